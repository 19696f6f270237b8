#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("syntax error at position {position}: {reason}")]
    Syntax {
        position: usize,
        reason: SyntaxReason,
    },
    /// The compiler or finalizer produced a program that breaks the
    /// structural invariants the VM relies on. Never caused by user input.
    #[error("compile invariant violated at pc {pc}: {violation}")]
    CompileInvariantViolation { pc: usize, violation: Violation },
}

#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyntaxReason {
    #[error("unmatched closing parenthesis")]
    UnmatchedRightParen,
    #[error("missing closing parenthesis")]
    MissingRightParen,
    #[error("quantifier `{0}` has nothing to repeat")]
    DanglingQuantifier(char),
    #[error("quantifier `{0}` repeats another quantifier")]
    RepeatedQuantifier(char),
    #[error("empty alternative")]
    EmptyAlternative,
    #[error("invalid escape sequence `\\{0}`")]
    InvalidEscape(char),
    #[error("trailing backslash")]
    TrailingBackslash,
    #[error("unsupported group syntax")]
    UnsupportedGroup,
    #[error("groups nested more than {} levels deep", crate::parser::MAX_NESTING)]
    NestingTooDeep,
}

#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Violation {
    #[error("patched operand is not a hole")]
    NotAHole,
    #[error("jump operand was never patched")]
    UnpatchedHole,
    #[error("jump target {target} outside program of length {len}")]
    TargetOutOfRange { target: isize, len: usize },
    #[error("save slot {slot} outside {slots} capture slots")]
    SlotOutOfRange { slot: usize, slots: usize },
    #[error("{groups} capture groups cannot fit in a program of length {len}")]
    TooManyGroups { groups: usize, len: usize },
    #[error("control falls off the end of the program")]
    FallsOffEnd,
    #[error("program is empty")]
    EmptyProgram,
}

impl Error {
    pub(crate) fn syntax(position: usize, reason: SyntaxReason) -> Self {
        Error::Syntax { position, reason }
    }

    pub(crate) fn invariant(pc: usize, violation: Violation) -> Self {
        Error::CompileInvariantViolation { pc, violation }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
