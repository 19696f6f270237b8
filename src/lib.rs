pub mod codegen;
mod error;
mod lexer;
pub mod parser;
pub mod vm;

pub use error::{Error, Result, SyntaxReason, Violation};
pub use parser::{AstNode, parse};
pub use vm::compile::compile;
pub use vm::finalize::finalize;
pub use vm::instruction::{
    Inst, InstRecord, Instruction, Label, Opcode, Program, RawInstruction, RawProgram,
};
pub use vm::{Captures, PikeVm, run};

/// A compiled regular expression.
///
/// Matching is anchored at the start of the input but not at the end: the
/// expression matches if some prefix of the input matches it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Regex {
    pattern: String,
    program: Program,
}

impl Regex {
    pub fn new(pattern: &str) -> Result<Regex> {
        let ast = parse(pattern)?;
        log::debug!(
            "parsed {pattern:?} with {} capturing groups",
            ast.capture_count()
        );
        let program = vm::build(ast)?;

        Ok(Regex {
            pattern: pattern.to_owned(),
            program,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.pattern
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    /// Number of capture slots, two per capturing group.
    pub fn num_captures(&self) -> usize {
        self.program.num_captures()
    }

    pub fn is_match(&self, input: &str) -> bool {
        PikeVm::new(&self.program).captures(input).is_some()
    }

    pub fn captures<'h>(&self, input: &'h str) -> Option<Captures<'h>> {
        PikeVm::new(&self.program).captures(input)
    }

    /// Same as [`run`] with this expression's program.
    pub fn run<'h>(&self, input: &'h str) -> (bool, Vec<Option<&'h str>>) {
        run(&self.program, input)
    }
}

impl std::str::FromStr for Regex {
    type Err = Error;

    fn from_str(pattern: &str) -> Result<Regex> {
        Regex::new(pattern)
    }
}

impl std::fmt::Display for Regex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.pattern)
    }
}
