/// A VM instruction. `L` is the type of the jump operands: a [`Label`] while
/// the compiler is still emitting code, an absolute pc once the program has
/// been finalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Inst<L> {
    Char(char),
    Match,
    Jump(L),
    /// Both targets run at the same input position; the first one has
    /// priority.
    Split(L, L),
    Save(usize),
    Nop,
}

pub type Instruction = Inst<usize>;
pub type RawInstruction = Inst<Label>;

/// Jump operand of a raw instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Label {
    /// Target not known yet; recorded in the compiler's patch list.
    Hole,
    /// Offset from the pc of the instruction holding the label.
    Relative(isize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum Opcode {
    Char = 0,
    Match = 1,
    Jump = 2,
    Split = 3,
    Save = 4,
    Nop = 5,
}

impl Opcode {
    pub fn mnemonic(self) -> &'static str {
        match self {
            Opcode::Char => "char",
            Opcode::Match => "match",
            Opcode::Jump => "jmp",
            Opcode::Split => "split",
            Opcode::Save => "save",
            Opcode::Nop => "nop",
        }
    }
}

/// Flat view of an instruction: the opcode plus every field any opcode
/// uses. Fields the opcode does not use are zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InstRecord {
    pub op: Opcode,
    pub ch: char,
    pub label1: usize,
    pub label2: usize,
}

impl<L> Inst<L> {
    pub fn opcode(&self) -> Opcode {
        match self {
            Inst::Char(_) => Opcode::Char,
            Inst::Match => Opcode::Match,
            Inst::Jump(_) => Opcode::Jump,
            Inst::Split(_, _) => Opcode::Split,
            Inst::Save(_) => Opcode::Save,
            Inst::Nop => Opcode::Nop,
        }
    }

    /// Whether control continues at the next pc after this instruction.
    pub fn falls_through(&self) -> bool {
        matches!(self, Inst::Char(_) | Inst::Save(_) | Inst::Nop)
    }

    pub(crate) fn try_map_labels<M, E>(
        self,
        mut f: impl FnMut(L) -> Result<M, E>,
    ) -> Result<Inst<M>, E> {
        Ok(match self {
            Inst::Char(c) => Inst::Char(c),
            Inst::Match => Inst::Match,
            Inst::Jump(target) => Inst::Jump(f(target)?),
            Inst::Split(first, second) => Inst::Split(f(first)?, f(second)?),
            Inst::Save(slot) => Inst::Save(slot),
            Inst::Nop => Inst::Nop,
        })
    }
}

impl Instruction {
    pub fn record(&self) -> InstRecord {
        let (ch, label1, label2) = match *self {
            Inst::Char(c) => (c, 0, 0),
            Inst::Jump(target) => ('\0', target, 0),
            Inst::Split(first, second) => ('\0', first, second),
            Inst::Save(slot) => ('\0', slot, 0),
            Inst::Match | Inst::Nop => ('\0', 0, 0),
        };

        InstRecord {
            op: self.opcode(),
            ch,
            label1,
            label2,
        }
    }

    pub fn from_record(record: InstRecord) -> Instruction {
        match record.op {
            Opcode::Char => Inst::Char(record.ch),
            Opcode::Match => Inst::Match,
            Opcode::Jump => Inst::Jump(record.label1),
            Opcode::Split => Inst::Split(record.label1, record.label2),
            Opcode::Save => Inst::Save(record.label1),
            Opcode::Nop => Inst::Nop,
        }
    }
}

impl std::fmt::Display for Label {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Label::Hole => write!(f, "?"),
            Label::Relative(offset) => write!(f, "{offset:+}"),
        }
    }
}

impl<L: std::fmt::Display> std::fmt::Display for Inst<L> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mnemonic = self.opcode().mnemonic();
        match self {
            Inst::Char(c) => write!(f, "{mnemonic} {c:?}"),
            Inst::Jump(target) => write!(f, "{mnemonic} {target}"),
            Inst::Split(first, second) => write!(f, "{mnemonic} {first}, {second}"),
            Inst::Save(slot) => write!(f, "{mnemonic} {slot}"),
            Inst::Match | Inst::Nop => write!(f, "{mnemonic}"),
        }
    }
}

/// Compiler output, before jump resolution and validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawProgram {
    pub instructions: Vec<RawInstruction>,
    pub capture_groups: usize,
}

/// A finalized program. Every value of this type has passed validation: jump
/// targets and save slots are in range and no instruction falls off the end,
/// so the VM can index it without checks.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Program {
    instructions: Vec<Instruction>,
    capture_groups: usize,
}

impl Program {
    pub(crate) fn new_unchecked(instructions: Vec<Instruction>, capture_groups: usize) -> Self {
        Program {
            instructions,
            capture_groups,
        }
    }

    /// Builds a program from already resolved instructions, such as a table
    /// embedded by generated code.
    pub fn from_instructions(
        instructions: Vec<Instruction>,
        capture_groups: usize,
    ) -> crate::Result<Self> {
        crate::vm::finalize::validate(&instructions, capture_groups)?;

        Ok(Program::new_unchecked(instructions, capture_groups))
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    pub fn records(&self) -> impl Iterator<Item = InstRecord> + '_ {
        self.instructions.iter().map(Instruction::record)
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    pub fn capture_groups(&self) -> usize {
        self.capture_groups
    }

    /// Two slots per capturing group, not counting the whole-match pair.
    pub fn num_captures(&self) -> usize {
        2 * self.capture_groups
    }

    /// Size of a thread's slot table, whole-match pair included.
    pub fn slot_count(&self) -> usize {
        self.num_captures() + 2
    }
}

impl std::ops::Index<usize> for Program {
    type Output = Instruction;

    fn index(&self, pc: usize) -> &Instruction {
        &self.instructions[pc]
    }
}

impl std::fmt::Display for Program {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (pc, instruction) in self.instructions.iter().enumerate() {
            writeln!(f, "{pc:04}: {instruction}")?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records() {
        let instructions = [
            Inst::Save(2),
            Inst::Char('x'),
            Inst::Split(3, 5),
            Inst::Jump(1),
            Inst::Nop,
            Inst::Match,
        ];

        assert_eq!(
            instructions[2].record(),
            InstRecord {
                op: Opcode::Split,
                ch: '\0',
                label1: 3,
                label2: 5
            }
        );
        assert_eq!(instructions[1].record().op as u8, 0);
        assert_eq!(instructions[5].record().op as u8, 1);

        for instruction in instructions {
            assert_eq!(Instruction::from_record(instruction.record()), instruction);
        }
    }

    #[test]
    fn display() {
        assert_eq!(Inst::Char::<usize>('a').to_string(), "char 'a'");
        assert_eq!(Inst::<usize>::Split(1, 3).to_string(), "split 1, 3");
        assert_eq!(
            Inst::Split(Label::Relative(1), Label::Hole).to_string(),
            "split +1, ?"
        );
        assert_eq!(Inst::Jump(Label::Relative(-4)).to_string(), "jmp -4");

        let program = Program::new_unchecked(
            vec![Inst::Save(0), Inst::Char('\n'), Inst::Save(1), Inst::Match],
            0,
        );
        assert_eq!(
            program.to_string(),
            "0000: save 0\n0001: char '\\n'\n0002: save 1\n0003: match\n"
        );
    }

    #[test]
    fn slot_counts() {
        let program = Program::new_unchecked(vec![Inst::Match], 2);
        assert_eq!(program.num_captures(), 4);
        assert_eq!(program.slot_count(), 6);
    }
}
