use crate::error::{Error, Violation};
use crate::parser::AstNode;
use crate::vm::instruction::{Inst, Label, RawInstruction, RawProgram};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operand {
    First,
    Second,
}

/// A jump operand whose target is the entry of whatever fragment comes
/// next. Fragments hand these back to the combinator that placed them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Hole {
    pc: usize,
    operand: Operand,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Compiler {
    instructions: Vec<RawInstruction>,
    capture_groups: usize,
}

impl Compiler {
    pub fn new() -> Self {
        Compiler::default()
    }

    fn pc(&self) -> usize {
        self.instructions.len()
    }

    fn emit(&mut self, instruction: RawInstruction) -> usize {
        self.instructions.push(instruction);
        self.instructions.len() - 1
    }

    fn label(from: usize, to: usize) -> Label {
        Label::Relative(to as isize - from as isize)
    }

    /// Emits a split with one operand pointing at `target` and the other left
    /// as a hole. `target` gets priority when `prefer_target` is set.
    fn emit_split(&mut self, target: usize, prefer_target: bool) -> Hole {
        let pc = self.pc();
        let target = Compiler::label(pc, target);

        if prefer_target {
            self.emit(Inst::Split(target, Label::Hole));
            Hole {
                pc,
                operand: Operand::Second,
            }
        } else {
            self.emit(Inst::Split(Label::Hole, target));
            Hole {
                pc,
                operand: Operand::First,
            }
        }
    }

    fn emit_jump(&mut self) -> Hole {
        Hole {
            pc: self.emit(Inst::Jump(Label::Hole)),
            operand: Operand::First,
        }
    }

    fn patch(&mut self, holes: Vec<Hole>, target: usize) -> crate::Result<()> {
        for hole in holes {
            let label = Compiler::label(hole.pc, target);
            let slot = match (self.instructions.get_mut(hole.pc), hole.operand) {
                (Some(Inst::Jump(slot)), Operand::First)
                | (Some(Inst::Split(slot, _)), Operand::First)
                | (Some(Inst::Split(_, slot)), Operand::Second) => slot,
                _ => return Err(Error::invariant(hole.pc, Violation::NotAHole)),
            };

            if *slot != Label::Hole {
                return Err(Error::invariant(hole.pc, Violation::NotAHole));
            }
            *slot = label;
        }

        Ok(())
    }

    /// Compiles `node` at the current pc and returns its dangling exits.
    fn compile_node(&mut self, node: AstNode) -> crate::Result<Vec<Hole>> {
        match node {
            AstNode::Literal(c) => {
                self.emit(Inst::Char(c));
                Ok(vec![])
            }
            AstNode::Concat(nodes) => {
                let mut holes = vec![];
                for node in nodes {
                    let entry = self.pc();
                    self.patch(holes, entry)?;
                    holes = self.compile_node(node)?;
                }

                Ok(holes)
            }
            AstNode::Alternation(left, right) => {
                // Walk the right spine of a|b|c|... in a loop so long
                // alternations do not grow the call stack.
                let mut exits = vec![];
                let mut node = AstNode::Alternation(left, right);

                while let AstNode::Alternation(left, right) = node {
                    let split = self.emit_split(self.pc() + 1, true);
                    exits.extend(self.compile_node(*left)?);
                    exits.push(self.emit_jump());

                    let entry = self.pc();
                    self.patch(vec![split], entry)?;
                    node = *right;
                }

                exits.extend(self.compile_node(node)?);
                Ok(exits)
            }
            AstNode::Star { inner, greedy } => {
                let split = self.pc();
                let exit = self.emit_split(split + 1, greedy);
                let holes = self.compile_node(*inner)?;

                let jump = self.emit(Inst::Jump(Compiler::label(self.pc(), split)));
                self.patch(holes, jump)?;

                Ok(vec![exit])
            }
            AstNode::Plus { inner, greedy } => {
                let entry = self.pc();
                let holes = self.compile_node(*inner)?;

                let split = self.pc();
                self.patch(holes, split)?;

                Ok(vec![self.emit_split(entry, greedy)])
            }
            AstNode::Question { inner, greedy } => {
                let exit = self.emit_split(self.pc() + 1, greedy);
                let mut holes = self.compile_node(*inner)?;
                holes.push(exit);

                Ok(holes)
            }
            AstNode::Group {
                inner,
                capture: Some(index),
            } => {
                self.capture_groups = self.capture_groups.max(index);

                self.emit(Inst::Save(2 * index));
                let holes = self.compile_node(*inner)?;
                let end = self.pc();
                self.patch(holes, end)?;
                self.emit(Inst::Save(2 * index + 1));

                Ok(vec![])
            }
            AstNode::Group {
                inner,
                capture: None,
            } => self.compile_node(*inner),
        }
    }

    pub fn compile(mut self, ast: AstNode) -> crate::Result<RawProgram> {
        self.emit(Inst::Save(0));
        let holes = self.compile_node(ast)?;
        let end = self.pc();
        self.patch(holes, end)?;
        self.emit(Inst::Save(1));
        self.emit(Inst::Match);

        log::debug!(
            "compiled {} instructions for {} capture groups",
            self.instructions.len(),
            self.capture_groups
        );

        Ok(RawProgram {
            instructions: self.instructions,
            capture_groups: self.capture_groups,
        })
    }
}

pub fn compile(ast: AstNode) -> crate::Result<RawProgram> {
    Compiler::new().compile(ast)
}
