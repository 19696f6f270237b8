use crate::error::{Error, Violation};
use crate::vm::instruction::{Inst, Instruction, Label, Program, RawProgram};

/// Resolves the relative labels of a raw program into absolute pcs and
/// validates the result.
pub fn finalize(raw: RawProgram) -> crate::Result<Program> {
    let len = raw.instructions.len();

    let instructions = raw
        .instructions
        .into_iter()
        .enumerate()
        .map(|(pc, instruction)| {
            instruction.try_map_labels(|label| match label {
                Label::Hole => Err(Error::invariant(pc, Violation::UnpatchedHole)),
                Label::Relative(offset) => {
                    // saturated targets are out of range for any real length
                    let target = (pc as isize).saturating_add(offset);
                    usize::try_from(target)
                        .ok()
                        .filter(|&target| target < len)
                        .ok_or(Error::invariant(
                            pc,
                            Violation::TargetOutOfRange { target, len },
                        ))
                }
            })
        })
        .collect::<crate::Result<Vec<_>>>()?;

    validate(&instructions, raw.capture_groups)?;
    log::debug!("finalized program of {len} instructions");

    Ok(Program::new_unchecked(instructions, raw.capture_groups))
}

/// Checks the structural invariants the VM depends on.
pub(crate) fn validate(instructions: &[Instruction], capture_groups: usize) -> crate::Result<()> {
    let len = instructions.len();
    if len == 0 {
        return Err(Error::invariant(0, Violation::EmptyProgram));
    }

    // each group saves at least two slots of its own
    let slots = capture_groups
        .checked_mul(2)
        .and_then(|n| n.checked_add(2))
        .filter(|_| capture_groups <= len)
        .ok_or(Error::invariant(
            0,
            Violation::TooManyGroups {
                groups: capture_groups,
                len,
            },
        ))?;
    let in_range = |pc: usize, target: usize| {
        if target < len {
            Ok(())
        } else {
            Err(Error::invariant(
                pc,
                Violation::TargetOutOfRange {
                    target: target as isize,
                    len,
                },
            ))
        }
    };

    for (pc, instruction) in instructions.iter().enumerate() {
        match *instruction {
            Inst::Jump(target) => in_range(pc, target)?,
            Inst::Split(first, second) => {
                in_range(pc, first)?;
                in_range(pc, second)?;
            }
            Inst::Save(slot) if slot >= slots => {
                return Err(Error::invariant(
                    pc,
                    Violation::SlotOutOfRange { slot, slots },
                ));
            }
            Inst::Char(_) | Inst::Save(_) | Inst::Nop | Inst::Match => {}
        }

        if pc == len - 1 && instruction.falls_through() {
            return Err(Error::invariant(pc, Violation::FallsOffEnd));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vm::instruction::{Label::Relative as R, RawInstruction};

    fn raw(pattern: &str) -> RawProgram {
        crate::vm::compile::compile(crate::parser::parse(pattern).unwrap()).unwrap()
    }

    fn violation(result: crate::Result<Program>) -> (usize, Violation) {
        match result {
            Err(Error::CompileInvariantViolation { pc, violation }) => (pc, violation),
            other => panic!("expected an invariant violation, got {other:?}"),
        }
    }

    #[test]
    fn resolves_relative_labels() {
        let program = finalize(raw("a*|b")).unwrap();
        assert_eq!(
            program.instructions(),
            &[
                Inst::Save(0),
                Inst::Split(2, 6),
                Inst::Split(3, 7),
                Inst::Char('a'),
                Inst::Jump(2),
                Inst::Jump(7),
                Inst::Char('b'),
                Inst::Save(1),
                Inst::Match,
            ]
        );
        assert_eq!(program.capture_groups(), 0);
    }

    #[test]
    fn rejects_unpatched_holes() {
        let program = RawProgram {
            instructions: vec![Inst::Split(R(1), Label::Hole), Inst::Match],
            capture_groups: 0,
        };
        assert_eq!(violation(finalize(program)), (0, Violation::UnpatchedHole));
    }

    #[test]
    fn rejects_out_of_range_targets() {
        let program = RawProgram {
            instructions: vec![Inst::Jump(R(2)), Inst::Match],
            capture_groups: 0,
        };
        assert_eq!(
            violation(finalize(program)),
            (0, Violation::TargetOutOfRange { target: 2, len: 2 })
        );

        let program = RawProgram {
            instructions: vec![Inst::Nop, Inst::Split(R(0), R(-2)), Inst::Match],
            capture_groups: 0,
        };
        assert_eq!(
            violation(finalize(program)),
            (1, Violation::TargetOutOfRange { target: -1, len: 3 })
        );
    }

    #[test]
    fn rejects_out_of_range_slots() {
        let program = RawProgram {
            instructions: vec![Inst::Save(0), Inst::Save(4), Inst::Match],
            capture_groups: 1,
        };
        assert_eq!(
            violation(finalize(program)),
            (1, Violation::SlotOutOfRange { slot: 4, slots: 4 })
        );
    }

    #[test]
    fn rejects_falling_off_the_end() {
        for last in [Inst::Char('a'), Inst::Save(0), Inst::Nop] {
            let program = RawProgram {
                instructions: vec![Inst::Match, last],
                capture_groups: 0,
            };
            assert_eq!(violation(finalize(program)), (1, Violation::FallsOffEnd));
        }

        let program = RawProgram {
            instructions: vec![],
            capture_groups: 0,
        };
        assert_eq!(violation(finalize(program)), (0, Violation::EmptyProgram));
    }

    #[test]
    fn rejects_extreme_operands() {
        let program = RawProgram {
            instructions: vec![Inst::Match, Inst::Jump(R(isize::MAX))],
            capture_groups: 0,
        };
        assert_eq!(
            violation(finalize(program)),
            (
                1,
                Violation::TargetOutOfRange {
                    target: isize::MAX,
                    len: 2
                }
            )
        );

        let program = RawProgram {
            instructions: vec![Inst::Match, Inst::Split(R(-1), R(isize::MIN))],
            capture_groups: 0,
        };
        assert_eq!(
            violation(finalize(program)),
            (
                1,
                Violation::TargetOutOfRange {
                    target: isize::MIN + 1,
                    len: 2
                }
            )
        );

        for groups in [usize::MAX, usize::MAX / 2, 2] {
            assert_eq!(
                violation(Program::from_instructions(vec![Inst::Match], groups)),
                (0, Violation::TooManyGroups { groups, len: 1 })
            );
        }
    }

    #[test]
    fn from_instructions_validates() {
        assert!(Program::from_instructions(vec![Inst::Char('a'), Inst::Match], 0).is_ok());
        assert!(Program::from_instructions(vec![Inst::Jump(5), Inst::Match], 0).is_err());
        assert!(Program::from_instructions(vec![Inst::Save(2), Inst::Match], 0).is_err());
    }

    /// Corrupts every operand of every compiled program in turn and checks
    /// that the finalizer refuses each broken variant.
    #[test]
    fn mutated_programs_are_rejected() {
        let patterns = ["abc", "a|b|c", "(a*)+b?", "((a)|(b))*?c", "(?:x+?y)|()"];
        let mut rejected = 0;

        for pattern in patterns {
            let original = raw(pattern);
            let len = original.instructions.len() as isize;
            assert!(finalize(original.clone()).is_ok());

            for pc in 0..original.instructions.len() {
                let mutations: Vec<RawInstruction> = match original.instructions[pc] {
                    Inst::Jump(_) => vec![
                        Inst::Jump(Label::Hole),
                        Inst::Jump(R(len - pc as isize)),
                        Inst::Jump(R(-(pc as isize) - 1)),
                        Inst::Jump(R(isize::MAX)),
                        Inst::Jump(R(isize::MIN)),
                    ],
                    Inst::Split(first, second) => vec![
                        Inst::Split(Label::Hole, second),
                        Inst::Split(first, Label::Hole),
                        Inst::Split(R(len + 7), second),
                        Inst::Split(first, R(-(pc as isize) - 3)),
                        Inst::Split(R(isize::MAX), second),
                        Inst::Split(first, R(isize::MIN)),
                    ],
                    Inst::Save(_) => vec![
                        Inst::Save(original.capture_groups * 2 + 2),
                        Inst::Save(usize::MAX),
                    ],
                    Inst::Char(_) | Inst::Match | Inst::Nop => vec![],
                };

                for mutation in mutations {
                    let mut broken = original.clone();
                    broken.instructions[pc] = mutation;
                    assert!(matches!(
                        finalize(broken),
                        Err(Error::CompileInvariantViolation { .. })
                    ));
                    rejected += 1;
                }
            }

            let mut crowded = original.clone();
            crowded.capture_groups = usize::MAX;
            assert!(matches!(
                finalize(crowded),
                Err(Error::CompileInvariantViolation { .. })
            ));

            let mut truncated = original.clone();
            truncated.instructions.pop();
            assert!(matches!(
                finalize(truncated),
                Err(Error::CompileInvariantViolation { .. })
            ));
        }

        assert!(rejected > 40);
    }
}
