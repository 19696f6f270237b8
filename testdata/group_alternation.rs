// Code generated by regvm-gen from "(a)|b". DO NOT EDIT.
//
// 0000: save 0
// 0001: split 2, 6
// 0002: save 2
// 0003: char 'a'
// 0004: save 3
// 0005: jmp 7
// 0006: char 'b'
// 0007: save 1
// 0008: match

pub const NUM_CAPTURES: usize = 2;

static INSTRUCTIONS: &[crate::Instruction] = &[
    crate::Instruction::Save(0),
    crate::Instruction::Split(2, 6),
    crate::Instruction::Save(2),
    crate::Instruction::Char('a'),
    crate::Instruction::Save(3),
    crate::Instruction::Jump(7),
    crate::Instruction::Char('b'),
    crate::Instruction::Save(1),
    crate::Instruction::Match,
];

pub fn regex_match(input: &str) -> (bool, Vec<Option<&str>>) {
    static PROGRAM: std::sync::LazyLock<crate::Program> = std::sync::LazyLock::new(|| {
        crate::Program::from_instructions(INSTRUCTIONS.to_vec(), NUM_CAPTURES / 2)
            .expect("embedded instruction table is valid")
    });

    crate::run(&PROGRAM, input)
}
