//! Renders a compiled [`Program`] as Rust source.
//!
//! The output embeds the instruction table as a `static` and wraps it in a
//! function with the same signature as [`crate::run`]. The VM itself is not
//! copied into the output; the generated code calls the runtime crate.

use std::io::Write;

use crate::vm::instruction::Program;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    /// Name of the generated matching function.
    pub function_name: String,
    /// Path to the runtime crate as seen from the generated module.
    pub runtime: String,
}

impl Default for RenderOptions {
    fn default() -> Self {
        RenderOptions {
            function_name: "regex_match".to_owned(),
            runtime: "regvm".to_owned(),
        }
    }
}

pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    let head = matches!(chars.next(), Some(c) if c == '_' || c.is_ascii_alphabetic());

    head && name != "_" && chars.all(|c| c == '_' || c.is_ascii_alphanumeric())
}

/// Whether `path` is a `::`-separated path such as `regvm` or
/// `crate::deps::regvm`.
pub fn is_path(path: &str) -> bool {
    path.strip_prefix("::")
        .unwrap_or(path)
        .split("::")
        .all(is_identifier)
}

pub fn render<W: Write>(
    w: &mut W,
    pattern: &str,
    program: &Program,
    options: &RenderOptions,
) -> std::io::Result<()> {
    let runtime = &options.runtime;

    writeln!(w, "// Code generated by regvm-gen from {pattern:?}. DO NOT EDIT.")?;
    writeln!(w, "//")?;
    for line in program.to_string().lines() {
        writeln!(w, "// {line}")?;
    }
    writeln!(w)?;

    writeln!(w, "pub const NUM_CAPTURES: usize = {};", program.num_captures())?;
    writeln!(w)?;

    writeln!(w, "static INSTRUCTIONS: &[{runtime}::Instruction] = &[")?;
    for instruction in program.instructions() {
        writeln!(w, "    {runtime}::Instruction::{instruction:?},")?;
    }
    writeln!(w, "];")?;
    writeln!(w)?;

    writeln!(
        w,
        "pub fn {}(input: &str) -> (bool, Vec<Option<&str>>) {{",
        options.function_name
    )?;
    writeln!(
        w,
        "    static PROGRAM: std::sync::LazyLock<{runtime}::Program> = std::sync::LazyLock::new(|| {{"
    )?;
    writeln!(
        w,
        "        {runtime}::Program::from_instructions(INSTRUCTIONS.to_vec(), NUM_CAPTURES / 2)"
    )?;
    writeln!(w, "            .expect(\"embedded instruction table is valid\")")?;
    writeln!(w, "    }});")?;
    writeln!(w)?;
    writeln!(w, "    {runtime}::run(&PROGRAM, input)")?;
    writeln!(w, "}}")
}
