pub mod compile;
pub mod finalize;
pub mod instruction;
mod pike;
mod threads;

pub use pike::{Captures, PikeVm, run};

/// Compiles and finalizes `ast` into a program the VM can run.
pub fn build(ast: crate::parser::AstNode) -> crate::Result<instruction::Program> {
    finalize::finalize(compile::compile(ast)?)
}
