//! Code generation for function bodies.

mod formatter;
mod stmt;

pub use formatter::CodeFormatter;
pub use stmt::BodyGenerator;
