pub mod attributes;
pub mod codegen;
pub mod config;
pub mod decls;
pub mod diagnostics;
pub mod emit;
pub mod error;
pub mod func;
pub mod machine;
pub mod resolver;
pub mod scope;
pub mod session;
pub mod symbols;
pub mod types;

pub use attributes::{Attributes, ReturnMode};
pub use config::CompilerConfig;
pub use decls::{Compiled, Decl, DeclError};
pub use diagnostics::Diagnostic;
pub use emit::{emit, OutputUnit};
pub use error::CompileError;
pub use func::{Func, FuncBody};
pub use machine::{MachineRegistry, StateMachine};
pub use resolver::TypeResolver;
pub use scope::{FrameGuard, SymbolTable};
pub use session::{CompileOutput, Session};
pub use symbols::{Symbol, SymbolKind, Var};
pub use types::{Type, TypeHandle};
