//! A small interpreter for CrabQL scripts.
//!
//! CrabQL is line oriented: every line holds at most one statement of the form
//! `command(arg1, arg2, ...)`, run in order against a namespaced key-value
//! store. Lines that aren't shaped like a statement are skipped, and a failing
//! statement is reported without stopping the script.
//!
//! The main entry point is [`Interpreter`], which drives the [`parser`] and a
//! [`Dispatcher`] over any [`Store`]. [`MemoryStore`] is the bundled store;
//! implement [`Store`] to run scripts against something else.

pub mod builtin;
pub mod command;
pub mod config;
pub mod error;
mod interpreter;
pub mod parser;
pub mod store;

pub use builtin::BUILTINS;
pub use command::{BuiltinCommand, CommandSpec, Dispatcher, Outcome};
pub use config::Config;
pub use error::{ErrorCode, RunError};
/// Just a convenient re-export of the script runner.
///
/// See [`Interpreter`] for the high-level API and examples.
pub use interpreter::{Interpreter, RunReport, StatementFailure};
pub use parser::Statement;
pub use store::{MemoryStore, Store};
