use crate::error::ErrorCode;
use crate::parser::Statement;
use crate::store::Store;
use std::fmt;

/// What a successful statement produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The operation succeeded and has nothing to show.
    Done,
    /// A single looked-up value.
    Value(String),
    /// Names, e.g. namespaces or keys.
    List(Vec<String>),
    /// A number of items.
    Count(usize),
    /// `(key, value)` pairs.
    Entries(Vec<(String, String)>),
}

impl fmt::Display for Outcome {
    /// One item per line; [`Outcome::Done`] renders as nothing.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Done => Ok(()),
            Outcome::Value(value) => writeln!(f, "{}", value),
            Outcome::List(items) => items.iter().try_for_each(|item| writeln!(f, "{}", item)),
            Outcome::Count(n) => writeln!(f, "{}", n),
            Outcome::Entries(entries) => entries
                .iter()
                .try_for_each(|(k, v)| writeln!(f, "{} = {}", k, v)),
        }
    }
}

/// A command known to the dispatcher at compile time.
///
/// `ARITY` is the exact number of arguments the command takes. The dispatcher
/// checks it before calling [`BuiltinCommand::from_args`].
pub trait BuiltinCommand: Sized {
    /// Name used in scripts, e.g. "insert".
    const NAME: &'static str;
    const ARITY: usize;
    /// Argument names for usage messages, `ARITY` entries long.
    const PARAMS: &'static [&'static str];

    /// Build the command from its arguments.
    ///
    /// Through the dispatcher the arity is already checked. Implementations
    /// still destructure the slice with a fixed-length pattern and return
    /// `InvalidQuery` on a mismatch, which is what direct callers get.
    fn from_args(args: &[&str]) -> Result<Self, ErrorCode>;

    /// Run the command against the store.
    fn execute(self, store: &mut dyn Store) -> Result<Outcome, ErrorCode>;
}

type RunFn = fn(&[&str], &mut dyn Store) -> Result<Outcome, ErrorCode>;

/// Dispatch table entry: a command name, its arity and the code to run.
#[derive(Clone, Copy)]
pub struct CommandSpec {
    pub name: &'static str,
    pub arity: usize,
    pub params: &'static [&'static str],
    run: RunFn,
}

fn run_builtin<T: BuiltinCommand>(
    args: &[&str],
    store: &mut dyn Store,
) -> Result<Outcome, ErrorCode> {
    T::from_args(args)?.execute(store)
}

impl CommandSpec {
    /// Table entry for a [`BuiltinCommand`].
    pub const fn of<T: BuiltinCommand>() -> Self {
        Self {
            name: T::NAME,
            arity: T::ARITY,
            params: T::PARAMS,
            run: run_builtin::<T>,
        }
    }

    /// Entry backed by a plain function, for commands that don't warrant a type.
    pub const fn from_fn(
        name: &'static str,
        params: &'static [&'static str],
        run: RunFn,
    ) -> Self {
        Self {
            name,
            arity: params.len(),
            params,
            run,
        }
    }

    /// Usage string, e.g. `insert(namespace, key, value)`.
    pub fn usage(&self) -> String {
        format!("{}({})", self.name, self.params.join(", "))
    }

    /// Check the argument count and run. The store isn't touched on a mismatch.
    pub fn invoke(&self, args: &[&str], store: &mut dyn Store) -> Result<Outcome, ErrorCode> {
        if args.len() != self.arity {
            return Err(ErrorCode::invalid_query(format!(
                "{} expects {} argument(s), got {}; usage: {}",
                self.name,
                self.arity,
                args.len(),
                self.usage()
            )));
        }
        (self.run)(args, store)
    }
}

impl fmt::Debug for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandSpec")
            .field("name", &self.name)
            .field("arity", &self.arity)
            .finish()
    }
}

/// Routes statements to store operations.
///
/// Holds an immutable table of [`CommandSpec`]s and nothing else, so a single
/// dispatcher can serve any number of runs and stores. See [`Default`] for
/// the built-in command set.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    commands: Vec<CommandSpec>,
}

impl Dispatcher {
    /// Create a dispatcher with a custom command table.
    ///
    /// When two entries share a name, the first one wins.
    pub fn new(commands: Vec<CommandSpec>) -> Self {
        Self { commands }
    }

    pub fn commands(&self) -> &[CommandSpec] {
        &self.commands
    }

    pub fn lookup(&self, name: &str) -> Option<&CommandSpec> {
        self.commands.iter().find(|spec| spec.name == name)
    }

    /// Run one statement. Store errors come back exactly as the store returned them.
    pub fn dispatch(
        &self,
        statement: &Statement,
        store: &mut dyn Store,
    ) -> Result<Outcome, ErrorCode> {
        self.run(&statement.command, &statement.args(), store)
    }

    /// Run a command by name with already-split arguments.
    pub fn run(
        &self,
        name: &str,
        args: &[&str],
        store: &mut dyn Store,
    ) -> Result<Outcome, ErrorCode> {
        let spec = self
            .lookup(name)
            .ok_or_else(|| ErrorCode::invalid_query(format!("unknown command: {}", name)))?;
        log::debug!("dispatching {}({})", name, args.join(", "));
        spec.invoke(args, store)
    }
}

impl Default for Dispatcher {
    /// Dispatcher over [`crate::builtin::BUILTINS`].
    fn default() -> Self {
        Self::new(crate::builtin::BUILTINS.to_vec())
    }
}
