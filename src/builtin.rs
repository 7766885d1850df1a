use crate::command::{BuiltinCommand, CommandSpec, Outcome};
use crate::error::ErrorCode;
use crate::store::Store;
use regex::Regex;

/// The command table used by [`crate::Dispatcher::default`].
pub static BUILTINS: &[CommandSpec] = &[
    CommandSpec::of::<CreateNamespace>(),
    CommandSpec::of::<EraseNamespace>(),
    CommandSpec::of::<Insert>(),
    CommandSpec::of::<Get>(),
    CommandSpec::of::<Update>(),
    CommandSpec::of::<Delete>(),
    CommandSpec::of::<ListNamespaces>(),
    CommandSpec::of::<ListKeys>(),
    CommandSpec::of::<Count>(),
    CommandSpec::of::<Search>(),
    CommandSpec::of::<Help>(),
];

fn arity_mismatch<T: BuiltinCommand>(args: &[&str]) -> ErrorCode {
    ErrorCode::invalid_query(format!(
        "{} expects {} argument(s), got {}",
        T::NAME,
        T::ARITY,
        args.len()
    ))
}

/// `create_namespace(namespace)`: add an empty namespace.
#[derive(Debug)]
pub struct CreateNamespace {
    pub namespace: String,
}

impl BuiltinCommand for CreateNamespace {
    const NAME: &'static str = "create_namespace";
    const ARITY: usize = 1;
    const PARAMS: &'static [&'static str] = &["namespace"];

    fn from_args(args: &[&str]) -> Result<Self, ErrorCode> {
        let [namespace] = args else {
            return Err(arity_mismatch::<Self>(args));
        };
        Ok(Self {
            namespace: namespace.to_string(),
        })
    }

    fn execute(self, store: &mut dyn Store) -> Result<Outcome, ErrorCode> {
        store.create_namespace(&self.namespace)?;
        Ok(Outcome::Done)
    }
}

/// `erase_namespace(namespace)`: drop a namespace and its keys.
#[derive(Debug)]
pub struct EraseNamespace {
    pub namespace: String,
}

impl BuiltinCommand for EraseNamespace {
    const NAME: &'static str = "erase_namespace";
    const ARITY: usize = 1;
    const PARAMS: &'static [&'static str] = &["namespace"];

    fn from_args(args: &[&str]) -> Result<Self, ErrorCode> {
        let [namespace] = args else {
            return Err(arity_mismatch::<Self>(args));
        };
        Ok(Self {
            namespace: namespace.to_string(),
        })
    }

    fn execute(self, store: &mut dyn Store) -> Result<Outcome, ErrorCode> {
        store.erase_namespace(&self.namespace)?;
        Ok(Outcome::Done)
    }
}

/// `insert(namespace, key, value)`
#[derive(Debug)]
pub struct Insert {
    pub namespace: String,
    pub key: String,
    pub value: String,
}

impl BuiltinCommand for Insert {
    const NAME: &'static str = "insert";
    const ARITY: usize = 3;
    const PARAMS: &'static [&'static str] = &["namespace", "key", "value"];

    fn from_args(args: &[&str]) -> Result<Self, ErrorCode> {
        let [namespace, key, value] = args else {
            return Err(arity_mismatch::<Self>(args));
        };
        Ok(Self {
            namespace: namespace.to_string(),
            key: key.to_string(),
            value: value.to_string(),
        })
    }

    fn execute(self, store: &mut dyn Store) -> Result<Outcome, ErrorCode> {
        store.insert(&self.namespace, &self.key, &self.value)?;
        Ok(Outcome::Done)
    }
}

/// `get(namespace, key)`
#[derive(Debug)]
pub struct Get {
    pub namespace: String,
    pub key: String,
}

impl BuiltinCommand for Get {
    const NAME: &'static str = "get";
    const ARITY: usize = 2;
    const PARAMS: &'static [&'static str] = &["namespace", "key"];

    fn from_args(args: &[&str]) -> Result<Self, ErrorCode> {
        let [namespace, key] = args else {
            return Err(arity_mismatch::<Self>(args));
        };
        Ok(Self {
            namespace: namespace.to_string(),
            key: key.to_string(),
        })
    }

    fn execute(self, store: &mut dyn Store) -> Result<Outcome, ErrorCode> {
        store.get(&self.namespace, &self.key).map(Outcome::Value)
    }
}

/// `update(namespace, key, value)`
#[derive(Debug)]
pub struct Update {
    pub namespace: String,
    pub key: String,
    pub value: String,
}

impl BuiltinCommand for Update {
    const NAME: &'static str = "update";
    const ARITY: usize = 3;
    const PARAMS: &'static [&'static str] = &["namespace", "key", "value"];

    fn from_args(args: &[&str]) -> Result<Self, ErrorCode> {
        let [namespace, key, value] = args else {
            return Err(arity_mismatch::<Self>(args));
        };
        Ok(Self {
            namespace: namespace.to_string(),
            key: key.to_string(),
            value: value.to_string(),
        })
    }

    fn execute(self, store: &mut dyn Store) -> Result<Outcome, ErrorCode> {
        store.update(&self.namespace, &self.key, &self.value)?;
        Ok(Outcome::Done)
    }
}

/// `delete(namespace, key)`
#[derive(Debug)]
pub struct Delete {
    pub namespace: String,
    pub key: String,
}

impl BuiltinCommand for Delete {
    const NAME: &'static str = "delete";
    const ARITY: usize = 2;
    const PARAMS: &'static [&'static str] = &["namespace", "key"];

    fn from_args(args: &[&str]) -> Result<Self, ErrorCode> {
        let [namespace, key] = args else {
            return Err(arity_mismatch::<Self>(args));
        };
        Ok(Self {
            namespace: namespace.to_string(),
            key: key.to_string(),
        })
    }

    fn execute(self, store: &mut dyn Store) -> Result<Outcome, ErrorCode> {
        store.delete(&self.namespace, &self.key)?;
        Ok(Outcome::Done)
    }
}

/// `list_namespaces()`
#[derive(Debug)]
pub struct ListNamespaces;

impl BuiltinCommand for ListNamespaces {
    const NAME: &'static str = "list_namespaces";
    const ARITY: usize = 0;
    const PARAMS: &'static [&'static str] = &[];

    fn from_args(args: &[&str]) -> Result<Self, ErrorCode> {
        if !args.is_empty() {
            return Err(arity_mismatch::<Self>(args));
        }
        Ok(Self)
    }

    fn execute(self, store: &mut dyn Store) -> Result<Outcome, ErrorCode> {
        Ok(Outcome::List(store.namespaces()))
    }
}

/// `list_keys(namespace)`
#[derive(Debug)]
pub struct ListKeys {
    pub namespace: String,
}

impl BuiltinCommand for ListKeys {
    const NAME: &'static str = "list_keys";
    const ARITY: usize = 1;
    const PARAMS: &'static [&'static str] = &["namespace"];

    fn from_args(args: &[&str]) -> Result<Self, ErrorCode> {
        let [namespace] = args else {
            return Err(arity_mismatch::<Self>(args));
        };
        Ok(Self {
            namespace: namespace.to_string(),
        })
    }

    fn execute(self, store: &mut dyn Store) -> Result<Outcome, ErrorCode> {
        let keys = store
            .entries(&self.namespace)?
            .into_iter()
            .map(|(key, _)| key)
            .collect();
        Ok(Outcome::List(keys))
    }
}

/// `count(namespace)`: number of keys in a namespace.
#[derive(Debug)]
pub struct Count {
    pub namespace: String,
}

impl BuiltinCommand for Count {
    const NAME: &'static str = "count";
    const ARITY: usize = 1;
    const PARAMS: &'static [&'static str] = &["namespace"];

    fn from_args(args: &[&str]) -> Result<Self, ErrorCode> {
        let [namespace] = args else {
            return Err(arity_mismatch::<Self>(args));
        };
        Ok(Self {
            namespace: namespace.to_string(),
        })
    }

    fn execute(self, store: &mut dyn Store) -> Result<Outcome, ErrorCode> {
        Ok(Outcome::Count(store.entries(&self.namespace)?.len()))
    }
}

/// `search(namespace, pattern)`: entries whose key or value matches a regular
/// expression.
///
/// The pattern is compiled before the store is queried, so a bad pattern is an
/// [`ErrorCode::InvalidQuery`] even for a missing namespace. Since arguments are
/// split on commas, patterns can't contain one (`{2,3}` style repetition is out).
#[derive(Debug)]
pub struct Search {
    pub namespace: String,
    pub pattern: Regex,
}

impl BuiltinCommand for Search {
    const NAME: &'static str = "search";
    const ARITY: usize = 2;
    const PARAMS: &'static [&'static str] = &["namespace", "pattern"];

    fn from_args(args: &[&str]) -> Result<Self, ErrorCode> {
        let [namespace, pattern] = args else {
            return Err(arity_mismatch::<Self>(args));
        };
        let pattern = Regex::new(pattern).map_err(|e| {
            ErrorCode::invalid_query(format!("invalid pattern {:?}: {}", pattern, e))
        })?;
        Ok(Self {
            namespace: namespace.to_string(),
            pattern,
        })
    }

    fn execute(self, store: &mut dyn Store) -> Result<Outcome, ErrorCode> {
        let matches = store
            .entries(&self.namespace)?
            .into_iter()
            .filter(|(key, value)| self.pattern.is_match(key) || self.pattern.is_match(value))
            .collect();
        Ok(Outcome::Entries(matches))
    }
}

/// `help()`: usage of every built-in command.
#[derive(Debug)]
pub struct Help;

impl BuiltinCommand for Help {
    const NAME: &'static str = "help";
    const ARITY: usize = 0;
    const PARAMS: &'static [&'static str] = &[];

    fn from_args(args: &[&str]) -> Result<Self, ErrorCode> {
        if !args.is_empty() {
            return Err(arity_mismatch::<Self>(args));
        }
        Ok(Self)
    }

    fn execute(self, _store: &mut dyn Store) -> Result<Outcome, ErrorCode> {
        Ok(Outcome::List(BUILTINS.iter().map(CommandSpec::usage).collect()))
    }
}
