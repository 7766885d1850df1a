use std::path::PathBuf;

/// Failure of a single statement.
///
/// Produced by the dispatcher (for malformed or unknown statements) or by a
/// [`Store`](crate::store::Store) implementation, and handed back to the
/// caller untouched. The interpreter reports it and moves on to the next line.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ErrorCode {
    /// Malformed statement: unknown command, wrong number of arguments,
    /// too many or empty arguments, or an argument the command can't use.
    #[error("invalid query: {reason}")]
    InvalidQuery { reason: String },

    /// The key is absent from an existing namespace.
    #[error("key not found: {namespace}.{key}")]
    KeyNotFound { namespace: String, key: String },

    /// The namespace doesn't exist.
    #[error("namespace not found: {namespace}")]
    NamespaceNotFound { namespace: String },

    /// Insert of a key that is already present.
    #[error("key already exists: {namespace}.{key}")]
    KeyExists { namespace: String, key: String },

    /// Creation of a namespace that is already present.
    #[error("namespace already exists: {namespace}")]
    NamespaceExists { namespace: String },

    /// Anything else a store backend wants to report.
    #[error("store error: {reason}")]
    Store { reason: String },
}

impl ErrorCode {
    pub fn invalid_query(reason: impl Into<String>) -> Self {
        Self::InvalidQuery {
            reason: reason.into(),
        }
    }

    pub fn key_not_found(namespace: &str, key: &str) -> Self {
        Self::KeyNotFound {
            namespace: namespace.to_string(),
            key: key.to_string(),
        }
    }

    pub fn namespace_not_found(namespace: &str) -> Self {
        Self::NamespaceNotFound {
            namespace: namespace.to_string(),
        }
    }
}

/// Errors that stop a whole script run.
///
/// Statement failures never end up here; only problems with the script
/// source itself do.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    /// The script could not be opened.
    #[error("cannot open script {}", .path.display())]
    ScriptUnreadable {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Reading failed part way through.
    #[error("read error at line {line}")]
    Read { line: usize, source: std::io::Error },

    /// Results could not be written out.
    #[error("cannot write output")]
    Output { source: std::io::Error },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;
    use std::io;

    #[test]
    fn test_run_error_message_leaves_cause_to_source() {
        let err = RunError::ScriptUnreadable {
            path: PathBuf::from("/nowhere/dinos.crabql"),
            source: io::Error::new(io::ErrorKind::NotFound, "gone"),
        };
        assert_eq!(err.to_string(), "cannot open script /nowhere/dinos.crabql");
        assert_eq!(err.source().unwrap().to_string(), "gone");

        let err = RunError::Read {
            line: 3,
            source: io::Error::other("disk unplugged"),
        };
        assert_eq!(err.to_string(), "read error at line 3");
        assert_eq!(err.source().unwrap().to_string(), "disk unplugged");

        let err = RunError::Output {
            source: io::Error::other("broken pipe"),
        };
        assert!(!err.to_string().contains("broken pipe"));
    }

    #[test]
    fn test_error_code_messages() {
        assert_eq!(
            ErrorCode::key_not_found("dinos", "T-Rex").to_string(),
            "key not found: dinos.T-Rex"
        );
        assert_eq!(
            ErrorCode::namespace_not_found("dinos").to_string(),
            "namespace not found: dinos"
        );
    }
}
