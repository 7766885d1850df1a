//! Turning script lines into statements.
//!
//! A statement looks like `command(arg1, arg2, ...)`. There is no quoting and
//! no nesting: the argument list ends at the first `)` and arguments are split
//! on every `,`, so values can't contain either character.

use crate::error::ErrorCode;

/// Separator between arguments.
pub const ARG_DELIMITER: char = ',';

/// Default bound on the number of arguments in one statement.
pub const DEFAULT_MAX_ARGS: usize = 10;

/// One parsed `command(args)` unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    /// Command name, trimmed. Case-sensitive.
    pub command: String,
    /// Arguments in declaration order, each trimmed.
    pub arguments: Vec<String>,
}

impl Statement {
    pub fn new(command: impl Into<String>, arguments: Vec<String>) -> Self {
        Self {
            command: command.into(),
            arguments,
        }
    }

    pub fn arity(&self) -> usize {
        self.arguments.len()
    }

    /// Borrowed view of the arguments, the shape the dispatcher works with.
    pub fn args(&self) -> Vec<&str> {
        self.arguments.iter().map(String::as_str).collect()
    }
}

impl std::fmt::Display for Statement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({})", self.command, self.arguments.join(", "))
    }
}

/// True for `#` comment lines.
pub fn is_comment(line: &str) -> bool {
    line.trim_start().starts_with('#')
}

/// Split a line into the command name and the raw text between the parentheses.
///
/// Returns `None` when the line isn't shaped like a statement: no `(`, no `)`
/// after it, or nothing but whitespace before the `(`. Text after the closing
/// `)` is ignored.
pub fn split_statement(line: &str) -> Option<(&str, &str)> {
    let open = line.find('(')?;
    let rest = &line[open + 1..];
    let close = rest.find(')')?;

    let command = line[..open].trim();
    if command.is_empty() {
        return None;
    }
    Some((command, &rest[..close]))
}

/// Split the raw argument text on [`ARG_DELIMITER`] and trim every field.
///
/// Blank input means no arguments. Empty fields and more than `max_args`
/// fields are rejected with [`ErrorCode::InvalidQuery`].
pub fn tokenize_arguments(raw: &str, max_args: usize) -> Result<Vec<String>, ErrorCode> {
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }

    let mut tokens = Vec::new();
    for (idx, field) in raw.split(ARG_DELIMITER).enumerate() {
        if idx >= max_args {
            return Err(ErrorCode::invalid_query(format!(
                "too many arguments (limit is {})",
                max_args
            )));
        }
        let field = field.trim();
        if field.is_empty() {
            return Err(ErrorCode::invalid_query(format!(
                "argument {} is empty",
                idx + 1
            )));
        }
        tokens.push(field.to_string());
    }
    Ok(tokens)
}

/// Split one script line (without its terminator) into its command and arguments.
///
/// Returns `None` when the line should be skipped: blank, a `#` comment, or
/// not shaped like a statement. Otherwise the command name comes back along
/// with the tokenized arguments, so a caller can still name the command when
/// the argument list is rejected.
pub fn parse_statement(
    line: &str,
    max_args: usize,
) -> Option<(&str, Result<Vec<String>, ErrorCode>)> {
    if is_comment(line) {
        return None;
    }
    let (command, raw_args) = split_statement(line)?;
    Some((command, tokenize_arguments(raw_args, max_args)))
}

/// Parse a single script line into a [`Statement`].
///
/// * `Ok(Some(statement))` - a statement to dispatch.
/// * `Ok(None)` - the line should be skipped, see [`parse_statement`].
/// * `Err(_)` - the line is a statement but its argument list is unusable.
pub fn parse_line(line: &str, max_args: usize) -> Result<Option<Statement>, ErrorCode> {
    let Some((command, arguments)) = parse_statement(line, max_args) else {
        return Ok(None);
    };
    Ok(Some(Statement::new(command, arguments?)))
}
