use crate::command::{Dispatcher, Outcome};
use crate::config::Config;
use crate::error::{ErrorCode, RunError};
use crate::parser::{self, Statement};
use crate::store::Store;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::Path;

/// A statement that was dispatched and failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatementFailure {
    /// 1-based line number in the script.
    pub line: usize,
    pub command: String,
    pub error: ErrorCode,
}

/// Summary of a completed script run.
///
/// A run that produced a report read its whole source; individual statements
/// may still have failed, see [`RunReport::failures`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    /// Lines read.
    pub lines: usize,
    /// Lines that weren't statements (blank, comments, malformed shape).
    pub skipped: usize,
    /// Statements handed to the dispatcher.
    pub executed: usize,
    pub failures: Vec<StatementFailure>,
}

impl RunReport {
    pub fn succeeded(&self) -> usize {
        self.executed - self.failures.len()
    }

    /// True when every executed statement succeeded.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Runs CrabQL scripts against a borrowed [`Store`].
///
/// Statements are executed one line at a time, best effort: a failing
/// statement is reported and the next line runs anyway. Nothing is rolled
/// back. The store is only borrowed for the duration of a call, the caller
/// keeps ownership.
///
/// Example
/// ```
/// use crabql::{Interpreter, MemoryStore};
/// let mut store = MemoryStore::new();
/// let script = "insert(dinos, T-Rex, big)\nget(dinos, T-Rex)\n";
/// let (mut out, mut err) = (Vec::new(), Vec::new());
/// let report = Interpreter::default()
///     .run_reader(&mut store, script.as_bytes(), &mut out, &mut err)
///     .unwrap();
/// assert_eq!(report.executed, 2);
/// assert_eq!(String::from_utf8(out).unwrap(), "big\n");
/// ```
#[derive(Debug, Clone, Default)]
pub struct Interpreter {
    config: Config,
    dispatcher: Dispatcher,
}

impl Interpreter {
    /// Create an interpreter with a custom configuration and command table.
    pub fn new(config: Config, dispatcher: Dispatcher) -> Self {
        Self { config, dispatcher }
    }

    /// Built-in commands with the given configuration.
    pub fn with_config(config: Config) -> Self {
        Self::new(config, Dispatcher::default())
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Run the script at `path`.
    ///
    /// Outcomes of successful statements go to `out`, failures to `err`.
    pub fn run_file(
        &self,
        store: &mut dyn Store,
        path: impl AsRef<Path>,
        out: &mut dyn Write,
        err: &mut dyn Write,
    ) -> Result<RunReport, RunError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| RunError::ScriptUnreadable {
            path: path.to_path_buf(),
            source,
        })?;
        log::info!("running script {}", path.display());
        self.run_reader(store, BufReader::new(file), out, err)
    }

    /// Run a script read from any buffered source.
    ///
    /// Lines are decoded leniently: invalid UTF-8 becomes U+FFFD and only
    /// affects the line it appears on.
    pub fn run_reader(
        &self,
        store: &mut dyn Store,
        mut reader: impl BufRead,
        out: &mut dyn Write,
        err: &mut dyn Write,
    ) -> Result<RunReport, RunError> {
        let mut report = RunReport::default();
        let mut buf = Vec::new();

        loop {
            let line_no = report.lines + 1;
            buf.clear();
            let n = reader
                .read_until(b'\n', &mut buf)
                .map_err(|source| RunError::Read {
                    line: line_no,
                    source,
                })?;
            if n == 0 {
                break;
            }
            report.lines = line_no;

            let text = String::from_utf8_lossy(&buf);
            let line = strip_terminator(&text);
            let Some((command, result)) = self.execute_line(store, line) else {
                log::trace!("line {}: skipped", line_no);
                report.skipped += 1;
                continue;
            };
            report.executed += 1;

            let failure = self
                .report_outcome(line_no, line, command, result, out, err)
                .map_err(|source| RunError::Output { source })?;
            report.failures.extend(failure);
        }

        log::info!(
            "script finished: {} line(s), {} executed, {} failed",
            report.lines,
            report.executed,
            report.failures.len()
        );
        Ok(report)
    }

    /// Run a single line. `None` means the line was skipped.
    pub fn run_line(
        &self,
        store: &mut dyn Store,
        line: &str,
    ) -> Option<Result<Outcome, ErrorCode>> {
        self.execute_line(store, line).map(|(_, result)| result)
    }

    /// Interactive read-eval-print loop over the same per-line semantics as a script.
    ///
    /// Every entered line counts towards the line numbers in error reports.
    pub fn repl(&self, store: &mut dyn Store) -> rustyline::Result<()> {
        let mut rl = DefaultEditor::new()?;
        let mut line_no = 0;

        loop {
            match rl.readline("crabql> ") {
                Ok(line) => {
                    line_no += 1;
                    if line.trim().is_empty() {
                        continue;
                    }
                    rl.add_history_entry(line.as_str())?;
                    match self.execute_line(store, &line) {
                        Some((command, result)) => {
                            self.report_outcome(
                                line_no,
                                &line,
                                command,
                                result,
                                &mut io::stdout().lock(),
                                &mut io::stderr().lock(),
                            )?;
                        }
                        None => eprintln!("not a statement, expected command(arg, ...)"),
                    }
                    io::stdout().flush()?;
                }
                Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
                Err(err) => return Err(err),
            }
        }

        Ok(())
    }

    /// Parse and dispatch one line, returning the command name with its result.
    fn execute_line<'l>(
        &self,
        store: &mut dyn Store,
        line: &'l str,
    ) -> Option<(&'l str, Result<Outcome, ErrorCode>)> {
        let (command, args) = parser::parse_statement(line, self.config.max_args)?;
        let result = args.and_then(|args| {
            self.dispatcher
                .dispatch(&Statement::new(command, args), store)
        });
        Some((command, result))
    }

    /// Write a dispatched line's result: the echo and outcome to `out`, a
    /// failure to `err`. Returns the failure for the caller to record.
    fn report_outcome(
        &self,
        line_no: usize,
        line: &str,
        command: &str,
        result: Result<Outcome, ErrorCode>,
        out: &mut dyn Write,
        err: &mut dyn Write,
    ) -> io::Result<Option<StatementFailure>> {
        if self.config.echo {
            writeln!(out, "> {}", line.trim())?;
        }
        match result {
            Ok(outcome) => {
                write!(out, "{}", outcome)?;
                Ok(None)
            }
            Err(error) => {
                log::warn!("line {}: {} failed: {}", line_no, command, error);
                writeln!(
                    err,
                    "Error executing command '{}' (line {}): {}",
                    command, line_no, error
                )?;
                Ok(Some(StatementFailure {
                    line: line_no,
                    command: command.to_string(),
                    error,
                }))
            }
        }
    }
}

fn strip_terminator(line: &str) -> &str {
    let line = line.strip_suffix('\n').unwrap_or(line);
    line.strip_suffix('\r').unwrap_or(line)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn run(interp: &Interpreter, store: &mut MemoryStore, script: &str) -> (RunReport, String, String) {
        let (mut out, mut err) = (Vec::new(), Vec::new());
        let report = interp
            .run_reader(store, script.as_bytes(), &mut out, &mut err)
            .unwrap();
        (
            report,
            String::from_utf8(out).unwrap(),
            String::from_utf8(err).unwrap(),
        )
    }

    #[test]
    fn test_failures_do_not_stop_the_run() {
        let mut store = MemoryStore::new();
        let script = "\
insert(dinos, T-Rex, big)
get(dinos, Stegosaurus)
bogus(1)
# a comment
no parens here
insert(dinos, Velociraptor, fast)
get(dinos, Velociraptor)
";
        let (report, out, err) = run(&Interpreter::default(), &mut store, script);

        assert_eq!(report.lines, 7);
        assert_eq!(report.skipped, 2);
        assert_eq!(report.executed, 5);
        assert_eq!(report.failures.len(), 2);
        assert_eq!(report.succeeded(), 3);
        assert!(!report.is_clean());

        assert_eq!(report.failures[0].line, 2);
        assert_eq!(report.failures[0].command, "get");
        assert_eq!(
            report.failures[0].error,
            ErrorCode::key_not_found("dinos", "Stegosaurus")
        );
        assert_eq!(report.failures[1].command, "bogus");

        assert_eq!(out, "fast\n");
        assert!(err.contains("Error executing command 'get' (line 2): key not found"));
        assert!(err.contains("Error executing command 'bogus' (line 3)"));
        assert_eq!(store.get("dinos", "Velociraptor").unwrap(), "fast");
    }

    #[test]
    fn test_too_many_arguments_is_a_reported_failure() {
        let mut store = MemoryStore::new();
        let config = Config {
            max_args: 2,
            ..Config::default()
        };
        let (report, _, err) = run(
            &Interpreter::with_config(config),
            &mut store,
            "insert(dinos, T-Rex, big)\n",
        );
        assert_eq!(report.executed, 1);
        assert!(matches!(
            report.failures[0].error,
            ErrorCode::InvalidQuery { .. }
        ));
        assert!(err.contains("'insert'"));
        assert!(store.namespaces().is_empty());
    }

    #[test]
    fn test_crlf_and_missing_final_newline() {
        let mut store = MemoryStore::new();
        let (report, out, _) = run(
            &Interpreter::default(),
            &mut store,
            "insert(a, k, v)\r\nget(a, k)",
        );
        assert_eq!(report.lines, 2);
        assert!(report.is_clean());
        assert_eq!(out, "v\n");
    }

    #[test]
    fn test_echo_mode() {
        let mut store = MemoryStore::new();
        let config = Config {
            echo: true,
            ..Config::default()
        };
        let (_, out, _) = run(
            &Interpreter::with_config(config),
            &mut store,
            "  insert(a, k, v)  \nget(a, k)\n\n",
        );
        assert_eq!(out, "> insert(a, k, v)\n> get(a, k)\nv\n");
    }

    #[test]
    fn test_run_line() {
        let interp = Interpreter::default();
        let mut store = MemoryStore::new();
        assert_eq!(interp.run_line(&mut store, "count(x"), None);
        assert_eq!(
            interp.run_line(&mut store, "insert(a, k, v)"),
            Some(Ok(Outcome::Done))
        );
        assert_eq!(
            interp.run_line(&mut store, "count(a)"),
            Some(Ok(Outcome::Count(1)))
        );
    }

    #[test]
    fn test_invalid_utf8_only_affects_its_line() {
        let mut store = MemoryStore::new();
        let mut script = b"insert(a, k, v)\n# caf".to_vec();
        script.extend_from_slice(&[0xff, 0xfe, b'\n']);
        script.extend_from_slice(b"insert(a, bad, ");
        script.extend_from_slice(&[0xc3, b')', b'\n']);
        script.extend_from_slice(b"get(a, k)\n");
        let (mut out, mut err) = (Vec::new(), Vec::new());
        let report = Interpreter::default()
            .run_reader(&mut store, &script[..], &mut out, &mut err)
            .unwrap();
        assert_eq!(report.lines, 4);
        assert_eq!(report.skipped, 1);
        assert_eq!(report.executed, 3);
        assert!(report.is_clean());
        assert_eq!(store.get("a", "bad").unwrap(), "\u{FFFD}");
        assert_eq!(out, b"v\n");
    }

    struct FailingReader {
        served: bool,
    }

    impl io::Read for FailingReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.served {
                return Err(io::Error::other("device gone"));
            }
            self.served = true;
            let line = b"insert(a, k, v)\n";
            buf[..line.len()].copy_from_slice(line);
            Ok(line.len())
        }
    }

    #[test]
    fn test_io_error_aborts_with_read_error() {
        let mut store = MemoryStore::new();
        let (mut out, mut err) = (Vec::new(), Vec::new());
        let reader = BufReader::new(FailingReader { served: false });
        let res = Interpreter::default().run_reader(&mut store, reader, &mut out, &mut err);
        assert!(matches!(res, Err(RunError::Read { line: 2, .. })));
        // statements before the failure already took effect
        assert_eq!(store.get("a", "k").unwrap(), "v");
    }

    #[test]
    fn test_report_outcome_echoes_and_numbers_failures() {
        let interp = Interpreter::with_config(Config {
            echo: true,
            ..Config::default()
        });
        let (mut out, mut err) = (Vec::new(), Vec::new());
        let failure = interp
            .report_outcome(
                3,
                " get(a, k) ",
                "get",
                Err(ErrorCode::namespace_not_found("a")),
                &mut out,
                &mut err,
            )
            .unwrap()
            .unwrap();
        assert_eq!(failure.line, 3);
        assert_eq!(String::from_utf8(out).unwrap(), "> get(a, k)\n");
        assert_eq!(
            String::from_utf8(err).unwrap(),
            "Error executing command 'get' (line 3): namespace not found: a\n"
        );

        let (mut out, mut err) = (Vec::new(), Vec::new());
        let failure = interp
            .report_outcome(
                4,
                "get(a, k)",
                "get",
                Ok(Outcome::Value("v".into())),
                &mut out,
                &mut err,
            )
            .unwrap();
        assert!(failure.is_none());
        assert_eq!(String::from_utf8(out).unwrap(), "> get(a, k)\nv\n");
        assert!(err.is_empty());
    }

    #[test]
    fn test_missing_file_is_unreadable() {
        let mut store = MemoryStore::new();
        let (mut out, mut err) = (Vec::new(), Vec::new());
        let res = Interpreter::default().run_file(
            &mut store,
            "/nonexistent/dir/script.crabql",
            &mut out,
            &mut err,
        );
        assert!(matches!(res, Err(RunError::ScriptUnreadable { .. })));
        assert!(out.is_empty() && err.is_empty());
    }

    #[test]
    fn test_strip_terminator() {
        assert_eq!(strip_terminator("a\r\n"), "a");
        assert_eq!(strip_terminator("a\n"), "a");
        assert_eq!(strip_terminator("a"), "a");
    }
}
