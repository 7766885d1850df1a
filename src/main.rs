use anyhow::{Context, Result};
use argh::FromArgs;
use crabql::{Config, Interpreter, MemoryStore};
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(FromArgs)]
/// Run a CrabQL script against an in-memory key-value store.
struct Args {
    #[argh(positional)]
    /// script to execute, one statement per line.
    script: Option<PathBuf>,

    #[argh(switch, short = 'i')]
    /// start an interactive session, after the script if one is given.
    interactive: bool,

    #[argh(option)]
    /// maximum number of arguments in a statement (default 10, or $CRABQL_MAX_ARGS).
    max_args: Option<usize>,

    #[argh(switch)]
    /// print every statement before its result.
    echo: bool,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .format_timestamp(None)
        .init();

    let args: Args = argh::from_env();
    match try_main(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn try_main(args: Args) -> Result<()> {
    if args.script.is_none() && !args.interactive {
        anyhow::bail!("Usage: crabql <crabql-file> [-i] [--max-args <n>] [--echo]");
    }

    let mut config = Config::from_env();
    if let Some(max_args) = args.max_args {
        config.max_args = max_args;
    }
    config.echo |= args.echo;

    let interpreter = Interpreter::with_config(config);
    let mut store = MemoryStore::new();

    if let Some(path) = &args.script {
        let mut out = io::stdout().lock();
        let mut err = io::stderr().lock();
        let report = interpreter
            .run_file(&mut store, path, &mut out, &mut err)
            .context("Failed to execute .crabql file")?;
        log::debug!("{:?}", report);
    }

    if args.interactive {
        interpreter
            .repl(&mut store)
            .context("interactive session failed")?;
    }

    Ok(())
}
