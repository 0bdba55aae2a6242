use std::fs;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser as _;
use console::style;
use lox::{LoxError, Session};
use lox_parser::lexer::scan;
use lox_parser::parser::Parser;
use lox_parser::printer::print_stmt;
use lox_source::Source;
use tracing_subscriber::EnvFilter;

/// Tree-walking interpreter for the Lox scripting language.
#[derive(clap::Parser)]
#[command(name = "lox", version)]
struct Cli {
    /// Script to run. Starts an interactive prompt when omitted.
    script: Option<PathBuf>,
    /// Print the token stream before running.
    #[arg(long)]
    dump_tokens: bool,
    /// Print the parsed statements before running.
    #[arg(long)]
    dump_ast: bool,
}

fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            // `--help` and `--version` also arrive here, on stdout.
            let code = if err.use_stderr() { 64 } else { 0 };
            err.print().context("Printing usage")?;
            return Ok(ExitCode::from(code));
        }
    };
    match &cli.script {
        Some(path) => {
            let source =
                fs::read_to_string(path).with_context(|| format!("Reading {}", path.display()))?;
            run_file(&cli, &source)
        }
        None => run_prompt(&cli),
    }
}

fn run_file(cli: &Cli, source: &str) -> Result<ExitCode> {
    dump(cli, source);
    let mut session = Session::stdout();
    match session.run(source) {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(err) => {
            report(&err);
            Ok(match err {
                LoxError::Syntax(_) => ExitCode::from(65),
                LoxError::Runtime(_) => ExitCode::from(70),
            })
        }
    }
}

fn run_prompt(cli: &Cli) -> Result<ExitCode> {
    let mut session = Session::stdout();
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut lines = stdin.lock().lines();

    loop {
        print!("> ");
        stdout.flush().context("Writing prompt")?;

        let line = match lines.next() {
            Some(line) => line.context("Reading stdin")?,
            None => break,
        };

        dump(cli, &line);
        // Errors do not end the session.
        if let Err(err) = session.run(&line) {
            report(&err);
        }
    }

    Ok(ExitCode::SUCCESS)
}

/// Prints the tokens and/or statements of `source` if requested.
/// Errors are left for the real run to report.
fn dump(cli: &Cli, source: &str) {
    if !cli.dump_tokens && !cli.dump_ast {
        return;
    }

    let source = Source::new(source);
    let tokens = scan(&source);
    if cli.dump_tokens {
        for token in &tokens {
            println!("{}", token);
        }
    }
    if cli.dump_ast {
        for stmt in Parser::new(tokens, &source).parse_program() {
            println!("{}", print_stmt(&stmt));
        }
    }
}

fn report(err: &LoxError) {
    match err {
        LoxError::Syntax(errors) => {
            for error in errors {
                eprintln!("{}", style(error).red().for_stderr());
            }
        }
        LoxError::Runtime(_) => eprintln!("{}", style(err).red().for_stderr()),
    }
}
