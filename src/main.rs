mod repl;

use std::{
    fs,
    path::{Path, PathBuf},
    thread,
};

use anyhow::{anyhow, Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use wolf404::{evaluator::STACK_SIZE, parse, Interpreter, Lexer};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// more log output (-v info, -vv debug, -vvv trace); RUST_LOG overrides
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// run a file
    #[command(alias = "gas")]
    Run {
        #[arg(name = "FILE")]
        file: PathBuf,
    },
    /// print the syntax tree of a file
    Ast {
        #[arg(name = "FILE")]
        file: PathBuf,
    },
    /// print the tokens of a file
    Tokens {
        #[arg(name = "FILE")]
        file: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    install_tracing(cli.verbose);

    // deep recursion needs more room than the main thread's default stack
    thread::Builder::new()
        .name("wolf404".to_string())
        .stack_size(STACK_SIZE)
        .spawn(move || run(cli.command))
        .context("could not start interpreter thread")?
        .join()
        .map_err(|_| anyhow!("interpreter thread panicked"))?
}

fn run(command: Option<Commands>) -> Result<()> {
    match command {
        Some(Commands::Run { file }) => {
            Interpreter::new().run_file(&file)?;
        }
        Some(Commands::Ast { file }) => {
            let source = read_source(&file)?;
            let program =
                parse(&source).with_context(|| format!("could not parse {}", file.display()))?;
            println!("{}", program);
        }
        Some(Commands::Tokens { file }) => {
            let source = read_source(&file)?;
            for token in Lexer::new(&source) {
                println!("{}:{}\t{}", token.line, token.column, token);
            }
        }
        None => repl::start()?,
    }

    Ok(())
}

fn read_source(file: &Path) -> Result<String> {
    fs::read_to_string(file).with_context(|| format!("could not read {}", file.display()))
}

fn install_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
