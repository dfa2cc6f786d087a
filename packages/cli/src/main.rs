mod commands;
mod compiler;
mod config;

use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::{edit, export, fmt, init, lint, EditArgs, ExportArgs, FmtArgs, InitArgs, LintArgs};
use tracing_subscriber::EnvFilter;

/// Stencil CLI - email template editing from the command line
#[derive(Parser, Debug)]
#[command(name = "stencil")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log editor decisions to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a starter template and config file
    Init(InitArgs),

    /// Rewrite a template in canonical layout
    Fmt(FmtArgs),

    /// Check templates for structural and accessibility problems
    Lint(LintArgs),

    /// Apply a JSON script of editing steps to a template
    Edit(EditArgs),

    /// Export markup, a save payload or the rendered output
    Export(ExportArgs),
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("STENCIL_LOG").unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let cwd = std::env::current_dir()
        .map_err(|err| anyhow::anyhow!("Cannot get current directory: {}", err))?
        .display()
        .to_string();

    match cli.command {
        Command::Init(args) => init(args, &cwd),
        Command::Fmt(args) => fmt(args, &cwd),
        Command::Lint(args) => lint(args, &cwd),
        Command::Edit(args) => edit(args, &cwd),
        Command::Export(args) => export(args, &cwd),
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(err) = run(cli) {
        eprintln!();
        eprintln!("{} {}", "Error:".red().bold(), err);
        eprintln!();
        std::process::exit(1);
    }
}
