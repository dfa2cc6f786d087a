use super::open_document;
use crate::config::Config;
use anyhow::{anyhow, Result};
use clap::Args;
use colored::Colorize;
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct FmtArgs {
    /// Template file to format
    pub input: PathBuf,

    /// Rewrite the file in place instead of printing
    #[arg(short, long)]
    pub write: bool,

    /// Exit with an error if the file is not formatted
    #[arg(long, conflicts_with = "write")]
    pub check: bool,
}

pub fn fmt(args: FmtArgs, cwd: &str) -> Result<()> {
    let config = Config::load(cwd)?;
    let doc = open_document(&args.input, &config)?;
    let formatted = doc.export_markup();

    if args.check {
        let source = fs::read_to_string(&args.input)?;
        if source != formatted {
            return Err(anyhow!("{} is not formatted", args.input.display()));
        }
        println!("{} {}", "✓".green(), args.input.display());
    } else if args.write {
        fs::write(&args.input, &formatted)?;
        println!("{} Formatted {}", "✓".green(), args.input.display());
    } else {
        print!("{}", formatted);
    }

    Ok(())
}
