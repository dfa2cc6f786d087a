use anyhow::{anyhow, Result};
use clap::{Args, ValueEnum};
use colored::Colorize;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use stencil_linter::{lint_document, Diagnostic, DiagnosticLevel, LintOptions};
use stencil_parser::{format_error, parse, NodeRef};
use walkdir::WalkDir;

const TEMPLATE_EXTENSION: &str = "mjml";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Args, Debug)]
pub struct LintArgs {
    /// Template file or directory to lint
    pub input: PathBuf,

    /// Show all diagnostics including info level
    #[arg(short, long)]
    pub verbose: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct Totals {
    diagnostics: usize,
    errors: usize,
    warnings: usize,
}

impl Totals {
    fn add(&mut self, other: Totals) {
        self.diagnostics += other.diagnostics;
        self.errors += other.errors;
        self.warnings += other.warnings;
    }
}

pub fn lint(args: LintArgs, _cwd: &str) -> Result<()> {
    let text = args.format == OutputFormat::Text;
    if text {
        println!("🔍 {} Stencil Linter", "Starting".green().bold());
        println!("   Input: {}", args.input.display());
        println!();
    }

    let files = if args.input.is_file() {
        vec![args.input.clone()]
    } else if args.input.is_dir() {
        let files = find_template_files(&args.input);
        if text {
            println!("   Found {} .{} files", files.len(), TEMPLATE_EXTENSION);
            println!();
        }
        files
    } else {
        return Err(anyhow!("Input path does not exist: {}", args.input.display()));
    };

    let mut totals = Totals::default();
    for file in &files {
        totals.add(lint_file(file, args.verbose, args.format)?);
    }

    if text {
        println!();
        println!(
            "✨ {} Linting complete!",
            if totals.errors > 0 {
                "Done".red().bold()
            } else {
                "Done".green().bold()
            }
        );
        println!("   Files checked: {}", files.len());
        println!("   Total diagnostics: {}", totals.diagnostics);

        if totals.errors > 0 {
            println!("   {} {}", "Errors:".red(), totals.errors);
        }
        if totals.warnings > 0 {
            println!("   {} {}", "Warnings:".yellow(), totals.warnings);
        }
        if totals.errors == 0 && totals.warnings == 0 {
            println!("   {} No issues found!", "✓".green());
        }
    }

    if totals.errors > 0 {
        return Err(anyhow!("{} lint error(s)", totals.errors));
    }
    Ok(())
}

fn lint_file(file_path: &Path, verbose: bool, format: OutputFormat) -> Result<Totals> {
    let source = fs::read_to_string(file_path)?;

    let forest: Vec<NodeRef> = match parse(&source) {
        Ok(nodes) => nodes.into_iter().map(Arc::new).collect(),
        Err(err) => {
            eprintln!(
                "{} Failed to parse {}",
                "✗".red(),
                file_path.display()
            );
            eprintln!("{}", format_error(&source, &file_path.display().to_string(), &err));
            return Ok(Totals {
                diagnostics: 1,
                errors: 1,
                warnings: 0,
            });
        }
    };

    let diagnostics = lint_document(&forest, LintOptions::default());
    let totals = count(&diagnostics);

    match format {
        OutputFormat::Json => {
            let json = serde_json::json!({
                "file": file_path.display().to_string(),
                "diagnostics": diagnostics,
            });
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        OutputFormat::Text if diagnostics.is_empty() => {
            if verbose {
                println!("{} {}", "✓".green(), file_path.display());
            }
        }
        OutputFormat::Text => {
            println!("{}", file_path.display());

            for diagnostic in &diagnostics {
                if !verbose && diagnostic.level == DiagnosticLevel::Info {
                    continue;
                }

                let level_str = match diagnostic.level {
                    DiagnosticLevel::Error => "error".red().bold(),
                    DiagnosticLevel::Warning => "warning".yellow().bold(),
                    DiagnosticLevel::Info => "info".blue().bold(),
                };
                let location = diagnostic
                    .tag
                    .as_deref()
                    .map(|tag| format!(" <{}>", tag))
                    .unwrap_or_default();

                println!("  {} [{}]{} {}", level_str, diagnostic.rule, location, diagnostic.message);

                if let Some(suggestion) = &diagnostic.suggestion {
                    println!("    {} {}", "💡".dimmed(), suggestion.dimmed());
                }
            }

            println!();
        }
    }

    Ok(totals)
}

fn count(diagnostics: &[Diagnostic]) -> Totals {
    Totals {
        diagnostics: diagnostics.len(),
        errors: diagnostics.iter().filter(|d| d.is_error()).count(),
        warnings: diagnostics
            .iter()
            .filter(|d| d.level == DiagnosticLevel::Warning)
            .count(),
    }
}

fn find_template_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
        .map(|entry| entry.into_path())
        .filter(|path| {
            path.is_file()
                && path
                    .extension()
                    .map(|e| e == TEMPLATE_EXTENSION)
                    .unwrap_or(false)
        })
        .collect();
    files.sort();
    files
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_template_files_recurses() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("a.mjml"), "<mjml><mj-body></mj-body></mjml>").unwrap();
        fs::write(dir.path().join("nested/b.mjml"), "<mjml><mj-body></mj-body></mjml>").unwrap();
        fs::write(dir.path().join("notes.txt"), "skip").unwrap();

        let files = find_template_files(dir.path());
        assert_eq!(files.len(), 2);
    }

    #[test]
    fn test_lint_file_counts() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("t.mjml");
        fs::write(
            &file,
            "<mjml><mj-body><mj-text>stray</mj-text><mj-section><mj-column><mj-image src=\"a.png\" /></mj-column></mj-section></mj-body></mjml>",
        )
        .unwrap();

        let totals = lint_file(&file, false, OutputFormat::Json).unwrap();
        assert_eq!(
            totals,
            Totals {
                diagnostics: 2,
                errors: 1,
                warnings: 1,
            }
        );
    }

    #[test]
    fn test_lint_reports_errors_as_failure() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("t.mjml");
        fs::write(&file, "<mjml><mj-body><mj-text>x</mj-text></mj-body></mjml>").unwrap();

        let args = LintArgs {
            input: file,
            verbose: false,
            format: OutputFormat::Text,
        };
        assert!(lint(args, ".").is_err());
    }
}
