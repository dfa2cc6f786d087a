use super::open_document;
use crate::compiler::CommandCompiler;
use crate::config::Config;
use anyhow::{anyhow, Result};
use clap::Args;
use colored::Colorize;
use std::fs;
use std::path::PathBuf;
use stencil_editor::{Document, Pipeline, PipelineResult};

#[derive(Debug, Args)]
pub struct ExportArgs {
    /// Template file to export
    pub input: PathBuf,

    /// Emit the save payload as JSON instead of bare markup
    #[arg(long, conflicts_with = "render")]
    pub payload: bool,

    /// Run the configured compiler and emit its rendered output
    #[arg(long)]
    pub render: bool,

    /// Where to write the result (prints to stdout if omitted)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

pub fn export(args: ExportArgs, cwd: &str) -> Result<()> {
    let config = Config::load(cwd)?;
    let doc = open_document(&args.input, &config)?;

    let content = if args.render {
        render(&doc, &config)?
    } else if args.payload {
        serde_json::to_string_pretty(&doc.save_payload())?
    } else {
        doc.export_markup()
    };

    match &args.output {
        Some(path) => {
            fs::write(path, &content)?;
            eprintln!("{} {} → {}", "✓".green(), args.input.display(), path.display());
        }
        None => print!("{}", content),
    }
    Ok(())
}

fn render(doc: &Document, config: &Config) -> Result<String> {
    let compiler_config = config
        .compiler
        .clone()
        .ok_or_else(|| anyhow!("No compiler configured; add a \"compiler\" entry to the config file"))?;
    let compiler = CommandCompiler::new(compiler_config);

    let mut pipeline = Pipeline::new();
    match pipeline.compile_now(&compiler, doc.export_markup()) {
        PipelineResult::Applied => {}
        PipelineResult::Failed(err) => return Err(err.into()),
        PipelineResult::Stale => return Err(anyhow!("Compile result was superseded")),
    }

    let preview = pipeline
        .preview()
        .ok_or_else(|| anyhow!("Compiler produced no output"))?;
    for warning in &preview.output.warnings {
        eprintln!("{} {}", "⚠️".yellow(), warning);
    }
    Ok(preview.output.html.clone())
}
