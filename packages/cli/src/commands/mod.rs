pub mod edit;
pub mod export;
pub mod fmt;
pub mod init;
pub mod lint;

pub use edit::{edit, EditArgs};
pub use export::{export, ExportArgs};
pub use fmt::{fmt, FmtArgs};
pub use init::{init, InitArgs};
pub use lint::{lint, LintArgs};

use anyhow::{anyhow, Context, Result};
use std::path::Path;
use stencil_editor::Document;
use stencil_parser::format_error;

use crate::config::Config;

/// Read a template file into a configured document
pub(crate) fn open_document(path: &Path, config: &Config) -> Result<Document> {
    let source = std::fs::read_to_string(path).with_context(|| format!("Cannot read {}", path.display()))?;
    let name = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "template".to_string());

    let mut doc = config.document(name);
    let report = doc
        .import_markup(&source)
        .map_err(|err| anyhow!("{}: {}", path.display(), err))?;

    if let Some(warning) = &report.warning {
        eprintln!("{}", format_error(&source, &path.display().to_string(), warning));
        return Err(anyhow!("{} is malformed", path.display()));
    }
    Ok(doc)
}
