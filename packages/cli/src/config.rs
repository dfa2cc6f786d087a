use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use stencil_editor::{Document, Reducer, DEFAULT_HISTORY_LIMIT};

pub const DEFAULT_CONFIG_NAME: &str = "stencil.config.json";

/// Stencil configuration file format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Undo and redo depth
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,

    /// Synthesize sections and columns around misplaced drops
    #[serde(default = "default_scaffolding")]
    pub scaffolding: bool,

    /// Indentation used when writing markup
    #[serde(default = "default_indent")]
    pub indent: String,

    /// External render compiler
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compiler: Option<CompilerConfig>,
}

fn default_history_limit() -> usize {
    DEFAULT_HISTORY_LIMIT
}

fn default_scaffolding() -> bool {
    true
}

fn default_indent() -> String {
    "  ".to_string()
}

/// Command line of the external compiler. Markup goes to its stdin, the
/// rendered form is read from its stdout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompilerConfig {
    pub command: String,

    #[serde(default)]
    pub args: Vec<String>,
}

impl Config {
    /// Load config from a directory
    pub fn load(cwd: &str) -> anyhow::Result<Self> {
        let config_path = PathBuf::from(cwd).join(DEFAULT_CONFIG_NAME);

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            // Return default config if none exists
            Ok(Config::default())
        }
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Cannot read {}", path.display()))?;
        let config: Config = serde_json::from_str(&content)
            .with_context(|| format!("Invalid config in {}", path.display()))?;
        Ok(config)
    }

    pub fn reducer(&self) -> Reducer {
        Reducer::default()
            .with_history_limit(self.history_limit)
            .with_scaffolding(self.scaffolding)
    }

    /// An empty document wired to this configuration
    pub fn document(&self, name: impl Into<String>) -> Document {
        Document::with_reducer(name, self.reducer()).with_indent(self.indent.clone())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            history_limit: default_history_limit(),
            scaffolding: default_scaffolding(),
            indent: default_indent(),
            compiler: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_parse_config() {
        let json = r#"{
            "historyLimit": 10,
            "scaffolding": false,
            "indent": "\t",
            "compiler": { "command": "mjml", "args": ["-i", "-s"] }
        }"#;

        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.history_limit, 10);
        assert!(!config.scaffolding);
        assert_eq!(config.indent, "\t");
        assert_eq!(
            config.compiler,
            Some(CompilerConfig {
                command: "mjml".to_string(),
                args: vec!["-i".to_string(), "-s".to_string()],
            })
        );
        assert_eq!(config.reducer().history_limit(), 10);
    }

    #[test]
    fn test_default_config() {
        let config: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.history_limit, 50);
        assert!(config.scaffolding);
        assert_eq!(config.indent, "  ");
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(&dir.path().display().to_string()).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(DEFAULT_CONFIG_NAME),
            r#"{ "historyLimit": 3 }"#,
        )
        .unwrap();

        let config = Config::load(&dir.path().display().to_string()).unwrap();
        assert_eq!(config.history_limit, 3);
        assert!(config.scaffolding);
    }

    #[test]
    fn test_invalid_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(DEFAULT_CONFIG_NAME), "{ nope").unwrap();

        let err = Config::load(&dir.path().display().to_string()).unwrap_err();
        assert!(err.to_string().contains("Invalid config"));
    }
}
