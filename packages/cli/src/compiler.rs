use crate::config::CompilerConfig;
use std::io::Write;
use std::process::{Command, Stdio};
use std::thread;
use stencil_editor::{CompileError, CompileOutput, RenderCompiler};

/// Runs an external program as the render compiler
#[derive(Debug, Clone)]
pub struct CommandCompiler {
    config: CompilerConfig,
}

impl CommandCompiler {
    pub fn new(config: CompilerConfig) -> Self {
        Self { config }
    }
}

impl RenderCompiler for CommandCompiler {
    fn compile(&self, markup: &str) -> Result<CompileOutput, CompileError> {
        tracing::debug!(command = %self.config.command, args = ?self.config.args, "spawning compiler");

        let mut child = Command::new(&self.config.command)
            .args(&self.config.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|err| CompileError::Unavailable(format!("{}: {}", self.config.command, err)))?;

        // Feed stdin from its own thread so a compiler that streams output
        // before reading all input cannot fill both pipes and stall
        let writer = child.stdin.take().map(|mut stdin| {
            let markup = markup.to_string();
            thread::spawn(move || stdin.write_all(markup.as_bytes()))
        });

        let output = child
            .wait_with_output()
            .map_err(|err| CompileError::Failed(format!("Compiler did not finish: {}", err)))?;

        let written = match writer {
            Some(writer) => writer
                .join()
                .map_err(|_| CompileError::Failed("Compiler input thread panicked".to_string()))?,
            None => Ok(()),
        };

        let stderr = String::from_utf8_lossy(&output.stderr);
        if !output.status.success() {
            return Err(CompileError::Failed(stderr.trim().to_string()));
        }
        written.map_err(|err| CompileError::Failed(format!("Cannot write to compiler: {}", err)))?;

        Ok(CompileOutput {
            html: String::from_utf8_lossy(&output.stdout).into_owned(),
            warnings: stderr
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(str::to_string)
                .collect(),
        })
    }
}
