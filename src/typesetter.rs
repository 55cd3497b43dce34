//! Running the external LaTeX engine.

use serde::{Deserialize, Serialize};
use std::io::Read;
use std::process::{Command, ExitStatus, Stdio};

#[derive(Debug, thiserror::Error)]
pub enum TypesetError {
    #[error("Failed to launch `{program}`")]
    Launch {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to read the output of `{program}`")]
    Output {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("`{program}` exited with {status} on pass {pass}:\n{output}")]
    Failed {
        program: String,
        status: ExitStatus,
        pass: u32,
        /// stdout followed by stderr of the failing pass
        output: String,
    },
}

/// How to turn the generated `.tex` into a PDF.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Typesetter {
    #[serde(default = "default_program")]
    pub program: String,
    /// Passed before the source file name
    #[serde(default = "default_args")]
    pub args: Vec<String>,
    /// How many times to run the engine; more than one lets cross references settle
    #[serde(default = "default_passes")]
    pub passes: u32,
}

fn default_program() -> String {
    "pdflatex".to_string()
}
fn default_args() -> Vec<String> {
    vec![
        "-interaction=nonstopmode".to_string(),
        "-halt-on-error".to_string(),
    ]
}
fn default_passes() -> u32 {
    1
}

impl Default for Typesetter {
    fn default() -> Self {
        Typesetter {
            program: default_program(),
            args: default_args(),
            passes: default_passes(),
        }
    }
}

impl Typesetter {
    /// Typeset `source_file`, relative to the current directory.
    ///
    /// Returns the combined output of every pass. The first pass that exits
    /// non-zero stops the run and its output is carried by the error.
    pub fn run(&self, source_file: &str) -> Result<String, TypesetError> {
        let mut combined = String::new();

        for pass in 1..=self.passes.max(1) {
            log::debug!("typesetting {source_file} with {} (pass {pass})", self.program);
            let (status, text) = self.run_pass(source_file)?;
            if !status.success() {
                return Err(TypesetError::Failed {
                    program: self.program.clone(),
                    status,
                    pass,
                    output: text,
                });
            }
            combined.push_str(&text);
        }

        Ok(combined)
    }

    /// Run the engine once with stdout and stderr sharing one pipe, so the
    /// captured text keeps the order the engine wrote it in.
    fn run_pass(&self, source_file: &str) -> Result<(ExitStatus, String), TypesetError> {
        let launch = |source| TypesetError::Launch {
            program: self.program.clone(),
            source,
        };
        let (mut reader, writer) = std::io::pipe().map_err(launch)?;
        let writer_err = writer.try_clone().map_err(launch)?;

        // the command, and with it our copies of the write end, is dropped
        // at the end of this statement; reading below sees EOF once the engine exits
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .arg(source_file)
            .stdin(Stdio::null())
            .stdout(writer)
            .stderr(writer_err)
            .spawn()
            .map_err(launch)?;

        let mut bytes = Vec::new();
        let read = reader.read_to_end(&mut bytes);
        let status = child.wait().map_err(|source| TypesetError::Output {
            program: self.program.clone(),
            source,
        })?;
        read.map_err(|source| TypesetError::Output {
            program: self.program.clone(),
            source,
        })?;

        Ok((status, String::from_utf8_lossy(&bytes).into_owned()))
    }
}
