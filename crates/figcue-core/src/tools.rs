use crate::error::FigcueError;
use serde::{Deserialize, Serialize};
use std::process::{Command, Output};

/// An external program plus an argument template.
///
/// Arguments may contain `{name}` placeholders that are substituted per call,
/// e.g. `["vec2svg.py", "-i", "{input}", "-o", "{output}"]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCommand {
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
}

impl ToolCommand {
    pub fn new(program: impl Into<String>, args: &[&str]) -> Self {
        ToolCommand {
            program: program.into(),
            args: args.iter().map(|a| a.to_string()).collect(),
        }
    }

    /// True if some argument mentions `{name}`.
    pub fn uses(&self, name: &str) -> bool {
        let placeholder = format!("{{{name}}}");
        self.args.iter().any(|a| a.contains(&placeholder))
    }

    pub fn expand_args(&self, vars: &[(&str, &str)]) -> Vec<String> {
        self.args
            .iter()
            .map(|arg| {
                vars.iter().fold(arg.clone(), |acc, (name, value)| {
                    acc.replace(&format!("{{{name}}}"), value)
                })
            })
            .collect()
    }

    /// Run the command once and return its output if it exited successfully.
    ///
    /// `tool` names the collaborator in errors ("rasterizer", "labeler").
    pub fn run(&self, tool: &str, vars: &[(&str, &str)]) -> Result<Output, FigcueError> {
        let args = self.expand_args(vars);
        tracing::debug!(tool, program = %self.program, ?args, "running external tool");

        let output = Command::new(&self.program)
            .args(&args)
            .output()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    FigcueError::ToolNotFound {
                        tool: format!("{tool} ({})", self.program),
                    }
                } else {
                    FigcueError::ToolFailed {
                        tool: tool.to_string(),
                        code: -1,
                        stderr: e.to_string(),
                    }
                }
            })?;

        if !output.status.success() {
            let code = output.status.code().unwrap_or(-1);
            let stderr = String::from_utf8_lossy(&output.stderr).to_string();
            return Err(FigcueError::ToolFailed {
                tool: tool.to_string(),
                code,
                stderr,
            });
        }

        Ok(output)
    }
}
