// src/render.rs

use crate::error::{Error, Result};
use crate::file_writer::{OutputPaths, settle_render_output};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

pub const DEFAULT_RENDER_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_PROGRAM: &str = "kicad-cli";

/// Runs `kicad-cli sch export svg` with a wall-clock limit.
#[derive(Debug, Clone)]
pub struct KicadCli {
    program: PathBuf,
    timeout: Duration,
}

impl Default for KicadCli {
    fn default() -> Self {
        Self::new()
    }
}

impl KicadCli {
    /// Uses `$KICAD_CLI` when set, otherwise `kicad-cli` from `PATH`.
    pub fn new() -> Self {
        let program = std::env::var_os("KICAD_CLI")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_PROGRAM));
        KicadCli {
            program,
            timeout: DEFAULT_RENDER_TIMEOUT,
        }
    }

    pub fn with_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = program.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Exports `schematic` to an SVG next to it and returns the SVG path.
    pub async fn export_svg(&self, schematic: &Path) -> Result<PathBuf> {
        let paths = OutputPaths::for_schematic(schematic);

        let mut cmd = Command::new(&self.program);
        cmd.args(["sch", "export", "svg", "-o"])
            .arg(paths.dir())
            .arg(schematic)
            .stdin(Stdio::null())
            .kill_on_drop(true);

        let output = match tokio::time::timeout(self.timeout, cmd.output()).await {
            Err(_elapsed) => return Err(Error::RendererTimedOut(self.timeout)),
            Ok(Err(e)) if e.kind() == ErrorKind::NotFound => {
                return Err(Error::RendererNotFound(self.program.clone()));
            }
            Ok(result) => result?,
        };

        if !output.status.success() {
            return Err(Error::RendererFailed {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        settle_render_output(&paths)
    }
}
