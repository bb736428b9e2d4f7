//! fbi (Linux framebuffer image viewer) driver

use std::path::PathBuf;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, info, warn};

use super::{DisplayDriver, DisplayError};

/// Invocation settings for the viewer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FbiConfig {
    /// Viewer executable
    pub program: String,
    /// Seconds each image stays on screen
    pub slide_secs: u32,
    /// Virtual console to draw on (`-T`); None lets fbi pick the current one
    pub console: Option<u32>,
}

impl Default for FbiConfig {
    fn default() -> Self {
        Self {
            program: "fbi".to_string(),
            slide_secs: 8,
            console: Some(1),
        }
    }
}

impl FbiConfig {
    /// Full argument list: autozoom, quiet, in order, fixed timeout, then the files
    pub fn args(&self, paths: &[PathBuf]) -> Vec<String> {
        let mut args = vec![
            "-a".to_string(),
            "-noverbose".to_string(),
            "-norandom".to_string(),
        ];
        if let Some(console) = self.console {
            args.push("-T".to_string());
            args.push(console.to_string());
        }
        args.push("-t".to_string());
        args.push(self.slide_secs.to_string());
        args.extend(paths.iter().map(|p| p.display().to_string()));
        args
    }
}

/// Runs fbi over the cache contents
pub struct FbiDisplay {
    config: FbiConfig,
}

impl FbiDisplay {
    pub fn new(config: FbiConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl DisplayDriver for FbiDisplay {
    async fn start(&mut self, paths: &[PathBuf]) -> Result<(), DisplayError> {
        if paths.is_empty() {
            warn!(program = %self.config.program, "Cache is empty, nothing to display");
            return Ok(());
        }

        info!(program = %self.config.program, images = paths.len(), "Starting slideshow");

        // fbi detaches onto the console, so this returns once it is running
        let output = Command::new(&self.config.program)
            .args(self.config.args(paths))
            .output()
            .await
            .map_err(|source| DisplayError::Launch {
                program: self.config.program.clone(),
                source,
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        debug!(stdout = %stdout.trim(), stderr = %stderr.trim(), "Slideshow launch output");

        if !output.status.success() {
            return Err(DisplayError::Exited {
                program: self.config.program.clone(),
                status: output.status.to_string(),
                output: format!("{}{}", stdout, stderr).trim().to_string(),
            });
        }
        Ok(())
    }

    async fn stop(&mut self) {
        let result = Command::new("pkill")
            .arg("-x")
            .arg(&self.config.program)
            .status()
            .await;

        match result {
            Ok(status) if status.success() => {
                debug!(program = %self.config.program, "Stopped slideshow");
            }
            Ok(status) => {
                debug!(program = %self.config.program, status = %status, "No slideshow to stop");
            }
            Err(e) => {
                debug!(error = %e, "Failed to run pkill");
            }
        }
    }
}
