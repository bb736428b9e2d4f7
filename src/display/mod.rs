//! Slideshow display
//!
//! The scheduler only talks to a `DisplayDriver`; `FbiDisplay` is the
//! framebuffer implementation used in production.

pub mod fbi;

use std::path::PathBuf;

use async_trait::async_trait;

pub use fbi::{FbiConfig, FbiDisplay};

/// Errors launching the slideshow; always fatal
#[derive(Debug, thiserror::Error)]
pub enum DisplayError {
    #[error("Unable to start {program}: {source}")]
    Launch {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} exited with {status}: {output}")]
    Exited {
        program: String,
        status: String,
        output: String,
    },
}

/// Controls the external slideshow process
#[async_trait]
pub trait DisplayDriver: Send {
    /// Show the given files; returns once the launch command has exited
    async fn start(&mut self, paths: &[PathBuf]) -> Result<(), DisplayError>;

    /// Stop any running slideshow; never fails
    async fn stop(&mut self);
}
