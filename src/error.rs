use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON deserialization failed: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Formatting failed: {0}")]
    FmtError(#[from] std::fmt::Error),

    #[error("Missing dependency: {0}")]
    MissingDependency(String),

    #[error("Invalid pin reference: {0:?} (expected \"Ref.Pin\")")]
    InvalidPinRef(String),

    #[error("Component {0} is already placed")]
    DuplicateReference(String),

    #[error("Component {0} not found in schematic")]
    ComponentNotFound(String),

    #[error("Pin {pin} not found on {reference}")]
    PinNotFound { reference: String, pin: String },

    #[error("No obstacle-free route from {from} to {to}")]
    RouteBlocked { from: String, to: String },

    #[error("No schematic has been created yet")]
    NoSchematic,

    #[error("Renderer {0:?} not found")]
    RendererNotFound(PathBuf),

    #[error("Renderer exited with {status}: {stderr}")]
    RendererFailed { status: String, stderr: String },

    #[error("Renderer timed out after {0:?}")]
    RendererTimedOut(Duration),

    #[error("Renderer produced no output at {0:?}")]
    MissingRenderOutput(PathBuf),
}

pub type Result<T> = std::result::Result<T, Error>;
