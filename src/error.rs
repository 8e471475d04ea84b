//! Error type shared by every fallible step of startup.

use std::path::PathBuf;

use crate::abs::ShaderStage;

/// Everything that can stop the renderer from coming up.
///
/// None of these are retried: the process logs the error and exits.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("window setup failed: {0}")]
    Window(String),
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid settings: {0}")]
    Settings(#[from] serde_json::Error),
    #[error("invalid log level {0:?}")]
    LogLevel(String),
    #[error("logger already initialized")]
    Logger(#[from] log::SetLoggerError),
    #[error("{stage} shader failed to compile:\n{log}")]
    ShaderCompile { stage: ShaderStage, log: String },
    #[error("shader program failed to link:\n{log}")]
    ProgramLink { log: String },
    #[error("GPU object creation failed: {0}")]
    Gpu(String),
}

impl Error {
    /// Wraps an I/O error together with the path that caused it.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
