use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading a scene description
#[derive(Debug, Error)]
pub enum SceneError {
    #[error("failed to read scene file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid scene file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}
