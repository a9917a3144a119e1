use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid scene config: {0}")]
    Config(#[from] toml::de::Error),

    #[error("failed to load texture: {0}")]
    Image(#[from] image::ImageError),

    #[error("invalid shape: {0}")]
    InvalidShape(String),

    #[error("no suitable GPU adapter on the system")]
    NoAdapter,

    #[error("unable to open GPU device: {0}")]
    RequestDevice(#[from] wgpu::RequestDeviceError),
}

pub type Result<T> = std::result::Result<T, Error>;
