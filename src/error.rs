use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced while constructing GPU resources or loading configuration.
///
/// Anything that can go wrong during a frame (missing uniforms, items without
/// a transform, failed pixel reads) is absorbed where it happens and never
/// shows up here.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("compiling {stage} stage of shader \"{shader}\" failed: {log}")]
    ShaderCompile {
        shader: String,
        stage: &'static str,
        log: String,
    },

    #[error("linking shader \"{shader}\" failed: {log}")]
    ShaderLink { shader: String, log: String },

    #[error("invalid vertex buffer: {0}")]
    InvalidBuffer(String),

    #[error("could not load image: {0}")]
    Image(#[from] image::ImageError),

    #[error("could not read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration: {0}")]
    Config(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, RenderError>;
