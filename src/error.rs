use std::io;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("usage: {0}")]
    Usage(String),

    #[error("i/o error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("invalid model file: {0}")]
    Format(String),

    #[error("model has {found} hidden layers, at least 2 are required")]
    TooFewLayers { found: usize },

    #[error("cannot multiply {left_name} {left:?} by {right_name} {right:?}")]
    ShapeMismatch {
        left_name: &'static str,
        left: (usize, usize),
        right_name: &'static str,
        right: (usize, usize),
    },

    #[error("view geometry {rows}x{cols}x{channels} holds {expected} values, weights have {actual}")]
    ViewMismatch {
        rows: usize,
        cols: usize,
        channels: usize,
        expected: usize,
        actual: usize,
    },

    #[error("render error: {0}")]
    Render(String),
}

impl Error {
    pub fn io(path: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
