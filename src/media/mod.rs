//! Media transforms used to build derivatives.
//!
//! Both paths are synchronous and CPU bound; callers run them on the
//! blocking pool.

use thiserror::Error;

pub mod audio;
pub mod image;

#[derive(Debug, Error)]
pub enum TransformError {
    #[error("unable to decode source media: {0}")]
    Decode(String),

    #[error("unable to encode derivative: {0}")]
    Encode(String),

    #[error("I/O error while transforming: {0}")]
    Io(#[from] std::io::Error),
}
