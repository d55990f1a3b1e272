// ============================================================
// Error Types
// ============================================================
// Every fallible function in this crate returns anyhow::Result.
// The root cause of a failure raised by the crate itself is always
// a TextCnnError, so callers can tell the categories apart with:
//
//   match err.downcast_ref::<TextCnnError>() {
//       Some(TextCnnError::Config { .. }) => ...,
//       Some(TextCnnError::KernelTooWide { .. }) => ...,
//       _ => ...,
//   }
//
// Nothing in the crate catches or downgrades these errors.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Failure categories of model construction and the forward pass.
#[derive(Debug, Error)]
pub enum TextCnnError {
    /// Invalid or inconsistent configuration. Raised at construction.
    #[error("configuration error: {message}")]
    Config {
        /// What is wrong with the configuration
        message: String,
    },

    /// A tensor or batch did not have the shape the model expects.
    #[error("shape error: {message}")]
    Shape {
        /// Which shape was violated and how
        message: String,
    },

    /// A sentence is shorter than the widest convolution kernel.
    #[error("kernel width {kernel} exceeds the shortest sentence length {shortest}")]
    KernelTooWide {
        /// The widest configured kernel
        kernel: usize,
        /// The shortest sentence length in the batch
        shortest: usize,
    },

    /// A pretrained resource could not be opened or parsed.
    #[error("cannot load resource '{}': {reason}", .path.display())]
    ResourceLoad {
        /// The file that failed to load
        path: PathBuf,
        /// What went wrong
        reason: String,
    },
}

impl TextCnnError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config { message: message.into() }
    }

    pub fn shape(message: impl Into<String>) -> Self {
        Self::Shape { message: message.into() }
    }

    pub fn resource(path: impl AsRef<Path>, reason: impl Into<String>) -> Self {
        Self::ResourceLoad {
            path:   path.as_ref().to_path_buf(),
            reason: reason.into(),
        }
    }
}
