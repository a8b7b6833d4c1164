//! # Error Types
//!
//! This module defines error types used throughout the codegen-pro library.
//! Layer-specific errors ([`EncodeError`], [`ExportError`]) roll up into
//! [`CodegenError`].

use thiserror::Error;

pub use crate::encode::EncodeError;
pub use crate::export::ExportError;

/// Main error type for codegen-pro operations
#[derive(Debug, Error)]
pub enum CodegenError {
    /// The encoder rejected the content
    #[error("Encode error: {0}")]
    Encode(#[from] EncodeError),

    /// Export (rasterize, serialize, save) failed
    #[error("Export error: {0}")]
    Export(#[from] ExportError),

    /// Invalid option value or options file
    #[error("Invalid options: {0}")]
    Options(String),

    /// Server-level errors (bind, accept)
    #[error("Server error: {0}")]
    Server(String),

    /// I/O error wrapper
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
