// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Labelwerk.

use thiserror::Error;

/// Top-level error type for all Labelwerk operations.
///
/// Every variant here is fatal for the file being processed: the pipeline
/// catches it at the top level, parks the furthest-progressed artifact in
/// `failed/`, and exits non-zero. Unknown content types are NOT an error —
/// they take the text-fallback path in the raster encoder instead.
#[derive(Debug, Error)]
pub enum LabelwerkError {
    // -- Transform errors --
    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),

    #[error("PDF operation failed: {0}")]
    Pdf(String),

    #[error("page rendering failed: {0}")]
    Render(String),

    #[error("image processing failed: {0}")]
    Image(String),

    // -- Lifecycle errors --
    #[error("staging error: {0}")]
    Staging(String),

    #[error("print dispatch failed: {0}")]
    Dispatch(String),

    // -- Configuration / environment --
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, LabelwerkError>;
