// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the Labelwerk label pipeline.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{LabelwerkError, Result};

/// Unique identifier for a dispatched print job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobId(pub Uuid);

impl JobId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Content classes the raster encoder distinguishes.
///
/// `Zpl` passes through to raw dispatch untouched, `Pdf` is rendered via
/// pdfium, images are binarized directly, and `Other` takes the text-field
/// fallback so the pipeline always produces a printable stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContentKind {
    Pdf,
    Png,
    Jpeg,
    /// Printer-native command stream, already in final form.
    Zpl,
    /// Anything else — printed as a single text field.
    Other,
}

impl ContentKind {
    /// Infer content kind from a file's extension.
    pub fn from_path(path: impl AsRef<std::path::Path>) -> Self {
        let ext = path
            .as_ref()
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());

        match ext.as_deref() {
            Some("pdf") => Self::Pdf,
            Some("png") => Self::Png,
            Some("jpg") | Some("jpeg") => Self::Jpeg,
            Some("zpl") => Self::Zpl,
            _ => Self::Other,
        }
    }
}

/// Physical label size, parsed from a compact "WxH" string.
///
/// Accepted forms: `"100x150mm"`, `"4x6in"`, or a bare `"832x1248"` which is
/// taken as pixels and used unscaled regardless of DPI.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum LabelSize {
    Millimeters { width: f64, height: f64 },
    Inches { width: f64, height: f64 },
    Pixels { width: u32, height: u32 },
}

impl LabelSize {
    /// Parse a label size specification string.
    pub fn parse(spec: &str) -> Result<Self> {
        let s: String = spec
            .trim()
            .to_ascii_lowercase()
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();

        let bad = |detail: &str| {
            LabelwerkError::Config(format!("label size '{}': {}", spec, detail))
        };

        if let Some(body) = s.strip_suffix("mm") {
            let (w, h) = split_dimensions(body).ok_or_else(|| bad("expected WxHmm"))?;
            Ok(Self::Millimeters { width: w, height: h })
        } else if let Some(body) = s.strip_suffix("in") {
            let (w, h) = split_dimensions(body).ok_or_else(|| bad("expected WxHin"))?;
            Ok(Self::Inches { width: w, height: h })
        } else {
            let (w, h) = s.split_once('x').ok_or_else(|| bad("expected WxH"))?;
            let width = w.parse().map_err(|_| bad("width is not an integer"))?;
            let height = h.parse().map_err(|_| bad("height is not an integer"))?;
            if width == 0 || height == 0 {
                return Err(bad("dimensions must be positive"));
            }
            Ok(Self::Pixels { width, height })
        }
    }

    /// Target raster dimensions in pixels at the given printer DPI.
    pub fn to_pixels(&self, dpi: u32) -> (u32, u32) {
        match *self {
            Self::Millimeters { width, height } => (
                (width / 25.4 * dpi as f64).round() as u32,
                (height / 25.4 * dpi as f64).round() as u32,
            ),
            Self::Inches { width, height } => (
                (width * dpi as f64).round() as u32,
                (height * dpi as f64).round() as u32,
            ),
            Self::Pixels { width, height } => (width, height),
        }
    }
}

fn split_dimensions(body: &str) -> Option<(f64, f64)> {
    let (w, h) = body.split_once('x')?;
    let width: f64 = w.parse().ok()?;
    let height: f64 = h.parse().ok()?;
    if width > 0.0 && height > 0.0 {
        Some((width, height))
    } else {
        None
    }
}
