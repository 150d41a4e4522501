// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Label profiles: an ordered dispatch table from filename patterns to
// transform recipes. New label types are additive data here, not new code
// paths. First match wins; the unconditional catch-all at the end makes
// classification total.

use labelwerk_document::geometry::{CropMargins, Unit};
use std::path::Path;

/// Stamp canvas: an 8x4 inch label at 72 dpi.
pub const STAMP_CANVAS_WIDTH_PT: f64 = 576.0;
pub const STAMP_CANVAS_HEIGHT_PT: f64 = 288.0;

/// Crop step of a profile.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CropRule {
    pub margins: CropMargins,
    pub unit: Unit,
}

/// What happens after the crop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PostCrop {
    None,
    FitToCanvas(CanvasRule),
}

/// Fit-to-canvas parameters for the scaled-stamp path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasRule {
    pub width_pt: f64,
    pub height_pt: f64,
    pub rotation_deg: f64,
    pub offset_x: f64,
    pub offset_y: f64,
}

/// Final artifact shape a profile produces under `printed/`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputKind {
    /// Byte-identical copy, already correctly sized.
    CopyOnly,
    /// Margin-cropped PDF (`<stem>.cropped.pdf`).
    CroppedPdf,
    /// Cropped then canvas-scaled PDF (`<stem>.scaled.pdf`).
    ScaledPdf,
}

/// A static rule mapping a filename pattern to a transform recipe.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabelProfile {
    pub name: &'static str,
    /// Substring matched against the filename; `None` matches everything.
    pub pattern: Option<&'static str>,
    pub crop: Option<CropRule>,
    pub post_crop: PostCrop,
    pub output: OutputKind,
    /// Rendering hint passed along on queue submission.
    pub fit_to_page: bool,
}

impl LabelProfile {
    pub fn matches(&self, filename: &str) -> bool {
        match self.pattern {
            Some(pattern) => filename.contains(pattern),
            None => true,
        }
    }

    /// Name of the final artifact this profile produces for `filename`.
    pub fn artifact_name(&self, filename: &str) -> String {
        match self.output {
            OutputKind::CopyOnly => filename.to_string(),
            OutputKind::CroppedPdf => format!("{}.cropped.pdf", stem(filename)),
            OutputKind::ScaledPdf => format!("{}.scaled.pdf", stem(filename)),
        }
    }

    /// Name of the intermediate cropped artifact on the scaled-stamp path.
    pub fn intermediate_name(&self, filename: &str) -> String {
        format!("{}.cropped.pdf", stem(filename))
    }
}

pub(crate) fn stem(filename: &str) -> &str {
    Path::new(filename)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(filename)
}

/// The dispatch table, in priority order. Evaluation order matters: some
/// patterns could in principle co-occur in one filename.
///
/// Rules 2 and 3 carry identical crop parameters today; they stay separate
/// profiles so they can diverge without reclassifying existing traffic.
static PROFILES: [LabelProfile; 6] = [
    LabelProfile {
        name: "parcel-label-A",
        pattern: Some("parcel-label-A"),
        crop: Some(CropRule {
            margins: CropMargins::new(20.0, 65.0, 20.0, 485.0),
            unit: Unit::Points,
        }),
        post_crop: PostCrop::None,
        output: OutputKind::CroppedPdf,
        fit_to_page: true,
    },
    LabelProfile {
        name: "return-label-B",
        pattern: Some("return-label-B"),
        crop: Some(CropRule {
            margins: CropMargins::new(20.0, 180.0, 20.0, 25.0),
            unit: Unit::Millimeters,
        }),
        post_crop: PostCrop::None,
        output: OutputKind::CroppedPdf,
        fit_to_page: true,
    },
    LabelProfile {
        name: "parcel-slip-C",
        pattern: Some("parcel-slip-C"),
        crop: Some(CropRule {
            margins: CropMargins::new(20.0, 180.0, 20.0, 25.0),
            unit: Unit::Millimeters,
        }),
        post_crop: PostCrop::None,
        output: OutputKind::CroppedPdf,
        fit_to_page: true,
    },
    LabelProfile {
        name: "stamp-with-address-D",
        pattern: Some("stamp-with-address-D"),
        crop: Some(CropRule {
            margins: CropMargins::new(0.0, 30.0, 340.0, 670.0),
            unit: Unit::Points,
        }),
        post_crop: PostCrop::FitToCanvas(CanvasRule {
            width_pt: STAMP_CANVAS_WIDTH_PT,
            height_pt: STAMP_CANVAS_HEIGHT_PT,
            rotation_deg: 270.0,
            offset_x: 220.0,
            offset_y: 0.0,
        }),
        output: OutputKind::ScaledPdf,
        fit_to_page: false,
    },
    LabelProfile {
        name: "shipper-label-E",
        pattern: Some("shipper-label-E"),
        crop: None,
        post_crop: PostCrop::None,
        output: OutputKind::CopyOnly,
        fit_to_page: true,
    },
    LabelProfile {
        name: "copy-as-is",
        pattern: None,
        crop: None,
        post_crop: PostCrop::None,
        output: OutputKind::CopyOnly,
        fit_to_page: false,
    },
];

/// All profiles in priority order.
pub fn profiles() -> &'static [LabelProfile] {
    &PROFILES
}

/// Select the profile for a filename. Total: the trailing catch-all matches
/// anything, so this can only fail later, during transform execution.
pub fn classify(filename: &str) -> &'static LabelProfile {
    PROFILES
        .iter()
        .find(|profile| profile.matches(filename))
        .unwrap_or(&PROFILES[PROFILES.len() - 1])
}
