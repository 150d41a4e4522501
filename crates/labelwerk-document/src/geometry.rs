// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Pure page-coordinate geometry: crop-by-margins and fit-to-canvas placement.
// No file I/O here — these are value-returning transforms the PDF layer
// applies.

use serde::{Deserialize, Serialize};

use labelwerk_core::error::{LabelwerkError, Result};

/// Conversion factor from millimeters to PostScript points (1/72 inch).
pub const MM_TO_PT: f64 = 72.0 / 25.4;

/// Unit for crop margins. Points need no conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Unit {
    Points,
    Millimeters,
}

impl Unit {
    /// Convert a value in this unit to points.
    pub fn to_points(self, value: f64) -> f64 {
        match self {
            Self::Points => value,
            Self::Millimeters => value * MM_TO_PT,
        }
    }
}

/// Margins to shave off each edge of a page's bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CropMargins {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl CropMargins {
    pub const fn new(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }
}

/// One page of a vector document: width and height in points.
///
/// Invariant: both dimensions are finite and strictly positive. A transform
/// that would violate this fails with `InvalidGeometry` instead of clamping.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageGeometry {
    width: f64,
    height: f64,
}

impl PageGeometry {
    pub fn new(width: f64, height: f64) -> Result<Self> {
        if !width.is_finite() || !height.is_finite() || width <= 0.0 || height <= 0.0 {
            return Err(LabelwerkError::InvalidGeometry(format!(
                "page dimensions must be positive, got {}x{}",
                width, height
            )));
        }
        Ok(Self { width, height })
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    /// Shrink the bounding box by the four margins, converting to points
    /// first. Fails when the result would have non-positive width or height.
    pub fn crop(&self, margins: &CropMargins, unit: Unit) -> Result<PageGeometry> {
        let width = self.width - unit.to_points(margins.left) - unit.to_points(margins.right);
        let height = self.height - unit.to_points(margins.top) - unit.to_points(margins.bottom);

        if width <= 0.0 || height <= 0.0 {
            return Err(LabelwerkError::InvalidGeometry(format!(
                "crop margins {:?} ({:?}) leave a {:.2}x{:.2}pt page from {:.2}x{:.2}pt",
                margins, unit, width, height, self.width, self.height
            )));
        }

        PageGeometry::new(width, height)
    }

    /// Compute the placement of this page on a fixed-size canvas: a single
    /// uniform scale factor (aspect ratio is never stretched), centered, then
    /// displaced by `(offset_x, offset_y)` points, rotated by `rotation_deg`
    /// around the placement rectangle's center.
    pub fn fit_to_canvas(
        &self,
        canvas_width: f64,
        canvas_height: f64,
        rotation_deg: f64,
        offset_x: f64,
        offset_y: f64,
    ) -> Result<CanvasPlacement> {
        if canvas_width <= 0.0 || canvas_height <= 0.0 {
            return Err(LabelwerkError::InvalidGeometry(format!(
                "canvas dimensions must be positive, got {}x{}",
                canvas_width, canvas_height
            )));
        }

        let scale = (canvas_width / self.width).min(canvas_height / self.height);
        let scaled_width = self.width * scale;
        let scaled_height = self.height * scale;

        let rect = Rect {
            x0: (canvas_width - scaled_width) / 2.0 + offset_x,
            y0: (canvas_height - scaled_height) / 2.0 + offset_y,
            x1: (canvas_width + scaled_width) / 2.0 + offset_x,
            y1: (canvas_height + scaled_height) / 2.0 + offset_y,
        };

        Ok(CanvasPlacement {
            scale,
            rect,
            rotation_deg,
        })
    }
}

/// Axis-aligned rectangle in page coordinates (points).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl Rect {
    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f64 {
        self.y1 - self.y0
    }
}

/// Result of a fit-to-canvas computation: where the scaled content lands and
/// how it is rotated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CanvasPlacement {
    /// Uniform scale factor applied to the source page.
    pub scale: f64,
    /// Destination rectangle on the canvas (centered + offset).
    pub rect: Rect,
    /// Rotation in degrees around the rectangle's center.
    pub rotation_deg: f64,
}

impl CanvasPlacement {
    /// Build the PDF current-transformation matrix `[a b c d e f]` that maps
    /// source-page coordinates (with the page's lower-left corner at
    /// `source_origin`) into the placement rectangle, then rotates the result
    /// about the rectangle's center.
    pub fn matrix(&self, source_origin: (f64, f64)) -> [f64; 6] {
        let (ox, oy) = source_origin;
        let s = self.scale;

        // Scale the page into the rect, compensating for a non-zero origin.
        let place = [
            s,
            0.0,
            0.0,
            s,
            self.rect.x0 - ox * s,
            self.rect.y0 - oy * s,
        ];

        let cx = (self.rect.x0 + self.rect.x1) / 2.0;
        let cy = (self.rect.y0 + self.rect.y1) / 2.0;
        let (cos, sin) = rotation_cos_sin(self.rotation_deg);
        let rotate_about_center = multiply(
            multiply(translation(-cx, -cy), [cos, sin, -sin, cos, 0.0, 0.0]),
            translation(cx, cy),
        );

        multiply(place, rotate_about_center)
    }
}

/// Cosine/sine of a rotation, exact for quarter turns so that 90/180/270
/// degree placements stay free of floating-point residue.
fn rotation_cos_sin(degrees: f64) -> (f64, f64) {
    match degrees.rem_euclid(360.0) {
        d if d == 0.0 => (1.0, 0.0),
        d if d == 90.0 => (0.0, 1.0),
        d if d == 180.0 => (-1.0, 0.0),
        d if d == 270.0 => (0.0, -1.0),
        d => (d.to_radians().cos(), d.to_radians().sin()),
    }
}

fn translation(tx: f64, ty: f64) -> [f64; 6] {
    [1.0, 0.0, 0.0, 1.0, tx, ty]
}

/// Compose two PDF matrices: apply `first`, then `second`.
fn multiply(first: [f64; 6], second: [f64; 6]) -> [f64; 6] {
    let [a1, b1, c1, d1, e1, f1] = first;
    let [a2, b2, c2, d2, e2, f2] = second;
    [
        a1 * a2 + b1 * c2,
        a1 * b2 + b1 * d2,
        c1 * a2 + d1 * c2,
        c1 * b2 + d1 * d2,
        e1 * a2 + f1 * c2 + e2,
        e1 * b2 + f1 * d2 + f2,
    ]
}
