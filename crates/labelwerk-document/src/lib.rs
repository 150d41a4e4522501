// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// labelwerk-document — Page transforms for the Labelwerk label pipeline.
//
// Provides the pure geometry engine (crop arithmetic, fit-to-canvas
// placement), the PDF operations that apply it to files (`lopdf`), and the
// rasterization front end (`pdfium-render` + `image`) feeding the ZPL
// encoder.

pub mod geometry;
pub mod pdf;
pub mod raster;

pub use geometry::{CanvasPlacement, CropMargins, PageGeometry, Unit};
pub use pdf::crop::crop_pdf;
pub use pdf::scale::scale_to_canvas;
pub use raster::{fit_and_center, load_image_to_gray, render_pdf_to_gray};
