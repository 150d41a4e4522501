// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Rasterization front end: render a PDF page (pdfium) or load an image file
// into an 8-bit grayscale buffer sized for the printer's pixel box.
//
// pdfium wraps a C++ library with thread-local state, so rendering runs
// under `tokio::task::spawn_blocking` rather than on the async workers.

use std::path::{Path, PathBuf};

use image::imageops::FilterType;
use image::{DynamicImage, GrayImage, Luma};
use pdfium_render::prelude::*;
use tracing::{debug, info, instrument};

use labelwerk_core::error::{LabelwerkError, Result};

/// Render the first page of a PDF to an exact `target_width` x
/// `target_height` grayscale buffer.
///
/// The page is rendered near the target size and then stretched to the exact
/// pixel box; label artifacts are pre-cropped to the stock's aspect ratio, so
/// the stretch is nominal.
#[instrument(skip_all, fields(path = %path.display(), target_width, target_height))]
pub async fn render_pdf_to_gray(
    path: &Path,
    target_width: u32,
    target_height: u32,
) -> Result<GrayImage> {
    let path: PathBuf = path.to_path_buf();

    tokio::task::spawn_blocking(move || render_blocking(&path, target_width, target_height))
        .await
        .map_err(|err| LabelwerkError::Render(format!("render task panicked: {}", err)))?
}

fn render_blocking(path: &Path, target_width: u32, target_height: u32) -> Result<GrayImage> {
    let pdfium = Pdfium::default();
    let document = pdfium
        .load_pdf_from_file(path, None)
        .map_err(|err| LabelwerkError::Render(format!("failed to open {}: {:?}", path.display(), err)))?;

    let pages = document.pages();
    if pages.len() == 0 {
        return Err(LabelwerkError::Render(format!(
            "{} has no pages",
            path.display()
        )));
    }

    let page = pages
        .get(0)
        .map_err(|err| LabelwerkError::Render(format!("cannot access first page: {:?}", err)))?;

    let render_config = PdfRenderConfig::new()
        .set_target_width(target_width as i32)
        .set_maximum_height(target_height as i32);

    let bitmap = page
        .render_with_config(&render_config)
        .map_err(|err| LabelwerkError::Render(format!("page render failed: {:?}", err)))?;

    let rendered = bitmap.as_image();
    debug!(
        width = rendered.width(),
        height = rendered.height(),
        "Page rendered"
    );

    // Stretch to the exact target box; letterboxing is the caller's job.
    Ok(exact_gray(rendered, target_width, target_height))
}

/// Load a raster image file (PNG/JPEG) into the target pixel box, aspect
/// preserved and letterboxed with white via [`fit_and_center`].
#[instrument(skip_all, fields(path = %path.display(), target_width, target_height))]
pub fn load_image_to_gray(path: &Path, target_width: u32, target_height: u32) -> Result<GrayImage> {
    let img = image::open(path).map_err(|err| {
        LabelwerkError::Image(format!("failed to open {}: {}", path.display(), err))
    })?;
    info!(width = img.width(), height = img.height(), "Image loaded");
    Ok(fit_and_center(img.to_luma8(), target_width, target_height))
}

fn exact_gray(img: DynamicImage, width: u32, height: u32) -> GrayImage {
    if img.width() == width && img.height() == height {
        return img.to_luma8();
    }
    img.resize_exact(width, height, FilterType::Lanczos3)
        .to_luma8()
}

/// Downsize `source` to fit within the target box (aspect preserved, never
/// upscaled), pad the remainder with white, and center the result. The
/// output is exactly `target_width` x `target_height`.
pub fn fit_and_center(source: GrayImage, target_width: u32, target_height: u32) -> GrayImage {
    let (w, h) = source.dimensions();
    let scaled = if w <= target_width && h <= target_height {
        source
    } else {
        DynamicImage::ImageLuma8(source)
            .resize(target_width, target_height, FilterType::Lanczos3)
            .to_luma8()
    };

    let mut canvas = GrayImage::from_pixel(target_width, target_height, Luma([255u8]));
    let off_x = (target_width - scaled.width()) / 2;
    let off_y = (target_height - scaled.height()) / 2;
    image::imageops::overlay(&mut canvas, &scaled, off_x as i64, off_y as i64);
    canvas
}
