// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Margin crop: rewrites each page's /MediaBox, validated through the pure
// geometry engine before anything is touched.

use std::path::Path;

use lopdf::{Document, Object};
use tracing::{debug, info, instrument};

use labelwerk_core::error::{LabelwerkError, Result};

use crate::geometry::{CropMargins, PageGeometry, Unit};
use crate::pdf::{media_box, pdf_err};

/// Crop every page of `src` by the given margins and write the result to
/// `dst`.
///
/// Each page is cropped independently with the same margins. A crop that
/// would leave any page with non-positive width or height aborts the whole
/// document with `InvalidGeometry` — no output file is produced in that case.
/// Re-running with the same input and margins produces identical bytes, so a
/// partial artifact from an interrupted run can be overwritten safely.
#[instrument(skip_all, fields(src = %src.display(), dst = %dst.display()))]
pub fn crop_pdf(src: &Path, dst: &Path, margins: &CropMargins, unit: Unit) -> Result<()> {
    let mut doc = Document::load(src)
        .map_err(|err| pdf_err(&format!("failed to open {}", src.display()), err))?;

    let page_ids: Vec<_> = doc.get_pages().values().copied().collect();
    if page_ids.is_empty() {
        return Err(LabelwerkError::Pdf(format!(
            "{} has no pages",
            src.display()
        )));
    }

    info!(pages = page_ids.len(), ?unit, "Cropping PDF");

    let left = unit.to_points(margins.left);
    let top = unit.to_points(margins.top);
    let right = unit.to_points(margins.right);
    let bottom = unit.to_points(margins.bottom);

    for page_id in page_ids {
        let rect = media_box(&doc, page_id)?;

        // Validate through the geometry engine; this is the only place a
        // degenerate result can come from.
        PageGeometry::new(rect.width(), rect.height())?.crop(margins, unit)?;

        let cropped = [
            rect.x0 + left,
            rect.y0 + bottom,
            rect.x1 - right,
            rect.y1 - top,
        ];

        let page_dict = doc
            .get_object_mut(page_id)
            .and_then(|object| object.as_dict_mut())
            .map_err(|err| pdf_err("page is not a dictionary", err))?;
        page_dict.set(
            "MediaBox",
            Object::Array(cropped.iter().map(|v| Object::Real(*v as f32)).collect()),
        );

        debug!(
            ?page_id,
            width = rect.width() - left - right,
            height = rect.height() - top - bottom,
            "Page cropped"
        );
    }

    doc.save(dst)
        .map_err(|err| pdf_err(&format!("failed to write {}", dst.display()), err))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::fixtures;

    fn crop_box(path: &Path) -> (f64, f64) {
        let doc = Document::load(path).unwrap();
        let page_id = *doc.get_pages().values().next().unwrap();
        let rect = media_box(&doc, page_id).unwrap();
        (rect.width(), rect.height())
    }

    #[test]
    fn crops_points_margins() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("label.pdf");
        let dst = dir.path().join("label.cropped.pdf");
        fixtures::single_page_pdf(&src, 300.0, 600.0);

        crop_pdf(
            &src,
            &dst,
            &CropMargins::new(20.0, 65.0, 20.0, 485.0),
            Unit::Points,
        )
        .unwrap();

        let (w, h) = crop_box(&dst);
        assert!((w - 260.0).abs() < 0.01);
        assert!((h - 50.0).abs() < 0.01);
    }

    #[test]
    fn crops_millimeter_margins() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("label.pdf");
        let dst = dir.path().join("label.cropped.pdf");
        fixtures::single_page_pdf(&src, 595.0, 842.0);

        crop_pdf(
            &src,
            &dst,
            &CropMargins::new(20.0, 180.0, 20.0, 25.0),
            Unit::Millimeters,
        )
        .unwrap();

        let (w, h) = crop_box(&dst);
        let factor = 72.0 / 25.4;
        assert!((w - (595.0 - 40.0 * factor)).abs() < 0.01);
        assert!((h - (842.0 - 205.0 * factor)).abs() < 0.01);
    }

    #[test]
    fn crops_every_page_of_a_multi_page_document() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("doc.pdf");
        let dst = dir.path().join("doc.cropped.pdf");
        fixtures::multi_page_pdf(&src, &[(300.0, 600.0), (300.0, 600.0)]);

        crop_pdf(
            &src,
            &dst,
            &CropMargins::new(10.0, 10.0, 10.0, 10.0),
            Unit::Points,
        )
        .unwrap();

        let doc = Document::load(&dst).unwrap();
        let pages = doc.get_pages();
        assert_eq!(pages.len(), 2);
        for page_id in pages.values() {
            let rect = media_box(&doc, *page_id).unwrap();
            assert!((rect.width() - 280.0).abs() < 0.01);
            assert!((rect.height() - 580.0).abs() < 0.01);
        }
    }

    #[test]
    fn oversized_margins_abort_without_output() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("tiny.pdf");
        let dst = dir.path().join("tiny.cropped.pdf");
        fixtures::single_page_pdf(&src, 100.0, 100.0);

        let result = crop_pdf(
            &src,
            &dst,
            &CropMargins::new(20.0, 65.0, 20.0, 485.0),
            Unit::Points,
        );
        assert!(matches!(result, Err(LabelwerkError::InvalidGeometry(_))));
        assert!(!dst.exists());
    }

    #[test]
    fn crop_is_idempotent_byte_for_byte() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("label.pdf");
        let first = dir.path().join("a.pdf");
        let second = dir.path().join("b.pdf");
        fixtures::single_page_pdf(&src, 300.0, 600.0);

        let margins = CropMargins::new(20.0, 65.0, 20.0, 485.0);
        crop_pdf(&src, &first, &margins, Unit::Points).unwrap();
        crop_pdf(&src, &second, &margins, Unit::Points).unwrap();

        assert_eq!(
            std::fs::read(&first).unwrap(),
            std::fs::read(&second).unwrap()
        );
    }
}
