// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Fit-to-canvas rescale: each source page becomes a Form XObject placed on a
// fresh canvas-sized page with a CTM computed by the geometry engine.

use std::path::Path;

use lopdf::{Document, Object, Stream, dictionary};
use tracing::{debug, info, instrument};

use labelwerk_core::error::{LabelwerkError, Result};

use crate::geometry::PageGeometry;
use crate::pdf::{clone_dictionary, media_box, page_resources, pdf_err};

/// Scale every page of `src` onto a `canvas_width` x `canvas_height` point
/// canvas and write the result to `dst`.
///
/// The content is uniformly scaled (aspect preserved), centered, displaced by
/// `(offset_x, offset_y)` points, and rotated by `rotation_deg` around the
/// placement rectangle. The output document has one canvas-sized page per
/// source page.
#[instrument(skip_all, fields(src = %src.display(), dst = %dst.display(), rotation_deg))]
pub fn scale_to_canvas(
    src: &Path,
    dst: &Path,
    canvas_width: f64,
    canvas_height: f64,
    rotation_deg: f64,
    offset_x: f64,
    offset_y: f64,
) -> Result<()> {
    let source = Document::load(src)
        .map_err(|err| pdf_err(&format!("failed to open {}", src.display()), err))?;

    let source_pages: Vec<_> = source.get_pages().values().copied().collect();
    if source_pages.is_empty() {
        return Err(LabelwerkError::Pdf(format!(
            "{} has no pages",
            src.display()
        )));
    }

    info!(pages = source_pages.len(), canvas_width, canvas_height, "Scaling PDF onto canvas");

    let mut target = Document::with_version("1.5");
    let pages_id = target.new_object_id();
    let mut kids: Vec<Object> = Vec::new();

    for page_id in source_pages {
        let bbox = media_box(&source, page_id)?;
        let placement = PageGeometry::new(bbox.width(), bbox.height())?.fit_to_canvas(
            canvas_width,
            canvas_height,
            rotation_deg,
            offset_x,
            offset_y,
        )?;
        let matrix = placement.matrix((bbox.x0, bbox.y0));

        // Wrap the source page as a Form XObject: its content stream plus its
        // resources, clipped to the page's own box.
        let content = source
            .get_page_content(page_id)
            .map_err(|err| pdf_err("cannot read page content", err))?;
        let resources = page_resources(&source, page_id)?;
        let cloned_resources = clone_dictionary(&source, &mut target, &resources)?;

        let mut form_dict = dictionary! {
            "Type" => "XObject",
            "Subtype" => "Form",
            "FormType" => 1,
            "BBox" => vec![
                Object::Real(bbox.x0 as f32),
                Object::Real(bbox.y0 as f32),
                Object::Real(bbox.x1 as f32),
                Object::Real(bbox.y1 as f32),
            ],
        };
        form_dict.set("Resources", Object::Dictionary(cloned_resources));
        let form_id = target.add_object(Object::Stream(Stream::new(form_dict, content)));

        let ops = format!(
            "q\n{} cm\n/L0 Do\nQ",
            matrix
                .iter()
                .map(|v| format!("{:.4}", v))
                .collect::<Vec<_>>()
                .join(" ")
        );
        let content_id = target.add_object(Object::Stream(Stream::new(
            dictionary! {},
            ops.into_bytes(),
        )));

        let new_page_id = target.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![
                0.into(),
                0.into(),
                Object::Real(canvas_width as f32),
                Object::Real(canvas_height as f32),
            ],
            "Contents" => content_id,
            "Resources" => dictionary! {
                "XObject" => dictionary! { "L0" => form_id },
            },
        });
        kids.push(new_page_id.into());

        debug!(?page_id, scale = placement.scale, "Page placed on canvas");
    }

    let count = kids.len() as i64;
    target.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );
    let catalog_id = target.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    target.trailer.set("Root", catalog_id);

    target
        .save(dst)
        .map_err(|err| pdf_err(&format!("failed to write {}", dst.display()), err))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::fixtures;

    #[test]
    fn output_pages_match_the_canvas_size() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("stamp.pdf");
        let dst = dir.path().join("stamp.scaled.pdf");
        fixtures::single_page_pdf(&src, 300.0, 600.0);

        scale_to_canvas(&src, &dst, 576.0, 288.0, 270.0, 220.0, 0.0).unwrap();

        let doc = Document::load(&dst).unwrap();
        let pages = doc.get_pages();
        assert_eq!(pages.len(), 1);
        let rect = media_box(&doc, *pages.values().next().unwrap()).unwrap();
        assert_eq!(rect.width(), 576.0);
        assert_eq!(rect.height(), 288.0);
    }

    #[test]
    fn every_source_page_gets_its_own_canvas_page() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("doc.pdf");
        let dst = dir.path().join("doc.scaled.pdf");
        fixtures::multi_page_pdf(&src, &[(200.0, 100.0), (300.0, 600.0), (50.0, 50.0)]);

        scale_to_canvas(&src, &dst, 576.0, 288.0, 0.0, 0.0, 0.0).unwrap();

        let doc = Document::load(&dst).unwrap();
        assert_eq!(doc.get_pages().len(), 3);
    }

    #[test]
    fn placed_content_invokes_the_form_xobject() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("stamp.pdf");
        let dst = dir.path().join("stamp.scaled.pdf");
        fixtures::single_page_pdf(&src, 300.0, 600.0);

        scale_to_canvas(&src, &dst, 576.0, 288.0, 270.0, 220.0, 0.0).unwrap();

        let doc = Document::load(&dst).unwrap();
        let page_id = *doc.get_pages().values().next().unwrap();
        let ops = String::from_utf8(doc.get_page_content(page_id).unwrap()).unwrap();
        assert!(ops.contains("cm"));
        assert!(ops.contains("/L0 Do"));
    }

    #[test]
    fn scaling_is_idempotent_byte_for_byte() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("stamp.pdf");
        let first = dir.path().join("a.pdf");
        let second = dir.path().join("b.pdf");
        fixtures::single_page_pdf(&src, 300.0, 600.0);

        scale_to_canvas(&src, &first, 576.0, 288.0, 270.0, 220.0, 0.0).unwrap();
        scale_to_canvas(&src, &second, 576.0, 288.0, 270.0, 220.0, 0.0).unwrap();

        assert_eq!(
            std::fs::read(&first).unwrap(),
            std::fs::read(&second).unwrap()
        );
    }
}
