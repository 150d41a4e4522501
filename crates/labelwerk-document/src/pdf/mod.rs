// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF transforms built on `lopdf`: margin cropping (MediaBox rewrite) and
// fit-to-canvas rescaling (Form XObject placement). Shared low-level helpers
// for page-tree attribute lookup and cross-document object cloning live here.

use lopdf::{Dictionary, Document, Object, ObjectId};

use labelwerk_core::error::{LabelwerkError, Result};

use crate::geometry::Rect;

pub mod crop;
pub mod scale;

pub(crate) fn pdf_err(context: &str, err: impl std::fmt::Display) -> LabelwerkError {
    LabelwerkError::Pdf(format!("{}: {}", context, err))
}

/// Numeric value of a PDF object (Integer or Real).
pub(crate) fn number(object: &Object) -> Option<f64> {
    match object {
        Object::Integer(i) => Some(*i as f64),
        Object::Real(r) => Some(*r as f64),
        _ => None,
    }
}

/// Resolve an object, following a single reference indirection.
pub(crate) fn resolve<'a>(doc: &'a Document, object: &'a Object) -> Result<&'a Object> {
    match object {
        Object::Reference(id) => doc
            .get_object(*id)
            .map_err(|err| pdf_err(&format!("dangling reference {:?}", id), err)),
        other => Ok(other),
    }
}

/// Upper bound on the page-tree /Parent chain; a well-formed tree is a few
/// levels deep, so hitting this means a malformed or cyclic tree.
const PAGE_TREE_DEPTH_LIMIT: usize = 64;

/// Look up a page attribute, walking /Parent links for inheritable entries
/// such as /MediaBox and /Resources. The walk is depth-bounded so a cyclic
/// /Parent chain fails instead of looping.
pub(crate) fn inherited_attribute<'a>(
    doc: &'a Document,
    page_id: ObjectId,
    key: &[u8],
) -> Result<Option<&'a Object>> {
    let mut dict = doc
        .get_dictionary(page_id)
        .map_err(|err| pdf_err("page is not a dictionary", err))?;

    for _ in 0..PAGE_TREE_DEPTH_LIMIT {
        if let Ok(value) = dict.get(key) {
            return resolve(doc, value).map(Some);
        }
        match dict.get(b"Parent") {
            Ok(parent) => {
                let parent_id = parent
                    .as_reference()
                    .map_err(|err| pdf_err("/Parent is not a reference", err))?;
                dict = doc
                    .get_dictionary(parent_id)
                    .map_err(|err| pdf_err("parent node is not a dictionary", err))?;
            }
            Err(_) => return Ok(None),
        }
    }

    Err(LabelwerkError::Pdf(format!(
        "page tree /Parent chain exceeds {} levels",
        PAGE_TREE_DEPTH_LIMIT
    )))
}

/// The page's effective /MediaBox as a rectangle in points.
pub(crate) fn media_box(doc: &Document, page_id: ObjectId) -> Result<Rect> {
    let object = inherited_attribute(doc, page_id, b"MediaBox")?
        .ok_or_else(|| LabelwerkError::Pdf("page has no /MediaBox".into()))?;
    let array = object
        .as_array()
        .map_err(|err| pdf_err("/MediaBox is not an array", err))?;
    if array.len() != 4 {
        return Err(LabelwerkError::Pdf(format!(
            "/MediaBox has {} entries, expected 4",
            array.len()
        )));
    }

    let mut values = [0.0f64; 4];
    for (slot, object) in values.iter_mut().zip(array) {
        *slot = number(resolve(doc, object)?)
            .ok_or_else(|| LabelwerkError::Pdf("/MediaBox entry is not numeric".into()))?;
    }

    // Normalise: PDF permits boxes with swapped corners.
    Ok(Rect {
        x0: values[0].min(values[2]),
        y0: values[1].min(values[3]),
        x1: values[0].max(values[2]),
        y1: values[1].max(values[3]),
    })
}

/// The page's effective /Resources dictionary, or an empty one when absent.
pub(crate) fn page_resources(doc: &Document, page_id: ObjectId) -> Result<Dictionary> {
    match inherited_attribute(doc, page_id, b"Resources")? {
        Some(object) => object
            .as_dict()
            .cloned()
            .map_err(|err| pdf_err("/Resources is not a dictionary", err)),
        None => Ok(Dictionary::new()),
    }
}

/// Deep-clone an object from `source` into `target`, recursively resolving
/// references. /Parent entries are skipped to avoid circular cloning — the
/// caller patches page-tree links itself.
pub(crate) fn clone_object(
    source: &Document,
    target: &mut Document,
    object: &Object,
) -> Result<Object> {
    match object {
        Object::Dictionary(dict) => Ok(Object::Dictionary(clone_dictionary(source, target, dict)?)),
        Object::Array(array) => {
            let mut cloned = Vec::with_capacity(array.len());
            for item in array {
                cloned.push(clone_object(source, target, item)?);
            }
            Ok(Object::Array(cloned))
        }
        Object::Reference(id) => {
            let referenced = source
                .get_object(*id)
                .map_err(|err| pdf_err(&format!("cannot resolve reference {:?}", id), err))?;
            let cloned = clone_object(source, target, referenced)?;
            let new_id = target.add_object(cloned);
            Ok(Object::Reference(new_id))
        }
        Object::Stream(stream) => {
            let dict = clone_dictionary(source, target, &stream.dict)?;
            Ok(Object::Stream(lopdf::Stream::new(
                dict,
                stream.content.clone(),
            )))
        }
        other => Ok(other.clone()),
    }
}

pub(crate) fn clone_dictionary(
    source: &Document,
    target: &mut Document,
    dict: &Dictionary,
) -> Result<Dictionary> {
    let mut cloned = Dictionary::new();
    for (key, value) in dict.iter() {
        if key == b"Parent" {
            continue;
        }
        cloned.set(key.clone(), clone_object(source, target, value)?);
    }
    Ok(cloned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::dictionary;

    #[test]
    fn cyclic_parent_chain_is_rejected() {
        let mut doc = Document::with_version("1.5");
        let a = doc.new_object_id();
        let b = doc.new_object_id();
        // Two nodes pointing at each other, neither carrying the attribute.
        doc.objects
            .insert(a, Object::Dictionary(dictionary! { "Parent" => b }));
        doc.objects
            .insert(b, Object::Dictionary(dictionary! { "Parent" => a }));

        let result = inherited_attribute(&doc, a, b"MediaBox");
        assert!(matches!(result, Err(LabelwerkError::Pdf(_))));
    }

    #[test]
    fn inherited_attribute_walks_to_an_ancestor() {
        let mut doc = Document::with_version("1.5");
        let root = doc.add_object(dictionary! {
            "MediaBox" => vec![0.into(), 0.into(), 300.into(), 600.into()],
        });
        let page_id = doc.add_object(dictionary! { "Parent" => root });

        let rect = media_box(&doc, page_id).unwrap();
        assert_eq!(rect.width(), 300.0);
        assert_eq!(rect.height(), 600.0);
    }
}
