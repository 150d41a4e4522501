// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// ZPL raster encoding: threshold a grayscale buffer into a packed
// bit-per-pixel bitmap and wrap it in a ^GFA command stream, plus the
// text-field fallback for content that cannot be rasterized.

use image::GrayImage;
use tracing::{debug, instrument};

/// A monochrome bitmap packed 8 pixels per byte, MSB first, each row aligned
/// to a whole byte.
///
/// Invariant: `bits.len() == stride * height` exactly, with
/// `stride = ceil(width / 8)`; unused trailing bits in a row are zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonoBitmap {
    width: u32,
    height: u32,
    stride: usize,
    bits: Vec<u8>,
}

impl MonoBitmap {
    /// Threshold a grayscale image: samples strictly below `threshold`
    /// become set (black) bits, samples at or above become clear (white).
    #[instrument(skip(gray), fields(width = gray.width(), height = gray.height(), threshold))]
    pub fn binarize(gray: &GrayImage, threshold: u8) -> Self {
        let (width, height) = gray.dimensions();
        let stride = width.div_ceil(8) as usize;
        let mut bits = vec![0u8; stride * height as usize];

        for (x, y, pixel) in gray.enumerate_pixels() {
            if pixel.0[0] < threshold {
                bits[y as usize * stride + x as usize / 8] |= 0x80 >> (x % 8);
            }
        }

        debug!(stride, total = bits.len(), "Bitmap binarized");
        Self {
            width,
            height,
            stride,
            bits,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Bytes per row.
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// The packed buffer, length `stride * height`.
    pub fn packed(&self) -> &[u8] {
        &self.bits
    }

    /// Whether the pixel at `(x, y)` is set (black).
    pub fn bit(&self, x: u32, y: u32) -> bool {
        let byte = self.bits[y as usize * self.stride + x as usize / 8];
        byte & (0x80 >> (x % 8)) != 0
    }
}

/// Wrap a packed bitmap in the ZPL raster envelope:
/// `^XA^PW{w}^LL{h}^FO0,0^GFA,{total},{total},{stride},{HEX}^FS^XZ`.
///
/// Both length fields carry the total packed-byte count (no compression),
/// and the data is uppercase hex, two characters per byte, no separators.
pub fn encode_gfa(bitmap: &MonoBitmap) -> String {
    let total = bitmap.packed().len();
    format!(
        "^XA^PW{}^LL{}^FO0,0^GFA,{},{},{},{}^FS^XZ",
        bitmap.width(),
        bitmap.height(),
        total,
        total,
        bitmap.stride(),
        hex::encode_upper(bitmap.packed()),
    )
}

/// Fallback for content that is neither a vector document nor a raster
/// image: a single text field at a fixed origin, truncated to `text_limit`
/// characters. Guarantees a printable stream for any input, with no binary
/// fidelity.
pub fn encode_text_field(
    text: &str,
    label_width: u32,
    label_height: u32,
    font_size: u32,
    text_limit: usize,
) -> String {
    let field: String = text
        .chars()
        .map(|c| if c == '\n' || c == '\r' || c == '\t' { ' ' } else { c })
        // ^ and ~ are ZPL control prefixes and must not appear in field data.
        .filter(|c| c.is_ascii() && !c.is_ascii_control() && *c != '^' && *c != '~')
        .take(text_limit)
        .collect();

    format!(
        "^XA^PW{}^LL{}^FO40,60^A0N,{},{}^FD{}^FS^XZ",
        label_width,
        label_height,
        font_size,
        font_size,
        field.trim(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    fn gray_from(rows: &[&[u8]]) -> GrayImage {
        let height = rows.len() as u32;
        let width = rows[0].len() as u32;
        GrayImage::from_fn(width, height, |x, y| Luma([rows[y as usize][x as usize]]))
    }

    #[test]
    fn packed_length_is_stride_times_height() {
        for (w, h) in [(8u32, 2u32), (10, 3), (1, 1), (17, 5), (576, 288)] {
            let bitmap = MonoBitmap::binarize(&GrayImage::new(w, h), 200);
            assert_eq!(bitmap.stride(), (w as usize).div_ceil(8));
            assert_eq!(bitmap.packed().len(), bitmap.stride() * h as usize);
        }
    }

    #[test]
    fn binarize_thresholds_strictly_below() {
        let gray = gray_from(&[&[199, 200, 201, 0, 255, 100, 250, 50]]);
        let bitmap = MonoBitmap::binarize(&gray, 200);
        assert!(bitmap.bit(0, 0)); // 199 < 200 → black
        assert!(!bitmap.bit(1, 0)); // 200 is white
        assert!(!bitmap.bit(2, 0));
        assert!(bitmap.bit(3, 0));
        assert!(!bitmap.bit(4, 0));
        assert!(bitmap.bit(5, 0));
    }

    #[test]
    fn binarize_is_monotonic_in_sample_value() {
        // Decreasing a sample must never flip a set bit to clear.
        for threshold in [1u8, 100, 200, 255] {
            for sample in 1..=255u8 {
                let darker = gray_from(&[&[sample - 1]]);
                let lighter = gray_from(&[&[sample]]);
                let dark_bit = MonoBitmap::binarize(&darker, threshold).bit(0, 0);
                let light_bit = MonoBitmap::binarize(&lighter, threshold).bit(0, 0);
                assert!(light_bit <= dark_bit, "sample {} thr {}", sample, threshold);
            }
        }
    }

    #[test]
    fn pack_round_trips_through_bit_lookup() {
        // A 10px-wide checkerboard exercises the byte-boundary padding.
        let gray = GrayImage::from_fn(10, 4, |x, y| {
            Luma([if (x + y) % 2 == 0 { 0 } else { 255 }])
        });
        let bitmap = MonoBitmap::binarize(&gray, 128);
        for y in 0..4 {
            for x in 0..10 {
                assert_eq!(bitmap.bit(x, y), (x + y) % 2 == 0);
            }
        }
        // Trailing bits of each row byte are zero.
        for y in 0..4usize {
            let last = bitmap.packed()[y * bitmap.stride() + 1];
            assert_eq!(last & 0b0011_1111, 0);
        }
    }

    #[test]
    fn gfa_envelope_field_order_and_hex() {
        let gray = GrayImage::new(8, 2); // all zeros → all black below 200
        let bitmap = MonoBitmap::binarize(&gray, 200);
        assert_eq!(
            encode_gfa(&bitmap),
            "^XA^PW8^LL2^FO0,0^GFA,2,2,1,FFFF^FS^XZ"
        );
    }

    #[test]
    fn gfa_hex_is_uppercase_without_separators() {
        let gray = gray_from(&[&[0, 255, 0, 255, 0, 255, 0, 255, 0, 255]]);
        let bitmap = MonoBitmap::binarize(&gray, 128);
        // 10101010 10------ → AA 80
        assert_eq!(
            encode_gfa(&bitmap),
            "^XA^PW10^LL1^FO0,0^GFA,2,2,2,AA80^FS^XZ"
        );
    }

    #[test]
    fn text_fallback_truncates_and_sanitizes() {
        let long = "x".repeat(500);
        let encoded = encode_text_field(&long, 799, 1199, 40, 200);
        assert!(encoded.starts_with("^XA^PW799^LL1199^FO40,60^A0N,40,40^FD"));
        assert!(encoded.ends_with("^FS^XZ"));
        let field = encoded
            .strip_prefix("^XA^PW799^LL1199^FO40,60^A0N,40,40^FD")
            .unwrap()
            .strip_suffix("^FS^XZ")
            .unwrap();
        assert_eq!(field.len(), 200);
    }

    #[test]
    fn text_fallback_strips_control_prefixes() {
        let encoded = encode_text_field("a^b~c\nd", 100, 100, 40, 200);
        assert!(encoded.contains("^FDabc d^FS"));
    }
}
