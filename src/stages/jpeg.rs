// src/stages/jpeg.rs

//! Lossless JPEG slimming: drop metadata segments, keep the image data.
//!
//! Removed: APP1 (EXIF/XMP), APP3–APP13, APP15 and COM.
//! Kept: everything needed to decode the same pixels, including APP0 (JFIF),
//! APP2 (ICC profile) and APP14 (Adobe colour transform). Entropy-coded data
//! after the first SOS marker is copied verbatim.

const SOI: u8 = 0xD8;
const EOI: u8 = 0xD9;
const SOS: u8 = 0xDA;
const TEM: u8 = 0x01;

fn is_metadata(marker: u8) -> bool {
    matches!(marker, 0xE1 | 0xE3..=0xED | 0xEF | 0xFE)
}

fn is_standalone(marker: u8) -> bool {
    matches!(marker, SOI | TEM | 0xD0..=0xD7)
}

/// Strip metadata segments from a JPEG file.
pub fn strip_metadata(data: &[u8]) -> Result<Vec<u8>, String> {
    if data.len() < 4 || data[0] != 0xFF || data[1] != SOI {
        return Err("not a JPEG file (missing SOI marker)".to_string());
    }

    let mut out = Vec::with_capacity(data.len());
    out.extend_from_slice(&[0xFF, SOI]);
    let mut i = 2;

    loop {
        if i >= data.len() {
            return Err("truncated JPEG: no image data found".to_string());
        }
        if data[i] != 0xFF {
            return Err(format!("corrupt JPEG: expected marker at offset {i}"));
        }
        // Any number of 0xFF fill bytes may precede a marker.
        while i < data.len() && data[i] == 0xFF {
            i += 1;
        }
        let Some(&marker) = data.get(i) else {
            return Err("truncated JPEG: dangling marker prefix".to_string());
        };
        i += 1;

        if is_standalone(marker) {
            out.extend_from_slice(&[0xFF, marker]);
            continue;
        }
        if marker == EOI {
            out.extend_from_slice(&[0xFF, EOI]);
            return Ok(out);
        }

        if i + 2 > data.len() {
            return Err(format!("truncated JPEG: segment 0x{marker:02X} has no length"));
        }
        let seg_len = usize::from(u16::from_be_bytes([data[i], data[i + 1]]));
        if seg_len < 2 || i + seg_len > data.len() {
            return Err(format!(
                "corrupt JPEG: segment 0x{marker:02X} length {seg_len} out of bounds"
            ));
        }

        if marker == SOS {
            out.extend_from_slice(&[0xFF, SOS]);
            out.extend_from_slice(&data[i..]);
            return Ok(out);
        }

        if !is_metadata(marker) {
            out.extend_from_slice(&[0xFF, marker]);
            out.extend_from_slice(&data[i..i + seg_len]);
        }
        i += seg_len;
    }
}
