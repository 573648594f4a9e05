//! PNG encoding for exported trail frames.
//!
//! Frames are straight-alpha RGBA and mostly transparent, so a plain
//! color-type-6 image with unfiltered scanlines compresses well enough.

use std::io::Write;

use crate::error::{FlowFieldError, Result};

const PNG_SIGNATURE: [u8; 8] = [137, 80, 78, 71, 13, 10, 26, 10];

/// Encode RGBA pixel data (4 bytes per pixel, row-major) as a PNG.
pub fn create_png(pixels: &[u8], width: usize, height: usize) -> Result<Vec<u8>> {
    let expected = width * height * 4;
    if pixels.len() != expected {
        return Err(FlowFieldError::EncodeFailed(format!(
            "expected {} bytes for {}x{} RGBA, got {}",
            expected,
            width,
            height,
            pixels.len()
        )));
    }

    let mut png = Vec::new();
    png.extend_from_slice(&PNG_SIGNATURE);

    let mut ihdr = Vec::with_capacity(13);
    ihdr.extend_from_slice(&(width as u32).to_be_bytes());
    ihdr.extend_from_slice(&(height as u32).to_be_bytes());
    ihdr.push(8); // bit depth
    ihdr.push(6); // color type (RGBA)
    ihdr.push(0); // compression
    ihdr.push(0); // filter
    ihdr.push(0); // interlace
    write_chunk(&mut png, b"IHDR", &ihdr);

    let idat = deflate_scanlines(pixels, width, height)?;
    write_chunk(&mut png, b"IDAT", &idat);

    write_chunk(&mut png, b"IEND", &[]);

    Ok(png)
}

/// Append one length-prefixed, CRC-terminated chunk.
fn write_chunk(png: &mut Vec<u8>, chunk_type: &[u8; 4], data: &[u8]) {
    png.extend_from_slice(&(data.len() as u32).to_be_bytes());
    png.extend_from_slice(chunk_type);
    png.extend_from_slice(data);

    let mut hasher = crc32fast::Hasher::new();
    hasher.update(chunk_type);
    hasher.update(data);
    png.extend_from_slice(&hasher.finalize().to_be_bytes());
}

fn deflate_scanlines(pixels: &[u8], width: usize, height: usize) -> Result<Vec<u8>> {
    let row_len = width * 4;
    let mut raw = Vec::with_capacity(height * (1 + row_len));
    for row in pixels.chunks_exact(row_len.max(1)).take(height) {
        raw.push(0); // filter type: none
        raw.extend_from_slice(row);
    }

    let mut encoder = flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::fast());
    encoder.write_all(&raw)?;
    Ok(encoder.finish()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::read::ZlibDecoder;
    use std::io::Read;

    fn chunk_at(png: &[u8], offset: usize) -> (&[u8], &[u8], usize) {
        let len = u32::from_be_bytes(png[offset..offset + 4].try_into().unwrap()) as usize;
        let kind = &png[offset + 4..offset + 8];
        let data = &png[offset + 8..offset + 8 + len];
        (kind, data, offset + 12 + len)
    }

    #[test]
    fn test_header_and_chunks() {
        let pixels = vec![255u8; 4 * 4 * 4];
        let png = create_png(&pixels, 4, 4).unwrap();

        assert_eq!(&png[..8], &PNG_SIGNATURE);

        let (kind, ihdr, next) = chunk_at(&png, 8);
        assert_eq!(kind, b"IHDR");
        assert_eq!(&ihdr[0..4], &4u32.to_be_bytes());
        assert_eq!(&ihdr[4..8], &4u32.to_be_bytes());
        assert_eq!(ihdr[9], 6);

        let (kind, _, next) = chunk_at(&png, next);
        assert_eq!(kind, b"IDAT");

        let (kind, data, end) = chunk_at(&png, next);
        assert_eq!(kind, b"IEND");
        assert!(data.is_empty());
        assert_eq!(end, png.len());
    }

    #[test]
    fn test_idat_round_trips_scanlines() {
        let pixels: Vec<u8> = (0..2 * 3 * 4).map(|i| i as u8).collect();
        let png = create_png(&pixels, 2, 3).unwrap();

        let (_, _, next) = chunk_at(&png, 8);
        let (_, idat, _) = chunk_at(&png, next);

        let mut raw = Vec::new();
        ZlibDecoder::new(idat).read_to_end(&mut raw).unwrap();
        assert_eq!(raw.len(), 3 * (1 + 8));
        assert_eq!(raw[0], 0);
        assert_eq!(&raw[1..9], &pixels[0..8]);
    }

    #[test]
    fn test_crc_covers_type_and_data() {
        let png = create_png(&[0, 0, 0, 0], 1, 1).unwrap();
        let ihdr_crc = &png[8 + 8 + 13..8 + 8 + 13 + 4];
        let expected = crc32fast::hash(&png[12..8 + 8 + 13]);
        assert_eq!(ihdr_crc, &expected.to_be_bytes());
    }

    #[test]
    fn test_wrong_buffer_length_is_rejected() {
        assert!(create_png(&[0, 0, 0], 1, 1).is_err());
    }
}
