//! Snake encoding and off-chain content metadata
//!
//! Byte content longer than a single cell is stored as a "snake": the data
//! is split into 127-byte chunks and each chunk lives in its own cell, with
//! a single reference pointing at the cell holding the next chunk. Content
//! URIs additionally carry a marker byte in front of the data.
//!
//! Decoding accepts both marked and unmarked buffers. Collection-level
//! content carries the 0x01 marker while item-level content historically
//! does not; both forms exist on chain and both must keep decoding.

use crate::tvm::builder::Builder;
use crate::tvm::cell::Cell;
use crate::tvm::slice::Slice;
use anyhow::{Result, bail};
use std::sync::Arc;

/// Marker byte for off-chain content URIs
pub const OFFCHAIN_CONTENT_PREFIX: u8 = 0x01;

/// Bytes stored per snake cell
pub const SNAKE_CHUNK_BYTES: usize = 127;

/// Encodes a byte buffer as a snake cell chain
///
/// Empty input produces an empty cell. Input of up to 127 bytes produces a
/// single leaf. Longer input is chunked and assembled backward from the last
/// chunk, each cell holding one chunk and one reference to the rest.
pub fn make_snake_cell(data: &[u8]) -> Result<Arc<Cell>> {
    if data.is_empty() {
        return Builder::new().build();
    }

    let chunks: Vec<&[u8]> = data.chunks(SNAKE_CHUNK_BYTES).collect();

    let mut cell = {
        let mut builder = Builder::new();
        builder.store_bytes(chunks[chunks.len() - 1])?;
        builder.build()?
    };

    for chunk in chunks[..chunks.len() - 1].iter().rev() {
        let mut builder = Builder::new();
        builder.store_bytes(chunk)?;
        builder.store_ref(cell)?;
        cell = builder.build()?;
    }

    Ok(cell)
}

/// Flattens a snake cell chain back into its byte buffer
///
/// Walks the single-reference chain from the head, concatenating all bits of
/// each cell, and stops at a cell with no remaining bits or no reference.
pub fn flatten_snake_cell(cell: &Arc<Cell>) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    let mut out_bits = 0usize;

    let mut current = Some(cell.clone());
    while let Some(c) = current {
        let mut slice = Slice::new(c.clone());
        let n = slice.remaining_bits();
        if n == 0 {
            break;
        }

        let chunk = slice.load_remaining_bits()?;
        append_bits(&mut out, &mut out_bits, &chunk, n);

        current = c.reference(0).cloned();
    }

    if out_bits % 8 != 0 {
        bail!("Snake content is not byte aligned: {} bits", out_bits);
    }
    out.truncate(out_bits / 8);

    Ok(out)
}

/// Appends `n` bits of `data` to a packed bit buffer
fn append_bits(out: &mut Vec<u8>, out_bits: &mut usize, data: &[u8], n: usize) {
    if *out_bits % 8 == 0 && n % 8 == 0 {
        out.extend_from_slice(&data[..n / 8]);
        *out_bits += n;
        return;
    }

    for i in 0..n {
        let bit = (data[i / 8] >> (7 - i % 8)) & 1;
        if *out_bits % 8 == 0 {
            out.push(0);
        }
        if bit == 1 {
            let last = out.len() - 1;
            out[last] |= 1 << (7 - *out_bits % 8);
        }
        *out_bits += 1;
    }
}

/// Encodes a content URI with the off-chain marker byte
pub fn encode_offchain_content(content: &str) -> Result<Arc<Cell>> {
    let mut data = Vec::with_capacity(content.len() + 1);
    data.push(OFFCHAIN_CONTENT_PREFIX);
    data.extend_from_slice(content.as_bytes());
    make_snake_cell(&data)
}

/// Decodes a content cell into its string form
///
/// The marker byte is stripped when present; unmarked buffers decode as raw
/// UTF-8. Item-level content is stored without the marker because the
/// collection holds the common prefix, so both paths stay.
pub fn decode_content(cell: &Arc<Cell>) -> Result<String> {
    let data = flatten_snake_cell(cell)?;

    let text = if data.first() == Some(&OFFCHAIN_CONTENT_PREFIX) {
        &data[1..]
    } else {
        &data[..]
    };

    String::from_utf8(text.to_vec()).map_err(|e| anyhow::anyhow!("Content is not UTF-8: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip(len: usize) {
        let data: Vec<u8> = (0..len).map(|i| (i % 251) as u8).collect();
        let cell = make_snake_cell(&data).unwrap();
        let decoded = flatten_snake_cell(&cell).unwrap();
        assert_eq!(decoded, data, "roundtrip failed for {} bytes", len);
    }

    #[test]
    fn test_snake_roundtrip_boundaries() {
        for len in [0, 1, 126, 127, 128, 254, 255] {
            roundtrip(len);
        }
    }

    #[test]
    fn test_snake_roundtrip_large() {
        roundtrip(10_000);
    }

    #[test]
    fn test_empty_input_is_empty_cell() {
        let cell = make_snake_cell(&[]).unwrap();
        assert_eq!(cell.bit_len(), 0);
        assert_eq!(cell.reference_count(), 0);
        assert_eq!(flatten_snake_cell(&cell).unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn test_single_chunk_has_no_refs() {
        let cell = make_snake_cell(&[0xAB; 127]).unwrap();
        assert_eq!(cell.bit_len(), 127 * 8);
        assert_eq!(cell.reference_count(), 0);
    }

    #[test]
    fn test_chain_shape() {
        // 3 full chunks plus one trailing byte makes a 4-cell chain
        let cell = make_snake_cell(&vec![0x55; 127 * 3 + 1]).unwrap();

        let mut lengths = Vec::new();
        let mut current = Some(cell);
        while let Some(c) = current {
            lengths.push(c.bit_len() / 8);
            assert!(c.reference_count() <= 1);
            current = c.reference(0).cloned();
        }

        assert_eq!(lengths, vec![127, 127, 127, 1]);
    }

    #[test]
    fn test_exact_multiple_chain_shape() {
        let cell = make_snake_cell(&vec![0x55; 254]).unwrap();
        assert_eq!(cell.bit_len() / 8, 127);
        assert_eq!(cell.reference_count(), 1);
        let tail = cell.reference(0).unwrap();
        assert_eq!(tail.bit_len() / 8, 127);
        assert_eq!(tail.reference_count(), 0);
    }

    #[test]
    fn test_offchain_content_roundtrip() {
        let url = "https://tiwiflix.example/collection.json";
        let cell = encode_offchain_content(url).unwrap();
        assert_eq!(decode_content(&cell).unwrap(), url);
    }

    #[test]
    fn test_offchain_content_roundtrip_long() {
        let url = format!("https://example.org/{}", "x".repeat(500));
        let cell = encode_offchain_content(&url).unwrap();
        assert!(cell.reference_count() > 0);
        assert_eq!(decode_content(&cell).unwrap(), url);
    }

    #[test]
    fn test_offchain_marker_present() {
        let cell = encode_offchain_content("/nft.json").unwrap();
        let data = flatten_snake_cell(&cell).unwrap();
        assert_eq!(data[0], OFFCHAIN_CONTENT_PREFIX);
    }

    #[test]
    fn test_legacy_unmarked_content_decodes_raw() {
        // Item content is stored without the marker byte
        let cell = make_snake_cell(b"/nft.json").unwrap();
        assert_eq!(decode_content(&cell).unwrap(), "/nft.json");
    }

    #[test]
    fn test_unicode_content() {
        let text = "метадата/ナフト.json";
        let cell = encode_offchain_content(text).unwrap();
        assert_eq!(decode_content(&cell).unwrap(), text);
    }
}
