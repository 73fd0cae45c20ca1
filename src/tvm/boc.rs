//! Bag of Cells (BoC) serialization and deserialization
//!
//! BoC is the wire format that flattens a cell tree into bytes. Cells are
//! emitted in topological order with the root first, so every reference
//! index points forward; shared subtrees are emitted once.

use crate::tvm::cell::Cell;
use anyhow::{Result, bail};
use std::collections::HashMap;
use std::sync::Arc;

/// BoC magic number for the generic format
const BOC_GENERIC_MAGIC: u32 = 0xb5ee9c72;

/// Serializes a cell and its references into a Bag of Cells
pub fn serialize_boc(root: &Arc<Cell>, has_crc32: bool) -> Result<Vec<u8>> {
    let cells = collect_cells(root);
    let mut index: HashMap<[u8; 32], usize> = HashMap::with_capacity(cells.len());
    for (idx, cell) in cells.iter().enumerate() {
        index.insert(cell.hash(), idx);
    }

    let size_bytes = bytes_needed(cells.len());

    // Serialize each cell: descriptors, padded data, then forward ref indices
    let mut serialized_cells = Vec::with_capacity(cells.len());
    for cell in &cells {
        let mut out = Vec::new();
        out.extend_from_slice(&cell.descriptors());
        out.extend_from_slice(&cell.serialize_data());
        for reference in cell.references() {
            let ref_idx = index
                .get(&reference.hash())
                .ok_or_else(|| anyhow::anyhow!("Reference not found in cell index"))?;
            write_uint(&mut out, *ref_idx, size_bytes);
        }
        serialized_cells.push(out);
    }

    let cells_size: usize = serialized_cells.iter().map(|c| c.len()).sum();
    let offset_bytes = bytes_needed(cells_size);

    let mut result = Vec::new();
    result.extend_from_slice(&BOC_GENERIC_MAGIC.to_be_bytes());

    // flags: has_idx(7), has_crc32(6), has_cache_bits(5), size in low bits
    let flags = if has_crc32 { 0x40u8 } else { 0x00u8 };
    result.push(flags | (size_bytes as u8));
    result.push(offset_bytes as u8);

    write_uint(&mut result, cells.len(), size_bytes); // cell count
    write_uint(&mut result, 1, size_bytes); // root count
    write_uint(&mut result, 0, size_bytes); // absent count
    write_uint(&mut result, cells_size, offset_bytes);
    write_uint(&mut result, 0, size_bytes); // root index

    for cell_data in serialized_cells {
        result.extend_from_slice(&cell_data);
    }

    if has_crc32 {
        let crc = crate::crc::CRC32C.checksum(&result);
        result.extend_from_slice(&crc.to_le_bytes());
    }

    Ok(result)
}

/// Deserializes a Bag of Cells into its root cell
pub fn deserialize_boc(data: &[u8]) -> Result<Arc<Cell>> {
    if data.len() < 4 {
        bail!("BoC data too short");
    }

    let magic = u32::from_be_bytes([data[0], data[1], data[2], data[3]]);
    if magic != BOC_GENERIC_MAGIC {
        bail!("Invalid BoC magic number: 0x{:08x}", magic);
    }

    let mut pos = 4;
    if pos + 2 > data.len() {
        bail!("Unexpected end of BoC data");
    }

    let flags = data[pos];
    pos += 1;
    let has_crc32 = (flags & 0x40) != 0;
    let size_bytes = (flags & 0x07) as usize;
    if size_bytes == 0 || size_bytes > 8 {
        bail!("Invalid size_bytes: {}", size_bytes);
    }

    let offset_bytes = data[pos] as usize;
    pos += 1;
    if offset_bytes == 0 || offset_bytes > 8 {
        bail!("Invalid offset_bytes: {}", offset_bytes);
    }

    let cells_count = read_uint(data, &mut pos, size_bytes)?;
    let roots_count = read_uint(data, &mut pos, size_bytes)?;
    if roots_count != 1 {
        bail!("Multiple roots are not supported");
    }
    let _absent_count = read_uint(data, &mut pos, size_bytes)?;
    let cells_size = read_uint(data, &mut pos, offset_bytes)?;
    let root_idx = read_uint(data, &mut pos, size_bytes)?;

    let cells_start = pos;
    let cells_end = cells_start + cells_size;
    let trailer = if has_crc32 { 4 } else { 0 };
    if cells_end + trailer > data.len() {
        bail!("Invalid cells size");
    }

    if has_crc32 {
        let expected_crc = u32::from_le_bytes([
            data[cells_end],
            data[cells_end + 1],
            data[cells_end + 2],
            data[cells_end + 3],
        ]);
        let actual_crc = crate::crc::CRC32C.checksum(&data[..cells_end]);
        if expected_crc != actual_crc {
            bail!(
                "BoC CRC mismatch: expected 0x{:08x}, got 0x{:08x}",
                expected_crc,
                actual_crc
            );
        }
    }

    let cells = parse_cells(&data[cells_start..cells_end], cells_count, size_bytes)?;
    if root_idx >= cells.len() {
        bail!("Invalid root index: {}", root_idx);
    }

    Ok(cells[root_idx].clone())
}

fn parse_cells(data: &[u8], count: usize, size_bytes: usize) -> Result<Vec<Arc<Cell>>> {
    let mut cells: Vec<Arc<Cell>> = Vec::with_capacity(count);
    let mut cell_refs: Vec<Vec<usize>> = Vec::with_capacity(count);
    let mut pos = 0;

    // First pass: raw data and reference indices
    for _ in 0..count {
        if pos + 2 > data.len() {
            bail!("Unexpected end of cells data");
        }

        let d1 = data[pos];
        let d2 = data[pos + 1];
        pos += 2;

        let ref_count = (d1 & 0x07) as usize;
        if d1 & 0x08 != 0 {
            bail!("Exotic cells are not supported");
        }

        // d2 = floor(b/8) + ceil(b/8), so the byte count is ceil(d2/2)
        let data_size = (d2 as usize + 1) / 2;
        if pos + data_size > data.len() {
            bail!("Cell data exceeds buffer");
        }
        let cell_data = data[pos..pos + data_size].to_vec();
        pos += data_size;

        let mut refs = Vec::with_capacity(ref_count);
        for _ in 0..ref_count {
            refs.push(read_uint(data, &mut pos, size_bytes)?);
        }
        cell_refs.push(refs);

        let bit_len = bit_len_from_descriptor(&cell_data, d2);
        cells.push(Arc::new(Cell::with_data(cell_data, bit_len)?));
    }

    // Second pass, in reverse: with root-first ordering every reference
    // points forward, so children are final before their parents are rebuilt
    for i in (0..count).rev() {
        if cell_refs[i].is_empty() {
            continue;
        }

        let mut cell = Cell::with_data(cells[i].data().to_vec(), cells[i].bit_len())?;
        for &ref_idx in &cell_refs[i] {
            if ref_idx >= cells.len() {
                bail!("Invalid reference index: {}", ref_idx);
            }
            cell.add_reference(cells[ref_idx].clone())?;
        }
        cells[i] = Arc::new(cell);
    }

    Ok(cells)
}

/// Recovers the exact bit length from d2 and the padding marker bit
fn bit_len_from_descriptor(cell_data: &[u8], d2: u8) -> usize {
    if cell_data.is_empty() || d2 == 0 {
        return 0;
    }

    if d2 % 2 == 0 {
        // Full bytes
        return (d2 as usize / 2) * 8;
    }

    // Partial last byte: the lowest set bit is the padding marker
    let last_byte = cell_data[cell_data.len() - 1];
    for i in 0..8 {
        if (last_byte >> i) & 1 == 1 {
            return (cell_data.len() - 1) * 8 + (7 - i);
        }
    }

    cell_data.len() * 8
}

/// Collects cells in topological order: root first, children after parents
fn collect_cells(root: &Arc<Cell>) -> Vec<Arc<Cell>> {
    let mut postorder = Vec::new();
    let mut visited = HashMap::new();
    collect_postorder(root, &mut postorder, &mut visited);
    postorder.reverse();
    postorder
}

fn collect_postorder(
    cell: &Arc<Cell>,
    out: &mut Vec<Arc<Cell>>,
    visited: &mut HashMap<[u8; 32], ()>,
) {
    let hash = cell.hash();
    if visited.contains_key(&hash) {
        return;
    }
    visited.insert(hash, ());

    for reference in cell.references() {
        collect_postorder(reference, out, visited);
    }
    out.push(cell.clone());
}

fn bytes_needed(value: usize) -> usize {
    if value == 0 {
        return 1;
    }
    ((usize::BITS - value.leading_zeros()) as usize).div_ceil(8)
}

fn write_uint(buf: &mut Vec<u8>, value: usize, size: usize) {
    let bytes = value.to_be_bytes();
    buf.extend_from_slice(&bytes[8 - size..]);
}

fn read_uint(data: &[u8], pos: &mut usize, size: usize) -> Result<usize> {
    if *pos + size > data.len() {
        bail!("Not enough data to read uint");
    }

    let mut result = 0usize;
    for i in 0..size {
        result = (result << 8) | (data[*pos + i] as usize);
    }
    *pos += size;

    Ok(result)
}

/// Parses a BoC from a hex string
pub fn hex_to_boc(hex: &str) -> Result<Arc<Cell>> {
    let hex = hex.trim().replace(" ", "").replace("\n", "");
    let bytes = hex::decode(&hex).map_err(|e| anyhow::anyhow!("Failed to decode hex: {}", e))?;
    deserialize_boc(&bytes)
}

/// Serializes a cell to a hex BoC string
pub fn boc_to_hex(cell: &Arc<Cell>, has_crc32: bool) -> Result<String> {
    Ok(hex::encode(serialize_boc(cell, has_crc32)?))
}

/// Serializes a cell to a base64 BoC string
pub fn boc_to_base64(cell: &Arc<Cell>, has_crc32: bool) -> Result<String> {
    use base64::Engine;
    let bytes = serialize_boc(cell, has_crc32)?;
    Ok(base64::engine::general_purpose::STANDARD.encode(bytes))
}

/// Parses a BoC from a base64 string
pub fn base64_to_boc(b64: &str) -> Result<Arc<Cell>> {
    use base64::Engine;
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(b64)
        .map_err(|e| anyhow::anyhow!("Failed to decode base64: {}", e))?;
    deserialize_boc(&bytes)
}
