//! Canonical dictionary (HashmapE) building and parsing
//!
//! Dictionaries are binary tries keyed by fixed-width unsigned integers and
//! stored across cells. The serialization is canonical: keys are processed
//! in sorted order and edge labels always use the shortest of the three
//! label encodings, so two dictionaries holding the same entries produce
//! bit-identical cells regardless of insertion order.
//!
//! Values are stored as cell references, matching how the marketplace's
//! batch-mint dictionary is laid out.

use crate::tvm::builder::Builder;
use crate::tvm::cell::Cell;
use crate::tvm::slice::Slice;
use anyhow::{Result, bail};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Dictionary with fixed-width integer keys and cell-reference values
pub struct Dict {
    /// Key width in bits (1..=64)
    key_bits: usize,
    /// Entries ordered by key
    entries: BTreeMap<u64, Arc<Cell>>,
}

impl Dict {
    /// Creates an empty dictionary with the given key width
    pub fn new(key_bits: usize) -> Self {
        debug_assert!(key_bits >= 1 && key_bits <= 64);
        Self {
            key_bits,
            entries: BTreeMap::new(),
        }
    }

    /// Inserts a value, replacing any previous value under the same key
    pub fn set(&mut self, key: u64, value: Arc<Cell>) -> Result<&mut Self> {
        if self.key_bits < 64 && key >> self.key_bits != 0 {
            bail!("Key {} does not fit in {} bits", key, self.key_bits);
        }
        self.entries.insert(key, value);
        Ok(self)
    }

    /// Gets a value by key
    pub fn get(&self, key: u64) -> Option<&Arc<Cell>> {
        self.entries.get(&key)
    }

    /// Returns whether the key is present
    pub fn contains_key(&self, key: u64) -> bool {
        self.entries.contains_key(&key)
    }

    /// Returns the number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the dictionary is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the key width in bits
    pub fn key_bits(&self) -> usize {
        self.key_bits
    }

    /// Iterates entries in key order
    pub fn iter(&self) -> impl Iterator<Item = (&u64, &Arc<Cell>)> {
        self.entries.iter()
    }

    /// Serializes the dictionary into its root edge cell
    ///
    /// Returns `None` for an empty dictionary; the caller stores the result
    /// through [`Builder::store_dict`], which encodes the Maybe bit.
    pub fn serialize(&self) -> Result<Option<Arc<Cell>>> {
        if self.entries.is_empty() {
            return Ok(None);
        }

        let entries: Vec<(u64, &Arc<Cell>)> =
            self.entries.iter().map(|(k, v)| (*k, v)).collect();
        log::debug!(
            "serializing dictionary: {} entries, {}-bit keys",
            entries.len(),
            self.key_bits
        );

        Ok(Some(build_edge(&entries, 0, self.key_bits)?))
    }

    /// Parses a dictionary from its root edge cell
    pub fn parse(root: &Arc<Cell>, key_bits: usize) -> Result<Self> {
        let mut dict = Dict::new(key_bits);
        parse_edge(root, 0, 0, key_bits, &mut dict.entries)?;
        Ok(dict)
    }
}

/// Bit `i` of `key`, counting from the most significant of `key_bits`
fn key_bit(key: u64, key_bits: usize, i: usize) -> bool {
    (key >> (key_bits - 1 - i)) & 1 == 1
}

/// Number of bits needed for a label length field, ceil(log2(m + 1))
fn len_bits(m: usize) -> usize {
    (usize::BITS - m.leading_zeros()) as usize
}

/// Builds one hm_edge cell for entries sharing the first `depth` key bits
fn build_edge(entries: &[(u64, &Arc<Cell>)], depth: usize, key_bits: usize) -> Result<Arc<Cell>> {
    let m = key_bits - depth;

    // Longest common prefix of the remaining key bits
    let mut lcp = 0;
    'outer: while lcp < m {
        let bit = key_bit(entries[0].0, key_bits, depth + lcp);
        for (key, _) in &entries[1..] {
            if key_bit(*key, key_bits, depth + lcp) != bit {
                break 'outer;
            }
        }
        lcp += 1;
    }

    let mut builder = Builder::new();
    write_label(&mut builder, entries[0].0, key_bits, depth, lcp, m)?;

    if entries.len() == 1 {
        // Leaf: the value follows the label as a reference
        builder.store_ref(entries[0].1.clone())?;
    } else {
        if lcp == m {
            bail!("Duplicate keys in dictionary");
        }
        // Fork on the bit after the common prefix
        let split = entries.partition_point(|(key, _)| !key_bit(*key, key_bits, depth + lcp));
        if split == 0 || split == entries.len() {
            bail!("Dictionary entries are not sorted");
        }
        builder.store_ref(build_edge(&entries[..split], depth + lcp + 1, key_bits)?)?;
        builder.store_ref(build_edge(&entries[split..], depth + lcp + 1, key_bits)?)?;
    }

    builder.build()
}

/// Writes the label for `n` key bits starting at `depth`, choosing the
/// shortest of hml_short, hml_long, hml_same (short wins ties, then long)
fn write_label(
    builder: &mut Builder,
    key: u64,
    key_bits: usize,
    depth: usize,
    n: usize,
    m: usize,
) -> Result<()> {
    enum LabelKind {
        Short,
        Long,
        Same,
    }

    let first_bit = n > 0 && key_bit(key, key_bits, depth);
    let uniform = (0..n).all(|i| key_bit(key, key_bits, depth + i) == first_bit);

    let short_size = 2 * n + 2;
    let long_size = 2 + len_bits(m) + n;
    let same_size = 3 + len_bits(m);

    let mut kind = LabelKind::Short;
    let mut best = short_size;
    if long_size < best {
        kind = LabelKind::Long;
        best = long_size;
    }
    if n > 0 && uniform && same_size < best {
        kind = LabelKind::Same;
    }

    match kind {
        LabelKind::Short => {
            // hml_short$0, unary length, then the bits
            builder.store_bit(false)?;
            for _ in 0..n {
                builder.store_bit(true)?;
            }
            builder.store_bit(false)?;
            for i in 0..n {
                builder.store_bit(key_bit(key, key_bits, depth + i))?;
            }
        }
        LabelKind::Long => {
            // hml_long$10, length, then the bits
            builder.store_bit(true)?;
            builder.store_bit(false)?;
            builder.store_uint(n as u64, len_bits(m))?;
            for i in 0..n {
                builder.store_bit(key_bit(key, key_bits, depth + i))?;
            }
        }
        LabelKind::Same => {
            // hml_same$11, the repeated bit, then the length
            builder.store_bit(true)?;
            builder.store_bit(true)?;
            builder.store_bit(first_bit)?;
            builder.store_uint(n as u64, len_bits(m))?;
        }
    }

    Ok(())
}

/// Reads a label, returning (length, bits as an integer)
fn read_label(slice: &mut Slice, m: usize) -> Result<(usize, u64)> {
    let (n, value) = if !slice.load_bit()? {
        // hml_short: unary length
        let mut n = 0;
        while slice.load_bit()? {
            n += 1;
        }
        let mut value = 0u64;
        for _ in 0..n {
            value = (value << 1) | slice.load_bit()? as u64;
        }
        (n, value)
    } else if !slice.load_bit()? {
        // hml_long
        let n = slice.load_uint(len_bits(m))? as usize;
        if n > 64 {
            bail!("Label length {} exceeds 64-bit keys", n);
        }
        let mut value = 0u64;
        for _ in 0..n {
            value = (value << 1) | slice.load_bit()? as u64;
        }
        (n, value)
    } else {
        // hml_same
        let bit = slice.load_bit()?;
        let n = slice.load_uint(len_bits(m))? as usize;
        if n > 64 {
            bail!("Label length {} exceeds 64-bit keys", n);
        }
        let value = match (bit, n) {
            (false, _) => 0,
            (true, 64) => u64::MAX,
            (true, _) => (1u64 << n) - 1,
        };
        (n, value)
    };

    if n > m {
        bail!("Label length {} exceeds remaining key bits {}", n, m);
    }

    Ok((n, value))
}

fn parse_edge(
    cell: &Arc<Cell>,
    prefix: u64,
    depth: usize,
    key_bits: usize,
    out: &mut BTreeMap<u64, Arc<Cell>>,
) -> Result<()> {
    let mut slice = Slice::new(cell.clone());
    let m = key_bits - depth;
    let (n, label) = read_label(&mut slice, m)?;

    let prefix = match n {
        0 => prefix,
        64 => label,
        _ => (prefix << n) | label,
    };

    if depth + n == key_bits {
        // Leaf
        out.insert(prefix, slice.load_reference()?);
        return Ok(());
    }

    let left = slice.load_reference()?;
    let right = slice.load_reference()?;
    parse_edge(&left, prefix << 1, depth + n + 1, key_bits, out)?;
    parse_edge(&right, (prefix << 1) | 1, depth + n + 1, key_bits, out)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn value_cell(n: u32) -> Arc<Cell> {
        let mut builder = Builder::new();
        builder.store_u32(n).unwrap();
        builder.build().unwrap()
    }

    #[test]
    fn test_dict_basic() {
        let mut dict = Dict::new(64);
        dict.set(1, value_cell(100)).unwrap();
        dict.set(2, value_cell(200)).unwrap();

        assert_eq!(dict.len(), 2);
        assert!(dict.contains_key(1));
        assert!(!dict.contains_key(3));
        assert_eq!(dict.get(2).unwrap().hash(), value_cell(200).hash());
    }

    #[test]
    fn test_key_width_check() {
        let mut dict = Dict::new(8);
        assert!(dict.set(255, value_cell(0)).is_ok());
        assert!(dict.set(256, value_cell(0)).is_err());
    }

    #[test]
    fn test_empty_dict_serializes_to_none() {
        let dict = Dict::new(64);
        assert!(dict.serialize().unwrap().is_none());
    }

    #[test]
    fn test_single_entry_label_shape() {
        // One zero key: hml_same(v=0, n=64) wins, 3 + 7 bits, one value ref
        let mut dict = Dict::new(64);
        dict.set(0, value_cell(7)).unwrap();

        let root = dict.serialize().unwrap().unwrap();
        assert_eq!(root.bit_len(), 10);
        assert_eq!(root.reference_count(), 1);
    }

    #[test]
    fn test_serialize_parse_roundtrip() {
        let mut dict = Dict::new(64);
        for key in [0u64, 1, 2, 5, 100, 1_000_000, u64::MAX] {
            dict.set(key, value_cell(key as u32)).unwrap();
        }

        let root = dict.serialize().unwrap().unwrap();
        let parsed = Dict::parse(&root, 64).unwrap();

        assert_eq!(parsed.len(), dict.len());
        for (key, value) in dict.iter() {
            assert_eq!(parsed.get(*key).unwrap().hash(), value.hash());
        }
    }

    #[test]
    fn test_insertion_order_independence() {
        let keys = [42u64, 7, 99, 0, 13, 64, 65];

        let mut forward = Dict::new(64);
        for &key in &keys {
            forward.set(key, value_cell(key as u32)).unwrap();
        }
        let mut backward = Dict::new(64);
        for &key in keys.iter().rev() {
            backward.set(key, value_cell(key as u32)).unwrap();
        }

        let a = forward.serialize().unwrap().unwrap();
        let b = backward.serialize().unwrap().unwrap();
        assert_eq!(a.hash(), b.hash());
    }

    #[test]
    fn test_adjacent_keys_fork_at_last_bit() {
        let mut dict = Dict::new(64);
        dict.set(10, value_cell(1)).unwrap();
        dict.set(11, value_cell(2)).unwrap();

        let root = dict.serialize().unwrap().unwrap();
        // Fork node carries the two leaf edges
        assert_eq!(root.reference_count(), 2);

        let parsed = Dict::parse(&root, 64).unwrap();
        assert_eq!(parsed.len(), 2);
        assert!(parsed.contains_key(10));
        assert!(parsed.contains_key(11));
    }

    #[test]
    fn test_narrow_keys() {
        let mut dict = Dict::new(8);
        for key in 0u64..16 {
            dict.set(key, value_cell(key as u32)).unwrap();
        }

        let root = dict.serialize().unwrap().unwrap();
        let parsed = Dict::parse(&root, 8).unwrap();
        assert_eq!(parsed.len(), 16);
    }
}
