//! Canonical prefix (Huffman) coding

use jxlenc_core::{EncoderError, EncoderResult};

use crate::{BitstreamReader, BitstreamWriter};

/// Longest code length the encoder will emit
pub const MAX_CODE_LENGTH: u8 = 15;

/// Compute Huffman code lengths for the given symbol frequencies
///
/// Zero-frequency symbols get length 0 and no code. If the natural tree
/// exceeds [`MAX_CODE_LENGTH`], frequencies are flattened and the tree is
/// rebuilt until it fits; with a 33-symbol alphabet this converges in a
/// couple of rounds.
pub fn build_code_lengths(frequencies: &[u32]) -> Vec<u8> {
    let used = frequencies.iter().filter(|&&f| f > 0).count();
    let mut lengths = vec![0u8; frequencies.len()];
    if used == 0 {
        return lengths;
    }
    if used == 1 {
        let symbol = frequencies.iter().position(|&f| f > 0).unwrap();
        lengths[symbol] = 1;
        return lengths;
    }

    let mut freqs: Vec<u64> = frequencies.iter().map(|&f| f as u64).collect();
    loop {
        let candidate = huffman_lengths(&freqs);
        let max = candidate.iter().copied().max().unwrap_or(0);
        if max <= MAX_CODE_LENGTH {
            return candidate;
        }
        for f in freqs.iter_mut() {
            if *f > 0 {
                *f = (*f >> 1).max(1);
            }
        }
    }
}

/// One round of Huffman tree construction, returning per-symbol depths
fn huffman_lengths(frequencies: &[u64]) -> Vec<u8> {
    // Nodes: leaves first, then internal nodes with parent links.
    let n = frequencies.len();
    let mut weight: Vec<u64> = Vec::with_capacity(n * 2);
    let mut parent: Vec<usize> = Vec::with_capacity(n * 2);
    let mut heap = std::collections::BinaryHeap::new();

    for (symbol, &f) in frequencies.iter().enumerate() {
        weight.push(f);
        parent.push(usize::MAX);
        if f > 0 {
            // Reverse ordering turns the max-heap into a min-heap; the
            // node index breaks ties deterministically.
            heap.push(std::cmp::Reverse((f, symbol)));
        }
    }

    while heap.len() > 1 {
        let std::cmp::Reverse((w1, n1)) = heap.pop().unwrap();
        let std::cmp::Reverse((w2, n2)) = heap.pop().unwrap();
        let merged = weight.len();
        weight.push(w1 + w2);
        parent.push(usize::MAX);
        parent[n1] = merged;
        parent[n2] = merged;
        heap.push(std::cmp::Reverse((w1 + w2, merged)));
    }

    let mut lengths = vec![0u8; n];
    for symbol in 0..n {
        if frequencies[symbol] == 0 {
            continue;
        }
        let mut depth = 0u8;
        let mut node = symbol;
        while parent[node] != usize::MAX {
            node = parent[node];
            depth += 1;
        }
        lengths[symbol] = depth;
    }
    lengths
}

/// Assign canonical codes to the given lengths
///
/// Codes are ordered by (length, symbol), the usual canonical convention.
fn canonical_codes(lengths: &[u8]) -> Vec<u32> {
    let max_length = lengths.iter().copied().max().unwrap_or(0) as usize;
    let mut length_counts = vec![0u32; max_length + 1];
    for &len in lengths {
        if len > 0 {
            length_counts[len as usize] += 1;
        }
    }

    let mut next_code = vec![0u32; max_length + 1];
    let mut code = 0u32;
    for len in 1..=max_length {
        code = (code + length_counts[len - 1]) << 1;
        next_code[len] = code;
    }

    let mut codes = vec![0u32; lengths.len()];
    for (symbol, &len) in lengths.iter().enumerate() {
        if len > 0 {
            codes[symbol] = next_code[len as usize];
            next_code[len as usize] += 1;
        }
    }
    codes
}

/// Canonical prefix encoder over a fixed alphabet
#[derive(Debug)]
pub struct PrefixEncoder {
    lengths: Vec<u8>,
    codes: Vec<u32>,
}

impl PrefixEncoder {
    /// Build codes from symbol frequencies
    pub fn from_frequencies(frequencies: &[u32]) -> Self {
        let lengths = build_code_lengths(frequencies);
        let codes = canonical_codes(&lengths);
        Self { lengths, codes }
    }

    pub fn lengths(&self) -> &[u8] {
        &self.lengths
    }

    /// Emit one symbol, most significant code bit first
    pub fn encode(&self, symbol: u32, writer: &mut BitstreamWriter) -> EncoderResult<()> {
        let idx = symbol as usize;
        if idx >= self.lengths.len() || self.lengths[idx] == 0 {
            return Err(EncoderError::internal(format!(
                "symbol {} has no prefix code",
                symbol
            )));
        }
        let len = self.lengths[idx];
        let code = self.codes[idx];
        for bit in (0..len).rev() {
            writer.write_bit((code >> bit) & 1 == 1)?;
        }
        Ok(())
    }
}

/// Prefix tree node
#[derive(Debug)]
enum Node {
    Empty,
    Leaf(u32),
    Internal(Box<Node>, Box<Node>),
}

/// Canonical prefix decoder, used for round-trip validation
#[derive(Debug)]
pub struct PrefixDecoder {
    root: Node,
}

impl PrefixDecoder {
    /// Rebuild the canonical tree from code lengths
    pub fn from_lengths(lengths: &[u8]) -> EncoderResult<Self> {
        let codes = canonical_codes(lengths);
        let mut root = Node::Internal(Box::new(Node::Empty), Box::new(Node::Empty));
        for (symbol, &len) in lengths.iter().enumerate() {
            if len == 0 {
                continue;
            }
            Self::insert(&mut root, symbol as u32, len, codes[symbol])?;
        }
        Ok(Self { root })
    }

    fn insert(root: &mut Node, symbol: u32, length: u8, code: u32) -> EncoderResult<()> {
        let mut node = root;
        for bit in (0..length).rev() {
            let right = (code >> bit) & 1 == 1;
            if matches!(node, Node::Empty | Node::Leaf(_)) {
                if matches!(node, Node::Leaf(_)) {
                    return Err(EncoderError::internal("prefix code collision"));
                }
                *node = Node::Internal(Box::new(Node::Empty), Box::new(Node::Empty));
            }
            node = match node {
                Node::Internal(left, r) => {
                    if right {
                        r
                    } else {
                        left
                    }
                }
                _ => unreachable!(),
            };
        }
        *node = Node::Leaf(symbol);
        Ok(())
    }

    /// Decode one symbol
    pub fn decode(&self, reader: &mut BitstreamReader<'_>) -> EncoderResult<u32> {
        let mut node = &self.root;
        loop {
            match node {
                Node::Leaf(symbol) => return Ok(*symbol),
                Node::Internal(left, right) => {
                    node = if reader.read_bit()? { right } else { left };
                }
                Node::Empty => {
                    return Err(EncoderError::internal("invalid prefix code path"));
                }
            }
        }
    }
}
