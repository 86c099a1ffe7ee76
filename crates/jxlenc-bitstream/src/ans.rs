//! Asymmetric numeral systems entropy coding
//!
//! Byte-wise rANS with a 12-bit probability table. The encoder consumes
//! symbols in reverse and emits renormalization bytes plus a final 32-bit
//! state; the decoder reads the state and walks the stream forward,
//! recovering symbols in their original order.

use byteorder::{ByteOrder, LittleEndian};
use jxlenc_core::{EncoderError, EncoderResult};

/// log2 of the probability table size
pub const ANS_LOG_TAB_SIZE: u32 = 12;
/// Probability table size (sum of normalized frequencies)
pub const ANS_TAB_SIZE: u32 = 1 << ANS_LOG_TAB_SIZE;
const ANS_TAB_MASK: u32 = ANS_TAB_SIZE - 1;
/// Lower bound of the normalized state interval
const RANS_LOW: u32 = 1 << 23;

/// Per-symbol slice of the probability table
#[derive(Debug, Clone, Copy, Default)]
struct AnsSymbol {
    freq: u16,
    cum: u16,
}

/// Normalize raw frequencies so they sum to exactly [`ANS_TAB_SIZE`]
///
/// Every present symbol keeps a frequency of at least 1; rounding drift is
/// settled against the most frequent symbol.
pub fn normalize_frequencies(frequencies: &[u32]) -> EncoderResult<Vec<u16>> {
    let total: u64 = frequencies.iter().map(|&f| f as u64).sum();
    if total == 0 {
        return Err(EncoderError::internal("empty frequency table"));
    }

    let mut normalized = vec![0u16; frequencies.len()];
    let mut sum = 0u32;
    for (i, &f) in frequencies.iter().enumerate() {
        if f == 0 {
            continue;
        }
        let scaled = ((f as u64 * ANS_TAB_SIZE as u64) / total).max(1) as u16;
        normalized[i] = scaled;
        sum += scaled as u32;
    }

    // Settle the rounding drift on the heaviest symbol; shave others only
    // if that symbol alone cannot absorb it.
    while sum != ANS_TAB_SIZE {
        let target = if sum < ANS_TAB_SIZE {
            normalized
                .iter()
                .enumerate()
                .max_by_key(|(_, &f)| f)
                .map(|(i, _)| i)
        } else {
            normalized
                .iter()
                .enumerate()
                .filter(|(_, &f)| f > 1)
                .max_by_key(|(_, &f)| f)
                .map(|(i, _)| i)
        };
        let Some(idx) = target else {
            return Err(EncoderError::internal("cannot normalize frequencies"));
        };
        if sum < ANS_TAB_SIZE {
            normalized[idx] += 1;
            sum += 1;
        } else {
            normalized[idx] -= 1;
            sum -= 1;
        }
    }

    Ok(normalized)
}

fn build_symbols(normalized: &[u16]) -> Vec<AnsSymbol> {
    let mut symbols = Vec::with_capacity(normalized.len());
    let mut cum = 0u16;
    for &freq in normalized {
        symbols.push(AnsSymbol { freq, cum });
        cum = cum.wrapping_add(freq);
    }
    symbols
}

/// rANS encoder
pub struct AnsEncoder {
    symbols: Vec<AnsSymbol>,
}

impl AnsEncoder {
    /// Build an encoder from normalized frequencies (sum == 4096)
    pub fn new(normalized: &[u16]) -> Self {
        Self {
            symbols: build_symbols(normalized),
        }
    }

    /// Encode a symbol stream into a self-contained byte blob
    pub fn encode(&self, stream: &[u32]) -> EncoderResult<Vec<u8>> {
        let mut state: u32 = RANS_LOW;
        let mut reversed = Vec::new();

        // rANS is a stack: encode in reverse so decoding runs forward.
        for &symbol in stream.iter().rev() {
            let sym = self
                .symbols
                .get(symbol as usize)
                .copied()
                .filter(|s| s.freq > 0)
                .ok_or_else(|| {
                    EncoderError::internal(format!("symbol {} out of distribution", symbol))
                })?;

            let x_max = ((RANS_LOW >> ANS_LOG_TAB_SIZE) << 8) * sym.freq as u32;
            while state >= x_max {
                reversed.push((state & 0xFF) as u8);
                state >>= 8;
            }
            state = ((state / sym.freq as u32) << ANS_LOG_TAB_SIZE)
                + (state % sym.freq as u32)
                + sym.cum as u32;
        }

        let mut blob = vec![0u8; 4];
        LittleEndian::write_u32(&mut blob, state);
        blob.extend(reversed.iter().rev());
        Ok(blob)
    }
}

/// rANS decoder, used for round-trip validation
pub struct AnsDecoder {
    symbols: Vec<AnsSymbol>,
    /// slot -> symbol lookup across the whole table
    slots: Vec<u16>,
}

impl AnsDecoder {
    /// Build a decoder from normalized frequencies (sum == 4096)
    pub fn new(normalized: &[u16]) -> EncoderResult<Self> {
        let symbols = build_symbols(normalized);
        let mut slots = vec![0u16; ANS_TAB_SIZE as usize];
        let mut pos = 0usize;
        for (symbol, &freq) in normalized.iter().enumerate() {
            for _ in 0..freq {
                if pos >= slots.len() {
                    return Err(EncoderError::internal("frequency table overflows"));
                }
                slots[pos] = symbol as u16;
                pos += 1;
            }
        }
        if pos != slots.len() {
            return Err(EncoderError::internal("frequency table does not sum to 4096"));
        }
        Ok(Self { symbols, slots })
    }

    /// Decode `count` symbols from a blob produced by [`AnsEncoder::encode`]
    pub fn decode(&self, blob: &[u8], count: usize) -> EncoderResult<Vec<u32>> {
        if blob.len() < 4 {
            return Err(EncoderError::internal("ANS blob too short"));
        }
        let mut state = LittleEndian::read_u32(&blob[..4]);
        let mut pos = 4usize;
        let mut out = Vec::with_capacity(count);

        for _ in 0..count {
            let slot = state & ANS_TAB_MASK;
            let symbol = self.slots[slot as usize] as u32;
            let sym = self.symbols[symbol as usize];

            state = sym.freq as u32 * (state >> ANS_LOG_TAB_SIZE) + slot - sym.cum as u32;
            while state < RANS_LOW {
                let byte = *blob
                    .get(pos)
                    .ok_or_else(|| EncoderError::internal("ANS blob exhausted"))?;
                state = (state << 8) | byte as u32;
                pos += 1;
            }
            out.push(symbol);
        }

        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalization_sums_to_table_size() {
        let cases: &[&[u32]] = &[
            &[1, 1, 1, 1],
            &[100, 200, 300, 400],
            &[1, 0, 0, 100000],
            &[7],
            &[0, 0, 5, 0],
        ];
        for &freqs in cases {
            let normalized = normalize_frequencies(freqs).unwrap();
            let sum: u32 = normalized.iter().map(|&f| f as u32).sum();
            assert_eq!(sum, ANS_TAB_SIZE, "for {:?}", freqs);
            for (i, &f) in freqs.iter().enumerate() {
                assert_eq!(f > 0, normalized[i] > 0);
            }
        }
    }

    #[test]
    fn test_encode_decode_roundtrip() {
        let frequencies = [100u32, 200, 300, 400];
        let normalized = normalize_frequencies(&frequencies).unwrap();
        let encoder = AnsEncoder::new(&normalized);
        let decoder = AnsDecoder::new(&normalized).unwrap();

        let symbols: Vec<u32> = (0..1000).map(|i| (i * 31 % 4) as u32).collect();
        let blob = encoder.encode(&symbols).unwrap();
        let decoded = decoder.decode(&blob, symbols.len()).unwrap();
        assert_eq!(symbols, decoded);
    }

    #[test]
    fn test_skewed_distribution_roundtrip() {
        let frequencies = [10000u32, 1, 1, 1, 1];
        let normalized = normalize_frequencies(&frequencies).unwrap();
        let encoder = AnsEncoder::new(&normalized);
        let decoder = AnsDecoder::new(&normalized).unwrap();

        let mut symbols = vec![0u32; 500];
        symbols[13] = 4;
        symbols[499] = 2;
        let blob = encoder.encode(&symbols).unwrap();
        assert_eq!(decoder.decode(&blob, symbols.len()).unwrap(), symbols);
        // A heavily skewed stream should compress well below one byte per
        // symbol.
        assert!(blob.len() < symbols.len() / 2);
    }

    #[test]
    fn test_single_symbol_stream() {
        let normalized = normalize_frequencies(&[42]).unwrap();
        let encoder = AnsEncoder::new(&normalized);
        let decoder = AnsDecoder::new(&normalized).unwrap();
        let symbols = vec![0u32; 64];
        let blob = encoder.encode(&symbols).unwrap();
        assert_eq!(decoder.decode(&blob, 64).unwrap(), symbols);
    }

    #[test]
    fn test_out_of_range_symbol_rejected() {
        let normalized = normalize_frequencies(&[1, 1]).unwrap();
        let encoder = AnsEncoder::new(&normalized);
        assert!(encoder.encode(&[5]).is_err());
    }
}
