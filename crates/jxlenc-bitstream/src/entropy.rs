//! Entropy-coded sections
//!
//! One section = varint value count, a mode bit (0 = prefix, 1 = ANS), the
//! table header, and the payload. Values run through the hybrid token
//! model; raw extra bits follow each symbol (prefix mode) or trail the
//! token blob in stream order (ANS mode). Both modes decode to the same
//! value stream.

use jxlenc_core::{EncoderError, EncoderResult};

use crate::{
    ans::{normalize_frequencies, AnsDecoder, AnsEncoder},
    histogram::{build_histogram, token_of, token_value},
    BitstreamReader, BitstreamWriter, PrefixDecoder, PrefixEncoder,
};

/// Bits used per code length in the prefix table header
const LENGTH_BITS: usize = 4;
/// Bits used per normalized frequency in the ANS table header
const FREQ_BITS: usize = 12;

/// Front-end over the two entropy coding modes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntropyCoder {
    Prefix,
    Ans,
}

impl EntropyCoder {
    /// Pick the coder selected by the options
    pub fn new(use_ans: bool) -> Self {
        if use_ans {
            EntropyCoder::Ans
        } else {
            EntropyCoder::Prefix
        }
    }

    /// Encode a stream of unsigned values as one self-describing section
    pub fn encode_stream(
        &self,
        values: &[u32],
        writer: &mut BitstreamWriter,
    ) -> EncoderResult<()> {
        writer.write_varint(values.len() as u64)?;
        if values.is_empty() {
            return Ok(());
        }
        writer.write_bit(*self == EntropyCoder::Ans)?;

        let histogram = build_histogram(values);
        writer.write_varint(histogram.len() as u64)?;

        match self {
            EntropyCoder::Prefix => self.encode_prefix(values, &histogram, writer),
            EntropyCoder::Ans => self.encode_ans(values, &histogram, writer),
        }
    }

    fn encode_prefix(
        &self,
        values: &[u32],
        histogram: &[u32],
        writer: &mut BitstreamWriter,
    ) -> EncoderResult<()> {
        let encoder = PrefixEncoder::from_frequencies(histogram);
        for &len in encoder.lengths() {
            writer.write_bits(len as u64, LENGTH_BITS)?;
        }
        for &value in values {
            let (token, extra, extra_bits) = token_of(value);
            encoder.encode(token, writer)?;
            writer.write_bits(extra as u64, extra_bits as usize)?;
        }
        Ok(())
    }

    fn encode_ans(
        &self,
        values: &[u32],
        histogram: &[u32],
        writer: &mut BitstreamWriter,
    ) -> EncoderResult<()> {
        let normalized = normalize_frequencies(histogram)?;
        for &freq in &normalized {
            // Frequencies are 1..=4096 for present symbols; a lone symbol
            // owns the whole table, so freq - 1 keeps 12 bits sufficient.
            writer.write_bit(freq != 0)?;
            if freq != 0 {
                writer.write_bits((freq - 1) as u64, FREQ_BITS)?;
            }
        }

        let tokens: Vec<u32> = values.iter().map(|&v| token_of(v).0).collect();
        let blob = AnsEncoder::new(&normalized).encode(&tokens)?;
        writer.write_varint(blob.len() as u64)?;
        for &byte in &blob {
            writer.write_byte(byte)?;
        }
        for &value in values {
            let (_, extra, extra_bits) = token_of(value);
            writer.write_bits(extra as u64, extra_bits as usize)?;
        }
        Ok(())
    }

    /// Decode a section written by [`EntropyCoder::encode_stream`]
    ///
    /// The mode is taken from the stream itself, so either coder variant
    /// can decode any section.
    pub fn decode_stream(reader: &mut BitstreamReader<'_>) -> EncoderResult<Vec<u32>> {
        let count = reader.read_varint()? as usize;
        if count == 0 {
            return Ok(Vec::new());
        }
        let is_ans = reader.read_bit()?;
        let alphabet = reader.read_varint()? as usize;
        if alphabet == 0 || alphabet > crate::histogram::MAX_TOKENS {
            return Err(EncoderError::internal("invalid entropy alphabet size"));
        }

        if is_ans {
            let mut normalized = vec![0u16; alphabet];
            for freq in normalized.iter_mut() {
                if reader.read_bit()? {
                    *freq = reader.read_bits(FREQ_BITS)? as u16 + 1;
                }
            }
            let blob_len = reader.read_varint()? as usize;
            let mut blob = Vec::with_capacity(blob_len);
            for _ in 0..blob_len {
                blob.push(reader.read_byte()?);
            }
            let tokens = AnsDecoder::new(&normalized)?.decode(&blob, count)?;
            let mut out = Vec::with_capacity(count);
            for token in tokens {
                let extra_bits = token.saturating_sub(1);
                let extra = if token > 1 {
                    reader.read_bits(extra_bits as usize)? as u32
                } else {
                    0
                };
                out.push(token_value(token, extra));
            }
            Ok(out)
        } else {
            let mut lengths = vec![0u8; alphabet];
            for len in lengths.iter_mut() {
                *len = reader.read_bits(LENGTH_BITS)? as u8;
            }
            let decoder = PrefixDecoder::from_lengths(&lengths)?;
            let mut out = Vec::with_capacity(count);
            for _ in 0..count {
                let token = decoder.decode(reader)?;
                let extra_bits = token.saturating_sub(1);
                let extra = if token > 1 {
                    reader.read_bits(extra_bits as usize)? as u32
                } else {
                    0
                };
                out.push(token_value(token, extra));
            }
            Ok(out)
        }
    }
}
