//! Progressive pass framing
//!
//! A progressive stream carries N independently entropy-coded passes,
//! coarse first. Every pass is byte-aligned and framed with a marker
//! byte, its pass index, and its byte length, so a decoder can render
//! after any prefix of passes. The extra markers and per-pass tables are
//! why a progressive stream is never smaller than the single-pass form
//! of the same data.

use jxlenc_bitstream::{BitstreamReader, BitstreamWriter};
use jxlenc_core::{EncoderError, EncoderResult};

/// Byte marking the start of each pass frame
pub const PASS_MARKER: u8 = 0xA5;

/// Number of passes the VarDCT path emits in progressive mode
pub const VARDCT_PASSES: usize = 3;
/// Number of passes the Modular path emits in progressive mode
pub const MODULAR_PASSES: usize = 2;

/// Zigzag index splitting DC+low frequencies from the refinement pass
pub const LOW_FREQUENCY_COEFFS: usize = 21;

/// Frame one pass: marker, index, byte length, payload
pub fn write_pass(
    writer: &mut BitstreamWriter,
    index: usize,
    payload: &[u8],
) -> EncoderResult<()> {
    writer.write_byte(PASS_MARKER)?;
    writer.write_varint(index as u64)?;
    writer.write_varint(payload.len() as u64)?;
    for &byte in payload {
        writer.write_byte(byte)?;
    }
    Ok(())
}

/// Read one pass frame, returning (index, payload)
pub fn read_pass(reader: &mut BitstreamReader<'_>) -> EncoderResult<(usize, Vec<u8>)> {
    let marker = reader.read_byte()?;
    if marker != PASS_MARKER {
        return Err(EncoderError::invalid_input("missing pass marker"));
    }
    let index = reader.read_varint()? as usize;
    let len = reader.read_varint()? as usize;
    let mut payload = Vec::with_capacity(len);
    for _ in 0..len {
        payload.push(reader.read_byte()?);
    }
    Ok((index, payload))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pass_roundtrip() {
        let mut writer = BitstreamWriter::new();
        write_pass(&mut writer, 0, &[1, 2, 3]).unwrap();
        write_pass(&mut writer, 1, &[]).unwrap();
        write_pass(&mut writer, 2, &[0xFF; 200]).unwrap();
        let bytes = writer.into_bytes();

        let mut reader = BitstreamReader::new(&bytes);
        assert_eq!(read_pass(&mut reader).unwrap(), (0, vec![1, 2, 3]));
        assert_eq!(read_pass(&mut reader).unwrap(), (1, vec![]));
        assert_eq!(read_pass(&mut reader).unwrap(), (2, vec![0xFF; 200]));
    }

    #[test]
    fn test_framing_overhead_is_positive() {
        let payload = vec![7u8; 100];
        let mut writer = BitstreamWriter::new();
        write_pass(&mut writer, 0, &payload).unwrap();
        assert!(writer.into_bytes().len() > payload.len());
    }
}
