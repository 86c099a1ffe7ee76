//! Round-trip decoding of the lossless path
//!
//! The encoder core only needs enough decoder to prove its own streams
//! invertible: this module parses the container header and reconstructs
//! the Modular payload exactly. The VarDCT payload is lossy by design and
//! is validated structurally elsewhere.

use jxlenc_bitstream::{unpack_signed, BitstreamReader, EntropyCoder};
use jxlenc_core::{EncoderError, EncoderResult};
use jxlenc_kernels::scalar;

use crate::{
    header::{self, ParsedHeader},
    modular::{merge_regions, undo_squeeze, SqueezeSchedule},
    progressive,
};

/// A decoded Modular frame: the parsed header plus one i32 plane per
/// channel, bit-exact against the encoder's input
#[derive(Debug)]
pub struct DecodedModular {
    pub header: ParsedHeader,
    pub channels: Vec<Vec<i32>>,
}

/// Decode a Modular (lossless) stream produced by this encoder
pub fn decode_modular(bytes: &[u8]) -> EncoderResult<DecodedModular> {
    let mut reader = BitstreamReader::new(bytes);
    let header = header::read_header(&mut reader)?;
    if !header.modular {
        return Err(EncoderError::unsupported(
            "round-trip decoding only covers the modular path",
        ));
    }

    let width = header.width as usize;
    let height = header.height as usize;
    let levels = reader.read_varint()? as u8;
    let use_rct = reader.read_bit()?;
    let progressive = reader.read_bit()?;
    let schedule = SqueezeSchedule { levels };

    let residual_planes = if progressive {
        let num_passes = reader.read_varint()? as usize;
        if num_passes != progressive::MODULAR_PASSES {
            return Err(EncoderError::invalid_input("unexpected pass count"));
        }
        read_progressive_residuals(&mut reader, &header, width, height, schedule)?
    } else {
        let mut planes = Vec::with_capacity(header.channels);
        for _ in 0..header.channels {
            planes.push(read_signed(&mut reader)?);
        }
        planes
    };

    let mut channels = Vec::with_capacity(header.channels);
    for residuals in &residual_planes {
        if residuals.len() != width * height {
            return Err(EncoderError::invalid_input("residual plane size mismatch"));
        }
        let mut plane = scalar::reconstruct_med_i32(residuals, width, height);
        undo_squeeze(&mut plane, width, height, schedule);
        channels.push(plane);
    }

    if use_rct {
        let n = width * height;
        let (mut r, mut g, mut b) = (vec![0u16; n], vec![0u16; n], vec![0u16; n]);
        scalar::inverse_rct(&channels[0], &channels[1], &channels[2], &mut r, &mut g, &mut b);
        channels[0] = r.into_iter().map(|v| v as i32).collect();
        channels[1] = g.into_iter().map(|v| v as i32).collect();
        channels[2] = b.into_iter().map(|v| v as i32).collect();
    }

    Ok(DecodedModular { header, channels })
}

fn read_progressive_residuals(
    reader: &mut BitstreamReader<'_>,
    header: &ParsedHeader,
    width: usize,
    height: usize,
    schedule: SqueezeSchedule,
) -> EncoderResult<Vec<Vec<i32>>> {
    let (coarse_w, coarse_h) = schedule.coarse_size(width, height);

    let (index, coarse_bytes) = progressive::read_pass(reader)?;
    if index != 0 {
        return Err(EncoderError::invalid_input("passes out of order"));
    }
    let (index, detail_bytes) = progressive::read_pass(reader)?;
    if index != 1 {
        return Err(EncoderError::invalid_input("passes out of order"));
    }

    let mut coarse_reader = BitstreamReader::new(&coarse_bytes);
    let mut detail_reader = BitstreamReader::new(&detail_bytes);
    let mut planes = Vec::with_capacity(header.channels);
    for _ in 0..header.channels {
        let coarse = read_signed(&mut coarse_reader)?;
        let detail = read_signed(&mut detail_reader)?;
        planes.push(merge_regions(
            &coarse, &detail, width, height, coarse_w, coarse_h,
        ));
    }
    Ok(planes)
}

fn read_signed(reader: &mut BitstreamReader<'_>) -> EncoderResult<Vec<i32>> {
    Ok(EntropyCoder::decode_stream(reader)?
        .into_iter()
        .map(unpack_signed)
        .collect())
}
