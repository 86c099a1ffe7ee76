//! Container header writing
//!
//! The stream is a naked codestream: the two-byte signature followed by
//! LSB-first bit fields. No ISOBMFF box wrapping is emitted.

use jxlenc_bitstream::{BitstreamReader, BitstreamWriter};
use jxlenc_core::{
    AlphaMode, ColorPrimaries, ColorSpace, EncoderError, EncoderResult, ImageFrame, Orientation,
    TransferFunction,
};

/// Write the signature and the frame's container header fields
///
/// Layout after the signature: width varint, height varint, bit depth
/// (6 bits), channel count (3 bits), alpha flag (1 bit) + alpha mode
/// (2 bits), color-space block, orientation (3 bits), and the coding-path
/// discriminator (1 = Modular).
pub fn write_header(
    writer: &mut BitstreamWriter,
    frame: &ImageFrame,
    modular: bool,
) -> EncoderResult<()> {
    writer.write_signature()?;
    writer.write_varint(frame.width() as u64)?;
    writer.write_varint(frame.height() as u64)?;
    writer.write_bits(frame.bits_per_sample() as u64, 6)?;
    writer.write_bits(frame.channels() as u64, 3)?;
    writer.write_bit(frame.has_alpha())?;
    writer.write_bits(frame.alpha_mode().raw_value() as u64, 2)?;
    write_color_space(writer, frame.color_space())?;
    writer.write_bits(Orientation::default() as u64, 3)?;
    writer.write_bit(modular)?;
    Ok(())
}

fn write_color_space(writer: &mut BitstreamWriter, color_space: ColorSpace) -> EncoderResult<()> {
    match color_space {
        ColorSpace::Srgb => writer.write_bits(0, 2),
        ColorSpace::Grayscale => writer.write_bits(1, 2),
        ColorSpace::Custom {
            primaries,
            transfer,
        } => {
            writer.write_bits(2, 2)?;
            for value in [
                primaries.red_x,
                primaries.red_y,
                primaries.green_x,
                primaries.green_y,
                primaries.blue_x,
                primaries.blue_y,
                primaries.white_x,
                primaries.white_y,
            ] {
                writer.write_bits(value.to_bits() as u64, 32)?;
            }
            writer.write_bits(transfer.raw_value() as u64, 3)?;
            if let TransferFunction::Gamma(gamma) = transfer {
                writer.write_bits(gamma.to_bits() as u64, 32)?;
            }
            Ok(())
        }
    }
}

/// Parsed container header, used by the round-trip decode path
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedHeader {
    pub width: u32,
    pub height: u32,
    pub bits_per_sample: u8,
    pub channels: usize,
    pub has_alpha: bool,
    pub alpha_mode: AlphaMode,
    pub color_space: ColorSpace,
    pub modular: bool,
}

/// Parse a header written by [`write_header`]
pub fn read_header(reader: &mut BitstreamReader<'_>) -> EncoderResult<ParsedHeader> {
    let sig0 = reader.read_byte()?;
    let sig1 = reader.read_byte()?;
    if [sig0, sig1] != jxlenc_bitstream::bitwriter::SIGNATURE {
        return Err(EncoderError::invalid_input("bad codestream signature"));
    }

    let width = reader.read_varint()? as u32;
    let height = reader.read_varint()? as u32;
    let bits_per_sample = reader.read_bits(6)? as u8;
    let channels = reader.read_bits(3)? as usize;
    let has_alpha = reader.read_bit()?;
    let alpha_mode = match reader.read_bits(2)? {
        0 => AlphaMode::None,
        1 => AlphaMode::Straight,
        2 => AlphaMode::Premultiplied,
        _ => return Err(EncoderError::invalid_input("bad alpha mode")),
    };
    let color_space = read_color_space(reader)?;
    let _orientation = reader.read_bits(3)?;
    let modular = reader.read_bit()?;

    Ok(ParsedHeader {
        width,
        height,
        bits_per_sample,
        channels,
        has_alpha,
        alpha_mode,
        color_space,
        modular,
    })
}

fn read_color_space(reader: &mut BitstreamReader<'_>) -> EncoderResult<ColorSpace> {
    match reader.read_bits(2)? {
        0 => Ok(ColorSpace::Srgb),
        1 => Ok(ColorSpace::Grayscale),
        2 => {
            let mut values = [0.0f32; 8];
            for value in values.iter_mut() {
                *value = f32::from_bits(reader.read_bits(32)? as u32);
            }
            let transfer = match reader.read_bits(3)? {
                0 => TransferFunction::Srgb,
                1 => TransferFunction::Linear,
                2 => TransferFunction::Pq,
                3 => TransferFunction::Hlg,
                4 => TransferFunction::Gamma(f32::from_bits(reader.read_bits(32)? as u32)),
                _ => return Err(EncoderError::invalid_input("bad transfer function")),
            };
            Ok(ColorSpace::Custom {
                primaries: ColorPrimaries {
                    red_x: values[0],
                    red_y: values[1],
                    green_x: values[2],
                    green_y: values[3],
                    blue_x: values[4],
                    blue_y: values[5],
                    white_x: values[6],
                    white_y: values[7],
                },
                transfer,
            })
        }
        _ => Err(EncoderError::invalid_input("bad color space tag")),
    }
}
