//! Bitstream writing and entropy coding
//!
//! This crate provides the bit-oriented output buffer, the hybrid
//! token model for integer symbols, and the two entropy coders (canonical
//! prefix codes and byte-wise rANS) selectable at encode time. Decoders
//! exist for round-trip validation only.

pub mod ans;
pub mod bitreader;
pub mod bitwriter;
pub mod entropy;
pub mod histogram;
pub mod prefix;

pub use ans::{AnsDecoder, AnsEncoder, ANS_LOG_TAB_SIZE, ANS_TAB_SIZE};
pub use bitreader::BitstreamReader;
pub use bitwriter::BitstreamWriter;
pub use entropy::EntropyCoder;
pub use histogram::{build_histogram, pack_signed, token_of, token_value, unpack_signed};
pub use prefix::{PrefixDecoder, PrefixEncoder};
