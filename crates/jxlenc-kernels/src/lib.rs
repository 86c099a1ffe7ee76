//! Numeric kernels and runtime SIMD dispatch
//!
//! Every backend implements the same [`Kernels`] surface; the scalar
//! implementations in [`scalar`] define numerical truth, and the
//! vectorized backends must stay within the documented tolerances of
//! them. Backend selection happens once per process through
//! [`DispatchBackend::current`].

pub mod backend;
pub mod dct;
pub mod hardware;
pub mod kernels;
pub mod scalar;

#[cfg(target_arch = "aarch64")]
pub mod neon;
#[cfg(target_arch = "x86_64")]
pub mod sse2;
#[cfg(target_arch = "x86_64")]
pub mod avx2;
#[cfg(target_os = "macos")]
pub mod accelerate;

pub use backend::DispatchBackend;
pub use hardware::{CpuArchitecture, HardwareCapabilities};
pub use kernels::Kernels;
pub use scalar::{ScalarOps, ZIGZAG_8X8};
