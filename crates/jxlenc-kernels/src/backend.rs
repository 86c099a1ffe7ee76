//! Backend enumeration and runtime selection

use lazy_static::lazy_static;

use crate::{scalar::ScalarOps, HardwareCapabilities, Kernels};

static SCALAR_OPS: ScalarOps = ScalarOps;
#[cfg(target_arch = "aarch64")]
static NEON_OPS: crate::neon::NeonOps = crate::neon::NeonOps;
#[cfg(target_arch = "x86_64")]
static SSE2_OPS: crate::sse2::Sse2Ops = crate::sse2::Sse2Ops;
#[cfg(target_arch = "x86_64")]
static AVX2_OPS: crate::avx2::Avx2Ops = crate::avx2::Avx2Ops;
#[cfg(target_os = "macos")]
static ACCELERATE_OPS: crate::accelerate::AccelerateOps = crate::accelerate::AccelerateOps;

lazy_static! {
    /// Best available backend, computed once per process
    static ref CURRENT_BACKEND: DispatchBackend = DispatchBackend::select_best(true);
}

/// Kernel backend selector
///
/// A closed set: every variant exists on every platform, but only the
/// variants whose instruction set (or vector library) is present report
/// themselves available. GPU backends are opt-in and currently stubs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum DispatchBackend {
    Scalar = 0,
    Neon = 1,
    Sse2 = 2,
    Avx2 = 3,
    Accelerate = 4,
    Metal = 5,
}

impl DispatchBackend {
    /// All variants, in raw-value order
    pub fn all() -> [DispatchBackend; 6] {
        [
            DispatchBackend::Scalar,
            DispatchBackend::Neon,
            DispatchBackend::Sse2,
            DispatchBackend::Avx2,
            DispatchBackend::Accelerate,
            DispatchBackend::Metal,
        ]
    }

    /// Whether this backend can run on the current machine
    pub fn is_available(&self) -> bool {
        match self {
            DispatchBackend::Scalar => true,
            DispatchBackend::Neon => cfg!(target_arch = "aarch64"),
            DispatchBackend::Sse2 => cfg!(target_arch = "x86_64"),
            DispatchBackend::Avx2 => {
                cfg!(target_arch = "x86_64") && HardwareCapabilities::detect().has_avx2
            }
            DispatchBackend::Accelerate => cfg!(target_os = "macos"),
            // No GPU kernel set is shipped; the variant stays unavailable.
            DispatchBackend::Metal => false,
        }
    }

    /// Whether the backend needs a GPU to run
    pub fn requires_gpu(&self) -> bool {
        matches!(self, DispatchBackend::Metal)
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            DispatchBackend::Scalar => "Scalar",
            DispatchBackend::Neon => "NEON",
            DispatchBackend::Sse2 => "SSE2",
            DispatchBackend::Avx2 => "AVX2",
            DispatchBackend::Accelerate => "Accelerate",
            DispatchBackend::Metal => "Metal",
        }
    }

    /// Unique small integer identifying the backend
    pub fn raw_value(&self) -> u8 {
        *self as u8
    }

    /// The process-wide best available backend
    ///
    /// Priority: Accelerate, then AVX2, then SSE2, then NEON, then scalar.
    /// GPU backends are never chosen implicitly. The result is computed
    /// once and cached.
    pub fn current() -> DispatchBackend {
        *CURRENT_BACKEND
    }

    /// Best available CPU/vector-library backend
    pub(crate) fn select_best(allow_accelerate: bool) -> DispatchBackend {
        if allow_accelerate && DispatchBackend::Accelerate.is_available() {
            return DispatchBackend::Accelerate;
        }
        if DispatchBackend::Avx2.is_available() {
            return DispatchBackend::Avx2;
        }
        if DispatchBackend::Sse2.is_available() {
            return DispatchBackend::Sse2;
        }
        if DispatchBackend::Neon.is_available() {
            return DispatchBackend::Neon;
        }
        DispatchBackend::Scalar
    }

    /// Backend chosen under the encoder's acceleration options
    pub fn for_options(use_hardware_acceleration: bool, use_accelerate: bool) -> DispatchBackend {
        if !use_hardware_acceleration {
            return DispatchBackend::Scalar;
        }
        let best = DispatchBackend::current();
        if best == DispatchBackend::Accelerate && !use_accelerate {
            return DispatchBackend::select_best(false);
        }
        best
    }

    /// The kernel implementation for this backend
    ///
    /// Unavailable variants (including the Metal stub) fall back to the
    /// scalar implementation rather than failing: kernels are total.
    pub fn ops(&self) -> &'static dyn Kernels {
        match self {
            #[cfg(target_arch = "aarch64")]
            DispatchBackend::Neon => &NEON_OPS,
            #[cfg(target_arch = "x86_64")]
            DispatchBackend::Sse2 => &SSE2_OPS,
            #[cfg(target_arch = "x86_64")]
            DispatchBackend::Avx2 => {
                if self.is_available() {
                    &AVX2_OPS
                } else {
                    &SCALAR_OPS
                }
            }
            #[cfg(target_os = "macos")]
            DispatchBackend::Accelerate => &ACCELERATE_OPS,
            _ => &SCALAR_OPS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_always_available() {
        assert!(DispatchBackend::Scalar.is_available());
    }

    #[test]
    fn test_raw_values_unique() {
        let mut seen = std::collections::HashSet::new();
        for backend in DispatchBackend::all() {
            assert!(seen.insert(backend.raw_value()));
            assert!(!backend.display_name().is_empty());
        }
    }

    #[test]
    fn test_only_metal_requires_gpu() {
        for backend in DispatchBackend::all() {
            assert_eq!(backend.requires_gpu(), backend == DispatchBackend::Metal);
        }
    }

    #[test]
    fn test_metal_never_available() {
        assert!(!DispatchBackend::Metal.is_available());
    }

    #[test]
    fn test_current_is_available_and_deterministic() {
        let current = DispatchBackend::current();
        assert!(current.is_available());
        assert!(!current.requires_gpu());
        assert_eq!(current, DispatchBackend::current());
    }

    #[test]
    fn test_architecture_gating() {
        if cfg!(target_arch = "x86_64") {
            assert!(DispatchBackend::Sse2.is_available());
            assert!(!DispatchBackend::Neon.is_available());
        }
        if cfg!(target_arch = "aarch64") {
            assert!(DispatchBackend::Neon.is_available());
            assert!(!DispatchBackend::Sse2.is_available());
            assert!(!DispatchBackend::Avx2.is_available());
        }
    }

    #[test]
    fn test_options_override() {
        assert_eq!(
            DispatchBackend::for_options(false, true),
            DispatchBackend::Scalar
        );
        let allowed = DispatchBackend::for_options(true, false);
        assert_ne!(allowed, DispatchBackend::Accelerate);
        assert!(allowed.is_available());
    }
}
