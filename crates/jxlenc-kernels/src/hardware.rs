//! Runtime hardware probing

/// Instruction sets and core count detected at runtime
#[derive(Debug, Clone, Copy)]
pub struct HardwareCapabilities {
    /// Number of logical cores; at least 1
    pub core_count: usize,
    /// AVX2 available (always false off x86-64)
    pub has_avx2: bool,
}

impl HardwareCapabilities {
    pub fn detect() -> Self {
        let core_count = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);

        #[cfg(target_arch = "x86_64")]
        let has_avx2 = is_x86_feature_detected!("avx2");
        #[cfg(not(target_arch = "x86_64"))]
        let has_avx2 = false;

        Self {
            core_count,
            has_avx2,
        }
    }
}

/// CPU architecture the process is running on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CpuArchitecture {
    X86_64,
    Arm64,
    Unknown,
}

impl CpuArchitecture {
    pub fn current() -> Self {
        #[cfg(target_arch = "x86_64")]
        {
            CpuArchitecture::X86_64
        }
        #[cfg(target_arch = "aarch64")]
        {
            CpuArchitecture::Arm64
        }
        #[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
        {
            CpuArchitecture::Unknown
        }
    }
}
