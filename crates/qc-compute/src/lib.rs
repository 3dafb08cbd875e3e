//! # QC-Compute: cancelable nonce search
//!
//! The PoW producer's mining loop is CPU-bound and must run off the I/O
//! scheduler, searching nonces in parallel across cores until a caller-
//! supplied predicate accepts one (or the search is canceled). This
//! crate is deliberately agnostic to what the predicate hashes — the
//! PoW producer closes over its own candidate block and hex-prefix
//! check, so an engine swap never has to know the block's encoding.

pub mod backends;
pub mod tasks;

use std::sync::Arc;
use thiserror::Error;

/// Compute backend capabilities.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    /// CPU with Rayon parallelism.
    Cpu,
}

impl std::fmt::Display for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Backend::Cpu => write!(f, "CPU (Rayon)"),
        }
    }
}

/// Compute engine errors.
#[derive(Error, Debug)]
pub enum ComputeError {
    #[error("no compute backend available")]
    NoBackendAvailable,
    #[error("compute task failed: {0}")]
    TaskFailed(String),
}

/// Device information.
#[derive(Debug, Clone)]
pub struct DeviceInfo {
    pub name: String,
    pub backend: Backend,
    pub compute_units: u32,
}

/// A predicate checked once per candidate nonce. Returns `true` when the
/// nonce is an acceptable solution.
pub type NonceCheck = Arc<dyn Fn(u64) -> bool + Send + Sync>;

/// Compute engine trait, implemented by all backends.
#[async_trait::async_trait]
pub trait ComputeEngine: Send + Sync {
    /// Get backend type.
    fn backend(&self) -> Backend;

    /// Get device info.
    fn device_info(&self) -> &DeviceInfo;

    /// Search `nonce_start..nonce_start+nonce_count` in parallel for the
    /// first value `check` accepts. Returns as soon as another thread's
    /// find is observed, or when the whole range is exhausted.
    async fn search_nonce(
        &self,
        check: NonceCheck,
        nonce_start: u64,
        nonce_count: u64,
    ) -> Result<Option<u64>, ComputeError>;
}

/// Create the CPU engine, the only backend this crate ships.
pub fn auto_detect() -> Result<Arc<dyn ComputeEngine>, ComputeError> {
    Ok(Arc::new(backends::cpu::CpuEngine::new()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auto_detect_yields_cpu_backend() {
        let engine = auto_detect().unwrap();
        assert_eq!(engine.backend(), Backend::Cpu);
    }
}
