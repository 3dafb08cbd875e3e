//! CPU compute backend using Rayon.

use crate::{Backend, ComputeEngine, ComputeError, DeviceInfo, NonceCheck};
use rayon::prelude::*;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// CPU-based compute engine using Rayon.
pub struct CpuEngine {
    device_info: DeviceInfo,
}

impl CpuEngine {
    pub fn new() -> Self {
        let num_cpus = num_cpus::get() as u32;
        Self {
            device_info: DeviceInfo {
                name: format!("CPU ({num_cpus} cores)"),
                backend: Backend::Cpu,
                compute_units: num_cpus,
            },
        }
    }
}

impl Default for CpuEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl ComputeEngine for CpuEngine {
    fn backend(&self) -> Backend {
        Backend::Cpu
    }

    fn device_info(&self) -> &DeviceInfo {
        &self.device_info
    }

    async fn search_nonce(
        &self,
        check: NonceCheck,
        nonce_start: u64,
        nonce_count: u64,
    ) -> Result<Option<u64>, ComputeError> {
        let num_threads = self.device_info.compute_units.max(1) as u64;
        let chunk_size = (nonce_count / num_threads).max(1);

        let found = AtomicBool::new(false);
        let result_nonce = AtomicU64::new(0);

        (0..num_threads).into_par_iter().for_each(|thread_id| {
            let start = nonce_start + thread_id * chunk_size;
            let end = if thread_id == num_threads - 1 {
                nonce_start + nonce_count
            } else {
                (start + chunk_size).min(nonce_start + nonce_count)
            };

            for nonce in start..end {
                if nonce % 256 == 0 && found.load(Ordering::Relaxed) {
                    break;
                }
                if check(nonce) {
                    found.store(true, Ordering::SeqCst);
                    result_nonce.store(nonce, Ordering::SeqCst);
                    break;
                }
            }
        });

        if found.load(Ordering::SeqCst) {
            Ok(Some(result_nonce.load(Ordering::SeqCst)))
        } else {
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn finds_a_nonce_matching_predicate() {
        let engine = CpuEngine::new();
        let check: NonceCheck = std::sync::Arc::new(|n: u64| n == 12_345);
        let result = engine.search_nonce(check, 0, 20_000).await.unwrap();
        assert_eq!(result, Some(12_345));
    }

    #[tokio::test]
    async fn returns_none_when_range_is_exhausted() {
        let engine = CpuEngine::new();
        let check: NonceCheck = std::sync::Arc::new(|n: u64| n == 99_999);
        let result = engine.search_nonce(check, 0, 1_000).await.unwrap();
        assert_eq!(result, None);
    }
}
