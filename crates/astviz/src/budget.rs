//! Memory-bounded execution of the visualization pipeline.
//!
//! Only allocations made through the Rust global allocator are counted.
//! tree-sitter keeps its parser state and parse tree in C `malloc` memory,
//! which the budget does not see.

use std::sync::Once;

use log::{debug, warn};

use astviz_core::alloc;

use crate::error::AstvizError;

const BYTES_PER_MB: u64 = 1024 * 1024;

static UNTRACKED_WARNING: Once = Once::new();

/// Ceiling on the heap growth of one pipeline run.
///
/// Growth is the peak number of live bytes the calling thread allocated on
/// top of what it held when the run started, as reported by
/// [`alloc::measure`]. The check happens after the run; anything the run
/// returns is dropped when the ceiling is exceeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryBudget {
    limit_mb: u64,
}

impl MemoryBudget {
    pub fn new(limit_mb: u64) -> Self {
        Self { limit_mb }
    }

    pub fn limit_mb(&self) -> u64 {
        self.limit_mb
    }

    pub fn limit_bytes(&self) -> u64 {
        self.limit_mb.saturating_mul(BYTES_PER_MB)
    }

    /// Runs `f` and enforces the ceiling on its heap growth.
    ///
    /// An error returned by `f` itself takes precedence over the ceiling.
    ///
    /// # Errors
    ///
    /// Returns the error of `f`, or [`AstvizError::MemoryLimitExceeded`] if
    /// `f` succeeded but grew the heap past the ceiling.
    pub fn run<T>(&self, f: impl FnOnce() -> Result<T, AstvizError>) -> Result<T, AstvizError> {
        if !alloc::is_installed() {
            UNTRACKED_WARNING.call_once(|| {
                warn!("Tracking allocator is not installed; memory limit is not enforced");
            });
        }

        let (result, growth) = alloc::measure(f);
        let output = result?;

        let growth = growth as u64;
        debug!(growth_bytes = growth, limit_bytes = self.limit_bytes(); "Pipeline memory growth");

        if growth > self.limit_bytes() {
            drop(output);
            return Err(AstvizError::MemoryLimitExceeded {
                limit_mb: self.limit_mb,
                used_mb: growth as f64 / BYTES_PER_MB as f64,
            });
        }

        Ok(output)
    }
}

impl Default for MemoryBudget {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_MEMORY_LIMIT_MB)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // The unit-test binary has no tracking allocator, so growth reads as zero
    // and only error propagation is observable here. Enforcement is covered by
    // the integration tests, which install one.

    #[test]
    fn test_limit_bytes() {
        assert_eq!(MemoryBudget::new(10).limit_bytes(), 10 * 1024 * 1024);
        assert_eq!(MemoryBudget::new(u64::MAX).limit_bytes(), u64::MAX);
        assert_eq!(MemoryBudget::default().limit_mb(), 10);
    }

    #[test]
    fn test_run_returns_output() {
        let budget = MemoryBudget::new(10);
        let value = budget.run(|| Ok(vec![1u8; 16])).unwrap();
        assert_eq!(value.len(), 16);
    }

    #[test]
    fn test_run_propagates_inner_error() {
        let budget = MemoryBudget::new(0);
        let err = budget
            .run(|| -> Result<(), AstvizError> { Err(AstvizError::Render("boom".to_string())) })
            .unwrap_err();
        assert!(matches!(err, AstvizError::Render(_)));
    }
}
