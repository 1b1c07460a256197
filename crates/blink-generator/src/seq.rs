use crate::Generator;
use blink_core::ShortCode;
use std::sync::atomic::{AtomicU64, Ordering};

/// Deterministic generator producing `prefix` followed by a zero-padded counter.
///
/// Used in tests and local setups where predictable codes are handy.
#[derive(Debug, Default)]
pub struct SeqGenerator {
    prefix: String,
    next: AtomicU64,
}

impl SeqGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: AtomicU64::new(0),
        }
    }

    /// Starts counting from `offset` instead of zero.
    pub fn with_offset(mut self, offset: u64) -> Self {
        self.next = AtomicU64::new(offset);
        self
    }
}

impl Generator for SeqGenerator {
    fn generate(&self) -> ShortCode {
        let n = self.next.fetch_add(1, Ordering::Relaxed);
        ShortCode::generated(format!("{}{:06}", self.prefix, n))
    }
}
