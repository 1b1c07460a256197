pub mod error;
pub mod random;
pub mod seq;

pub use error::Error;
pub use random::{RandomGenerator, RandomSettings};
pub use seq::SeqGenerator;

use blink_core::ShortCode;
use std::sync::Arc;

/// Trait for generating short codes.
///
/// Implementations are pure generators that don't interact with storage.
/// Uniqueness is not guaranteed; the shortener retries when a generated
/// code is already taken.
pub trait Generator: Send + Sync + 'static {
    /// Produces the next candidate code.
    fn generate(&self) -> ShortCode;
}

impl<T: Generator + ?Sized> Generator for Arc<T> {
    fn generate(&self) -> ShortCode {
        (**self).generate()
    }
}
