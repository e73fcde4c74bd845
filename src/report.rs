//! Failure reporting seam.
//!
//! Every exec/parse/control failure in the core is routed here rather
//! than swallowed. The default sink logs; a shell may surface dialogs or
//! crash reports behind the same trait.

use async_trait::async_trait;
use log::error;

/// Failure currency for the reporting seam.
pub type Failure = Box<dyn std::error::Error + Send + Sync>;

#[async_trait]
pub trait FailureReporter: Send + Sync {
    async fn report(&self, failure: Failure);
}

/// Log-backed reporter used when no richer sink is wired.
#[derive(Default)]
pub struct LogReporter;

#[async_trait]
impl FailureReporter for LogReporter {
    async fn report(&self, failure: Failure) {
        error!("{failure}");
    }
}
