//! Risk factor analyzers
//!
//! Six independent scorers, each mapping a transaction (plus the user's
//! profile or transaction history where relevant) to a 0-100 sub-score with
//! human-readable reasons. Analyzers return `Result`; the engine converts
//! any failure into that analyzer's fixed fallback score at a single
//! boundary, so one failing analyzer can never block a payment.

mod amount;
mod behavior;
mod device;
mod external;
mod frequency;
mod time;

pub use amount::AmountDeviationAnalyzer;
pub use behavior::BehaviorAnalyzer;
pub use device::DeviceFingerprintAnalyzer;
pub use external::ExternalCheckAnalyzer;
pub use frequency::FrequencyAnalyzer;
pub use time::TimePatternAnalyzer;

/// Fallback score substituted when an analyzer fails internally.
///
/// The external check is the exception: it fails open to 0.
pub const MODERATE_FALLBACK_SCORE: u8 = 50;
