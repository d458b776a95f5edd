//! Bot detection: probe sessions and reply classification.

pub mod classify;
pub mod session;

pub use classify::{Classification, Classifier, SignatureMatcher};
pub use session::{Detector, ProbeOutcome, ProbeState, Verdict};
