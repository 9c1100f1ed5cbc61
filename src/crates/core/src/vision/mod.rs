//! Detection flow
//!
//! Single-shot binary exchange with the detection endpoint

pub mod client;
pub mod types;

pub use client::DetectionClient;
pub use types::DetectionResult;
