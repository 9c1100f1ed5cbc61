//! Incremental answer-stream consumption
//!
//! `FragmentDecoder` turns raw byte chunks into ordered text fragments;
//! the pump in `handler` drives it over a live HTTP response body.

pub mod decoder;
pub mod handler;

pub use decoder::FragmentDecoder;
pub use handler::{pump_answer_stream, AnswerEvent};
