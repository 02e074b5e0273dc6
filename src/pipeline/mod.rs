//! Concurrent fetch-and-extract pipeline
//!
//! This module contains the orchestration layer, including:
//! - The per-URL unit of work and its state machine
//! - The error taxonomy surfaced to callers
//! - Concurrent fan-out with bounded renders and ordered fan-in

mod orchestrator;
mod unit;

pub use orchestrator::Orchestrator;
pub use unit::{ErrorKind, ExtractionOutcome, UnitState};
