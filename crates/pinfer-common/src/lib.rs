//! Common types and utilities for the pinfer inference engine.
//!
//! - String interning (`Atom`, `AtomTable`)
//! - Limits and thresholds shared by the solver and the engine

pub mod interner;
pub use interner::{Atom, AtomTable};

pub mod limits;
