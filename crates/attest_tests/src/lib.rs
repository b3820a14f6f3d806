//! Integration test crate.
//!
//! Holds the end-to-end verification scenarios and the property-based
//! suite under `tests/`. No library code lives here.
