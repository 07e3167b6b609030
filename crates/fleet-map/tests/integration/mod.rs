//! Integration tests for fleet-map.
//!
//! These tests drive the widget through its lifecycle with instrumented
//! collaborators:
//! - gated environment detection and icon loading
//! - a recording map engine
//! - fixture vehicle snapshots

pub mod common;
