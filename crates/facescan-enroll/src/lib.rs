//! Single-session 3D face-scan enrollment handshake.
//!
//! The [`enrollment`] module owns one enrollment attempt: it gates the capture engine's
//! terminal result, submits usable scans to the backend, turns the verdict into a directive
//! for the engine, and reports success or failure to the caller once the engine winds down.

pub mod config;
pub mod enrollment;
pub mod error;
pub mod telemetry;
