//! One enrollment attempt between a capture engine and the verification backend.
//!
//! The capture engine delivers a terminal [`CaptureResult`] to an [`EnrollmentProcessor`]. The
//! processor gates it, submits usable scans through a [`BackendClient`], turns the verdict into
//! a single [`Directive`] for the engine, and reports to the caller: errors immediately,
//! success only after the engine signals it has completely finished.

pub mod client;
pub mod domain;
pub mod engine;
mod gate;
pub mod processor;
pub mod submission;
pub mod verdict;

#[cfg(test)]
mod tests;

pub use client::{
    BackendClient, BackendError, EnrollmentRequest, HttpBackendClient, DEVICE_KEY_HEADER,
    ENROLLMENT_PATH, USER_AGENT_HEADER,
};
pub use domain::{
    AuditImage, CaptureArtifacts, CaptureResult, CaptureResultError, CaptureStatus,
    EnrollmentSession, FaceScan, ScanResultBlob, SessionId, StatusKind,
};
pub use engine::{CaptureSdk, Directive, FaceScanProcessor, FaceScanResultCallback};
pub use processor::{
    ContractViolation, EnrollmentProcessor, ErrorHandler, ProcessorOptions, SessionError,
    SessionPhase, SuccessHandler,
};
pub use submission::SubmissionPayload;
pub use verdict::{BackendVerdict, Continuation};
