use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Identifies one enrollment attempt on the caller side.
///
/// The session token is the credential handed to the capture engine; the group name and
/// external reference travel with the submission so the backend can file the enrollment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrollmentSession {
    pub session_token: String,
    pub group_name: String,
    pub external_database_ref_id: String,
}

impl EnrollmentSession {
    pub fn new(
        session_token: impl Into<String>,
        group_name: impl Into<String>,
        external_database_ref_id: impl Into<String>,
    ) -> Self {
        Self {
            session_token: session_token.into(),
            group_name: group_name.into(),
            external_database_ref_id: external_database_ref_id.into(),
        }
    }
}

/// Correlation id the capture engine assigns to a scan.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Encoded 3D face scan produced by the capture engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaceScan(pub String);

/// Encoded audit-trail image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditImage(pub String);

/// Opaque continuation token from the backend. Only the capture engine interprets it, so any
/// JSON value is carried through untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScanResultBlob(pub Value);

impl ScanResultBlob {
    pub fn new(value: impl Into<Value>) -> Self {
        Self(value.into())
    }

    /// Size of the token as it travels on the wire.
    pub fn encoded_len(&self) -> usize {
        match &self.0 {
            Value::String(raw) => raw.len(),
            other => other.to_string().len(),
        }
    }
}

/// Terminal status reported by the capture engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CaptureStatus {
    SessionCompletedSuccessfully,
    UserCancelled,
    UserCancelledFromNewUserGuidance,
    UserCancelledFromRetryGuidance,
    UserCancelledWhenAttemptingToGetCameraPermissions,
    ProgrammaticallyCancelled,
    Timeout,
    ContextSwitch,
    OrientationChangeDuringSession,
    LandscapeModeNotAllowed,
    LockedOut,
    CameraNotEnabled,
    CameraNotRunning,
    UnknownInternalError,
}

/// Coarse grouping of [`CaptureStatus`] values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    CompletedSuccessfully,
    Cancelled,
    TimedOut,
    Other,
}

impl CaptureStatus {
    pub const ALL: [CaptureStatus; 14] = [
        CaptureStatus::SessionCompletedSuccessfully,
        CaptureStatus::UserCancelled,
        CaptureStatus::UserCancelledFromNewUserGuidance,
        CaptureStatus::UserCancelledFromRetryGuidance,
        CaptureStatus::UserCancelledWhenAttemptingToGetCameraPermissions,
        CaptureStatus::ProgrammaticallyCancelled,
        CaptureStatus::Timeout,
        CaptureStatus::ContextSwitch,
        CaptureStatus::OrientationChangeDuringSession,
        CaptureStatus::LandscapeModeNotAllowed,
        CaptureStatus::LockedOut,
        CaptureStatus::CameraNotEnabled,
        CaptureStatus::CameraNotRunning,
        CaptureStatus::UnknownInternalError,
    ];

    pub fn name(self) -> &'static str {
        match self {
            CaptureStatus::SessionCompletedSuccessfully => "SessionCompletedSuccessfully",
            CaptureStatus::UserCancelled => "UserCancelled",
            CaptureStatus::UserCancelledFromNewUserGuidance => "UserCancelledFromNewUserGuidance",
            CaptureStatus::UserCancelledFromRetryGuidance => "UserCancelledFromRetryGuidance",
            CaptureStatus::UserCancelledWhenAttemptingToGetCameraPermissions => {
                "UserCancelledWhenAttemptingToGetCameraPermissions"
            }
            CaptureStatus::ProgrammaticallyCancelled => "ProgrammaticallyCancelled",
            CaptureStatus::Timeout => "Timeout",
            CaptureStatus::ContextSwitch => "ContextSwitch",
            CaptureStatus::OrientationChangeDuringSession => "OrientationChangeDuringSession",
            CaptureStatus::LandscapeModeNotAllowed => "LandscapeModeNotAllowed",
            CaptureStatus::LockedOut => "LockedOut",
            CaptureStatus::CameraNotEnabled => "CameraNotEnabled",
            CaptureStatus::CameraNotRunning => "CameraNotRunning",
            CaptureStatus::UnknownInternalError => "UnknownInternalError",
        }
    }

    pub fn kind(self) -> StatusKind {
        match self {
            CaptureStatus::SessionCompletedSuccessfully => StatusKind::CompletedSuccessfully,
            CaptureStatus::UserCancelled
            | CaptureStatus::UserCancelledFromNewUserGuidance
            | CaptureStatus::UserCancelledFromRetryGuidance
            | CaptureStatus::UserCancelledWhenAttemptingToGetCameraPermissions
            | CaptureStatus::ProgrammaticallyCancelled => StatusKind::Cancelled,
            CaptureStatus::Timeout => StatusKind::TimedOut,
            CaptureStatus::ContextSwitch
            | CaptureStatus::OrientationChangeDuringSession
            | CaptureStatus::LandscapeModeNotAllowed
            | CaptureStatus::LockedOut
            | CaptureStatus::CameraNotEnabled
            | CaptureStatus::CameraNotRunning
            | CaptureStatus::UnknownInternalError => StatusKind::Other,
        }
    }

    pub fn is_completed_successfully(self) -> bool {
        self.kind() == StatusKind::CompletedSuccessfully
    }
}

impl fmt::Display for CaptureStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CaptureStatus {
    type Err = CaptureResultError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let needle = raw.trim();
        CaptureStatus::ALL
            .into_iter()
            .find(|status| status.name().eq_ignore_ascii_case(needle))
            .ok_or_else(|| CaptureResultError::UnknownStatus(needle.to_string()))
    }
}

/// Scan data that only exists for a successfully completed capture.
///
/// Both audit trails are non-empty by construction, so the primary image of each is always
/// available to the submission builder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureArtifacts {
    face_scan: FaceScan,
    audit_trail: Vec<AuditImage>,
    low_quality_audit_trail: Vec<AuditImage>,
}

impl CaptureArtifacts {
    pub fn new(
        face_scan: FaceScan,
        audit_trail: Vec<AuditImage>,
        low_quality_audit_trail: Vec<AuditImage>,
    ) -> Result<Self, CaptureResultError> {
        if face_scan.0.is_empty() {
            return Err(CaptureResultError::MissingFaceScan);
        }
        if audit_trail.is_empty() {
            return Err(CaptureResultError::EmptyAuditTrail);
        }
        if low_quality_audit_trail.is_empty() {
            return Err(CaptureResultError::EmptyLowQualityAuditTrail);
        }

        Ok(Self {
            face_scan,
            audit_trail,
            low_quality_audit_trail,
        })
    }

    pub fn face_scan(&self) -> &FaceScan {
        &self.face_scan
    }

    pub fn audit_trail(&self) -> &[AuditImage] {
        &self.audit_trail
    }

    pub fn low_quality_audit_trail(&self) -> &[AuditImage] {
        &self.low_quality_audit_trail
    }

    pub fn primary_audit_image(&self) -> &AuditImage {
        &self.audit_trail[0]
    }

    pub fn primary_low_quality_audit_image(&self) -> &AuditImage {
        &self.low_quality_audit_trail[0]
    }
}

/// Terminal output of the capture engine for one session.
///
/// Everything except the completely-done flag is fixed at construction. The engine raises that
/// flag later, after it has torn down its own UI, through a handle it shares with the processor.
#[derive(Debug)]
pub struct CaptureResult {
    session_id: SessionId,
    status: CaptureStatus,
    artifacts: Option<CaptureArtifacts>,
    completely_done: AtomicBool,
}

impl CaptureResult {
    pub fn completed(session_id: SessionId, artifacts: CaptureArtifacts) -> Self {
        Self {
            session_id,
            status: CaptureStatus::SessionCompletedSuccessfully,
            artifacts: Some(artifacts),
            completely_done: AtomicBool::new(false),
        }
    }

    pub fn unsuccessful(
        session_id: SessionId,
        status: CaptureStatus,
    ) -> Result<Self, CaptureResultError> {
        if status.is_completed_successfully() {
            return Err(CaptureResultError::MissingArtifacts);
        }

        Ok(Self {
            session_id,
            status,
            artifacts: None,
            completely_done: AtomicBool::new(false),
        })
    }

    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    pub fn status(&self) -> CaptureStatus {
        self.status
    }

    pub fn artifacts(&self) -> Option<&CaptureArtifacts> {
        self.artifacts.as_ref()
    }

    pub fn mark_completely_done(&self) {
        self.completely_done.store(true, Ordering::Release);
    }

    pub fn is_completely_done(&self) -> bool {
        self.completely_done.load(Ordering::Acquire)
    }
}

/// Raised when the capture engine hands over a result that cannot exist.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CaptureResultError {
    #[error("a successful capture must carry its scan artifacts")]
    MissingArtifacts,
    #[error("face scan is empty")]
    MissingFaceScan,
    #[error("audit trail must contain at least one image")]
    EmptyAuditTrail,
    #[error("low quality audit trail must contain at least one image")]
    EmptyLowQualityAuditTrail,
    #[error("unknown capture status '{0}'")]
    UnknownStatus(String),
}
