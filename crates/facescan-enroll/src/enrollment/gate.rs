use tracing::debug;

use super::domain::{CaptureArtifacts, CaptureResult};
use super::processor::SessionError;

/// Admit a capture result for submission.
///
/// Anything other than a successful completion is rejected with the engine's status so the
/// caller can see whether the user cancelled, timed out, or something else went wrong.
pub(crate) fn admit(result: &CaptureResult) -> Result<&CaptureArtifacts, SessionError> {
    let status = result.status();
    match result.artifacts() {
        Some(artifacts) if status.is_completed_successfully() => Ok(artifacts),
        _ => {
            debug!(
                session_id = %result.session_id(),
                %status,
                kind = ?status.kind(),
                "capture result has nothing to submit"
            );
            Err(SessionError::NotCompleted { status })
        }
    }
}
