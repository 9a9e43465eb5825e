use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use super::domain::ScanResultBlob;
use super::processor::SessionError;

/// Backend's answer to an enrollment submission.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackendVerdict {
    pub was_processed: bool,
    #[serde(default)]
    pub scan_result_blob: Option<ScanResultBlob>,
    #[serde(default)]
    pub result_screen_success_message: Option<String>,
}

/// What the capture engine needs to move on after an accepted scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Continuation {
    pub scan_result_blob: ScanResultBlob,
    pub success_message: Option<String>,
}

/// Interpret a parsed response body.
///
/// Only a body with `wasProcessed: true` and a non-null continuation token advances the
/// engine; every other shape is treated as an unexpected response.
pub fn interpret(body: Value) -> Result<Continuation, SessionError> {
    let verdict = match serde_json::from_value::<BackendVerdict>(body) {
        Ok(verdict) => verdict,
        Err(err) => {
            warn!(error = %err, "backend response is not a verdict");
            return Err(SessionError::UnexpectedResponse);
        }
    };

    match verdict {
        BackendVerdict {
            was_processed: true,
            scan_result_blob: Some(scan_result_blob),
            result_screen_success_message,
        } => Ok(Continuation {
            scan_result_blob,
            success_message: result_screen_success_message,
        }),
        BackendVerdict {
            was_processed: true,
            scan_result_blob: None,
            ..
        } => {
            warn!("backend processed the scan but sent no scanResultBlob");
            Err(SessionError::UnexpectedResponse)
        }
        BackendVerdict {
            was_processed: false,
            ..
        } => {
            warn!("backend did not process the scan");
            Err(SessionError::UnexpectedResponse)
        }
    }
}
