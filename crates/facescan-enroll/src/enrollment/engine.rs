use std::sync::Arc;

use async_trait::async_trait;

use super::domain::{CaptureResult, ScanResultBlob, SessionId};
use super::processor::ContractViolation;

/// Instruction handed back to the capture engine for a delivered result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    Advance(ScanResultBlob),
    Abort,
}

impl Directive {
    pub fn label(&self) -> &'static str {
        match self {
            Directive::Advance(_) => "advance",
            Directive::Abort => "abort",
        }
    }
}

/// Handle the capture engine passes alongside a result.
///
/// Both methods consume the handle, so at most one directive can be issued per delivery.
pub trait FaceScanResultCallback: Send {
    fn proceed_to_next_step(self: Box<Self>, scan_result_blob: ScanResultBlob);
    fn cancel(self: Box<Self>);
}

/// Issue `directive` through `callback`, consuming it.
pub(crate) fn issue(callback: Box<dyn FaceScanResultCallback>, directive: &Directive) {
    match directive {
        Directive::Advance(blob) => callback.proceed_to_next_step(blob.clone()),
        Directive::Abort => callback.cancel(),
    }
}

/// Helpers the capture engine's SDK exposes to integrators.
pub trait CaptureSdk: Send + Sync {
    /// Open a capture session on the engine, authenticated by `session_token`.
    fn start_session(&self, session_token: &str);
    /// User-agent string the backend expects for requests tied to `session_id`.
    fn api_user_agent(&self, session_id: &SessionId) -> String;
    /// Replace the message shown on the engine's success screen.
    fn set_result_screen_success_message(&self, message: &str);
}

/// Entry points the capture engine drives for one session.
#[async_trait]
pub trait FaceScanProcessor: Send {
    /// Handle the engine's terminal result. Returns the directive issued, or `None` when the
    /// backend exchange failed before a verdict existed.
    async fn deliver_result(
        &mut self,
        result: Arc<CaptureResult>,
        callback: Box<dyn FaceScanResultCallback>,
    ) -> Result<Option<Directive>, ContractViolation>;

    /// The engine has completely finished its own teardown.
    fn signal_done(&mut self) -> Result<(), ContractViolation>;
}
