use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, error, info, warn, Instrument};

use super::client::{BackendClient, BackendError, EnrollmentRequest};
use super::domain::{CaptureResult, CaptureStatus, EnrollmentSession};
use super::engine::{issue, CaptureSdk, Directive, FaceScanProcessor, FaceScanResultCallback};
use super::gate;
use super::submission::SubmissionPayload;
use super::verdict;
use crate::telemetry;

pub type SuccessHandler = Box<dyn FnOnce(Arc<CaptureResult>) + Send>;
pub type ErrorHandler = Box<dyn FnOnce(SessionError) + Send>;

/// Failure reported to the caller through the error handler.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Session was not completed successfully, cancelling. Session Status: {status}")]
    NotCompleted { status: CaptureStatus },
    #[error("Unexpected API response, cancelling out.")]
    UnexpectedResponse,
    #[error(transparent)]
    Transport(#[from] BackendError),
}

impl SessionError {
    /// Recoverable errors leave the capture engine with an abort directive.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, SessionError::Transport(_))
    }
}

/// The capture engine broke its calling contract. Never routed through the caller handlers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContractViolation {
    #[error("capture engine signalled completion before delivering a result")]
    NoSessionResult,
    #[error("capture engine delivered a second result for the same session")]
    ResultAlreadyDelivered,
    #[error("capture engine signalled completion twice")]
    AlreadyDone,
}

/// Where a session sits in the two-phase handshake.
#[derive(Debug)]
pub enum SessionPhase {
    AwaitingResult,
    AwaitingCompletion(Arc<CaptureResult>),
    Done,
}

impl SessionPhase {
    pub fn label(&self) -> &'static str {
        match self {
            SessionPhase::AwaitingResult => "awaiting_result",
            SessionPhase::AwaitingCompletion(_) => "awaiting_completion",
            SessionPhase::Done => "done",
        }
    }
}

/// Tunables that do not change the handshake itself.
#[derive(Debug, Clone, Default)]
pub struct ProcessorOptions {
    /// Success-screen message used when the backend does not send one.
    pub success_message: Option<String>,
}

#[derive(Default)]
struct SessionHandlers {
    on_success: Option<SuccessHandler>,
    on_error: Option<ErrorHandler>,
    reported: bool,
}

impl SessionHandlers {
    fn succeed(&mut self, result: Arc<CaptureResult>) {
        if self.claim() {
            if let Some(handler) = self.on_success.take() {
                handler(result);
            }
        }
    }

    fn fail(&mut self, err: SessionError) {
        if self.claim() {
            if let Some(handler) = self.on_error.take() {
                handler(err);
            }
        }
    }

    // The first report wins and disarms both handlers.
    fn claim(&mut self) -> bool {
        if self.reported {
            debug!("session outcome already reported");
            return false;
        }
        self.reported = true;
        true
    }
}

/// Drives one enrollment attempt from capture result to caller notification.
pub struct EnrollmentProcessor<B, S> {
    session: EnrollmentSession,
    backend: Arc<B>,
    sdk: Arc<S>,
    options: ProcessorOptions,
    phase: SessionPhase,
    handlers: SessionHandlers,
}

impl<B, S> EnrollmentProcessor<B, S>
where
    B: BackendClient + 'static,
    S: CaptureSdk + 'static,
{
    pub fn new(session: EnrollmentSession, backend: Arc<B>, sdk: Arc<S>) -> Self {
        Self::with_options(session, backend, sdk, ProcessorOptions::default())
    }

    pub fn with_options(
        session: EnrollmentSession,
        backend: Arc<B>,
        sdk: Arc<S>,
        options: ProcessorOptions,
    ) -> Self {
        debug!(group = %session.group_name, "starting capture session");
        sdk.start_session(&session.session_token);
        Self {
            session,
            backend,
            sdk,
            options,
            phase: SessionPhase::AwaitingResult,
            handlers: SessionHandlers::default(),
        }
    }

    pub fn session(&self) -> &EnrollmentSession {
        &self.session
    }

    pub fn phase(&self) -> &SessionPhase {
        &self.phase
    }

    /// Whether the caller has already been told how the session ended.
    pub fn has_reported(&self) -> bool {
        self.handlers.reported
    }

    pub fn on_success<F>(&mut self, handler: F)
    where
        F: FnOnce(Arc<CaptureResult>) + Send + 'static,
    {
        self.handlers.on_success = Some(Box::new(handler));
    }

    pub fn on_error<F>(&mut self, handler: F)
    where
        F: FnOnce(SessionError) + Send + 'static,
    {
        self.handlers.on_error = Some(Box::new(handler));
    }

    fn abort(&mut self, callback: Box<dyn FaceScanResultCallback>, err: SessionError) -> Directive {
        let directive = Directive::Abort;
        issue(callback, &directive);
        warn!(error = %err, "enrollment aborted");
        self.handlers.fail(err);
        directive
    }

    fn advance(
        &mut self,
        callback: Box<dyn FaceScanResultCallback>,
        continuation: verdict::Continuation,
    ) -> Directive {
        let message = continuation
            .success_message
            .as_deref()
            .or(self.options.success_message.as_deref());
        if let Some(message) = message {
            self.sdk.set_result_screen_success_message(message);
        }

        let directive = Directive::Advance(continuation.scan_result_blob);
        issue(callback, &directive);
        info!("enrollment processed; capture engine advancing");
        directive
    }

    /// Gate, submit and interpret one result. `None` means no verdict was obtained.
    async fn submit(
        &mut self,
        result: Arc<CaptureResult>,
        callback: Box<dyn FaceScanResultCallback>,
    ) -> Option<Directive> {
        debug!("capture result received");

        let payload = match gate::admit(&result) {
            Ok(artifacts) => SubmissionPayload::build(&self.session, result.session_id(), artifacts),
            Err(err) => return Some(self.abort(callback, err)),
        };
        let request = EnrollmentRequest {
            user_agent: self.sdk.api_user_agent(result.session_id()),
            payload,
        };

        let body = match self.backend.enroll(&request).await {
            Ok(body) => body,
            Err(err) => {
                // No verdict exists, so the engine gets no directive and keeps waiting.
                warn!(
                    error = %err,
                    "enrollment exchange failed; capture engine left without a directive"
                );
                drop(callback);
                self.handlers.fail(SessionError::Transport(err));
                return None;
            }
        };

        let directive = match verdict::interpret(body) {
            Ok(continuation) => self.advance(callback, continuation),
            Err(err) => self.abort(callback, err),
        };
        Some(directive)
    }
}

#[async_trait]
impl<B, S> FaceScanProcessor for EnrollmentProcessor<B, S>
where
    B: BackendClient + 'static,
    S: CaptureSdk + 'static,
{
    async fn deliver_result(
        &mut self,
        result: Arc<CaptureResult>,
        callback: Box<dyn FaceScanResultCallback>,
    ) -> Result<Option<Directive>, ContractViolation> {
        if !matches!(self.phase, SessionPhase::AwaitingResult) {
            error!(
                phase = self.phase.label(),
                session_id = %result.session_id(),
                "capture result delivered twice"
            );
            return Err(ContractViolation::ResultAlreadyDelivered);
        }
        self.phase = SessionPhase::AwaitingCompletion(Arc::clone(&result));

        let span = telemetry::session_span(&self.session, &result);
        let directive = self.submit(result, callback).instrument(span).await;
        Ok(directive)
    }

    fn signal_done(&mut self) -> Result<(), ContractViolation> {
        let result = match std::mem::replace(&mut self.phase, SessionPhase::Done) {
            SessionPhase::AwaitingCompletion(result) => result,
            SessionPhase::AwaitingResult => {
                self.phase = SessionPhase::AwaitingResult;
                error!("completion signalled with no capture result stored");
                return Err(ContractViolation::NoSessionResult);
            }
            SessionPhase::Done => {
                error!("completion signalled twice");
                return Err(ContractViolation::AlreadyDone);
            }
        };

        if result.is_completely_done() {
            debug!(session_id = %result.session_id(), "capture engine completely done");
            self.handlers.succeed(result);
        } else {
            debug!(
                session_id = %result.session_id(),
                "capture engine finished without marking the result completely done"
            );
        }
        Ok(())
    }
}
