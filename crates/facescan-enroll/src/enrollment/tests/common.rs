use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;

use crate::enrollment::client::{BackendClient, BackendError, EnrollmentRequest};
use crate::enrollment::domain::{
    AuditImage, CaptureArtifacts, CaptureResult, CaptureStatus, EnrollmentSession, FaceScan,
    SessionId,
};
use crate::enrollment::engine::{CaptureSdk, Directive, FaceScanResultCallback};
use crate::enrollment::processor::{EnrollmentProcessor, ProcessorOptions, SessionError};
use crate::enrollment::ScanResultBlob;

pub(super) enum Reply {
    Body(Value),
    Malformed,
}

#[derive(Default)]
pub(super) struct ScriptedBackend {
    replies: Mutex<VecDeque<Reply>>,
    requests: Mutex<Vec<EnrollmentRequest>>,
}

impl ScriptedBackend {
    pub(super) fn replying(body: Value) -> Self {
        Self::with_reply(Reply::Body(body))
    }

    pub(super) fn malformed() -> Self {
        Self::with_reply(Reply::Malformed)
    }

    pub(super) fn with_reply(reply: Reply) -> Self {
        let backend = Self::default();
        backend
            .replies
            .lock()
            .expect("replies mutex")
            .push_back(reply);
        backend
    }

    pub(super) fn requests(&self) -> Vec<EnrollmentRequest> {
        self.requests.lock().expect("requests mutex").clone()
    }
}

#[async_trait]
impl BackendClient for ScriptedBackend {
    async fn enroll(&self, request: &EnrollmentRequest) -> Result<Value, BackendError> {
        self.requests
            .lock()
            .expect("requests mutex")
            .push(request.clone());
        let reply = self
            .replies
            .lock()
            .expect("replies mutex")
            .pop_front()
            .expect("backend called more often than scripted");

        match reply {
            Reply::Body(body) => Ok(body),
            Reply::Malformed => Err(BackendError::Decode {
                status: reqwest::StatusCode::OK,
                source: serde_json::from_str::<Value>("<html>busy</html>")
                    .expect_err("html is not json"),
            }),
        }
    }
}

#[derive(Default)]
pub(super) struct RecordingSdk {
    started: Mutex<Vec<String>>,
    messages: Mutex<Vec<String>>,
}

impl RecordingSdk {
    pub(super) fn started_tokens(&self) -> Vec<String> {
        self.started.lock().expect("started mutex").clone()
    }

    pub(super) fn messages(&self) -> Vec<String> {
        self.messages.lock().expect("messages mutex").clone()
    }
}

impl CaptureSdk for RecordingSdk {
    fn start_session(&self, session_token: &str) {
        self.started
            .lock()
            .expect("started mutex")
            .push(session_token.to_string());
    }

    fn api_user_agent(&self, session_id: &SessionId) -> String {
        format!("facescan-test/1.0 session/{session_id}")
    }

    fn set_result_screen_success_message(&self, message: &str) {
        self.messages
            .lock()
            .expect("messages mutex")
            .push(message.to_string());
    }
}

/// Fake capture engine side: records every directive it receives.
#[derive(Clone, Default)]
pub(super) struct EngineProbe {
    directives: Arc<Mutex<Vec<Directive>>>,
}

impl EngineProbe {
    pub(super) fn callback(&self) -> Box<dyn FaceScanResultCallback> {
        Box::new(ProbeCallback {
            directives: Arc::clone(&self.directives),
        })
    }

    pub(super) fn directives(&self) -> Vec<Directive> {
        self.directives.lock().expect("directives mutex").clone()
    }
}

struct ProbeCallback {
    directives: Arc<Mutex<Vec<Directive>>>,
}

impl FaceScanResultCallback for ProbeCallback {
    fn proceed_to_next_step(self: Box<Self>, scan_result_blob: ScanResultBlob) {
        self.directives
            .lock()
            .expect("directives mutex")
            .push(Directive::Advance(scan_result_blob));
    }

    fn cancel(self: Box<Self>) {
        self.directives
            .lock()
            .expect("directives mutex")
            .push(Directive::Abort);
    }
}

/// Caller side: records every handler invocation.
#[derive(Clone, Default)]
pub(super) struct CallerProbe {
    successes: Arc<Mutex<Vec<Arc<CaptureResult>>>>,
    errors: Arc<Mutex<Vec<SessionError>>>,
}

impl CallerProbe {
    pub(super) fn attach<B, S>(&self, processor: &mut EnrollmentProcessor<B, S>)
    where
        B: BackendClient + 'static,
        S: CaptureSdk + 'static,
    {
        let successes = Arc::clone(&self.successes);
        processor.on_success(move |result| {
            successes.lock().expect("successes mutex").push(result);
        });
        let errors = Arc::clone(&self.errors);
        processor.on_error(move |err| {
            errors.lock().expect("errors mutex").push(err);
        });
    }

    pub(super) fn success_count(&self) -> usize {
        self.successes.lock().expect("successes mutex").len()
    }

    pub(super) fn successes(&self) -> Vec<Arc<CaptureResult>> {
        self.successes.lock().expect("successes mutex").clone()
    }

    pub(super) fn error_count(&self) -> usize {
        self.errors.lock().expect("errors mutex").len()
    }

    pub(super) fn error_messages(&self) -> Vec<String> {
        self.errors
            .lock()
            .expect("errors mutex")
            .iter()
            .map(ToString::to_string)
            .collect()
    }

    pub(super) fn take_errors(&self) -> Vec<SessionError> {
        std::mem::take(&mut *self.errors.lock().expect("errors mutex"))
    }
}

pub(super) fn session() -> EnrollmentSession {
    EnrollmentSession::new("session-token-abc", "cohort-north", "subject-0042")
}

pub(super) fn completed_result(session_id: &str) -> Arc<CaptureResult> {
    let artifacts = CaptureArtifacts::new(
        FaceScan(format!("facescan-{session_id}")),
        vec![
            AuditImage(format!("audit-{session_id}-0")),
            AuditImage(format!("audit-{session_id}-1")),
        ],
        vec![AuditImage(format!("audit-low-{session_id}-0"))],
    )
    .expect("valid artifacts");
    Arc::new(CaptureResult::completed(
        SessionId(session_id.to_string()),
        artifacts,
    ))
}

pub(super) fn unsuccessful_result(session_id: &str, status: CaptureStatus) -> Arc<CaptureResult> {
    Arc::new(
        CaptureResult::unsuccessful(SessionId(session_id.to_string()), status)
            .expect("non-success status"),
    )
}

pub(super) fn processor(
    backend: &Arc<ScriptedBackend>,
    sdk: &Arc<RecordingSdk>,
) -> EnrollmentProcessor<ScriptedBackend, RecordingSdk> {
    EnrollmentProcessor::new(session(), Arc::clone(backend), Arc::clone(sdk))
}

pub(super) fn processor_with_message(
    backend: &Arc<ScriptedBackend>,
    sdk: &Arc<RecordingSdk>,
    message: &str,
) -> EnrollmentProcessor<ScriptedBackend, RecordingSdk> {
    EnrollmentProcessor::with_options(
        session(),
        Arc::clone(backend),
        Arc::clone(sdk),
        ProcessorOptions {
            success_message: Some(message.to_string()),
        },
    )
}
