use clap::Args;
use facescan_enroll::config::AppConfig;
use facescan_enroll::enrollment::{
    AuditImage, CaptureArtifacts, CaptureResult, CaptureSdk, CaptureStatus, Directive,
    EnrollmentProcessor, EnrollmentSession, FaceScan, FaceScanProcessor, FaceScanResultCallback,
    HttpBackendClient, ProcessorOptions, ScanResultBlob, SessionId,
};
use facescan_enroll::error::AppError;
use facescan_enroll::telemetry;
use std::sync::{Arc, Mutex};
use tracing::info;

#[derive(Args, Debug)]
pub(crate) struct SimulateArgs {
    /// Terminal status the simulated capture engine reports
    #[arg(long, default_value = "SessionCompletedSuccessfully", value_parser = parse_status)]
    pub(crate) status: CaptureStatus,
    /// Enrollment group the subject belongs to
    #[arg(long, default_value = "default-group")]
    pub(crate) group: String,
    /// External database reference for the subject (defaults to a random id)
    #[arg(long)]
    pub(crate) external_ref: Option<String>,
    /// Override the configured backend base URL
    #[arg(long)]
    pub(crate) base_url: Option<String>,
    /// Leave the result's completely-done flag unset when the engine finishes
    #[arg(long)]
    pub(crate) incomplete: bool,
}

fn parse_status(raw: &str) -> Result<CaptureStatus, String> {
    raw.parse::<CaptureStatus>().map_err(|err| err.to_string())
}

/// Capture engine helpers for a headless run.
struct ConsoleSdk;

impl CaptureSdk for ConsoleSdk {
    fn start_session(&self, session_token: &str) {
        println!("Capture engine: session opened with token {session_token}");
    }

    fn api_user_agent(&self, session_id: &SessionId) -> String {
        format!(
            "facescan-enroll-simulator/{} (session {session_id})",
            env!("CARGO_PKG_VERSION")
        )
    }

    fn set_result_screen_success_message(&self, message: &str) {
        println!("Result screen message: {message}");
    }
}

/// Capture engine side of the handshake; announces the directive it was given.
struct ConsoleCallback;

impl FaceScanResultCallback for ConsoleCallback {
    fn proceed_to_next_step(self: Box<Self>, scan_result_blob: ScanResultBlob) {
        println!(
            "Capture engine: proceeding with a {} byte continuation token",
            scan_result_blob.encoded_len()
        );
    }

    fn cancel(self: Box<Self>) {
        println!("Capture engine: session cancelled");
    }
}

fn simulated_result(status: CaptureStatus) -> Result<CaptureResult, AppError> {
    let session_id = SessionId(uuid::Uuid::new_v4().to_string());
    if !status.is_completed_successfully() {
        return Ok(CaptureResult::unsuccessful(session_id, status)?);
    }

    let artifacts = CaptureArtifacts::new(
        FaceScan("c2ltdWxhdGVkLWZhY2VzY2Fu".to_string()),
        vec![AuditImage("c2ltdWxhdGVkLWF1ZGl0".to_string())],
        vec![AuditImage("c2ltdWxhdGVkLWxvdw==".to_string())],
    )?;
    Ok(CaptureResult::completed(session_id, artifacts))
}

pub(crate) async fn run_simulation(args: SimulateArgs) -> Result<(), AppError> {
    let SimulateArgs {
        status,
        group,
        external_ref,
        base_url,
        incomplete,
    } = args;

    let mut config = AppConfig::load()?;
    if let Some(base_url) = base_url {
        config.backend.base_url = base_url.trim_end_matches('/').to_string();
    }
    telemetry::init(&config.telemetry)?;

    let external_ref = external_ref.unwrap_or_else(|| format!("ref-{}", uuid::Uuid::new_v4()));
    let session = EnrollmentSession::new(
        format!("simulated-token-{}", uuid::Uuid::new_v4().simple()),
        group,
        external_ref,
    );
    let backend = Arc::new(HttpBackendClient::from_config(&config.backend));
    let options = ProcessorOptions {
        success_message: config.backend.success_message.clone(),
    };
    let mut processor =
        EnrollmentProcessor::with_options(session, backend, Arc::new(ConsoleSdk), options);

    let outcome: Arc<Mutex<Option<String>>> = Arc::new(Mutex::new(None));
    let on_success = Arc::clone(&outcome);
    processor.on_success(move |result| {
        if let Ok(mut slot) = on_success.lock() {
            *slot = Some(format!("success for session {}", result.session_id()));
        }
    });
    let on_error = Arc::clone(&outcome);
    processor.on_error(move |err| {
        if let Ok(mut slot) = on_error.lock() {
            *slot = Some(format!("error: {err}"));
        }
    });

    println!("Enrollment simulation");
    println!("Backend: {}", config.backend.base_url);
    println!("Capture status: {status}");

    let result = Arc::new(simulated_result(status)?);
    let directive = processor
        .deliver_result(Arc::clone(&result), Box::new(ConsoleCallback))
        .await?;
    info!(directive = directive.as_ref().map(Directive::label), "result delivered");
    if directive.is_none() {
        println!("Directive: none issued; a real capture engine would still be waiting");
    }

    if !incomplete {
        result.mark_completely_done();
    }
    processor.signal_done()?;

    let reported = outcome.lock().ok().and_then(|slot| slot.clone());
    match reported {
        Some(message) => println!("Caller notified: {message}"),
        None => println!("Caller notified: nothing (result not completely done)"),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simulated_results_match_requested_status() {
        let result = simulated_result(CaptureStatus::Timeout).expect("timeout result");
        assert_eq!(result.status(), CaptureStatus::Timeout);
        assert!(result.artifacts().is_none());

        let result = simulated_result(CaptureStatus::SessionCompletedSuccessfully)
            .expect("successful result");
        assert!(result.artifacts().is_some());
    }

    #[test]
    fn status_argument_is_case_insensitive() {
        assert_eq!(parse_status("usercancelled"), Ok(CaptureStatus::UserCancelled));
        assert!(parse_status("bogus").is_err());
    }
}
