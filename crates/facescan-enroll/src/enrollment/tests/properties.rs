use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::json;

use super::common::*;
use crate::enrollment::domain::CaptureStatus;
use crate::enrollment::engine::{Directive, FaceScanProcessor};

#[derive(Debug, Clone, Copy)]
enum Response {
    Processed,
    Rejected,
    MissingBlob,
    Malformed,
}

const RESPONSES: [Response; 4] = [
    Response::Processed,
    Response::Rejected,
    Response::MissingBlob,
    Response::Malformed,
];

fn reply_for(response: Response, index: usize) -> Reply {
    match response {
        Response::Processed => Reply::Body(json!({
            "wasProcessed": true,
            "scanResultBlob": format!("blob-{index}"),
        })),
        Response::Rejected => Reply::Body(json!({ "wasProcessed": false })),
        Response::MissingBlob => Reply::Body(json!({ "wasProcessed": true })),
        Response::Malformed => Reply::Malformed,
    }
}

#[tokio::test]
async fn every_session_reports_at_most_one_outcome() {
    let mut rng = StdRng::seed_from_u64(0x5eed_f00d);

    for index in 0..1000 {
        let status = if rng.gen_bool(0.5) {
            CaptureStatus::SessionCompletedSuccessfully
        } else {
            CaptureStatus::ALL[rng.gen_range(1..CaptureStatus::ALL.len())]
        };
        let response = RESPONSES[rng.gen_range(0..RESPONSES.len())];
        let completely_done = rng.gen_bool(0.8);

        let backend = Arc::new(ScriptedBackend::with_reply(reply_for(response, index)));
        let sdk = Arc::new(RecordingSdk::default());
        let engine = EngineProbe::default();
        let caller = CallerProbe::default();
        let mut processor = processor(&backend, &sdk);
        caller.attach(&mut processor);

        let session_id = format!("sid-{index}");
        let result = if status.is_completed_successfully() {
            completed_result(&session_id)
        } else {
            unsuccessful_result(&session_id, status)
        };

        let directive = processor
            .deliver_result(Arc::clone(&result), engine.callback())
            .await
            .expect("contract respected");
        if completely_done {
            result.mark_completely_done();
        }
        processor.signal_done().expect("completion accepted");

        let successes = caller.success_count();
        let errors = caller.error_count();
        let context = format!("session {index}: {status} / {response:?} / done={completely_done}");

        assert!(successes + errors <= 1, "{context}: both handlers fired");
        assert!(engine.directives().len() <= 1, "{context}: repeated directive");
        assert_eq!(
            directive.iter().cloned().collect::<Vec<_>>(),
            engine.directives(),
            "{context}: reported directive differs from issued one"
        );

        if !status.is_completed_successfully() {
            assert!(backend.requests().is_empty(), "{context}: backend contacted");
            assert_eq!(directive, Some(Directive::Abort), "{context}");
            assert_eq!(errors, 1, "{context}: gate rejection unreported");
            continue;
        }

        assert_eq!(backend.requests().len(), 1, "{context}");
        match response {
            Response::Processed => {
                assert!(
                    matches!(directive, Some(Directive::Advance(_))),
                    "{context}"
                );
                assert_eq!(errors, 0, "{context}");
                let expected = usize::from(completely_done);
                assert_eq!(successes, expected, "{context}");
            }
            Response::Rejected | Response::MissingBlob => {
                assert_eq!(directive, Some(Directive::Abort), "{context}");
                assert_eq!(errors, 1, "{context}");
            }
            Response::Malformed => {
                assert_eq!(directive, None, "{context}");
                assert_eq!(errors, 1, "{context}");
            }
        }
    }
}
