use serde::{Deserialize, Serialize};

use super::domain::{AuditImage, CaptureArtifacts, EnrollmentSession, FaceScan, SessionId};

/// Body of an enrollment request, in the backend's field naming.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionPayload {
    pub face_scan: FaceScan,
    pub audit_trail_image: AuditImage,
    pub low_quality_audit_trail_image: AuditImage,
    pub session_id: SessionId,
    #[serde(rename = "externalDatabaseRefID")]
    pub external_database_ref_id: String,
    pub group_name: String,
}

impl SubmissionPayload {
    pub fn build(
        session: &EnrollmentSession,
        session_id: &SessionId,
        artifacts: &CaptureArtifacts,
    ) -> Self {
        Self {
            face_scan: artifacts.face_scan().clone(),
            audit_trail_image: artifacts.primary_audit_image().clone(),
            low_quality_audit_trail_image: artifacts.primary_low_quality_audit_image().clone(),
            session_id: session_id.clone(),
            external_database_ref_id: session.external_database_ref_id.clone(),
            group_name: session.group_name.clone(),
        }
    }

    /// Wire names of fields that are empty.
    pub fn empty_fields(&self) -> Vec<&'static str> {
        [
            ("faceScan", self.face_scan.0.is_empty()),
            ("auditTrailImage", self.audit_trail_image.0.is_empty()),
            (
                "lowQualityAuditTrailImage",
                self.low_quality_audit_trail_image.0.is_empty(),
            ),
            ("sessionId", self.session_id.0.is_empty()),
            (
                "externalDatabaseRefID",
                self.external_database_ref_id.is_empty(),
            ),
            ("groupName", self.group_name.is_empty()),
        ]
        .into_iter()
        .filter_map(|(name, empty)| empty.then_some(name))
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn artifacts() -> CaptureArtifacts {
        CaptureArtifacts::new(
            FaceScan("c2Nhbg==".to_string()),
            vec![
                AuditImage("primary".to_string()),
                AuditImage("secondary".to_string()),
            ],
            vec![AuditImage("primary-low".to_string())],
        )
        .expect("valid artifacts")
    }

    #[test]
    fn serializes_exactly_the_six_wire_fields() {
        let session = EnrollmentSession::new("token-1", "cohort-a", "subject-42");
        let payload = SubmissionPayload::build(&session, &SessionId("sid-9".to_string()), &artifacts());

        let value = serde_json::to_value(&payload).expect("payload serializes");
        assert_eq!(
            value,
            json!({
                "faceScan": "c2Nhbg==",
                "auditTrailImage": "primary",
                "lowQualityAuditTrailImage": "primary-low",
                "sessionId": "sid-9",
                "externalDatabaseRefID": "subject-42",
                "groupName": "cohort-a",
            })
        );
        assert!(payload.empty_fields().is_empty());
    }

    #[test]
    fn session_token_never_leaves_the_device() {
        let session = EnrollmentSession::new("secret-token", "cohort-a", "subject-42");
        let payload = SubmissionPayload::build(&session, &SessionId("sid-9".to_string()), &artifacts());
        let body = serde_json::to_string(&payload).expect("payload serializes");
        assert!(!body.contains("secret-token"));
    }

    #[test]
    fn reports_empty_caller_metadata() {
        let session = EnrollmentSession::new("token", "", "");
        let payload = SubmissionPayload::build(&session, &SessionId("sid".to_string()), &artifacts());
        assert_eq!(
            payload.empty_fields(),
            vec!["externalDatabaseRefID", "groupName"]
        );
    }
}
