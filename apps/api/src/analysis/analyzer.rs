//! Analysis orchestration. Glues classifier, composer, model client,
//! extractor, and fallback into the two pipelines.
//!
//! Flow: classify sector → compose prompt → invoke model → map the outcome.
//! A degraded model serves the demo payload; a failed invocation or a
//! non-extractable response becomes an error envelope. These functions never
//! touch the database; persistence is the handlers' concern.

use tracing::{info, warn};

use crate::analysis::composer::{compose_ats_prompt, compose_job_match_prompt};
use crate::analysis::extractor::extract_json;
use crate::analysis::fallback;
use crate::analysis::result::{AnalysisKind, AnalysisResult};
use crate::analysis::sector::SectorClassifier;
use crate::model_client::{ModelClient, ModelOutcome};

/// Token budgets per analysis flavor. Job matching needs headroom for its
/// larger schema.
const ATS_MAX_TOKENS: u32 = 4000;
const JOB_MATCH_MAX_TOKENS: u32 = 4500;

/// Runs the ATS scoring pipeline over a resume.
pub async fn analyze_ats(
    client: &ModelClient,
    classifier: &SectorClassifier,
    resume_text: &str,
) -> AnalysisResult {
    let sector = classifier.classify(resume_text);
    info!("running ATS analysis (sector: {sector})");

    let profile = classifier.profile(sector);
    let prompt = compose_ats_prompt(profile, resume_text);

    finish(
        AnalysisKind::Ats,
        client.invoke(&prompt, ATS_MAX_TOKENS).await,
    )
}

/// Runs the job-match pipeline over a resume and a job description.
pub async fn match_job(
    client: &ModelClient,
    classifier: &SectorClassifier,
    resume_text: &str,
    job_description: &str,
) -> AnalysisResult {
    // Sector detection sees both texts; the posting usually dominates, but
    // the resume still contributes when the posting is sparse.
    let combined = format!("{job_description} {resume_text}");
    let sector = classifier.classify(&combined);
    info!("running job-match analysis (sector: {sector})");

    let profile = classifier.profile(sector);
    let prompt = compose_job_match_prompt(profile, resume_text, job_description);

    finish(
        AnalysisKind::JobMatch,
        client.invoke(&prompt, JOB_MATCH_MAX_TOKENS).await,
    )
}

/// Maps a model outcome onto the result envelope.
fn finish(kind: AnalysisKind, outcome: ModelOutcome) -> AnalysisResult {
    match outcome {
        ModelOutcome::Success { raw_text } => match extract_json(&raw_text) {
            Ok(fields) => AnalysisResult::parsed(fields),
            Err(e) => {
                warn!("model answered but no analysis object could be extracted");
                AnalysisResult::extraction_failed(
                    "JSON parse error: model output did not contain a valid analysis object",
                    e.raw_excerpt,
                )
            }
        },
        ModelOutcome::Degraded { reason } => {
            warn!("serving demo analysis: {}", reason.message());
            match kind {
                AnalysisKind::Ats => fallback::demo_ats(),
                AnalysisKind::JobMatch => fallback::demo_job_match(),
            }
        }
        ModelOutcome::Failure(error) => AnalysisResult::failed(error.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model_client::{DegradedReason, ModelError};

    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const RESUME: &str =
        "Software engineer with Rust, Python and Kubernetes experience. \
         Built APIs and CI/CD pipelines for cloud deployments.";

    async fn healthy_server_answering(content: &str) -> MockServer {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [ { "message": { "role": "assistant", "content": content } } ]
            })))
            .mount(&server)
            .await;

        server
    }

    #[tokio::test]
    async fn test_ats_pipeline_parses_model_json() {
        let answer = r#"Let me assess this resume.

{"overall_ats_score": 88, "section_analysis": {"skills": {"score": 91}}}"#;
        let server = healthy_server_answering(answer).await;

        let client = ModelClient::with_endpoint(server.uri(), "test-model".into());
        let classifier = SectorClassifier::new();
        let result = analyze_ats(&client, &classifier, RESUME).await;

        assert!(!result.is_failed());
        assert!(!result.fallback_mode);
        assert_eq!(result.score_any(&["/overall_ats_score"]), 88);
        assert_eq!(result.score_any(&["/section_analysis/skills/score"]), 91);
        assert!(result.raw_response.is_none(), "clean parses carry no excerpt");
    }

    #[tokio::test]
    async fn test_ats_pipeline_degrades_to_demo_when_unreachable() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = ModelClient::with_endpoint(format!("http://{addr}"), "test-model".into());
        let classifier = SectorClassifier::new();
        let result = analyze_ats(&client, &classifier, RESUME).await;

        assert!(result.fallback_mode);
        assert!(!result.is_failed());
        assert_eq!(result.score_any(&["/overall_score"]), 75);
        assert!(result.fields["strengths"].as_array().is_some_and(|s| !s.is_empty()));
    }

    #[tokio::test]
    async fn test_ats_pipeline_flags_unparseable_output() {
        let server = healthy_server_answering("I could not produce a score today.").await;

        let client = ModelClient::with_endpoint(server.uri(), "test-model".into());
        let classifier = SectorClassifier::new();
        let result = analyze_ats(&client, &classifier, RESUME).await;

        assert!(result.is_failed());
        assert!(!result.fallback_mode);
        assert_eq!(
            result.raw_response.as_deref(),
            Some("I could not produce a score today.")
        );
    }

    #[tokio::test]
    async fn test_job_match_pipeline_parses_match_score() {
        let answer = r#"{"overall_match_score": 72, "detailed_analysis": {"skills_analysis": {"technical_skills": {"matched": ["rust"], "missing": ["go"]}}}}"#;
        let server = healthy_server_answering(answer).await;

        let client = ModelClient::with_endpoint(server.uri(), "test-model".into());
        let classifier = SectorClassifier::new();
        let job = "Senior Rust Engineer\nWe need Rust, Go and Kubernetes.";
        let result = match_job(&client, &classifier, RESUME, job).await;

        assert!(!result.is_failed());
        assert_eq!(result.score_any(&["/overall_match_score"]), 72);
        assert_eq!(
            result
                .value_any(&["/detailed_analysis/skills_analysis/technical_skills/matched"])
                .unwrap(),
            json!(["rust"])
        );
    }

    #[test]
    fn test_success_with_clean_json_parses() {
        let outcome = ModelOutcome::Success {
            raw_text: r#"Reasoning done. {"overall_ats_score": 82} "#.to_string(),
        };
        let result = finish(AnalysisKind::Ats, outcome);
        assert!(!result.is_failed());
        assert!(!result.fallback_mode);
        assert_eq!(result.fields["overall_ats_score"], 82);
    }

    #[test]
    fn test_success_without_json_becomes_extraction_failure() {
        let outcome = ModelOutcome::Success {
            raw_text: "I am sorry, I cannot help with that.".to_string(),
        };
        let result = finish(AnalysisKind::Ats, outcome);
        assert!(result.is_failed());
        assert!(!result.fallback_mode, "extraction failure is not demo mode");
        assert_eq!(
            result.raw_response.as_deref(),
            Some("I am sorry, I cannot help with that.")
        );
    }

    #[test]
    fn test_degraded_serves_demo_ats() {
        let outcome = ModelOutcome::Degraded {
            reason: DegradedReason::ProbeConnectionFailed,
        };
        let result = finish(AnalysisKind::Ats, outcome);
        assert!(result.fallback_mode);
        assert_eq!(result.fields["sector"], "technology");
    }

    #[test]
    fn test_degraded_serves_demo_job_match() {
        let outcome = ModelOutcome::Degraded {
            reason: DegradedReason::ProbeTimeout,
        };
        let result = finish(AnalysisKind::JobMatch, outcome);
        assert!(result.fallback_mode);
        assert!(result.fields.contains_key("overall_match_score"));
    }

    #[test]
    fn test_failure_becomes_error_envelope() {
        let outcome = ModelOutcome::Failure(ModelError::Http {
            status: 503,
            body: "overloaded".to_string(),
        });
        let result = finish(AnalysisKind::Ats, outcome);
        assert!(result.is_failed());
        assert!(!result.fallback_mode);
        assert!(result.error.as_deref().unwrap().contains("503"));
        assert!(result.raw_response.is_none());
    }
}
