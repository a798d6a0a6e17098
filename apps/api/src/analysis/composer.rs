//! Prompt composition: assembles the full analysis prompt from the static
//! templates in `prompts.rs`.
//!
//! Block order is fixed: sector role block, calibration examples, task
//! instruction with the output schema, all wrapped in the chain-of-thought
//! scaffold with the subject text appended. The subject text is included
//! verbatim and never truncated.

use crate::analysis::prompts::{
    ATS_FEW_SHOT, ATS_TASK_TEMPLATE, CHAIN_OF_THOUGHT_TEMPLATE, JOB_MATCH_FEW_SHOT,
    JOB_MATCH_TASK_TEMPLATE, SECTOR_ROLE_ATS_TEMPLATE, SECTOR_ROLE_JOB_MATCH_TEMPLATE,
};
use crate::analysis::sector::SectorProfile;

/// Builds the ATS scoring prompt for a resume.
pub fn compose_ats_prompt(profile: &SectorProfile, resume_text: &str) -> String {
    let base = [
        fill_role_block(SECTOR_ROLE_ATS_TEMPLATE, profile),
        ATS_FEW_SHOT.to_string(),
        ATS_TASK_TEMPLATE.replace("{sector}", profile.name),
    ]
    .join("\n\n");

    wrap_chain_of_thought(&base, resume_text)
}

/// Builds the job-match prompt. The subject block carries the job posting
/// first, then the resume, both labeled.
pub fn compose_job_match_prompt(
    profile: &SectorProfile,
    resume_text: &str,
    job_description: &str,
) -> String {
    let base = [
        fill_role_block(SECTOR_ROLE_JOB_MATCH_TEMPLATE, profile),
        JOB_MATCH_FEW_SHOT.to_string(),
        JOB_MATCH_TASK_TEMPLATE.replace("{sector}", profile.name),
    ]
    .join("\n\n");

    let context = format!("JOB DESCRIPTION:\n{job_description}\n\nRESUME:\n{resume_text}");
    wrap_chain_of_thought(&base, &context)
}

fn fill_role_block(template: &str, profile: &SectorProfile) -> String {
    template
        .replace("{role_prompt}", profile.role_prompt)
        .replace("{sector}", profile.name)
        .replace("{focus_areas}", &profile.focus_areas.join(", "))
}

fn wrap_chain_of_thought(base_prompt: &str, context: &str) -> String {
    CHAIN_OF_THOUGHT_TEMPLATE
        .replace("{base_prompt}", base_prompt)
        .replace("{context}", context)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::sector::SectorClassifier;

    const RESUME: &str = "Jane Doe\njane@example.com\nBackend engineer, 6 years of python.";

    #[test]
    fn test_ats_prompt_carries_all_blocks() {
        let classifier = SectorClassifier::new();
        let profile = classifier.profile("technology");
        let prompt = compose_ats_prompt(profile, RESUME);

        assert!(prompt.contains(profile.role_prompt), "role prompt present");
        assert!(prompt.contains("Sector: technology"), "sector named");
        assert!(prompt.contains("CALIBRATION EXAMPLES"), "few-shot present");
        assert!(
            prompt.contains("\"overall_ats_score\""),
            "schema template embedded"
        );
        assert!(prompt.contains("STEP 1"), "chain-of-thought steps present");
        assert!(prompt.contains("STEP 4"), "chain-of-thought steps present");
        assert!(prompt.contains(RESUME), "resume text included verbatim");
    }

    #[test]
    fn test_no_placeholder_survives_composition() {
        let classifier = SectorClassifier::new();
        let profile = classifier.profile("finance");
        for prompt in [
            compose_ats_prompt(profile, RESUME),
            compose_job_match_prompt(profile, RESUME, "Accountant role, IFRS required."),
        ] {
            for token in [
                "{role_prompt}",
                "{sector}",
                "{focus_areas}",
                "{base_prompt}",
                "{context}",
            ] {
                assert!(!prompt.contains(token), "unsubstituted token {token}");
            }
        }
    }

    #[test]
    fn test_job_match_prompt_carries_both_texts() {
        let classifier = SectorClassifier::new();
        let profile = classifier.profile("technology");
        let job = "Platform engineer. Kubernetes, terraform, on-call rotation.";
        let prompt = compose_job_match_prompt(profile, RESUME, job);

        assert!(prompt.contains("JOB DESCRIPTION:"));
        assert!(prompt.contains(job), "job description included verbatim");
        assert!(prompt.contains(RESUME), "resume included verbatim");
        assert!(prompt.contains("\"overall_match_score\""));
    }

    #[test]
    fn test_subject_text_with_braces_survives_verbatim() {
        let classifier = SectorClassifier::new();
        let profile = classifier.profile("general");
        let tricky = r#"Config sample: {"env": "prod", "region": "eu-1"}"#;
        let prompt = compose_ats_prompt(profile, tricky);
        assert!(prompt.contains(tricky));
    }

    #[test]
    fn test_composition_is_deterministic() {
        let classifier = SectorClassifier::new();
        let profile = classifier.profile("marketing");
        assert_eq!(
            compose_ats_prompt(profile, RESUME),
            compose_ats_prompt(profile, RESUME)
        );
    }
}
