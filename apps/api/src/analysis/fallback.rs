//! Demo fallback results served when the model is unreachable.
//!
//! Hand-authored, deterministic payloads with plausible scores. They keep
//! the product demonstrable without a running model; `fallback_mode = true`
//! is the renderer's signal that no real inference happened.

use serde_json::{json, Map, Value};

use crate::analysis::result::AnalysisResult;

/// Fixed demo ATS analysis.
pub fn demo_ats() -> AnalysisResult {
    AnalysisResult::demo(object(json!({
        "overall_score": 75,
        "contact_score": 90,
        "summary_score": 70,
        "experience_score": 80,
        "education_score": 75,
        "skills_score": 85,
        "format_score": 85,
        "keyword_score": 70,
        "sector": "technology",
        "strengths": [
            "Clear work-history progression",
            "Relevant technical skills are listed",
            "Education details are complete",
            "Contact information is present and well formed"
        ],
        "improvements": [
            "Add more sector-specific keywords",
            "Quantify achievements with concrete numbers",
            "Add a short professional summary at the top",
            "Collect certifications in a dedicated section"
        ],
        "recommendations": [
            "Mirror wording from target job postings",
            "Keep formatting plain so ATS parsers stay happy",
            "Lead bullet points with action verbs",
            "Tailor the resume for every application"
        ]
    })))
}

/// Fixed demo job-match analysis.
pub fn demo_job_match() -> AnalysisResult {
    AnalysisResult::demo(object(json!({
        "overall_match_score": 78,
        "skills_match_score": 75,
        "experience_match_score": 80,
        "education_match_score": 85,
        "requirements_match_score": 70,
        "matching_skills": [
            "Problem solving",
            "Team collaboration",
            "Project delivery",
            "Written communication"
        ],
        "missing_skills": [
            "Leadership experience",
            "Sector-specific certifications",
            "Public speaking",
            "Budget ownership"
        ],
        "recommendations": [
            "Address the missing skills in a cover letter",
            "Highlight transferable experience for the gaps",
            "Add role-specific keywords from the posting",
            "Prepare concrete examples for the strong areas"
        ],
        "match_details": {
            "strong_points": [
                "Core competencies overlap with the posting",
                "Experience level fits the seniority band"
            ],
            "improvement_areas": [
                "Sector-specific tooling exposure",
                "Demonstrated leadership scope"
            ]
        }
    })))
}

fn object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => unreachable!("demo payloads are object literals, got {other}"),
    }
}
