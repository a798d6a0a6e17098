// All prompt constants for the analysis module. Templates carry named
// `{placeholder}` tokens; the composer substitutes them with `.replace()`
// chains and never does any other formatting.

/// Sector role block, ATS variant. Replace `{role_prompt}`, `{sector}` and
/// `{focus_areas}` before sending.
pub const SECTOR_ROLE_ATS_TEMPLATE: &str = r#"{role_prompt}

Sector: {sector}
Focus areas: {focus_areas}

Evaluate the resume against ATS (Applicant Tracking System) criteria:
1. Keyword optimization for {sector} roles
2. Format compatibility with automated resume screening
3. Density of sector-relevant keywords
4. Relevance of work experience to the sector
5. Alignment of technical and professional skills"#;

/// Sector role block, job-match variant. Same placeholders as the ATS one.
pub const SECTOR_ROLE_JOB_MATCH_TEMPLATE: &str = r#"{role_prompt}

Sector: {sector}
Focus areas: {focus_areas}

Evaluate how well the candidate matches the job posting:
1. Technical skill overlap with the job requirements
2. Experience fit for the role's seniority and scope
3. Education fit for the stated requirements
4. Sector-specific competencies
5. Growth potential in the role"#;

/// Two fixed calibration examples for ATS scoring: one strong resume, one
/// weak one. Sent verbatim, no placeholders.
pub const ATS_FEW_SHOT: &str = r#"CALIBRATION EXAMPLES:

Example 1 - strong technology resume:
Resume: "Senior Software Engineer, 8 years. Python, Django, React, AWS. Led a team of 5 engineers, cut deployment time 60% with CI/CD. AWS Solutions Architect certified."
Assessment: {"overall_ats_score": 88, "ats_compatibility": "excellent", "strengths": ["quantified achievements", "certifications listed", "dense relevant keywords"], "critical_weaknesses": ["no contact LinkedIn profile"]}

Example 2 - weak generic resume:
Resume: "Hard-working person looking for opportunities. Did various jobs. Good with people and computers."
Assessment: {"overall_ats_score": 25, "ats_compatibility": "poor", "strengths": [], "critical_weaknesses": ["no concrete skills", "no measurable results", "no sector keywords", "missing contact details"]}"#;

/// Two fixed calibration examples for job matching.
pub const JOB_MATCH_FEW_SHOT: &str = r#"CALIBRATION EXAMPLES:

Example 1 - strong match:
Job: "Backend developer, 5+ years Python, PostgreSQL, AWS." Resume: "6 years Python backend work, PostgreSQL tuning, AWS ECS deployments."
Assessment: {"overall_match_score": 92, "strengths_for_role": ["direct stack overlap", "seniority matches"], "gaps_and_concerns": []}

Example 2 - weak match:
Job: "Senior accountant, IFRS reporting, audit experience." Resume: "Junior graphic designer, 2 years, Adobe Creative Suite."
Assessment: {"overall_match_score": 12, "strengths_for_role": [], "gaps_and_concerns": ["no accounting experience", "no IFRS exposure", "seniority gap"]}"#;

/// ATS task instruction with the full output schema. Replace `{sector}`
/// before sending.
pub const ATS_TASK_TEMPLATE: &str = r#"Analyze the resume below for ATS compatibility in the {sector} sector.

Respond with a SINGLE valid JSON object following this exact schema. No markdown fences, no commentary, nothing outside the JSON object:
{
  "overall_ats_score": <0-100>,
  "ats_compatibility": "<excellent|good|average|poor>",
  "section_analysis": {
    "contact_info": {"score": <0-100>, "status": "<complete|incomplete>", "details": "<assessment>", "missing_elements": ["<missing item>"], "specific_improvements": ["<concrete fix>"]},
    "professional_summary": {"score": <0-100>, "status": "<strong|adequate|weak|missing>", "details": "<assessment>", "missing_elements": ["<missing item>"], "specific_improvements": ["<concrete fix>"]},
    "work_experience": {"score": <0-100>, "status": "<strong|adequate|weak>", "details": "<assessment>", "missing_elements": ["<missing item>"], "specific_improvements": ["<concrete fix>"]},
    "education": {"score": <0-100>, "status": "<complete|incomplete>", "details": "<assessment>", "missing_elements": ["<missing item>"], "specific_improvements": ["<concrete fix>"]},
    "skills": {"score": <0-100>, "status": "<strong|adequate|weak>", "details": "<assessment>", "missing_elements": ["<missing item>"], "specific_improvements": ["<concrete fix>"]}
  },
  "format_analysis": {"score": <0-100>, "ats_friendly": <true|false>, "issues": ["<format issue>"], "recommendations": ["<format fix>"]},
  "keyword_analysis": {"score": <0-100>, "sector_keywords_found": ["<keyword>"], "missing_keywords": ["<keyword>"], "keyword_density": "<assessment>"},
  "strengths": ["<strength>"],
  "critical_weaknesses": ["<weakness>"],
  "improvement_priority": {"high": ["<urgent fix>"], "medium": ["<worthwhile fix>"], "low": ["<nice to have>"]},
  "actionable_recommendations": {"immediate": ["<do today>"], "short_term": ["<within a month>"], "long_term": ["<within six months>"]},
  "industry_alignment": {"score": <0-100>, "assessment": "<fit summary>"},
  "success_metrics": {"interview_likelihood": "<low|medium|high>", "ats_pass_likelihood": "<low|medium|high>"}
}"#;

/// Job-match task instruction with the full output schema. Replace
/// `{sector}` before sending.
pub const JOB_MATCH_TASK_TEMPLATE: &str = r#"Compare the resume against the job description below for a {sector} sector role.

Respond with a SINGLE valid JSON object following this exact schema. No markdown fences, no commentary, nothing outside the JSON object:
{
  "overall_match_score": <0-100>,
  "detailed_analysis": {
    "skills_analysis": {
      "technical_skills": {"matched": ["<skill>"], "missing": ["<skill>"], "match_percentage": <0-100>, "critical_missing": ["<blocking skill>"], "transferable": ["<adjacent skill>"]},
      "soft_skills": {"matched": ["<skill>"], "missing": ["<skill>"], "match_percentage": <0-100>}
    },
    "experience_analysis": {"score": <0-100>, "relevant_experience": "<summary>", "experience_gaps": ["<gap>"], "years_fit": "<assessment>"},
    "education_analysis": {"score": <0-100>, "meets_requirements": <true|false>, "notes": "<assessment>"},
    "keyword_analysis": {"matched_keywords": ["<keyword>"], "missing_keywords": ["<keyword>"], "keyword_match_percentage": <0-100>}
  },
  "compatibility_scores": {"technical_compatibility": <0-100>, "experience_compatibility": <0-100>, "cultural_fit_indicators": <0-100>, "growth_potential": <0-100>, "immediate_impact_potential": <0-100>},
  "strengths_for_role": ["<strength>"],
  "gaps_and_concerns": ["<gap>"],
  "improvement_roadmap": {"immediate_actions": ["<action>"], "short_term_development": ["<action>"], "long_term_strategy": ["<action>"]},
  "application_strategy": {"cover_letter_focus": "<advice>", "interview_preparation": ["<topic>"], "salary_negotiation_position": "<weak|moderate|strong>"},
  "risk_assessment": {"rejection_risk": "<low|medium|high>", "main_risk_factors": ["<factor>"]}
}"#;

/// Chain-of-thought wrapper applied last. Replace `{base_prompt}` with the
/// assembled role + examples + task blocks and `{context}` with the subject
/// text.
pub const CHAIN_OF_THOUGHT_TEMPLATE: &str = r#"Work through these reasoning steps before producing the final JSON:

STEP 1 - First impression: what stands out on a first scan, and what would an ATS filter catch immediately?
STEP 2 - Detailed analysis: evaluate each section of the content against the criteria given below.
STEP 3 - Sector fit: weigh the evidence for and against fitness for the target sector.
STEP 4 - Recommendations: rank the most impactful improvements first.

Reason through the steps internally. Output ONLY the final JSON object.

{base_prompt}

Content to analyze:
{context}"#;
