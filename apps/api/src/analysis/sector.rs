//! Sector classification: keyword-density detection of a resume's industry.
//!
//! Each sector carries a fixed keyword vocabulary. A text's density for a
//! sector is the count of whole-word keyword occurrences divided by the
//! vocabulary size; the highest density above [`DENSITY_THRESHOLD`] wins.
//! Profiles are scored in declared order and only a strictly greater density
//! replaces the current best, so ties resolve to the earlier profile.

use regex::Regex;

/// Minimum keyword density for a sector to beat the neutral default.
const DENSITY_THRESHOLD: f64 = 0.1;

/// Name of the neutral fallback sector.
pub const GENERAL_SECTOR: &str = "general";

// ────────────────────────────────────────────────────────────────────────────
// Profile table
// ────────────────────────────────────────────────────────────────────────────

/// One industry sector: its detection vocabulary and the persona the prompt
/// composer builds the evaluator from.
#[derive(Debug)]
pub struct SectorProfile {
    pub name: &'static str,
    pub keywords: &'static [&'static str],
    pub role_prompt: &'static str,
    pub focus_areas: &'static [&'static str],
}

/// Scored profiles, in declared order. The order is part of the contract:
/// density ties keep the earlier entry.
const PROFILES: &[SectorProfile] = &[
    SectorProfile {
        name: "technology",
        keywords: &[
            "python",
            "java",
            "javascript",
            "typescript",
            "react",
            "angular",
            "node.js",
            "sql",
            "nosql",
            "aws",
            "azure",
            "docker",
            "kubernetes",
            "git",
            "agile",
            "scrum",
            "devops",
            "api",
            "microservices",
            "cloud",
            "machine learning",
            "data science",
            "ai",
        ],
        role_prompt: "You are a CTO at a technology company with 15 years of experience. \
            You have reviewed thousands of engineering resumes and know exactly what \
            ATS filters and technical hiring managers look for.",
        focus_areas: &[
            "technical skills",
            "project experience",
            "certifications",
            "open-source profile",
        ],
    },
    SectorProfile {
        name: "finance",
        keywords: &[
            "excel",
            "sap",
            "oracle",
            "financial analysis",
            "accounting",
            "budgeting",
            "risk management",
            "audit",
            "tax",
            "banking",
            "insurance",
            "investment",
            "portfolio",
            "credit",
            "bloomberg",
            "reuters",
            "compliance",
            "treasury",
            "forecasting",
            "ifrs",
            "derivatives",
        ],
        role_prompt: "You are a senior HR manager in the finance industry with 15 years \
            of banking and investment hiring experience. You know what financial \
            institutions and their ATS screens demand from a resume.",
        focus_areas: &[
            "financial analysis",
            "regulatory knowledge",
            "analytical tools",
            "certifications",
        ],
    },
    SectorProfile {
        name: "healthcare",
        keywords: &[
            "patient",
            "clinical",
            "medical",
            "healthcare",
            "hospital",
            "nursing",
            "physician",
            "pharmacy",
            "diagnosis",
            "treatment",
            "surgery",
            "radiology",
            "laboratory",
            "patient care",
            "medical records",
            "hipaa",
            "emergency",
            "rehabilitation",
            "immunization",
            "telemedicine",
        ],
        role_prompt: "You are a healthcare human resources director with 15 years of \
            experience hiring clinical and administrative staff for hospitals and clinics.",
        focus_areas: &[
            "clinical experience",
            "patient care",
            "licenses and certifications",
            "regulatory compliance",
        ],
    },
    SectorProfile {
        name: "education",
        keywords: &[
            "teaching",
            "curriculum",
            "classroom",
            "pedagogy",
            "lesson planning",
            "student",
            "school",
            "university",
            "academic",
            "research",
            "publication",
            "assessment",
            "tutoring",
            "e-learning",
            "lms",
            "moodle",
            "instructional design",
            "faculty",
        ],
        role_prompt: "You are an education-sector HR specialist who has hired teachers, \
            faculty, and academic staff for 15 years.",
        focus_areas: &[
            "teaching experience",
            "curriculum development",
            "academic output",
            "student outcomes",
        ],
    },
    SectorProfile {
        name: "marketing",
        keywords: &[
            "marketing",
            "advertising",
            "social media",
            "seo",
            "sem",
            "google ads",
            "content marketing",
            "email marketing",
            "crm",
            "analytics",
            "brand",
            "campaign",
            "digital marketing",
            "influencer",
            "public relations",
            "copywriting",
            "market research",
            "conversion",
        ],
        role_prompt: "You are a marketing director with 15 years of experience building \
            digital marketing and brand teams, and you know what marketing recruiters \
            scan a resume for.",
        focus_areas: &[
            "campaign results",
            "digital channels",
            "analytics",
            "brand experience",
        ],
    },
    SectorProfile {
        name: "sales",
        keywords: &[
            "sales",
            "customer",
            "revenue",
            "quota",
            "pipeline",
            "lead generation",
            "prospecting",
            "negotiation",
            "closing",
            "b2b",
            "b2c",
            "retail",
            "wholesale",
            "account management",
            "business development",
            "crm",
            "upselling",
            "territory",
            "forecast",
            "partnership",
        ],
        role_prompt: "You are a sales organization HR leader with 15 years of experience \
            hiring quota-carrying sales and business development professionals.",
        focus_areas: &[
            "quota attainment",
            "pipeline management",
            "customer relationships",
            "negotiation",
        ],
    },
];

/// Neutral profile returned when no sector clears the density threshold.
/// Never scored itself.
static GENERAL: SectorProfile = SectorProfile {
    name: GENERAL_SECTOR,
    keywords: &[],
    role_prompt: "You are an experienced human resources specialist with broad, \
        cross-industry recruiting experience and deep knowledge of ATS screening.",
    focus_areas: &["work experience", "education", "skills", "achievements"],
};

// ────────────────────────────────────────────────────────────────────────────
// Classifier
// ────────────────────────────────────────────────────────────────────────────

struct CompiledProfile {
    profile: &'static SectorProfile,
    patterns: Vec<Regex>,
}

impl CompiledProfile {
    fn compile(profile: &'static SectorProfile) -> Self {
        let patterns = profile
            .keywords
            .iter()
            .map(|kw| {
                // Whole-word, case-insensitive. Multi-word keywords match as
                // phrases; "ai" must not match inside "said".
                Regex::new(&format!(r"(?i)\b{}\b", regex::escape(kw)))
                    .expect("static keyword compiles to a valid pattern")
            })
            .collect();
        Self { profile, patterns }
    }

    /// Total whole-word occurrences of this profile's keywords in `text`.
    /// Repeated occurrences count every time, matching how keyword-stuffed
    /// resumes are actually scored by ATS filters.
    fn hit_count(&self, text: &str) -> usize {
        self.patterns.iter().map(|p| p.find_iter(text).count()).sum()
    }

    fn density(&self, text: &str) -> f64 {
        if self.patterns.is_empty() {
            return 0.0;
        }
        self.hit_count(text) as f64 / self.patterns.len() as f64
    }
}

/// Keyword-density sector classifier. Compiles every keyword pattern once at
/// construction; `classify` is then a pure function of the text.
pub struct SectorClassifier {
    profiles: Vec<CompiledProfile>,
}

impl SectorClassifier {
    pub fn new() -> Self {
        Self::from_profiles(PROFILES)
    }

    fn from_profiles(profiles: &'static [SectorProfile]) -> Self {
        Self {
            profiles: profiles.iter().map(CompiledProfile::compile).collect(),
        }
    }

    /// Detects the dominant sector of `text`, or `general` when no profile's
    /// keyword density clears the threshold.
    pub fn classify(&self, text: &str) -> &'static str {
        let mut best: Option<(&'static str, f64)> = None;

        for compiled in &self.profiles {
            let density = compiled.density(text);
            match best {
                Some((_, best_density)) if density <= best_density => {}
                _ => best = Some((compiled.profile.name, density)),
            }
        }

        match best {
            Some((name, density)) if density > DENSITY_THRESHOLD => name,
            _ => GENERAL_SECTOR,
        }
    }

    /// Profile lookup for prompt composition. Unknown names resolve to the
    /// neutral profile.
    pub fn profile(&self, name: &str) -> &'static SectorProfile {
        self.profiles
            .iter()
            .map(|c| c.profile)
            .find(|p| p.name == name)
            .unwrap_or(&GENERAL)
    }
}

impl Default for SectorClassifier {
    fn default() -> Self {
        Self::new()
    }
}
