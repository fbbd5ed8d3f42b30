//! Resume field extraction.

use lazy_static::lazy_static;

use super::rules::{
    Cascade, FieldExtractor, Rule, Selection, CONTACT_MARKER, EMAIL, PHONE_AREA_CODE, PHONE_PLAIN,
};
use super::text::{char_len, head_lines, title_case};
use crate::models::record::{EducationEntry, ExperienceEntry, ResumeRecord};

const NAME_SCAN_LINES: usize = 3;
const MAX_SECTION_ENTRIES: usize = 5;

const EDUCATION_KEYWORDS: &[&str] = &[
    "university",
    "college",
    "degree",
    "bachelor",
    "master",
    "phd",
    "education",
];

const EXPERIENCE_KEYWORDS: &[&str] = &["experience", "work", "employment", "job", "position"];

/// Skills reported by the extractor; nothing outside this list is emitted.
pub const SKILL_VOCABULARY: &[&str] = &[
    "python",
    "java",
    "javascript",
    "react",
    "django",
    "sql",
    "html",
    "css",
];

lazy_static! {
    static ref EMAIL_ADDRESS: Cascade =
        Cascade::new(vec![Rule::new("email", &EMAIL, 0)], Selection::First);

    static ref PHONE: Cascade = Cascade::new(
        vec![
            Rule::new("plain", &PHONE_PLAIN, 0),
            Rule::new("area_code", &PHONE_AREA_CODE, 0),
        ],
        Selection::First,
    );
}

/// Resume field extractor.
pub struct ResumeExtractor;

impl ResumeExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Run every resume field extractor over `text`.
    pub fn extract(&self, text: &str) -> ResumeRecord {
        ResumeRecord {
            name: extract_name(text),
            email: extract_email(text),
            phone: extract_phone(text),
            education: extract_education(text),
            experience: extract_experience(text),
            skills: extract_skills(text),
            entities: None,
        }
    }
}

impl Default for ResumeExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// First of the top lines that looks like a name rather than contact info.
pub fn extract_name(text: &str) -> Option<String> {
    head_lines(text, NAME_SCAN_LINES)
        .find(|line| {
            let len = char_len(line.trim());
            len > 5 && len < 50 && !CONTACT_MARKER.is_match(line)
        })
        .map(|line| line.trim().to_string())
}

pub fn extract_email(text: &str) -> Option<String> {
    EMAIL_ADDRESS.extract(text)
}

pub fn extract_phone(text: &str) -> Option<String> {
    PHONE.extract(text)
}

pub fn extract_education(text: &str) -> Vec<EducationEntry> {
    keyword_lines(text, EDUCATION_KEYWORDS)
        .map(|line| EducationEntry {
            institution: line.to_string(),
        })
        .collect()
}

pub fn extract_experience(text: &str) -> Vec<ExperienceEntry> {
    keyword_lines(text, EXPERIENCE_KEYWORDS)
        .map(|line| ExperienceEntry {
            position: line.to_string(),
        })
        .collect()
}

/// Vocabulary skills mentioned anywhere in the text, title-cased, in
/// vocabulary order.
pub fn extract_skills(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    SKILL_VOCABULARY
        .iter()
        .filter(|skill| lower.contains(*skill))
        .map(|skill| title_case(skill))
        .collect()
}

/// Trimmed lines mentioning any of `keywords`, capped per section.
fn keyword_lines<'t>(
    text: &'t str,
    keywords: &'static [&'static str],
) -> impl Iterator<Item = &'t str> {
    text.lines()
        .filter(move |line| {
            let lower = line.to_lowercase();
            keywords.iter().any(|k| lower.contains(k))
        })
        .map(str::trim)
        .take(MAX_SECTION_ENTRIES)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_email() {
        assert_eq!(
            extract_email("Contact: jane.doe@example.com for info"),
            Some("jane.doe@example.com".to_string())
        );
        assert_eq!(extract_email("no address"), None);
    }

    #[test]
    fn test_phone_shapes() {
        assert_eq!(extract_phone("Call 555-123-4567"), Some("555-123-4567".to_string()));
        assert_eq!(extract_phone("Call (555) 123-4567"), Some("(555) 123-4567".to_string()));
    }

    #[test]
    fn test_name_skips_contact_lines() {
        let text = "jane@example.com\nJane Doe\nSoftware Engineer";
        assert_eq!(extract_name(text), Some("Jane Doe".to_string()));
    }

    #[test]
    fn test_name_length_bounds() {
        // "Ann" is too short, the third line is too long
        let text = format!("Ann\nPhone: 555\n{}", "x".repeat(60));
        assert_eq!(extract_name(&text), None);
    }

    #[test]
    fn test_education_and_experience() {
        let text = "EDUCATION\n\
                    BSc, State University\n\
                    Work Experience\n\
                    Backend developer position at Acme\n";

        let education = extract_education(text);
        assert_eq!(
            education.iter().map(|e| e.institution.as_str()).collect::<Vec<_>>(),
            vec!["EDUCATION", "BSc, State University"]
        );

        let experience = extract_experience(text);
        assert_eq!(
            experience.iter().map(|e| e.position.as_str()).collect::<Vec<_>>(),
            vec!["Work Experience", "Backend developer position at Acme"]
        );
    }

    #[test]
    fn test_section_entries_capped() {
        let text = "college\n".repeat(8);
        assert_eq!(extract_education(&text).len(), 5);
    }

    #[test]
    fn test_skills_vocabulary_bounded() {
        let text = "Skills: Python, Rust, Kubernetes, SQL, react";
        assert_eq!(extract_skills(text), vec!["Python", "React", "Sql"]);
    }

    #[test]
    fn test_skills_substring_matches() {
        // "javascript" also contains "java"
        assert_eq!(extract_skills("JavaScript"), vec!["Java", "Javascript"]);
    }

    #[test]
    fn test_empty_text() {
        assert_eq!(ResumeExtractor::new().extract(""), ResumeRecord::default());
    }
}
