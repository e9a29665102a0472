// src/core/reasoning.rs — Human-readable reasoning for suggestions

use std::collections::HashSet;

use super::types::{ProfileSnapshot, Project, ProjectSuggestion, StudentProfile};
use crate::learner::types::FeedbackAdjustment;
use crate::provider::text::ProcessedText;

/// Does `needle` appear in the text? Single words must match a whole token;
/// phrases fall back to a substring check.
fn mentions(tokens: &HashSet<String>, lower_text: &str, needle: &str) -> bool {
    let needle = needle.trim().to_lowercase();
    if needle.is_empty() {
        return false;
    }
    if needle.contains(char::is_whitespace) {
        lower_text.contains(&needle)
    } else {
        tokens.contains(&needle)
    }
}

fn in_list(list: &[String], needle: &str) -> bool {
    list.iter().any(|item| item.trim().eq_ignore_ascii_case(needle.trim()))
}

struct ProjectText {
    tokens: HashSet<String>,
    lower: String,
}

impl ProjectText {
    fn of(project: &Project) -> Self {
        let processed =
            ProcessedText::from_text(format!("{} {}", project.title, project.abstract_text));
        Self {
            lower: processed.text.to_lowercase(),
            tokens: processed.tokens.into_iter().collect(),
        }
    }
}

/// Student skills found in the project's stack, tags or description.
pub fn matching_skills(profile: &StudentProfile, project: &Project) -> Vec<String> {
    let text = ProjectText::of(project);
    profile
        .skills
        .iter()
        .filter(|skill| {
            in_list(&project.technology_stack, skill)
                || in_list(&project.tags, skill)
                || mentions(&text.tokens, &text.lower, skill)
        })
        .cloned()
        .collect()
}

/// Student interests found in the project's tags, specialization or description.
pub fn matching_interests(profile: &StudentProfile, project: &Project) -> Vec<String> {
    let text = ProjectText::of(project);
    profile
        .interests
        .iter()
        .filter(|interest| {
            in_list(&project.tags, interest)
                || project.specialization.eq_ignore_ascii_case(interest.trim())
                || mentions(&text.tokens, &text.lower, interest)
        })
        .cloned()
        .collect()
}

pub fn specialization_match(specializations: &[String], specialization: &str) -> bool {
    in_list(specializations, specialization)
}

fn strength(similarity: f32) -> &'static str {
    match similarity {
        s if s >= 0.8 => "Strong",
        s if s >= 0.6 => "Good",
        s if s >= 0.4 => "Moderate",
        _ => "Weak",
    }
}

fn preview(items: &[String]) -> String {
    match items.len() {
        0 => String::new(),
        1..=3 => items.join(", "),
        n => format!("{} and {} more", items[..3].join(", "), n - 3),
    }
}

/// One or two sentences per suggestion.
pub fn suggestion_reasoning(
    project: &Project,
    similarity: f32,
    skills: &[String],
    interests: &[String],
    specialization_aligned: bool,
    adjustment: &FeedbackAdjustment,
) -> String {
    let mut parts = vec![format!(
        "{} semantic match with your profile ({:.0}%).",
        strength(similarity),
        similarity * 100.0
    )];

    if !skills.is_empty() {
        parts.push(format!("Uses your skills: {}.", preview(skills)));
    }
    if !interests.is_empty() {
        parts.push(format!("Relates to your interests: {}.", preview(interests)));
    }
    if specialization_aligned {
        parts.push(format!(
            "Falls within your preferred specialization {}.",
            project.specialization
        ));
    }

    if adjustment.boosts(&project.specialization) {
        parts.push(format!(
            "You have responded positively to {} projects before.",
            project.specialization
        ));
    } else if adjustment.penalizes(&project.specialization) {
        parts.push(format!(
            "Ranked lower because of your earlier negative feedback on {} projects.",
            project.specialization
        ));
    }

    parts.join(" ")
}

/// Summary line for a whole result.
pub fn overall_reasoning(
    suggestions: &[ProjectSuggestion],
    total_candidates: usize,
    adjustment: &FeedbackAdjustment,
    diversity_applied: bool,
) -> String {
    if suggestions.is_empty() {
        return format!(
            "None of the {total_candidates} approved projects reached the similarity threshold for your profile."
        );
    }

    let mut specializations: Vec<&str> = Vec::new();
    for s in suggestions {
        if !specializations.contains(&s.specialization.as_str()) {
            specializations.push(&s.specialization);
        }
    }

    let mut text = format!(
        "Selected {} of {} approved projects by similarity to your skills and interests, covering {}.",
        suggestions.len(),
        total_candidates,
        specializations.join(", ")
    );
    if !adjustment.is_neutral() {
        text.push_str(" Rankings reflect your previous feedback.");
    }
    if diversity_applied {
        text.push_str(" Less represented specializations were given a small boost.");
    }
    text
}

/// Profile gaps worth fixing, judged against one suggestion.
pub fn improvement_suggestions(
    snapshot: &ProfileSnapshot,
    suggestion: &ProjectSuggestion,
) -> Vec<String> {
    let mut out = Vec::new();
    if suggestion.matching_skills.is_empty() {
        out.push("Add more technical skills to your profile to improve skill matching.".to_string());
    }
    if suggestion.matching_interests.is_empty() {
        out.push("Describe more of your interests so projects can be matched to them.".to_string());
    }
    if !specialization_match(&snapshot.specializations, &suggestion.specialization) {
        out.push(format!(
            "Add {} to your preferred specializations if this area appeals to you.",
            suggestion.specialization
        ));
    }
    if snapshot.completeness < 100.0 {
        out.push(format!(
            "Your profile is {:.0}% complete; a bio and career goals help produce better matches.",
            snapshot.completeness
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{ApprovalStatus, Difficulty};

    fn project() -> Project {
        Project {
            id: "p1".into(),
            title: "Realtime anomaly detection".into(),
            abstract_text: "Stream processing with machine learning for sensor data.".into(),
            specialization: "AI/ML".into(),
            difficulty: Difficulty::Advanced,
            tags: vec!["IoT".into()],
            technology_stack: vec!["Python".into(), "Kafka".into()],
            approval_status: ApprovalStatus::Approved,
        }
    }

    fn profile() -> StudentProfile {
        StudentProfile {
            skills: vec!["python".into(), "Java".into(), "Kafka".into()],
            interests: vec!["machine learning".into(), "iot".into(), "games".into()],
            preferred_specializations: vec!["AI/ML".into()],
            bio: None,
            career_goals: None,
        }
    }

    #[test]
    fn test_matching_is_case_insensitive() {
        assert_eq!(matching_skills(&profile(), &project()), vec!["python", "Kafka"]);
        assert_eq!(
            matching_interests(&profile(), &project()),
            vec!["machine learning", "iot"]
        );
    }

    #[test]
    fn test_single_words_match_whole_tokens() {
        let mut p = project();
        p.technology_stack.clear();
        p.abstract_text = "A javascript dashboard.".into();
        let student = StudentProfile {
            skills: vec!["java".into()],
            ..profile()
        };
        assert!(matching_skills(&student, &p).is_empty());
    }

    #[test]
    fn test_reasoning_mentions_feedback_history() {
        let adjustment = FeedbackAdjustment {
            boost_specializations: ["AI/ML".to_string()].into(),
            ..Default::default()
        };
        let text = suggestion_reasoning(
            &project(),
            0.82,
            &["Python".into()],
            &[],
            true,
            &adjustment,
        );
        assert!(text.starts_with("Strong semantic match"));
        assert!(text.contains("Uses your skills: Python."));
        assert!(text.contains("preferred specialization AI/ML"));
        assert!(text.contains("responded positively to AI/ML"));
    }

    #[test]
    fn test_improvements_flag_missing_skills() {
        let snapshot = profile().snapshot();
        let suggestion = ProjectSuggestion {
            project_id: "p1".into(),
            title: "t".into(),
            specialization: "Security".into(),
            difficulty: Difficulty::Beginner,
            final_score: 0.5,
            similarity_score: 0.5,
            feedback_adjustment: 0.0,
            diversity_bonus: 0.0,
            matching_skills: vec![],
            matching_interests: vec!["iot".into()],
            reasoning: String::new(),
            diversity_boost: false,
        };
        let tips = improvement_suggestions(&snapshot, &suggestion);
        assert!(tips[0].starts_with("Add more technical skills"));
        assert!(tips.iter().any(|t| t.contains("Security")));
        assert!(tips.iter().any(|t| t.contains("60% complete")));
    }

    #[test]
    fn test_overall_reasoning_empty() {
        let text = overall_reasoning(&[], 7, &FeedbackAdjustment::default(), false);
        assert!(text.contains("None of the 7"));
    }
}
