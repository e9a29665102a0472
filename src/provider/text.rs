// src/provider/text.rs — Text representations of profiles and projects

use serde::{Deserialize, Serialize};

use crate::core::types::{Project, StudentProfile};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProcessedText {
    pub text: String,
    pub tokens: Vec<String>,
    pub word_count: usize,
    pub character_count: usize,
}

impl ProcessedText {
    pub fn from_text(text: String) -> Self {
        let tokens: Vec<String> = text
            .split(|c: char| !c.is_alphanumeric() && c != '+' && c != '#')
            .filter(|t| !t.is_empty())
            .map(|t| t.to_lowercase())
            .collect();
        Self {
            word_count: text.split_whitespace().count(),
            character_count: text.chars().count(),
            tokens,
            text,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProcessedDocument {
    pub combined: ProcessedText,
}

/// Builds the text that gets embedded for each side of a match.
pub trait TextProcessor: Send + Sync {
    fn process_student_profile(&self, profile: &StudentProfile) -> ProcessedDocument;
    fn process_project(&self, project: &Project) -> ProcessedDocument;
}

/// Labelled-section concatenation. Good enough for sentence-embedding models,
/// which do their own tokenization.
#[derive(Debug, Default, Clone, Copy)]
pub struct BasicTextProcessor;

fn section(out: &mut Vec<String>, label: &str, items: &[String]) {
    let items: Vec<&str> = items
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect();
    if !items.is_empty() {
        out.push(format!("{label}: {}.", items.join(", ")));
    }
}

impl TextProcessor for BasicTextProcessor {
    fn process_student_profile(&self, profile: &StudentProfile) -> ProcessedDocument {
        let mut parts = Vec::new();
        section(&mut parts, "Skills", &profile.skills);
        section(&mut parts, "Interests", &profile.interests);
        section(
            &mut parts,
            "Preferred specializations",
            &profile.preferred_specializations,
        );
        if let Some(bio) = profile.bio.as_deref().filter(|b| !b.trim().is_empty()) {
            parts.push(bio.trim().to_string());
        }
        if let Some(goals) = profile
            .career_goals
            .as_deref()
            .filter(|g| !g.trim().is_empty())
        {
            parts.push(format!("Career goals: {}", goals.trim()));
        }
        ProcessedDocument {
            combined: ProcessedText::from_text(parts.join(" ")),
        }
    }

    fn process_project(&self, project: &Project) -> ProcessedDocument {
        let mut parts = vec![format!("{}.", project.title.trim())];
        if !project.abstract_text.trim().is_empty() {
            parts.push(project.abstract_text.trim().to_string());
        }
        parts.push(format!("Specialization: {}.", project.specialization));
        section(&mut parts, "Technologies", &project.technology_stack);
        section(&mut parts, "Tags", &project.tags);
        ProcessedDocument {
            combined: ProcessedText::from_text(parts.join(" ")),
        }
    }
}
