// src/cli/seed.rs — Catalog import
//
// Expects a JSON document of the form
//   {"students": [Student, ...], "projects": [Project, ...]}
// Existing rows with the same id are replaced.

use std::path::Path;

use serde::Deserialize;
use serde_json::json;
use tracing::info;

use super::print_json;
use crate::core::types::{Project, Student};
use crate::memory::{self, SharedStore};

#[derive(Debug, Default, Deserialize)]
pub struct SeedData {
    #[serde(default)]
    pub students: Vec<Student>,
    #[serde(default)]
    pub projects: Vec<Project>,
}

pub fn load_seed_file(path: &Path) -> anyhow::Result<SeedData> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Cannot read {}: {e}", path.display()))?;
    Ok(serde_json::from_str(&content)?)
}

/// Write every student and project; returns (students, projects) written.
pub fn apply_seed(store: &SharedStore, data: &SeedData) -> anyhow::Result<(usize, usize)> {
    let store = memory::lock(store)?;
    for student in &data.students {
        store.upsert_student(student)?;
    }
    for project in &data.projects {
        store.upsert_project(project)?;
    }
    info!(
        "Seeded {} students and {} projects",
        data.students.len(),
        data.projects.len()
    );
    Ok((data.students.len(), data.projects.len()))
}

pub fn run_seed(store: &SharedStore, file: &str) -> anyhow::Result<()> {
    let data = load_seed_file(Path::new(file))?;
    let (students, projects) = apply_seed(store, &data)?;
    print_json(&json!({ "students": students, "projects": projects }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SEED: &str = r#"{
        "students": [{
            "id": "s1",
            "name": "Ada",
            "profile": {
                "skills": ["Rust"],
                "interests": ["compilers"],
                "preferred_specializations": ["Systems"]
            }
        }],
        "projects": [{
            "id": "p1",
            "title": "A tiny JIT",
            "abstract": "Compile bytecode to machine code at runtime.",
            "specialization": "Systems",
            "difficulty": "advanced",
            "approval_status": "approved"
        }]
    }"#;

    #[test]
    fn test_seed_round_trip_through_store() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SEED.as_bytes()).unwrap();

        let data = load_seed_file(file.path()).unwrap();
        let store = memory::shared(memory::in_memory().unwrap());
        assert_eq!(apply_seed(&store, &data).unwrap(), (1, 1));

        let guard = memory::lock(&store).unwrap();
        let student = guard.get_student("s1").unwrap().unwrap();
        assert_eq!(student.profile.unwrap().skills, vec!["Rust"]);
        let project = guard.get_project("p1").unwrap().unwrap();
        assert_eq!(project.abstract_text, "Compile bytecode to machine code at runtime.");
        assert!(project.tags.is_empty());
    }

    #[test]
    fn test_missing_file_is_an_error() {
        assert!(load_seed_file(Path::new("/nonexistent/seed.json")).is_err());
    }
}
