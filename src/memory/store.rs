// src/memory/store.rs — SQLite operations

use anyhow::Context;
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction, TransactionBehavior};

use crate::core::types::{
    ApprovalStatus, Difficulty, FeedbackType, Project, Recommendation, RecommendationFeedback,
    RecommendationStatus, Student, StudentProfile,
};

/// Candidate filters applied on top of the approval check.
#[derive(Debug, Clone, Default)]
pub struct ProjectFilter {
    pub include_specializations: Vec<String>,
    pub exclude_specializations: Vec<String>,
    pub max_difficulty: Option<Difficulty>,
}

impl ProjectFilter {
    pub fn admits(&self, project: &Project) -> bool {
        let spec = project.specialization.as_str();
        if !self.include_specializations.is_empty()
            && !self
                .include_specializations
                .iter()
                .any(|s| s.eq_ignore_ascii_case(spec))
        {
            return false;
        }
        if self
            .exclude_specializations
            .iter()
            .any(|s| s.eq_ignore_ascii_case(spec))
        {
            return false;
        }
        match self.max_difficulty {
            Some(max) => project.difficulty <= max,
            None => true,
        }
    }
}

/// A feedback row joined to the project it refers to.
#[derive(Debug, Clone)]
pub struct StudentFeedbackRow {
    pub feedback: RecommendationFeedback,
    pub specialization: String,
    pub difficulty: Difficulty,
    pub tags: Vec<String>,
    pub technology_stack: Vec<String>,
}

/// Low-level SQLite operations for all data types.
pub struct Store {
    conn: Connection,
}

pub(crate) fn timestamp(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(raw: &str) -> anyhow::Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(raw)
        .with_context(|| format!("bad timestamp '{raw}'"))?
        .with_timezone(&Utc))
}

fn parse_enum<T: std::str::FromStr<Err = String>>(raw: &str) -> anyhow::Result<T> {
    raw.parse::<T>().map_err(anyhow::Error::msg)
}

fn string_list(raw: &str) -> anyhow::Result<Vec<String>> {
    Ok(serde_json::from_str(raw)?)
}

// Raw column tuples; decoding JSON/enum columns happens outside the row closure.
type RawProject = (String, String, String, String, String, String, String, String);
type RawRecommendation = (String, String, String, String, String, f64, String);
type RawFeedback = (
    String,
    String,
    String,
    String,
    Option<f64>,
    Option<f64>,
    Option<String>,
    bool,
    String,
    Option<String>,
);

const PROJECT_COLUMNS: &str =
    "id, title, abstract, specialization, difficulty, tags, technology_stack, approval_status";
const RECOMMENDATION_COLUMNS: &str = "id, student_id, profile_snapshot, project_suggestions, \
     status, average_similarity_score, created_at";
const FEEDBACK_COLUMNS: &str = "f.id, f.recommendation_id, f.project_id, f.feedback_type, \
     f.rating, f.implicit_rating, f.comment, f.is_implicit, f.created_at, f.source_feedback_id";

fn raw_project(row: &Row<'_>) -> rusqlite::Result<RawProject> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
        row.get(7)?,
    ))
}

fn decode_project(raw: RawProject) -> anyhow::Result<Project> {
    let (id, title, abstract_text, specialization, difficulty, tags, tech, status) = raw;
    Ok(Project {
        id,
        title,
        abstract_text,
        specialization,
        difficulty: parse_enum::<Difficulty>(&difficulty)?,
        tags: string_list(&tags)?,
        technology_stack: string_list(&tech)?,
        approval_status: parse_enum::<ApprovalStatus>(&status)?,
    })
}

fn raw_recommendation(row: &Row<'_>) -> rusqlite::Result<RawRecommendation> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
    ))
}

fn decode_recommendation(raw: RawRecommendation) -> anyhow::Result<Recommendation> {
    let (id, student_id, snapshot, suggestions, status, avg, created_at) = raw;
    Ok(Recommendation {
        profile_snapshot: serde_json::from_str(&snapshot)
            .with_context(|| format!("profile snapshot of recommendation {id}"))?,
        project_suggestions: serde_json::from_str(&suggestions)
            .with_context(|| format!("suggestions of recommendation {id}"))?,
        status: parse_enum::<RecommendationStatus>(&status)?,
        average_similarity_score: avg as f32,
        created_at: parse_timestamp(&created_at)?,
        id,
        student_id,
    })
}

fn raw_feedback(row: &Row<'_>) -> rusqlite::Result<RawFeedback> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
        row.get(7)?,
        row.get(8)?,
        row.get(9)?,
    ))
}

fn decode_feedback(raw: RawFeedback) -> anyhow::Result<RecommendationFeedback> {
    let (id, recommendation_id, project_id, ftype, rating, implicit, comment, is_implicit, at, source) =
        raw;
    Ok(RecommendationFeedback {
        id,
        recommendation_id,
        project_id,
        feedback_type: parse_enum::<FeedbackType>(&ftype)?,
        rating,
        implicit_rating: implicit,
        comment,
        is_implicit,
        created_at: parse_timestamp(&at)?,
        source_feedback_id: source,
    })
}

fn collect<R, T>(
    rows: impl Iterator<Item = rusqlite::Result<R>>,
    decode: impl Fn(R) -> anyhow::Result<T>,
) -> anyhow::Result<Vec<T>> {
    let mut result = Vec::new();
    for row in rows {
        result.push(decode(row?)?);
    }
    Ok(result)
}

impl Store {
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    /// Raw connection access (tests and diagnostics).
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    // -- Students --

    pub fn upsert_student(&self, student: &Student) -> anyhow::Result<()> {
        let profile = student
            .profile
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;
        self.conn.execute(
            "INSERT INTO students (id, name, profile, updated_at) VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(id) DO UPDATE SET name = ?2, profile = ?3, updated_at = ?4",
            params![student.id, student.name, profile, timestamp(&Utc::now())],
        )?;
        Ok(())
    }

    pub fn get_student(&self, id: &str) -> anyhow::Result<Option<Student>> {
        let raw: Option<(String, String, Option<String>)> = self
            .conn
            .query_row(
                "SELECT id, name, profile FROM students WHERE id = ?1",
                params![id],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .optional()?;

        let Some((id, name, profile)) = raw else {
            return Ok(None);
        };
        let profile: Option<StudentProfile> = match profile {
            Some(json) => Some(serde_json::from_str(&json)?),
            None => None,
        };
        Ok(Some(Student { id, name, profile }))
    }

    // -- Projects --

    pub fn upsert_project(&self, project: &Project) -> anyhow::Result<()> {
        self.conn.execute(
            "INSERT INTO projects (id, title, abstract, specialization, difficulty, tags,
             technology_stack, approval_status, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
             ON CONFLICT(id) DO UPDATE SET title = ?2, abstract = ?3, specialization = ?4,
                difficulty = ?5, tags = ?6, technology_stack = ?7, approval_status = ?8,
                updated_at = ?9",
            params![
                project.id,
                project.title,
                project.abstract_text,
                project.specialization,
                project.difficulty.as_str(),
                serde_json::to_string(&project.tags)?,
                serde_json::to_string(&project.technology_stack)?,
                project.approval_status.as_str(),
                timestamp(&Utc::now())
            ],
        )?;
        Ok(())
    }

    pub fn get_project(&self, id: &str) -> anyhow::Result<Option<Project>> {
        let raw = self
            .conn
            .query_row(
                &format!("SELECT {PROJECT_COLUMNS} FROM projects WHERE id = ?1"),
                params![id],
                raw_project,
            )
            .optional()?;
        raw.map(decode_project).transpose()
    }

    /// Approved projects passing `filter`, ordered by id.
    pub fn query_approved_projects(&self, filter: &ProjectFilter) -> anyhow::Result<Vec<Project>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {PROJECT_COLUMNS} FROM projects WHERE approval_status = ?1 ORDER BY id"
        ))?;
        let rows = stmt.query_map(params![ApprovalStatus::Approved.as_str()], raw_project)?;
        let projects = collect(rows, decode_project)?;
        Ok(projects.into_iter().filter(|p| filter.admits(p)).collect())
    }

    // -- Recommendations --

    /// Mark the student's active recommendation superseded and insert `rec` as the
    /// new active one, atomically. Returns how many rows were superseded.
    pub fn supersede_and_insert_recommendation(&self, rec: &Recommendation) -> anyhow::Result<usize> {
        // IMMEDIATE takes the write lock up front so two writers for the same
        // student serialize instead of both reading "no active row".
        let tx = Transaction::new_unchecked(&self.conn, TransactionBehavior::Immediate)?;
        let superseded = tx.execute(
            "UPDATE recommendations SET status = ?1 WHERE student_id = ?2 AND status = ?3",
            params![
                RecommendationStatus::Superseded.as_str(),
                rec.student_id,
                RecommendationStatus::Active.as_str()
            ],
        )?;
        tx.execute(
            "INSERT INTO recommendations (id, student_id, profile_snapshot, project_suggestions,
             status, average_similarity_score, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                rec.id,
                rec.student_id,
                serde_json::to_string(&rec.profile_snapshot)?,
                serde_json::to_string(&rec.project_suggestions)?,
                RecommendationStatus::Active.as_str(),
                rec.average_similarity_score as f64,
                timestamp(&rec.created_at)
            ],
        )?;
        tx.commit()?;
        Ok(superseded)
    }

    pub fn get_recommendation(&self, id: &str) -> anyhow::Result<Option<Recommendation>> {
        let raw = self
            .conn
            .query_row(
                &format!("SELECT {RECOMMENDATION_COLUMNS} FROM recommendations WHERE id = ?1"),
                params![id],
                raw_recommendation,
            )
            .optional()?;
        raw.map(decode_recommendation).transpose()
    }

    pub fn get_active_recommendation(
        &self,
        student_id: &str,
    ) -> anyhow::Result<Option<Recommendation>> {
        let raw = self
            .conn
            .query_row(
                &format!(
                    "SELECT {RECOMMENDATION_COLUMNS} FROM recommendations
                     WHERE student_id = ?1 AND status = ?2"
                ),
                params![student_id, RecommendationStatus::Active.as_str()],
                raw_recommendation,
            )
            .optional()?;
        raw.map(decode_recommendation).transpose()
    }

    /// A student's recommendations, newest first.
    pub fn list_recommendations(
        &self,
        student_id: &str,
        limit: u32,
    ) -> anyhow::Result<Vec<Recommendation>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {RECOMMENDATION_COLUMNS} FROM recommendations WHERE student_id = ?1
             ORDER BY created_at DESC, rowid DESC LIMIT ?2"
        ))?;
        let rows = stmt.query_map(params![student_id, limit], raw_recommendation)?;
        collect(rows, decode_recommendation)
    }

    /// All recommendations created at or after `since` (everything when `None`).
    pub fn query_recommendations_since(
        &self,
        since: Option<DateTime<Utc>>,
    ) -> anyhow::Result<Vec<Recommendation>> {
        let since = since.map(|s| timestamp(&s)).unwrap_or_default();
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {RECOMMENDATION_COLUMNS} FROM recommendations WHERE created_at >= ?1
             ORDER BY created_at"
        ))?;
        let rows = stmt.query_map(params![since], raw_recommendation)?;
        collect(rows, decode_recommendation)
    }

    /// Most recent recommendation for the student whose suggestions include the project.
    pub fn find_latest_recommendation_with_project(
        &self,
        student_id: &str,
        project_id: &str,
    ) -> anyhow::Result<Option<Recommendation>> {
        let raw = self
            .conn
            .query_row(
                &format!(
                    "SELECT {RECOMMENDATION_COLUMNS} FROM recommendations r
                     WHERE r.student_id = ?1 AND EXISTS (
                        SELECT 1 FROM json_each(r.project_suggestions) j
                        WHERE json_extract(j.value, '$.project_id') = ?2
                     )
                     ORDER BY r.created_at DESC, r.rowid DESC LIMIT 1"
                ),
                params![student_id, project_id],
                raw_recommendation,
            )
            .optional()?;
        raw.map(decode_recommendation).transpose()
    }

    pub fn count_active_recommendations(&self, student_id: &str) -> anyhow::Result<i64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM recommendations WHERE student_id = ?1 AND status = ?2",
            params![student_id, RecommendationStatus::Active.as_str()],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    // -- Feedback --

    pub fn insert_feedback(&self, feedback: &RecommendationFeedback) -> anyhow::Result<()> {
        self.conn.execute(
            "INSERT INTO recommendation_feedback (id, recommendation_id, project_id,
             feedback_type, rating, implicit_rating, comment, is_implicit, created_at,
             source_feedback_id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                feedback.id,
                feedback.recommendation_id,
                feedback.project_id,
                feedback.feedback_type.as_str(),
                feedback.rating,
                feedback.implicit_rating,
                feedback.comment,
                feedback.is_implicit,
                timestamp(&feedback.created_at),
                feedback.source_feedback_id
            ],
        )?;
        Ok(())
    }

    pub fn query_feedback_for_project(
        &self,
        project_id: &str,
    ) -> anyhow::Result<Vec<RecommendationFeedback>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {FEEDBACK_COLUMNS} FROM recommendation_feedback f
             WHERE f.project_id = ?1 ORDER BY f.created_at"
        ))?;
        let rows = stmt.query_map(params![project_id], raw_feedback)?;
        collect(rows, decode_feedback)
    }

    pub fn query_feedback_for_recommendation(
        &self,
        recommendation_id: &str,
    ) -> anyhow::Result<Vec<RecommendationFeedback>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {FEEDBACK_COLUMNS} FROM recommendation_feedback f
             WHERE f.recommendation_id = ?1 ORDER BY f.created_at"
        ))?;
        let rows = stmt.query_map(params![recommendation_id], raw_feedback)?;
        collect(rows, decode_feedback)
    }

    pub fn query_feedback_since(
        &self,
        since: Option<DateTime<Utc>>,
    ) -> anyhow::Result<Vec<RecommendationFeedback>> {
        let since = since.map(|s| timestamp(&s)).unwrap_or_default();
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {FEEDBACK_COLUMNS} FROM recommendation_feedback f
             WHERE f.created_at >= ?1 ORDER BY f.created_at"
        ))?;
        let rows = stmt.query_map(params![since], raw_feedback)?;
        collect(rows, decode_feedback)
    }

    /// A student's feedback joined through its recommendation to the project catalog.
    pub fn query_student_feedback(&self, student_id: &str) -> anyhow::Result<Vec<StudentFeedbackRow>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {FEEDBACK_COLUMNS}, p.specialization, p.difficulty, p.tags, p.technology_stack
             FROM recommendation_feedback f
             JOIN recommendations r ON r.id = f.recommendation_id
             JOIN projects p ON p.id = f.project_id
             WHERE r.student_id = ?1
             ORDER BY f.created_at"
        ))?;
        let rows = stmt.query_map(params![student_id], |row| {
            let feedback = raw_feedback(row)?;
            let spec: String = row.get(10)?;
            let difficulty: String = row.get(11)?;
            let tags: String = row.get(12)?;
            let tech: String = row.get(13)?;
            Ok((feedback, spec, difficulty, tags, tech))
        })?;
        collect(rows, |(feedback, specialization, difficulty, tags, tech)| {
            Ok(StudentFeedbackRow {
                feedback: decode_feedback(feedback)?,
                specialization,
                difficulty: parse_enum::<Difficulty>(&difficulty)?,
                tags: string_list(&tags)?,
                technology_stack: string_list(&tech)?,
            })
        })
    }

    // -- Engagement --

    pub fn insert_bookmark(&self, student_id: &str, project_id: &str) -> anyhow::Result<()> {
        self.conn.execute(
            "INSERT OR IGNORE INTO project_bookmarks (student_id, project_id, created_at)
             VALUES (?1, ?2, ?3)",
            params![student_id, project_id, timestamp(&Utc::now())],
        )?;
        Ok(())
    }

    pub fn remove_bookmark(&self, student_id: &str, project_id: &str) -> anyhow::Result<bool> {
        let removed = self.conn.execute(
            "DELETE FROM project_bookmarks WHERE student_id = ?1 AND project_id = ?2",
            params![student_id, project_id],
        )?;
        Ok(removed > 0)
    }

    pub fn count_bookmarks(&self, project_id: &str) -> anyhow::Result<i64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM project_bookmarks WHERE project_id = ?1",
            params![project_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    pub fn insert_view(&self, student_id: Option<&str>, project_id: &str) -> anyhow::Result<()> {
        self.conn.execute(
            "INSERT INTO project_views (id, student_id, project_id, viewed_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                uuid::Uuid::new_v4().to_string(),
                student_id,
                project_id,
                timestamp(&Utc::now())
            ],
        )?;
        Ok(())
    }

    pub fn count_views(&self, project_id: &str) -> anyhow::Result<i64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM project_views WHERE project_id = ?1",
            params![project_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}
