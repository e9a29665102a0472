// src/cli/feedback.rs — Feedback submission and learning inspection

use serde_json::json;

use super::{print_json, AppContext};
use crate::core::types::{FeedbackInput, FeedbackType};
use crate::learner::types::{ImplicitAction, ImplicitFeedback};
use crate::memory;

pub async fn run_feedback(
    ctx: &AppContext,
    recommendation_id: &str,
    project_id: &str,
    feedback_type: &str,
    rating: Option<f64>,
    comment: Option<String>,
) -> anyhow::Result<()> {
    let feedback_type: FeedbackType = feedback_type.parse().map_err(anyhow::Error::msg)?;
    let input = FeedbackInput {
        feedback_type,
        rating,
        comment,
    };
    let id = ctx
        .orchestrator
        .submit_feedback(recommendation_id, project_id, &input)
        .await?;
    print_json(&json!({ "feedback_id": id }))
}

/// Record the engagement itself, then the implicit feedback derived from it.
pub fn run_track(
    ctx: &AppContext,
    student_id: &str,
    project_id: &str,
    action: &str,
    metadata: Option<&str>,
) -> anyhow::Result<()> {
    let action = ImplicitAction::parse(action);
    {
        let store = memory::lock(&ctx.store)?;
        match action {
            ImplicitAction::Bookmark => store.insert_bookmark(student_id, project_id)?,
            ImplicitAction::View => store.insert_view(Some(student_id), project_id)?,
            ImplicitAction::Dismiss => {
                store.remove_bookmark(student_id, project_id)?;
            }
            ImplicitAction::Other(_) => {}
        }
    }

    let mut event = ImplicitFeedback::now(student_id, project_id, action);
    event.metadata = metadata.map(serde_json::from_str).transpose()?;
    let feedback_id = ctx.orchestrator.learner().track_implicit_feedback(&event)?;
    print_json(&json!({
        "action": event.action.as_str(),
        "feedback_id": feedback_id,
        "attributed": feedback_id.is_some(),
    }))
}

pub fn run_aggregate(ctx: &AppContext, project_id: &str) -> anyhow::Result<()> {
    let aggregation = ctx
        .orchestrator
        .learner()
        .aggregate_project_feedback(project_id)?;
    print_json(&aggregation)
}

pub fn run_patterns(ctx: &AppContext, student_id: &str) -> anyhow::Result<()> {
    let patterns = ctx
        .orchestrator
        .learner()
        .analyze_student_feedback_patterns(student_id)?;
    print_json(&patterns)
}

pub fn run_adjustments(ctx: &AppContext, student_id: &str) -> anyhow::Result<()> {
    let outcome = ctx
        .orchestrator
        .learner()
        .get_recommendation_adjustments(student_id);
    let degraded = outcome.is_degraded();
    print_json(&json!({
        "adjustment": outcome.value(),
        "degraded": degraded,
    }))
}
