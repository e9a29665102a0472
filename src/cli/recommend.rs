// src/cli/recommend.rs — generate, refresh, explain and history commands

use super::{print_json, AppContext, GenerateArgs};

pub async fn run_generate(
    ctx: &AppContext,
    student_id: &str,
    args: &GenerateArgs,
    force: bool,
) -> anyhow::Result<()> {
    let result = ctx
        .orchestrator
        .generate_recommendations(student_id, &args.to_options(force))
        .await?;
    print_json(&result)
}

pub async fn run_refresh(
    ctx: &AppContext,
    student_id: &str,
    args: &GenerateArgs,
) -> anyhow::Result<()> {
    let result = ctx
        .orchestrator
        .refresh_recommendations(student_id, &args.to_options(true))
        .await?;
    print_json(&result)
}

pub async fn run_explain(
    ctx: &AppContext,
    recommendation_id: &str,
    project_id: &str,
) -> anyhow::Result<()> {
    let explanation = ctx
        .orchestrator
        .explain_recommendation(recommendation_id, project_id)
        .await?;
    print_json(&explanation)
}

pub fn run_history(
    ctx: &AppContext,
    student_id: &str,
    limit: u32,
    active_only: bool,
) -> anyhow::Result<()> {
    if active_only {
        let active = ctx.orchestrator.active_recommendation(student_id)?;
        return print_json(&active);
    }
    let history = ctx.orchestrator.history(student_id, limit)?;
    print_json(&history)
}
