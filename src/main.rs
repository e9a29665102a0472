// src/main.rs — project-recommender entry point

use std::path::Path;

use clap::Parser;

use project_recommender::cli::{self, AppContext, Cli, Commands};
use project_recommender::infra::config::Config;
use project_recommender::infra::errors::RecommenderError;
use project_recommender::infra::logger;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Load config (falls back to defaults if no config.toml)
    let config = match &cli.config {
        Some(path) => Config::load_from(Path::new(path)),
        None => Config::load(),
    };
    let config = match config {
        Ok(config) => config,
        Err(e) => {
            logger::init_logging("warn");
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    };

    // RUST_LOG overrides the configured level
    logger::init_logging(&config.storage.log_level);

    if let Err(e) = run(cli.command, config).await {
        eprintln!("error: {e}");
        // Caller mistakes exit 2, everything else 1.
        let code = match e.downcast_ref::<RecommenderError>() {
            Some(err) if err.is_surfaced() => 2,
            _ => 1,
        };
        std::process::exit(code);
    }
}

async fn run(command: Commands, config: Config) -> anyhow::Result<()> {
    // Commands that must not open (and so migrate) the database first
    if let Commands::Migrate { status, rollback } = &command {
        return cli::migrate::run_migrate(&config.storage.resolved_db_path(), *status, *rollback);
    }

    let ctx = AppContext::open(config)?;

    let outcome = match command {
        Commands::Generate {
            student_id,
            args,
            force,
        } => cli::recommend::run_generate(&ctx, &student_id, &args, force).await,
        Commands::Refresh { student_id, args } => {
            cli::recommend::run_refresh(&ctx, &student_id, &args).await
        }
        Commands::Feedback {
            recommendation_id,
            project_id,
            feedback_type,
            rating,
            comment,
        } => {
            cli::feedback::run_feedback(
                &ctx,
                &recommendation_id,
                &project_id,
                &feedback_type,
                rating,
                comment,
            )
            .await
        }
        Commands::Track {
            student_id,
            project_id,
            action,
            metadata,
        } => cli::feedback::run_track(&ctx, &student_id, &project_id, &action, metadata.as_deref()),
        Commands::Explain {
            recommendation_id,
            project_id,
        } => cli::recommend::run_explain(&ctx, &recommendation_id, &project_id).await,
        Commands::Aggregate { project_id } => cli::feedback::run_aggregate(&ctx, &project_id),
        Commands::Patterns { student_id } => cli::feedback::run_patterns(&ctx, &student_id),
        Commands::Adjustments { student_id } => cli::feedback::run_adjustments(&ctx, &student_id),
        Commands::History {
            student_id,
            limit,
            active,
        } => cli::recommend::run_history(&ctx, &student_id, limit, active),
        Commands::Analytics {
            since,
            satisfaction,
        } => cli::analytics::run_analytics(&ctx, since.as_deref(), satisfaction),
        Commands::Seed { file } => cli::seed::run_seed(&ctx.store, &file),
        Commands::Health => cli::status::run_health(&ctx).await,
        Commands::Migrate { .. } => Ok(()),
    };

    ctx.orchestrator.shutdown().await;
    outcome
}
