// src/cli/status.rs — Health check for the embedding service and database

use serde_json::json;

use super::{print_json, AppContext};
use crate::memory::{self, schema};

/// Probe each dependency and report; exits non-zero only through the
/// returned error when nothing could be checked at all.
pub async fn run_health(ctx: &AppContext) -> anyhow::Result<()> {
    let embedding = match ctx.embeddings.health().await {
        Ok(health) => json!({
            "url": ctx.embeddings.base_url(),
            "reachable": true,
            "status": health.status,
            "model": health.model,
            "model_loaded": health.model_loaded,
        }),
        Err(e) => json!({
            "url": ctx.embeddings.base_url(),
            "reachable": false,
            "error": e.to_string(),
        }),
    };

    let database = {
        let store = memory::lock(&ctx.store)?;
        let version = schema::current_version(store.conn())?;
        json!({
            "path": ctx.config.storage.resolved_db_path(),
            "schema_version": version,
            "latest_version": schema::latest_version(),
        })
    };

    print_json(&json!({
        "embedding_service": embedding,
        "database": database,
        "cache": ctx.orchestrator.cache_stats(),
    }))
}
