// src/cli/analytics.rs — Quality report command

use chrono::{DateTime, Utc};

use super::{print_json, AppContext};
use crate::analytics::RecommendationAnalytics;
use crate::infra::errors::RecommenderError;

pub fn run_analytics(ctx: &AppContext, since: Option<&str>, satisfaction: bool) -> anyhow::Result<()> {
    let analytics = RecommendationAnalytics::new(ctx.store.clone(), &ctx.config.learning);

    if satisfaction {
        return print_json(&analytics.satisfaction_summary()?);
    }

    let since = since
        .map(|s| {
            DateTime::parse_from_rfc3339(s)
                .map(|d| d.with_timezone(&Utc))
                .map_err(|e| {
                    RecommenderError::invalid_input(
                        "since",
                        "format",
                        format!("'{s}' is not an RFC 3339 timestamp: {e}"),
                    )
                })
        })
        .transpose()?;
    print_json(&analytics.quality_metrics(since)?)
}
