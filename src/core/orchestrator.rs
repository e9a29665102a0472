// src/core/orchestrator.rs — Recommendation pipeline controller

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use tracing::{debug, info, warn};

use super::reasoning;
use super::scoring::{self, ScoredCandidate};
use super::types::*;
use super::validation;
use crate::cache::recommendation::{explanation_key, recommendation_key};
use crate::cache::{CacheLookup, CacheStats, CacheTier, RecommendationCache};
use crate::infra::config::{Config, RecommendationConfig};
use crate::infra::errors::{RecommenderError, Result};
use crate::learner::types::{FeedbackAdjustment, ImplicitAction, ImplicitFeedback};
use crate::learner::FeedbackLearningEngine;
use crate::memory::store::ProjectFilter;
use crate::memory::{self, SharedStore};
use crate::provider::text::TextProcessor;
use crate::provider::EmbeddingProvider;
use crate::ranking::{SimilarityOptions, SimilarityRanker};

/// Drives cache lookup, candidate retrieval, embedding, ranking, feedback
/// adjustment, diversity, persistence and cache write for one student.
pub struct RecommendationOrchestrator {
    store: SharedStore,
    embeddings: Arc<dyn EmbeddingProvider>,
    text: Arc<dyn TextProcessor>,
    cache: Arc<RecommendationCache>,
    learner: FeedbackLearningEngine,
    ranker: SimilarityRanker,
    config: RecommendationConfig,
    embedding_timeout: Duration,
}

impl RecommendationOrchestrator {
    pub fn new(
        store: SharedStore,
        embeddings: Arc<dyn EmbeddingProvider>,
        text: Arc<dyn TextProcessor>,
        cache: Arc<RecommendationCache>,
        config: &Config,
    ) -> Self {
        Self {
            learner: FeedbackLearningEngine::new(store.clone(), config.learning.clone()),
            store,
            embeddings,
            text,
            cache,
            ranker: SimilarityRanker::new(),
            config: config.recommendation.clone(),
            embedding_timeout: config.embedding.timeout(),
        }
    }

    /// Override the deadline for the batch embedding call.
    pub fn with_embedding_timeout(mut self, timeout: Duration) -> Self {
        self.embedding_timeout = timeout;
        self
    }

    pub fn learner(&self) -> &FeedbackLearningEngine {
        &self.learner
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    fn load_student(&self, student_id: &str) -> Result<Student> {
        memory::lock(&self.store)?
            .get_student(student_id)?
            .ok_or_else(|| RecommenderError::not_found("Student", student_id))
    }

    fn load_recommendation(&self, recommendation_id: &str) -> Result<Recommendation> {
        memory::lock(&self.store)?
            .get_recommendation(recommendation_id)?
            .ok_or_else(|| RecommenderError::not_found("Recommendation", recommendation_id))
    }

    /// Produce (or return cached) recommendations for a student.
    pub async fn generate_recommendations(
        &self,
        student_id: &str,
        options: &RecommendationOptions,
    ) -> Result<RecommendationResult> {
        let started = Instant::now();

        let student = self.load_student(student_id)?;
        let profile = validation::validate_profile(student.profile.as_ref())?;
        validation::ensure_valid(validation::validate_options(options, &self.config))?;

        let key = recommendation_key(student_id);
        if !options.force_refresh {
            match self.cache.get::<RecommendationResult>(&key).await {
                CacheLookup::Hit(mut cached) => {
                    info!("Serving cached recommendations for student {student_id}");
                    cached.from_cache = true;
                    return Ok(cached);
                }
                CacheLookup::Miss => {}
                CacheLookup::Unavailable(reason) => {
                    debug!("Cache unavailable for {key}, generating: {reason}");
                }
            }
        }

        // Candidates
        let filter = ProjectFilter {
            include_specializations: options.include_specializations.clone(),
            exclude_specializations: options.exclude_specializations.clone(),
            max_difficulty: options.max_difficulty,
        };
        let mut projects = memory::lock(&self.store)?.query_approved_projects(&filter)?;
        if projects.is_empty() {
            return Err(RecommenderError::NoCandidates);
        }
        let mut dropped_candidates = 0;
        if projects.len() > self.config.max_candidates {
            // Preferred specializations survive the cap first; id order within each group.
            projects.sort_by_key(|p| {
                !reasoning::specialization_match(
                    &profile.preferred_specializations,
                    &p.specialization,
                )
            });
            dropped_candidates = projects.len() - self.config.max_candidates;
            warn!(
                "{} candidates exceed the per-request cap of {}, dropping {dropped_candidates}",
                projects.len(),
                self.config.max_candidates
            );
            projects.truncate(self.config.max_candidates);
        }
        let total_candidates = projects.len();

        // One embedding call: profile first, then every candidate in order.
        let mut texts = Vec::with_capacity(total_candidates + 1);
        texts.push(self.text.process_student_profile(profile).combined.text);
        texts.extend(
            projects
                .iter()
                .map(|p| self.text.process_project(p).combined.text),
        );

        let batch = tokio::time::timeout(
            self.embedding_timeout,
            self.embeddings.generate_embeddings(&texts),
        )
        .await
        .map_err(|_| RecommenderError::EmbeddingTimeout {
            timeout_ms: self.embedding_timeout.as_millis() as u64,
        })??;

        if batch.embeddings.len() != texts.len() {
            return Err(RecommenderError::Embedding {
                message: format!(
                    "Expected {} embeddings, got {}",
                    texts.len(),
                    batch.embeddings.len()
                ),
            });
        }
        let (query, candidate_vectors) = batch.embeddings.split_at(1);

        // Rank
        let ranked = self.ranker.calculate_batch_similarity(
            &query[0],
            candidate_vectors,
            &SimilarityOptions {
                min_threshold: options.min_similarity_score,
                top_k: None,
            },
        );
        let mut slots: Vec<Option<Project>> = projects.into_iter().map(Some).collect();
        let mut candidates: Vec<ScoredCandidate> = ranked
            .similarities
            .iter()
            .filter_map(|s| {
                slots[s.index]
                    .take()
                    .map(|p| ScoredCandidate::new(p, s.normalized_score))
            })
            .collect();

        // Learn
        let adjustment_outcome = self.learner.get_recommendation_adjustments(student_id);
        let adjustment_degraded = adjustment_outcome.is_degraded();
        let adjustment = adjustment_outcome.into_value();
        scoring::apply_feedback_adjustment(&mut candidates, &adjustment, &self.config);

        let diversity_applied = options.include_diversity_boost
            && scoring::apply_diversity_boost(&mut candidates, self.config.diversity_bonus) > 0;

        let limit = options.limit.unwrap_or(self.config.default_limit);
        candidates.truncate(limit);
        let average_similarity_score = scoring::average_similarity(&candidates);

        let suggestions: Vec<ProjectSuggestion> = candidates
            .into_iter()
            .map(|c| self.build_suggestion(profile, c, &adjustment))
            .collect();
        let overall = reasoning::overall_reasoning(
            &suggestions,
            total_candidates,
            &adjustment,
            diversity_applied,
        );

        // Persist
        let recommendation = Recommendation {
            id: uuid::Uuid::new_v4().to_string(),
            student_id: student_id.to_string(),
            profile_snapshot: profile.snapshot(),
            project_suggestions: suggestions,
            status: RecommendationStatus::Active,
            average_similarity_score,
            created_at: Utc::now(),
        };
        let superseded =
            memory::lock(&self.store)?.supersede_and_insert_recommendation(&recommendation)?;
        info!(
            "Generated recommendation {} for student {student_id}: {} suggestions from {total_candidates} candidates (superseded {superseded})",
            recommendation.id,
            recommendation.project_suggestions.len()
        );

        let result = RecommendationResult {
            metadata: RecommendationMetadata {
                recommendation_id: recommendation.id.clone(),
                total_candidates,
                dropped_candidates,
                ranked_candidates: ranked.similarities.len(),
                embedding_provider: self.embeddings.id().to_string(),
                embedding_tokens: batch.tokens_used,
                embedding_ms: batch.processing_time_ms,
                processing_ms: started.elapsed().as_millis() as u64,
                score_adjustment: adjustment.score_adjustment,
                adjustment_degraded,
                diversity_applied,
            },
            recommendations: recommendation.project_suggestions,
            reasoning: overall,
            average_similarity_score,
            from_cache: false,
            generated_at: recommendation.created_at,
        };

        self.cache
            .set_tier(&key, &result, CacheTier::Recommendations)
            .await;
        Ok(result)
    }

    fn build_suggestion(
        &self,
        profile: &StudentProfile,
        candidate: ScoredCandidate,
        adjustment: &FeedbackAdjustment,
    ) -> ProjectSuggestion {
        let project = candidate.project;
        let matching_skills = reasoning::matching_skills(profile, &project);
        let matching_interests = reasoning::matching_interests(profile, &project);
        let aligned = reasoning::specialization_match(
            &profile.preferred_specializations,
            &project.specialization,
        );
        let text = reasoning::suggestion_reasoning(
            &project,
            candidate.similarity,
            &matching_skills,
            &matching_interests,
            aligned,
            adjustment,
        );
        ProjectSuggestion {
            project_id: project.id,
            title: project.title,
            specialization: project.specialization,
            difficulty: project.difficulty,
            final_score: candidate.final_score,
            similarity_score: candidate.similarity,
            feedback_adjustment: candidate.feedback_adjustment,
            diversity_bonus: candidate.diversity_bonus,
            matching_skills,
            matching_interests,
            reasoning: text,
            diversity_boost: candidate.diversity_boost,
        }
    }

    /// Drop the cached result and regenerate.
    pub async fn refresh_recommendations(
        &self,
        student_id: &str,
        options: &RecommendationOptions,
    ) -> Result<RecommendationResult> {
        self.cache.del(&recommendation_key(student_id)).await;
        let options = RecommendationOptions {
            force_refresh: true,
            ..options.clone()
        };
        self.generate_recommendations(student_id, &options).await
    }

    /// Record explicit feedback on one suggestion and forward the matching
    /// implicit signal. Returns the feedback id.
    pub async fn submit_feedback(
        &self,
        recommendation_id: &str,
        project_id: &str,
        input: &FeedbackInput,
    ) -> Result<String> {
        let recommendation = self.load_recommendation(recommendation_id)?;
        if recommendation.suggestion(project_id).is_none() {
            return Err(RecommenderError::not_found(
                "Project suggestion",
                format!("{project_id} in recommendation {recommendation_id}"),
            ));
        }
        validation::ensure_valid(validation::validate_feedback(input))?;

        let feedback = RecommendationFeedback {
            id: uuid::Uuid::new_v4().to_string(),
            recommendation_id: recommendation_id.to_string(),
            project_id: project_id.to_string(),
            feedback_type: input.feedback_type,
            rating: input.rating,
            implicit_rating: None,
            comment: input.comment.clone(),
            is_implicit: false,
            created_at: Utc::now(),
            source_feedback_id: None,
        };
        memory::lock(&self.store)?.insert_feedback(&feedback)?;
        info!(
            "Recorded {} feedback on project {project_id} (recommendation {recommendation_id})",
            input.feedback_type
        );

        let event = ImplicitFeedback::now(
            &recommendation.student_id,
            project_id,
            ImplicitAction::for_feedback_type(input.feedback_type),
        )
        .forwarded_from(&feedback.id);
        if let Err(e) = self.learner.track_implicit_feedback(&event) {
            warn!("Could not forward implicit '{}' signal: {e}", event.action);
        }

        // Rankings depend on feedback history, so the cached result is stale.
        self.cache
            .del(&recommendation_key(&recommendation.student_id))
            .await;
        Ok(feedback.id)
    }

    /// Score breakdown and reasoning for one suggestion of a stored recommendation.
    pub async fn explain_recommendation(
        &self,
        recommendation_id: &str,
        project_id: &str,
    ) -> Result<Explanation> {
        let key = explanation_key(recommendation_id, project_id);
        if let CacheLookup::Hit(explanation) = self.cache.get::<Explanation>(&key).await {
            return Ok(explanation);
        }

        let recommendation = self.load_recommendation(recommendation_id)?;
        let suggestion = recommendation.suggestion(project_id).ok_or_else(|| {
            RecommenderError::not_found(
                "Project suggestion",
                format!("{project_id} in recommendation {recommendation_id}"),
            )
        })?;

        let snapshot = &recommendation.profile_snapshot;
        let explanation = Explanation {
            recommendation_id: recommendation_id.to_string(),
            project_id: project_id.to_string(),
            project_title: suggestion.title.clone(),
            reasoning: suggestion.reasoning.clone(),
            score_breakdown: ScoreBreakdown {
                similarity_score: suggestion.similarity_score,
                feedback_adjustment: suggestion.feedback_adjustment,
                diversity_bonus: suggestion.diversity_bonus,
                final_score: suggestion.final_score,
            },
            matching_elements: MatchingElements {
                skills: suggestion.matching_skills.clone(),
                interests: suggestion.matching_interests.clone(),
                specialization_match: reasoning::specialization_match(
                    &snapshot.specializations,
                    &suggestion.specialization,
                ),
            },
            improvement_suggestions: reasoning::improvement_suggestions(snapshot, suggestion),
        };

        self.cache
            .set_tier(&key, &explanation, CacheTier::Explanations)
            .await;
        Ok(explanation)
    }

    pub fn get_recommendation(&self, recommendation_id: &str) -> Result<Recommendation> {
        self.load_recommendation(recommendation_id)
    }

    pub fn active_recommendation(&self, student_id: &str) -> Result<Option<Recommendation>> {
        Ok(memory::lock(&self.store)?.get_active_recommendation(student_id)?)
    }

    /// A student's recommendations, newest first.
    pub fn history(&self, student_id: &str, limit: u32) -> Result<Vec<Recommendation>> {
        self.load_student(student_id)?;
        Ok(memory::lock(&self.store)?.list_recommendations(student_id, limit)?)
    }

    pub async fn shutdown(&self) {
        self.cache.close().await;
    }
}
