use crate::config::Config;
use crate::enrichment::{
    derive_enrichment, email_domain, is_valid_email, is_valid_zip, normalize_us_phone,
};
use crate::errors::{AppError, ResultExt};
use crate::geo;
use crate::lead_storage::LeadStorage;
use crate::models::*;
use crate::notifier::LeadNotifier;
use crate::scoring::{build_lead_insights, derive_tags, determine_priority, score_lead};
use crate::search::LeadSearchParams;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use moka::future::Cache;
use serde_json::json;
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

/// Shared application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: PgPool,
    /// Application configuration.
    pub config: Config,
    /// Webhook client announcing new leads (optional).
    pub notifier: Option<LeadNotifier>,
    /// Dedup cache keyed by lowercased email, guarding against rapid
    /// repeat submissions of the same lead.
    pub recent_submission_cache: Cache<String, i64>,
}

/// Health check endpoint.
pub async fn health() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "service": "lead-intel-api",
            "version": "0.1.0"
        })),
    )
}

/// POST /api/v1/leads
///
/// Accept a marketing-form submission: validate, geo-resolve, score,
/// classify, tag, persist, and announce. The webhook announcement is
/// best-effort and never fails the request.
pub async fn submit_lead(
    State(state): State<Arc<AppState>>,
    Json(mut submission): Json<LeadSubmission>,
) -> Result<Json<SubmitLeadResponse>, AppError> {
    tracing::info!(
        "POST /leads - company: {}, type: {}",
        submission.company,
        submission.business_type.as_str()
    );

    validate_and_normalize(&mut submission)?;

    // Same email inside the dedup window: acknowledge without re-inserting
    let dedup_key = submission.email.clone();
    if state.recent_submission_cache.get(&dedup_key).await.is_some() {
        tracing::info!("Duplicate submission within dedup window: {}", dedup_key);
        return Ok(Json(SubmitLeadResponse {
            success: true,
            id: None,
            score: None,
            priority: None,
            duplicate: true,
        }));
    }

    // Geo-resolve unless the form already supplied coordinates. A miss is
    // a normal outcome, the record is stored without coordinates.
    if submission.location.coordinates.is_none() {
        submission.location.coordinates =
            geo::resolve_coordinates(&submission.location.city, &submission.location.state);
    }

    let score = score_lead(&submission);
    let priority = determine_priority(score);
    let insights = build_lead_insights(&submission, score);
    let tags = derive_tags(&submission, priority);

    let storage = LeadStorage::new(state.db.clone());
    let record = storage
        .insert_lead(&submission, score, priority, &insights, &tags)
        .await?;

    state
        .recent_submission_cache
        .insert(dedup_key, chrono::Utc::now().timestamp())
        .await;

    if let Some(notifier) = state.notifier.clone() {
        let announced = record.clone();
        tokio::spawn(async move {
            if let Err(e) = notifier.notify_new_lead(&announced).await {
                tracing::warn!("Lead notification failed for {}: {}", announced.id, e);
            }
        });
    }

    tracing::info!(
        "Lead {} stored (score: {}, priority: {})",
        record.id,
        record.score,
        record.priority.as_str()
    );

    Ok(Json(SubmitLeadResponse {
        success: true,
        id: Some(record.id),
        score: Some(record.score),
        priority: Some(record.priority),
        duplicate: false,
    }))
}

/// GET /api/v1/leads/:id
pub async fn get_lead(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<LeadRecord>, AppError> {
    tracing::info!("GET /leads/{}", id);

    let storage = LeadStorage::new(state.db.clone());
    let record = storage
        .fetch_lead(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Lead with id {} not found", id)))?;

    Ok(Json(record))
}

/// GET /api/v1/leads/search
///
/// Faceted search over the lead collection. Query parameters are parsed
/// defensively: malformed numerics and unknown enum values are treated as
/// absent, and a geo radius with no resolvable center is silently dropped.
pub async fn search_leads(
    State(state): State<Arc<AppState>>,
    Query(params): Query<LeadSearchParams>,
) -> Result<Json<LeadSearchResult>, AppError> {
    tracing::info!("GET /leads/search - params: {:?}", params);

    let query = params.parse();
    let storage = LeadStorage::new(state.db.clone());
    let result = storage.search(&query).await?;

    tracing::info!(
        "Search returned {} of {} leads (limit {}, offset {})",
        result.results.len(),
        result.total,
        result.limit,
        result.offset
    );

    Ok(Json(result))
}

/// POST /api/v1/leads/rescore
///
/// Maintenance pass re-deriving score, priority, insights, and tags for
/// existing records. Without `force` only records untouched since intake
/// are selected.
pub async fn rescore_leads(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RescoreRequest>,
) -> Result<Json<RescoreResponse>, AppError> {
    let limit = request.limit.unwrap_or(50).clamp(1, 500);
    tracing::info!(
        "POST /leads/rescore - limit: {}, force: {}",
        limit,
        request.force
    );

    let storage = LeadStorage::new(state.db.clone());
    let candidates = storage
        .find_rescore_candidates(limit, request.force, request.lead_ids.as_deref())
        .await?;

    let mut results = Vec::with_capacity(candidates.len());
    for lead in candidates {
        let submission = lead.as_submission();
        let score = score_lead(&submission);
        let priority = determine_priority(score);
        let insights = build_lead_insights(&submission, score);
        let tags = derive_tags(&submission, priority);

        storage
            .apply_scoring(lead.id, score, priority, &insights, &tags)
            .await
            .with_context(|| format!("Failed to store re-score for lead {}", lead.id))?;

        results.push(RescoreOutcome {
            id: lead.id,
            score,
            priority,
        });
    }

    tracing::info!("Re-scored {} lead(s)", results.len());

    Ok(Json(RescoreResponse {
        success: true,
        processed: results.len(),
        results,
    }))
}

/// POST /api/v1/leads/:id/enrich
///
/// Re-derive firmographic enrichment from the record's email domain and
/// apply it. Idempotent: running it twice yields the same stored fields.
pub async fn enrich_lead(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    tracing::info!("POST /leads/{}/enrich", id);

    let storage = LeadStorage::new(state.db.clone());
    let record = storage
        .fetch_lead(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Lead with id {} not found", id)))?;

    let domain = email_domain(&record.email);
    let enrichment = derive_enrichment(domain, record.business_type);

    storage
        .apply_enrichment(id, &enrichment)
        .await
        .context("Failed to apply enrichment")?;

    Ok(Json(json!({
        "success": true,
        "lead_id": id,
        "enrichment": enrichment,
    })))
}

/// Validate a submission and normalize its fields in place.
///
/// Validation lives here, not in the scoring core: the core stays total
/// and scores whatever well-typed submission it is handed.
fn validate_and_normalize(submission: &mut LeadSubmission) -> Result<(), AppError> {
    submission.name = submission.name.trim().to_string();
    submission.company = submission.company.trim().to_string();
    submission.email = submission.email.trim().to_lowercase();
    submission.location.city = submission.location.city.trim().to_string();
    submission.location.state = submission.location.state.trim().to_string();
    submission.location.postal_code = submission.location.postal_code.trim().to_string();
    if let Some(message) = &submission.message {
        let trimmed = message.trim().to_string();
        submission.message = (!trimmed.is_empty()).then_some(trimmed);
    }

    if submission.name.len() < 2 || submission.name.len() > 100 {
        return Err(AppError::BadRequest(
            "name must be 2-100 characters".to_string(),
        ));
    }
    if submission.company.len() < 2 || submission.company.len() > 100 {
        return Err(AppError::BadRequest(
            "company must be 2-100 characters".to_string(),
        ));
    }
    if !is_valid_email(&submission.email) {
        return Err(AppError::BadRequest("Invalid email format".to_string()));
    }
    if submission.location.state.len() != 2 {
        return Err(AppError::BadRequest(
            "state must be a 2-letter code".to_string(),
        ));
    }
    if !is_valid_zip(&submission.location.postal_code) {
        return Err(AppError::BadRequest(
            "postal_code must be a 5 or 5+4 digit US ZIP".to_string(),
        ));
    }
    if let Some(message) = &submission.message {
        if message.len() > 1000 {
            return Err(AppError::BadRequest(
                "message must be at most 1000 characters".to_string(),
            ));
        }
    }

    let raw_phone = submission.phone.trim().to_string();
    if raw_phone.is_empty() {
        return Err(AppError::BadRequest("phone is required".to_string()));
    }
    // Normalize to E.164 when the number parses as US; otherwise keep the
    // trimmed input rather than rejecting the lead.
    submission.phone = normalize_us_phone(&raw_phone).unwrap_or(raw_phone);

    // Negative self-reported figures are treated as absent
    if submission.estimated_locations.is_some_and(|n| n < 0) {
        submission.estimated_locations = None;
    }
    if submission.headcount.is_some_and(|n| n < 0) {
        submission.headcount = None;
    }

    Ok(())
}
