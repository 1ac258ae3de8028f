use crate::errors::AppError;
use crate::models::{
    FacetCount, LeadInsights, LeadPriority, LeadRecord, LeadSearchFacets, LeadSearchResult,
    LeadSubmission,
};
use crate::search::LeadSearchQuery;
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

/// Database storage for lead records.
///
/// Uses sequential queries sharing one compiled filter instead of a single
/// aggregation statement; every search query (count, page, facets) is built
/// from the same `LeadFilter` so they all see the same filtered set.
pub struct LeadStorage {
    pool: PgPool,
}

impl LeadStorage {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a fully scored submission and return the stored record.
    ///
    /// Both timestamps are set here; `updated_at == created_at` marks a
    /// record untouched since intake.
    pub async fn insert_lead(
        &self,
        submission: &LeadSubmission,
        score: i32,
        priority: LeadPriority,
        insights: &LeadInsights,
        tags: &[String],
    ) -> Result<LeadRecord, AppError> {
        let record = sqlx::query_as::<_, LeadRecord>(
            r#"
            INSERT INTO leads (
                id, name, email, company, business_type, phone, message,
                submission_type, city, state, postal_code, geo_lon, geo_lat,
                estimated_locations, headcount, marketing,
                created_at, updated_at,
                score, priority, insights, enrichment_status, tags
            )
            VALUES (
                $1, $2, $3, $4, $5, $6, $7,
                $8, $9, $10, $11, $12, $13,
                $14, $15, $16,
                now(), now(),
                $17, $18, $19, 'pending', $20
            )
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&submission.name)
        .bind(&submission.email)
        .bind(&submission.company)
        .bind(submission.business_type)
        .bind(&submission.phone)
        .bind(&submission.message)
        .bind(submission.submission_type)
        .bind(&submission.location.city)
        .bind(&submission.location.state)
        .bind(&submission.location.postal_code)
        .bind(submission.location.coordinates.map(|c| c.longitude()))
        .bind(submission.location.coordinates.map(|c| c.latitude()))
        .bind(submission.estimated_locations)
        .bind(submission.headcount)
        .bind(submission.marketing.as_ref().map(Json))
        .bind(score)
        .bind(priority)
        .bind(Json(insights))
        .bind(tags.to_vec())
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::DatabaseError)?;

        Ok(record)
    }

    /// Fetch a single record by id.
    pub async fn fetch_lead(&self, id: Uuid) -> Result<Option<LeadRecord>, AppError> {
        let record = sqlx::query_as::<_, LeadRecord>("SELECT * FROM leads WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::DatabaseError)?;

        Ok(record)
    }

    /// Run a faceted search: count, page, and the four facet dimensions,
    /// all over the same compiled filter.
    pub async fn search(&self, query: &LeadSearchQuery) -> Result<LeadSearchResult, AppError> {
        // Total over the filtered set, independent of the page window
        let mut count_qb = QueryBuilder::<Postgres>::new("SELECT count(*) FROM leads");
        query.filter.push_where(&mut count_qb);
        let (total,): (i64,) = count_qb
            .build_query_as()
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::DatabaseError)?;

        // Result page
        let mut page_qb = QueryBuilder::<Postgres>::new("SELECT * FROM leads");
        query.filter.push_where(&mut page_qb);
        query.filter.push_order_by(&mut page_qb);
        page_qb.push(" LIMIT ").push_bind(query.limit);
        page_qb.push(" OFFSET ").push_bind(query.offset);
        let results: Vec<LeadRecord> = page_qb
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::DatabaseError)?;

        let facets = LeadSearchFacets {
            business_types: self.facet_counts(query, "business_type::text").await?,
            submission_types: self.facet_counts(query, "submission_type::text").await?,
            priorities: self.facet_counts(query, "priority::text").await?,
            states: self.facet_counts(query, "lower(state)").await?,
        };

        Ok(LeadSearchResult {
            results,
            total,
            limit: query.limit,
            offset: query.offset,
            facets,
        })
    }

    /// Count the filtered set grouped by one dimension expression.
    /// Null and empty group keys are dropped.
    async fn facet_counts(
        &self,
        query: &LeadSearchQuery,
        dimension: &str,
    ) -> Result<Vec<FacetCount>, AppError> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT ");
        qb.push(dimension).push(" AS value, count(*) FROM leads");
        query.filter.push_where(&mut qb);
        qb.push(" AND ")
            .push(dimension)
            .push(" IS NOT NULL AND ")
            .push(dimension)
            .push(" <> ''")
            .push(" GROUP BY 1 ORDER BY 2 DESC, 1 ASC");

        let rows: Vec<(String, i64)> = qb
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::DatabaseError)?;

        Ok(rows
            .into_iter()
            .map(|(value, count)| FacetCount { value, count })
            .collect())
    }

    /// Select records for a maintenance re-score pass.
    ///
    /// Without `force`, only records untouched since intake
    /// (`updated_at = created_at`) qualify; `force` re-scores the whole
    /// selected batch.
    pub async fn find_rescore_candidates(
        &self,
        limit: i64,
        force: bool,
        lead_ids: Option<&[Uuid]>,
    ) -> Result<Vec<LeadRecord>, AppError> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM leads WHERE 1=1");
        if !force {
            qb.push(" AND updated_at = created_at");
        }
        if let Some(ids) = lead_ids {
            qb.push(" AND id = ANY(").push_bind(ids.to_vec()).push(")");
        }
        qb.push(" ORDER BY created_at ASC LIMIT ").push_bind(limit);

        let records: Vec<LeadRecord> = qb
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::DatabaseError)?;

        Ok(records)
    }

    /// Write a freshly computed score set. Priority, insights, and tags are
    /// only ever written together with the score they were derived from.
    pub async fn apply_scoring(
        &self,
        id: Uuid,
        score: i32,
        priority: LeadPriority,
        insights: &LeadInsights,
        tags: &[String],
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE leads
            SET score = $2,
                priority = $3,
                insights = $4,
                tags = $5,
                updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(score)
        .bind(priority)
        .bind(Json(insights))
        .bind(tags.to_vec())
        .execute(&self.pool)
        .await
        .map_err(AppError::DatabaseError)?;

        Ok(())
    }

    /// Apply a derived enrichment to a record. Marketing attribution is
    /// merged into the existing jsonb rather than replaced, so UTM fields
    /// captured at submission time survive.
    pub async fn apply_enrichment(
        &self,
        id: Uuid,
        enrichment: &crate::enrichment::AppliedEnrichment,
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE leads
            SET headcount = $2,
                tags = $3,
                enrichment_status = $4,
                enrichment_notes = $5,
                marketing = COALESCE(marketing, '{}'::jsonb) || $6,
                insights = $7,
                updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(enrichment.headcount)
        .bind(enrichment.tags.clone())
        .bind(enrichment.enrichment_status)
        .bind(&enrichment.enrichment_notes)
        .bind(serde_json::json!({
            "lead_source": enrichment.lead_source,
            "utm_source": enrichment.utm_source,
        }))
        .bind(Json(&enrichment.insights))
        .execute(&self.pool)
        .await
        .map_err(AppError::DatabaseError)?;

        Ok(())
    }
}
