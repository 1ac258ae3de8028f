use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::postgres::PgRow;
use sqlx::types::Json;
use sqlx::{FromRow, Row};
use uuid::Uuid;

// ============ Domain Enumerations ============

/// Business category reported on the inquiry form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "business_type", rename_all = "lowercase")]
pub enum BusinessType {
    Restaurant,
    Fleet,
    Other,
}

// Unknown values deserialize to `Other` so that payloads from older form
// revisions still score through the default branch.
impl<'de> Deserialize<'de> for BusinessType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Ok(match value.trim().to_lowercase().as_str() {
            "restaurant" => BusinessType::Restaurant,
            "fleet" => BusinessType::Fleet,
            _ => BusinessType::Other,
        })
    }
}

impl BusinessType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BusinessType::Restaurant => "restaurant",
            BusinessType::Fleet => "fleet",
            BusinessType::Other => "other",
        }
    }
}

/// What the prospect asked for: a strategy workshop or a pilot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "submission_type", rename_all = "lowercase")]
pub enum SubmissionType {
    Strategy,
    Pilot,
}

impl SubmissionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubmissionType::Strategy => "strategy",
            SubmissionType::Pilot => "pilot",
        }
    }
}

/// Coarse urgency classification derived from the lead score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "lead_priority", rename_all = "lowercase")]
pub enum LeadPriority {
    Hot,
    Warm,
    Nurture,
}

impl LeadPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            LeadPriority::Hot => "hot",
            LeadPriority::Warm => "warm",
            LeadPriority::Nurture => "nurture",
        }
    }
}

/// Software tier the lead is likely to land on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SoftwareTier {
    Starter,
    Growth,
    Enterprise,
}

impl SoftwareTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            SoftwareTier::Starter => "starter",
            SoftwareTier::Growth => "growth",
            SoftwareTier::Enterprise => "enterprise",
        }
    }
}

/// Lifecycle of the domain-heuristic enrichment pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "enrichment_status", rename_all = "lowercase")]
pub enum EnrichmentStatus {
    Pending,
    Complete,
    Skipped,
}

// ============ Location & Marketing ============

/// A `[longitude, latitude]` pair.
///
/// Serialized as a two-element array to match the stored GeoJSON ordering.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint(pub f64, pub f64);

impl GeoPoint {
    pub fn longitude(&self) -> f64 {
        self.0
    }

    pub fn latitude(&self) -> f64 {
        self.1
    }
}

/// Location block on a submission. Coordinates are only present when the
/// (city, state) pair matched the geo reference table; absence is valid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeadLocation {
    /// City name as typed on the form.
    pub city: String,
    /// Two-letter state code.
    pub state: String,
    /// US ZIP, 5 or 5+4 digits.
    pub postal_code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<GeoPoint>,
}

/// Marketing attribution metadata, all optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LeadMarketingMeta {
    pub utm_source: Option<String>,
    pub utm_medium: Option<String>,
    pub utm_campaign: Option<String>,
    pub lead_source: Option<String>,
}

// ============ Submission & Record ============

/// Validated inbound lead submission. Immutable once accepted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeadSubmission {
    pub name: String,
    pub email: String,
    pub company: String,
    pub business_type: BusinessType,
    pub phone: String,
    #[serde(default)]
    pub message: Option<String>,
    pub submission_type: SubmissionType,
    pub location: LeadLocation,
    /// Self-reported number of physical locations.
    #[serde(default)]
    pub estimated_locations: Option<i32>,
    /// Self-reported employee count.
    #[serde(default)]
    pub headcount: Option<i32>,
    #[serde(default)]
    pub marketing: Option<LeadMarketingMeta>,
}

/// Insights derived from the submission at scoring time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeadInsights {
    pub ideal_software_tier: SoftwareTier,
    pub recommended_product_focus: String,
    /// Ordered, append-only list of recommended follow-ups.
    pub follow_up_actions: Vec<String>,
}

/// Persisted lead row: the submission plus every field the scoring,
/// enrichment, and maintenance paths own.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeadRecord {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub company: String,
    pub business_type: BusinessType,
    pub phone: String,
    pub message: Option<String>,
    pub submission_type: SubmissionType,
    pub location: LeadLocation,
    pub estimated_locations: Option<i32>,
    pub headcount: Option<i32>,
    pub marketing: Option<LeadMarketingMeta>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Clamped to [0, 100].
    pub score: i32,
    pub priority: LeadPriority,
    pub insights: LeadInsights,
    pub enrichment_status: EnrichmentStatus,
    pub enrichment_notes: Option<String>,
    /// De-duplicated, insertion-ordered tag set.
    pub tags: Option<Vec<String>>,
}

impl LeadRecord {
    /// Rebuilds the submission view of this record, e.g. for re-scoring.
    pub fn as_submission(&self) -> LeadSubmission {
        LeadSubmission {
            name: self.name.clone(),
            email: self.email.clone(),
            company: self.company.clone(),
            business_type: self.business_type,
            phone: self.phone.clone(),
            message: self.message.clone(),
            submission_type: self.submission_type,
            location: self.location.clone(),
            estimated_locations: self.estimated_locations,
            headcount: self.headcount,
            marketing: self.marketing.clone(),
        }
    }
}

// Location and marketing are flattened into columns (city/state/postal_code,
// geo_lon/geo_lat, marketing jsonb), so the row is assembled by hand.
impl<'r> FromRow<'r, PgRow> for LeadRecord {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        let geo_lon: Option<f64> = row.try_get("geo_lon")?;
        let geo_lat: Option<f64> = row.try_get("geo_lat")?;
        let coordinates = match (geo_lon, geo_lat) {
            (Some(lon), Some(lat)) => Some(GeoPoint(lon, lat)),
            _ => None,
        };

        let marketing: Option<Json<LeadMarketingMeta>> = row.try_get("marketing")?;
        let insights: Json<LeadInsights> = row.try_get("insights")?;

        Ok(LeadRecord {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            email: row.try_get("email")?,
            company: row.try_get("company")?,
            business_type: row.try_get("business_type")?,
            phone: row.try_get("phone")?,
            message: row.try_get("message")?,
            submission_type: row.try_get("submission_type")?,
            location: LeadLocation {
                city: row.try_get("city")?,
                state: row.try_get("state")?,
                postal_code: row.try_get("postal_code")?,
                coordinates,
            },
            estimated_locations: row.try_get("estimated_locations")?,
            headcount: row.try_get("headcount")?,
            marketing: marketing.map(|m| m.0),
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
            score: row.try_get("score")?,
            priority: row.try_get("priority")?,
            insights: insights.0,
            enrichment_status: row.try_get("enrichment_status")?,
            enrichment_notes: row.try_get("enrichment_notes")?,
            tags: row.try_get("tags")?,
        })
    }
}

// ============ API Request/Response Models ============

/// Response payload for a lead submission.
#[derive(Debug, Serialize)]
pub struct SubmitLeadResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<LeadPriority>,
    /// Set when the submission was swallowed by the dedup window.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub duplicate: bool,
}

/// Request body for the maintenance re-score pass.
#[derive(Debug, Default, Deserialize)]
pub struct RescoreRequest {
    /// Batch size, clamped to [1, 500]. Defaults to 50.
    pub limit: Option<i64>,
    /// Re-score records that already carry a score.
    #[serde(default)]
    pub force: bool,
    /// Restrict the pass to specific records.
    pub lead_ids: Option<Vec<Uuid>>,
}

/// Per-record outcome of a re-score pass.
#[derive(Debug, Serialize)]
pub struct RescoreOutcome {
    pub id: Uuid,
    pub score: i32,
    pub priority: LeadPriority,
}

#[derive(Debug, Serialize)]
pub struct RescoreResponse {
    pub success: bool,
    pub processed: usize,
    pub results: Vec<RescoreOutcome>,
}

// ============ Search Envelope ============

/// One facet bucket: a group key and how many filtered records carry it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetCount {
    pub value: String,
    pub count: i64,
}

/// Facet breakdowns computed over the full filtered set, not the page.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LeadSearchFacets {
    pub business_types: Vec<FacetCount>,
    pub submission_types: Vec<FacetCount>,
    pub priorities: Vec<FacetCount>,
    pub states: Vec<FacetCount>,
}

/// Search result envelope.
#[derive(Debug, Serialize)]
pub struct LeadSearchResult {
    pub results: Vec<LeadRecord>,
    /// Size of the filtered set, independent of the pagination window.
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
    pub facets: LeadSearchFacets,
}
