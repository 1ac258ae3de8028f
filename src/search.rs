//! Lead search criteria: defensive query-parameter parsing, the typed
//! filter object, and its compilation to SQL predicates.
//!
//! The filter is the single source of truth for "the filtered set": the
//! count, page, and facet queries in `lead_storage` all compile from the
//! same `LeadFilter`, so facet totals always partition the same records the
//! page was drawn from.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use sqlx::{Postgres, QueryBuilder};

use crate::geo;
use crate::models::{BusinessType, GeoPoint, LeadPriority, SubmissionType};

pub const DEFAULT_LIMIT: i64 = 50;
pub const MAX_LIMIT: i64 = 200;

const EARTH_RADIUS_MILES: f64 = 3958.8;

// ============ Raw Parameters ============

/// Raw query-string bag. Every field arrives as text; numeric and enum
/// values are parsed defensively, so anything malformed is treated as
/// absent, never as an error.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LeadSearchParams {
    /// Free-text query.
    pub q: Option<String>,
    pub business_type: Option<String>,
    pub submission_type: Option<String>,
    pub score_min: Option<String>,
    pub priority: Option<String>,
    pub state: Option<String>,
    pub city: Option<String>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
    /// Geo radius in miles; activates the geo filter when a center resolves.
    pub radius_miles: Option<String>,
    /// Explicit geo center, takes precedence over city/state resolution.
    pub lon: Option<String>,
    pub lat: Option<String>,
    pub limit: Option<String>,
    pub offset: Option<String>,
}

fn parse_business_type(value: &str) -> Option<BusinessType> {
    match value.trim().to_lowercase().as_str() {
        "restaurant" => Some(BusinessType::Restaurant),
        "fleet" => Some(BusinessType::Fleet),
        "other" => Some(BusinessType::Other),
        _ => None,
    }
}

fn parse_submission_type(value: &str) -> Option<SubmissionType> {
    match value.trim().to_lowercase().as_str() {
        "strategy" => Some(SubmissionType::Strategy),
        "pilot" => Some(SubmissionType::Pilot),
        _ => None,
    }
}

fn parse_priority(value: &str) -> Option<LeadPriority> {
    match value.trim().to_lowercase().as_str() {
        "hot" => Some(LeadPriority::Hot),
        "warm" => Some(LeadPriority::Warm),
        "nurture" => Some(LeadPriority::Nurture),
        _ => None,
    }
}

/// Accept RFC 3339 timestamps or bare `YYYY-MM-DD` dates (midnight UTC).
fn parse_date(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

fn non_empty(value: Option<&String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl LeadSearchParams {
    /// Parse the raw bag into a typed query: filter + clamped window.
    pub fn parse(&self) -> LeadSearchQuery {
        let limit = self
            .limit
            .as_deref()
            .and_then(|v| v.trim().parse::<i64>().ok())
            .unwrap_or(DEFAULT_LIMIT)
            .clamp(1, MAX_LIMIT);
        let offset = self
            .offset
            .as_deref()
            .and_then(|v| v.trim().parse::<i64>().ok())
            .unwrap_or(0)
            .max(0);

        let city = non_empty(self.city.as_ref());
        let state = non_empty(self.state.as_ref());

        let filter = LeadFilter {
            query: non_empty(self.q.as_ref()),
            business_type: self.business_type.as_deref().and_then(parse_business_type),
            submission_type: self
                .submission_type
                .as_deref()
                .and_then(parse_submission_type),
            score_min: self
                .score_min
                .as_deref()
                .and_then(|v| v.trim().parse::<i32>().ok()),
            priority: self.priority.as_deref().and_then(parse_priority),
            state: state.clone(),
            city: city.clone(),
            created_from: self.date_from.as_deref().and_then(parse_date),
            created_to: self.date_to.as_deref().and_then(parse_date),
            geo: self.resolve_geo(city.as_deref(), state.as_deref()),
        };

        LeadSearchQuery {
            filter,
            limit,
            offset,
        }
    }

    /// Resolve the geo filter: requires a positive radius plus a center.
    /// Explicit coordinates win; otherwise the city/state pair goes through
    /// the geo resolver. No resolvable center means no geo filter.
    fn resolve_geo(&self, city: Option<&str>, state: Option<&str>) -> Option<GeoFilter> {
        let radius = self
            .radius_miles
            .as_deref()
            .and_then(|v| v.trim().parse::<f64>().ok())
            .filter(|r| r.is_finite() && *r > 0.0)?;

        let explicit = match (
            self.lon.as_deref().and_then(|v| v.trim().parse::<f64>().ok()),
            self.lat.as_deref().and_then(|v| v.trim().parse::<f64>().ok()),
        ) {
            (Some(lon), Some(lat)) => Some(GeoPoint(lon, lat)),
            _ => None,
        };

        let center = explicit.or_else(|| match (city, state) {
            (Some(city), Some(state)) => geo::resolve_coordinates(city, state),
            _ => None,
        })?;

        Some(GeoFilter {
            center,
            radius_miles: radius,
        })
    }
}

// ============ Typed Criteria ============

/// Radius filter around a resolved center point.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoFilter {
    pub center: GeoPoint,
    pub radius_miles: f64,
}

/// Typed search criteria. All present filters combine with AND semantics.
#[derive(Debug, Clone, Default)]
pub struct LeadFilter {
    pub query: Option<String>,
    pub business_type: Option<BusinessType>,
    pub submission_type: Option<SubmissionType>,
    pub score_min: Option<i32>,
    pub priority: Option<LeadPriority>,
    pub state: Option<String>,
    pub city: Option<String>,
    pub created_from: Option<DateTime<Utc>>,
    pub created_to: Option<DateTime<Utc>>,
    pub geo: Option<GeoFilter>,
}

/// A parsed search request: criteria plus the clamped pagination window.
#[derive(Debug, Clone)]
pub struct LeadSearchQuery {
    pub filter: LeadFilter,
    pub limit: i64,
    pub offset: i64,
}

/// Expression over the text columns fed to the full-text stage.
const SEARCH_DOCUMENT: &str =
    "to_tsvector('english', name || ' ' || company || ' ' || email || ' ' || coalesce(message, ''))";

impl LeadFilter {
    /// Append the WHERE clause for this filter to a query under
    /// construction. Every query over "the filtered set" goes through here.
    pub fn push_where(&self, qb: &mut QueryBuilder<Postgres>) {
        qb.push(" WHERE 1=1");

        // Text-relevance stage first: it narrows the candidate set the
        // structured predicates then filter.
        if let Some(query) = &self.query {
            qb.push(" AND ")
                .push(SEARCH_DOCUMENT)
                .push(" @@ plainto_tsquery('english', ")
                .push_bind(query.clone())
                .push(")");
        }

        if let Some(business_type) = self.business_type {
            qb.push(" AND business_type = ").push_bind(business_type);
        }
        if let Some(submission_type) = self.submission_type {
            qb.push(" AND submission_type = ").push_bind(submission_type);
        }
        if let Some(score_min) = self.score_min {
            qb.push(" AND score >= ").push_bind(score_min);
        }
        if let Some(priority) = self.priority {
            qb.push(" AND priority = ").push_bind(priority);
        }
        if let Some(state) = &self.state {
            qb.push(" AND lower(state) = ")
                .push_bind(state.to_lowercase());
        }
        if let Some(city) = &self.city {
            qb.push(" AND lower(city) = ").push_bind(city.to_lowercase());
        }
        if let Some(from) = self.created_from {
            qb.push(" AND created_at >= ").push_bind(from);
        }
        if let Some(to) = self.created_to {
            qb.push(" AND created_at <= ").push_bind(to);
        }

        if let Some(geo) = &self.geo {
            // Haversine distance in miles over the stored coordinates;
            // rows without coordinates never match a geo filter.
            qb.push(" AND geo_lon IS NOT NULL AND geo_lat IS NOT NULL AND ")
                .push(format!("{:.1}", EARTH_RADIUS_MILES))
                .push(" * 2 * asin(sqrt(pow(sin(radians(geo_lat - ")
                .push_bind(geo.center.latitude())
                .push(") / 2), 2) + cos(radians(")
                .push_bind(geo.center.latitude())
                .push(")) * cos(radians(geo_lat)) * pow(sin(radians(geo_lon - ")
                .push_bind(geo.center.longitude())
                .push(") / 2), 2))) <= ")
                .push_bind(geo.radius_miles);
        }
    }

    /// Append the ordering for the result page: text relevance first when a
    /// query is present, newest-first as the stable tiebreak.
    pub fn push_order_by(&self, qb: &mut QueryBuilder<Postgres>) {
        if let Some(query) = &self.query {
            qb.push(" ORDER BY ts_rank(")
                .push(SEARCH_DOCUMENT)
                .push(", plainto_tsquery('english', ")
                .push_bind(query.clone())
                .push(")) DESC, created_at DESC");
        } else {
            qb.push(" ORDER BY created_at DESC");
        }
    }
}
