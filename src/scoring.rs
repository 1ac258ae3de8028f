//! Lead scoring, priority classification, insights, and tag derivation.
//!
//! Every function here is pure, synchronous, and total: for any well-formed
//! submission it produces a bounded output and never signals failure.
//! Unknown business types score through the `Other` branch; validation is
//! the handler layer's job, not ours.

use crate::models::{
    BusinessType, LeadInsights, LeadPriority, LeadSubmission, SoftwareTier, SubmissionType,
};

/// Upper bound on a lead score. Sums past this clamp down to it.
pub const MAX_SCORE: i32 = 100;

/// Score cut points for priority classification, evaluated high to low.
pub struct PriorityThresholds {
    pub hot: i32,
    pub warm: i32,
}

pub const PRIORITY_THRESHOLDS: PriorityThresholds = PriorityThresholds { hot: 80, warm: 55 };

/// Score cut points for the recommended software tier.
///
/// Currently identical to `PRIORITY_THRESHOLDS`, but the two tables evolve
/// independently. Neither is derived from the other.
pub struct TierThresholds {
    pub enterprise: i32,
    pub growth: i32,
}

pub const TIER_THRESHOLDS: TierThresholds = TierThresholds { enterprise: 80, growth: 55 };

/// Location-count tiers: (minimum locations, points). Highest qualifying
/// tier wins; ordered descending so the first match is the answer.
const LOCATION_TIERS: &[(i32, i32)] = &[(10, 20), (5, 12), (2, 5)];

/// Headcount tiers, same shape as `LOCATION_TIERS`.
const HEADCOUNT_TIERS: &[(i32, i32)] = &[(200, 15), (100, 10)];

/// Marketing channel bonuses keyed by utm_source substring, checked in
/// precedence order; first match wins.
const UTM_BONUSES: &[(&str, i32)] = &[("paid", 10), ("event", 8), ("referral", 6)];

/// States inside the regional service area.
const REGIONAL_STATES: &[&str] = &["nj", "pa", "de"];

const REGIONAL_BONUS: i32 = 10;
const HYPER_LOCAL_BONUS: i32 = 5;

fn base_points(business_type: BusinessType) -> i32 {
    match business_type {
        BusinessType::Restaurant => 35,
        BusinessType::Fleet => 25,
        BusinessType::Other => 15,
    }
}

fn submission_points(submission_type: SubmissionType) -> i32 {
    match submission_type {
        SubmissionType::Strategy => 25,
        SubmissionType::Pilot => 18,
    }
}

fn tier_points(value: Option<i32>, tiers: &[(i32, i32)]) -> i32 {
    let Some(value) = value else {
        return 0;
    };
    tiers
        .iter()
        .find(|(min, _)| value >= *min)
        .map(|(_, points)| *points)
        .unwrap_or(0)
}

fn utm_points(submission: &LeadSubmission) -> i32 {
    let Some(source) = submission
        .marketing
        .as_ref()
        .and_then(|m| m.utm_source.as_deref())
    else {
        return 0;
    };
    let source = source.to_lowercase();
    UTM_BONUSES
        .iter()
        .find(|(needle, _)| source.contains(needle))
        .map(|(_, points)| *points)
        .unwrap_or(0)
}

/// Compute the lead score: additive rule evaluation in fixed order,
/// clamped to `[0, MAX_SCORE]`.
pub fn score_lead(submission: &LeadSubmission) -> i32 {
    let mut score = 0;

    score += base_points(submission.business_type);
    score += submission_points(submission.submission_type);
    score += tier_points(submission.estimated_locations, LOCATION_TIERS);
    score += tier_points(submission.headcount, HEADCOUNT_TIERS);
    score += utm_points(submission);

    let city = submission.location.city.trim().to_lowercase();
    let state = submission.location.state.trim().to_lowercase();
    if REGIONAL_STATES.contains(&state.as_str()) {
        score += REGIONAL_BONUS;
    }
    // Additive on top of the regional bonus.
    if state == "nj" && city == "toms river" {
        score += HYPER_LOCAL_BONUS;
    }

    score.min(MAX_SCORE)
}

/// Classify a score into a priority tier.
pub fn determine_priority(score: i32) -> LeadPriority {
    if score >= PRIORITY_THRESHOLDS.hot {
        LeadPriority::Hot
    } else if score >= PRIORITY_THRESHOLDS.warm {
        LeadPriority::Warm
    } else {
        LeadPriority::Nurture
    }
}

/// Map a score to the recommended software tier.
pub fn ideal_software_tier(score: i32) -> SoftwareTier {
    if score >= TIER_THRESHOLDS.enterprise {
        SoftwareTier::Enterprise
    } else if score >= TIER_THRESHOLDS.growth {
        SoftwareTier::Growth
    } else {
        SoftwareTier::Starter
    }
}

/// Build the insight block for a scored submission.
///
/// Follow-up actions are appended, never replaced: the submission-type
/// action always comes first, then the multi-location and NJ actions when
/// their conditions hold.
pub fn build_lead_insights(submission: &LeadSubmission, score: i32) -> LeadInsights {
    let recommended_product_focus = match submission.business_type {
        BusinessType::Restaurant => "Food waste tracking & AP automation",
        BusinessType::Fleet => "Fleet compliance dashboards & maintenance scheduling",
        BusinessType::Other => "Operational intelligence starter package",
    };

    let mut follow_up_actions = Vec::new();
    match submission.submission_type {
        SubmissionType::Strategy => {
            follow_up_actions.push("Schedule strategy workshop within 24h".to_string());
        }
        SubmissionType::Pilot => {
            follow_up_actions.push("Offer pilot kickoff within 72h".to_string());
        }
    }
    if submission.estimated_locations.unwrap_or(0) >= 10 {
        follow_up_actions.push("Share multi-location ROI benchmarks".to_string());
    }
    if submission.location.state.trim().eq_ignore_ascii_case("nj") {
        follow_up_actions.push("Highlight local NJ support team availability".to_string());
    }

    LeadInsights {
        ideal_software_tier: ideal_software_tier(score),
        recommended_product_focus: recommended_product_focus.to_string(),
        follow_up_actions,
    }
}

/// Derive the tag set for a scored submission.
///
/// Insertion order is fixed: business type, submission type, priority,
/// then the conditional tags. The result is de-duplicated while keeping
/// first-insertion order.
pub fn derive_tags(submission: &LeadSubmission, priority: LeadPriority) -> Vec<String> {
    let mut tags = Vec::new();
    push_unique(&mut tags, submission.business_type.as_str().to_string());
    push_unique(
        &mut tags,
        format!("{}_request", submission.submission_type.as_str()),
    );
    push_unique(&mut tags, format!("{}_priority", priority.as_str()));

    if submission.estimated_locations.unwrap_or(0) >= 10 {
        push_unique(&mut tags, "multi_location".to_string());
    }
    if submission.headcount.unwrap_or(0) >= 200 {
        push_unique(&mut tags, "enterprise_headcount".to_string());
    }
    if submission.location.state.trim().eq_ignore_ascii_case("nj") {
        push_unique(&mut tags, "local_nj".to_string());
    }

    tags
}

fn push_unique(tags: &mut Vec<String>, tag: String) {
    if !tags.iter().any(|existing| *existing == tag) {
        tags.push(tag);
    }
}
