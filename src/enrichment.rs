//! Domain-heuristic enrichment and submission validators.
//!
//! Enrichment is a one-shot, idempotent re-derivation: the same
//! (domain, business type) input always yields byte-identical output.
//! There is no external lookup; the rule table below is the whole source.

use crate::models::{BusinessType, EnrichmentStatus, LeadInsights, SoftwareTier};
use regex::Regex;
use serde::Serialize;

// ============ Domain Heuristics ============

/// One firmographic classification rule. `needles` are matched as
/// case-insensitive substrings of the email domain; rules are evaluated in
/// table order and the first match wins.
struct DomainRule {
    needles: &'static [&'static str],
    estimated_headcount: i32,
    lead_source: &'static str,
    utm_source: &'static str,
    tier: SoftwareTier,
    tags: &'static [&'static str],
    follow_ups: &'static [&'static str],
}

const DOMAIN_RULES: &[DomainRule] = &[
    DomainRule {
        needles: &["group"],
        estimated_headcount: 500,
        lead_source: "account_based",
        utm_source: "account_based",
        tier: SoftwareTier::Enterprise,
        tags: &["enterprise", "abm_target"],
        follow_ups: &["Route to enterprise AE", "Invite to executive briefing"],
    },
    DomainRule {
        needles: &["cafe", "dining"],
        estimated_headcount: 150,
        lead_source: "inbound_content",
        utm_source: "seo",
        tier: SoftwareTier::Growth,
        tags: &["hospitality", "regional_chain"],
        follow_ups: &["Share food waste case study", "Offer analytics walkthrough"],
    },
];

const FALLBACK_RULE: DomainRule = DomainRule {
    needles: &[],
    estimated_headcount: 75,
    lead_source: "organic",
    utm_source: "direct",
    tier: SoftwareTier::Starter,
    tags: &["smb"],
    follow_ups: &["Send personalized onboarding plan"],
};

/// Enrichment fields to apply to a lead record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppliedEnrichment {
    pub headcount: i32,
    pub tags: Vec<String>,
    pub enrichment_status: EnrichmentStatus,
    pub enrichment_notes: String,
    pub lead_source: String,
    pub utm_source: String,
    pub insights: LeadInsights,
}

/// Extract the domain part of an email address.
pub fn email_domain(email: &str) -> &str {
    email
        .split_once('@')
        .map(|(_, domain)| domain)
        .filter(|domain| !domain.is_empty())
        .unwrap_or("unknown.com")
}

/// Derive enrichment fields from an email domain and business type.
///
/// Pure function: no hidden state, safe to re-run on the same record.
pub fn derive_enrichment(domain: &str, business_type: BusinessType) -> AppliedEnrichment {
    let lower = domain.to_lowercase();
    let rule = DOMAIN_RULES
        .iter()
        .find(|rule| rule.needles.iter().any(|needle| lower.contains(needle)))
        .unwrap_or(&FALLBACK_RULE);

    let recommended_product_focus = match business_type {
        BusinessType::Fleet => "Fleet compliance automation",
        _ => "Food waste + AP automation bundle",
    };

    AppliedEnrichment {
        headcount: rule.estimated_headcount,
        tags: rule.tags.iter().map(|t| t.to_string()).collect(),
        enrichment_status: EnrichmentStatus::Complete,
        enrichment_notes: format!("Enriched via domain heuristics ({})", domain),
        lead_source: rule.lead_source.to_string(),
        utm_source: rule.utm_source.to_string(),
        insights: LeadInsights {
            ideal_software_tier: rule.tier,
            recommended_product_focus: recommended_product_focus.to_string(),
            follow_up_actions: rule.follow_ups.iter().map(|f| f.to_string()).collect(),
        },
    }
}

// ============ Submission Validators ============

/// Validate an email address.
///
/// Checks for:
/// - Basic email format (contains @ and .)
/// - Fake/placeholder patterns (repeated digits like 9999, 1111)
/// - Minimum length requirements
/// - Valid domain structure
pub fn is_valid_email(email: &str) -> bool {
    if email.len() < 5 || !email.contains('@') || !email.contains('.') {
        return false;
    }

    // Placeholder addresses people type to get past the form
    let fake_patterns = ["999999", "111111", "000000", "123456789"];
    for pattern in &fake_patterns {
        if email.contains(pattern) {
            tracing::warn!("Rejected email (fake pattern '{}'): {}", pattern, email);
            return false;
        }
    }

    // RFC 5322 simplified email regex
    let email_regex = Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$"
    ).unwrap();

    if !email_regex.is_match(email) {
        tracing::warn!("Rejected email (format): {}", email);
        return false;
    }

    true
}

/// Validate a US ZIP code: 5 digits or 5+4.
pub fn is_valid_zip(zip: &str) -> bool {
    let zip_regex = Regex::new(r"^[0-9]{5}(-[0-9]{4})?$").unwrap();
    zip_regex.is_match(zip.trim())
}

/// Validate and normalize a US phone number to E.164 (+17325550100).
///
/// Returns `None` when the number does not parse as a valid US number.
pub fn normalize_us_phone(raw: &str) -> Option<String> {
    use phonenumber::country::Id as CountryId;
    use phonenumber::Mode;

    if raw.trim().is_empty() || raw.len() < 8 {
        return None;
    }

    match phonenumber::parse(Some(CountryId::US), raw) {
        Ok(number) if phonenumber::is_valid(&number) => {
            Some(number.format().mode(Mode::E164).to_string())
        }
        Ok(_) => {
            tracing::warn!("Invalid US phone number: {}", raw);
            None
        }
        Err(e) => {
            tracing::warn!("Failed to parse US phone '{}': {:?}", raw, e);
            None
        }
    }
}
