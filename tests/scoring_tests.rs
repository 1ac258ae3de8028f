/// Unit tests for the scoring pipeline
/// Tests scoring rules, priority boundaries, insights, tags, and enrichment
use lead_intel_api::enrichment::{derive_enrichment, email_domain};
use lead_intel_api::models::{
    BusinessType, LeadLocation, LeadMarketingMeta, LeadPriority, LeadSubmission, SoftwareTier,
    SubmissionType,
};
use lead_intel_api::scoring::{
    build_lead_insights, derive_tags, determine_priority, score_lead, MAX_SCORE,
};

fn base_submission() -> LeadSubmission {
    LeadSubmission {
        name: "Jordan Reyes".to_string(),
        email: "jordan@example.com".to_string(),
        company: "Example Ops".to_string(),
        business_type: BusinessType::Other,
        phone: "+17325550142".to_string(),
        message: None,
        submission_type: SubmissionType::Pilot,
        location: LeadLocation {
            city: "Boise".to_string(),
            state: "ID".to_string(),
            postal_code: "83702".to_string(),
            coordinates: None,
        },
        estimated_locations: None,
        headcount: None,
        marketing: None,
    }
}

#[cfg(test)]
mod scoring_boundaries {
    use super::*;

    #[test]
    fn priority_boundary_at_hot_threshold() {
        assert_eq!(determine_priority(80), LeadPriority::Hot);
        assert_eq!(determine_priority(79), LeadPriority::Warm);
    }

    #[test]
    fn priority_boundary_at_warm_threshold() {
        assert_eq!(determine_priority(55), LeadPriority::Warm);
        assert_eq!(determine_priority(54), LeadPriority::Nurture);
    }

    #[test]
    fn score_is_clamped_when_every_bonus_applies() {
        let mut lead = base_submission();
        lead.business_type = BusinessType::Restaurant;
        lead.submission_type = SubmissionType::Strategy;
        lead.estimated_locations = Some(12);
        lead.headcount = Some(250);
        lead.marketing = Some(LeadMarketingMeta {
            utm_source: Some("paid_search".to_string()),
            ..Default::default()
        });
        lead.location.city = "Toms River".to_string();
        lead.location.state = "NJ".to_string();

        // Raw sum is 35+25+20+15+10+10+5 = 120
        let score = score_lead(&lead);
        assert_eq!(score, MAX_SCORE);
        assert_eq!(determine_priority(score), LeadPriority::Hot);

        let insights = build_lead_insights(&lead, score);
        assert_eq!(insights.ideal_software_tier, SoftwareTier::Enterprise);
    }

    #[test]
    fn minimum_possible_score_is_well_above_zero() {
        // other + pilot with nothing else is the floor: 15 + 18
        let lead = base_submission();
        assert_eq!(score_lead(&lead), 33);
        assert_eq!(determine_priority(score_lead(&lead)), LeadPriority::Nurture);
    }
}

#[cfg(test)]
mod insight_tests {
    use super::*;

    #[test]
    fn product_focus_tracks_business_type() {
        let mut lead = base_submission();
        lead.business_type = BusinessType::Restaurant;
        let insights = build_lead_insights(&lead, 50);
        assert_eq!(
            insights.recommended_product_focus,
            "Food waste tracking & AP automation"
        );

        lead.business_type = BusinessType::Fleet;
        let insights = build_lead_insights(&lead, 50);
        assert_eq!(
            insights.recommended_product_focus,
            "Fleet compliance dashboards & maintenance scheduling"
        );

        lead.business_type = BusinessType::Other;
        let insights = build_lead_insights(&lead, 50);
        assert_eq!(
            insights.recommended_product_focus,
            "Operational intelligence starter package"
        );
    }

    #[test]
    fn follow_up_actions_compose_independently() {
        // Pilot outside NJ, small footprint: one action
        let lead = base_submission();
        let insights = build_lead_insights(&lead, 40);
        assert_eq!(
            insights.follow_up_actions,
            vec!["Offer pilot kickoff within 72h"]
        );

        // Strategy + multi-location + NJ: all three, in order
        let mut lead = base_submission();
        lead.submission_type = SubmissionType::Strategy;
        lead.estimated_locations = Some(10);
        lead.location.state = "nj".to_string();
        let insights = build_lead_insights(&lead, 90);
        assert_eq!(
            insights.follow_up_actions,
            vec![
                "Schedule strategy workshop within 24h",
                "Share multi-location ROI benchmarks",
                "Highlight local NJ support team availability",
            ]
        );
    }

    #[test]
    fn insights_are_idempotent() {
        let mut lead = base_submission();
        lead.business_type = BusinessType::Fleet;
        lead.estimated_locations = Some(11);
        let first = build_lead_insights(&lead, 70);
        let second = build_lead_insights(&lead, 70);
        assert_eq!(first, second);
    }

    #[test]
    fn nine_locations_does_not_trigger_benchmark_action() {
        let mut lead = base_submission();
        lead.estimated_locations = Some(9);
        let insights = build_lead_insights(&lead, 40);
        assert_eq!(insights.follow_up_actions.len(), 1);
    }
}

#[cfg(test)]
mod tag_tests {
    use super::*;

    #[test]
    fn full_tag_set_in_derivation_order() {
        let mut lead = base_submission();
        lead.business_type = BusinessType::Restaurant;
        lead.submission_type = SubmissionType::Strategy;
        lead.estimated_locations = Some(12);
        lead.headcount = Some(250);
        lead.location.state = "NJ".to_string();

        let tags = derive_tags(&lead, LeadPriority::Hot);
        assert_eq!(
            tags,
            vec![
                "restaurant",
                "strategy_request",
                "hot_priority",
                "multi_location",
                "enterprise_headcount",
                "local_nj",
            ]
        );
    }

    #[test]
    fn tags_never_contain_duplicates() {
        let mut lead = base_submission();
        lead.location.state = "NJ".to_string();
        lead.headcount = Some(500);
        let tags = derive_tags(&lead, LeadPriority::Warm);
        let unique: std::collections::HashSet<_> = tags.iter().collect();
        assert_eq!(unique.len(), tags.len());
    }
}

#[cfg(test)]
mod enrichment_heuristic_tests {
    use super::*;

    #[test]
    fn enrichment_is_idempotent_and_deterministic() {
        let first = derive_enrichment("shoregroup.com", BusinessType::Restaurant);
        let second = derive_enrichment("shoregroup.com", BusinessType::Restaurant);
        assert_eq!(first, second);
    }

    #[test]
    fn domain_rules_first_match_wins() {
        // "group" is checked before "cafe"; a domain with both classifies
        // as enterprise
        let enrichment = derive_enrichment("cafegroup.com", BusinessType::Restaurant);
        assert_eq!(enrichment.headcount, 500);
        assert_eq!(
            enrichment.insights.ideal_software_tier,
            SoftwareTier::Enterprise
        );
    }

    #[test]
    fn enrichment_notes_mention_the_domain() {
        let enrichment = derive_enrichment("example.com", BusinessType::Other);
        assert_eq!(
            enrichment.enrichment_notes,
            "Enriched via domain heuristics (example.com)"
        );
    }

    #[test]
    fn email_without_domain_falls_back_to_unknown() {
        let domain = email_domain("malformed-address");
        let enrichment = derive_enrichment(domain, BusinessType::Other);
        assert_eq!(enrichment.headcount, 75);
        assert!(enrichment.enrichment_notes.contains("unknown.com"));
    }
}

#[cfg(test)]
mod robustness_tests {
    use super::*;

    #[test]
    fn unknown_business_type_deserializes_to_other() {
        let parsed: BusinessType = serde_json::from_str("\"food_truck\"").unwrap();
        assert_eq!(parsed, BusinessType::Other);

        let parsed: BusinessType = serde_json::from_str("\"Restaurant\"").unwrap();
        assert_eq!(parsed, BusinessType::Restaurant);
    }

    #[test]
    fn unknown_business_type_still_scores_through_default_branch() {
        let mut lead = base_submission();
        lead.business_type = serde_json::from_str("\"laundromat\"").unwrap();
        // other 15 + pilot 18
        assert_eq!(score_lead(&lead), 33);
    }
}

#[cfg(test)]
mod geo_tests {
    use lead_intel_api::geo::resolve_coordinates;
    use lead_intel_api::models::GeoPoint;

    #[test]
    fn known_pair_resolves() {
        let point = resolve_coordinates("Toms River", "NJ");
        assert_eq!(point, Some(GeoPoint(-74.1979, 39.9537)));
    }

    #[test]
    fn unknown_pair_is_a_normal_outcome() {
        assert_eq!(resolve_coordinates("Nowhere", "ZZ"), None);
    }

    #[test]
    fn resolution_is_case_and_whitespace_insensitive() {
        assert_eq!(
            resolve_coordinates(" toms river ", "nj"),
            resolve_coordinates("Toms River", "NJ")
        );
    }
}
