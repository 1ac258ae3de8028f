/// Tests for search parameter parsing and filter compilation
/// The filter compiles to SQL; these tests exercise the criteria logic
/// without a database.
use lead_intel_api::models::{BusinessType, GeoPoint, LeadPriority};
use lead_intel_api::search::{LeadFilter, LeadSearchParams, DEFAULT_LIMIT, MAX_LIMIT};
use sqlx::{Postgres, QueryBuilder};

fn params() -> LeadSearchParams {
    LeadSearchParams::default()
}

#[cfg(test)]
mod parameter_parsing {
    use super::*;

    #[test]
    fn empty_bag_yields_defaults() {
        let query = params().parse();
        assert_eq!(query.limit, DEFAULT_LIMIT);
        assert_eq!(query.offset, 0);
        assert!(query.filter.query.is_none());
        assert!(query.filter.business_type.is_none());
        assert!(query.filter.geo.is_none());
    }

    #[test]
    fn limit_clamps_to_valid_window() {
        let mut p = params();
        p.limit = Some("500".to_string());
        assert_eq!(p.parse().limit, MAX_LIMIT);

        p.limit = Some("-10".to_string());
        assert_eq!(p.parse().limit, 1);

        p.limit = Some("75".to_string());
        assert_eq!(p.parse().limit, 75);
    }

    #[test]
    fn non_numeric_parameters_never_crash_the_parse() {
        let mut p = params();
        p.limit = Some("a lot".to_string());
        p.offset = Some("two".to_string());
        p.score_min = Some("high".to_string());
        p.radius_miles = Some("close".to_string());
        p.lon = Some("west".to_string());
        p.lat = Some("north".to_string());
        p.date_from = Some("last tuesday".to_string());

        let query = p.parse();
        assert_eq!(query.limit, DEFAULT_LIMIT);
        assert_eq!(query.offset, 0);
        assert!(query.filter.score_min.is_none());
        assert!(query.filter.geo.is_none());
        assert!(query.filter.created_from.is_none());
    }

    #[test]
    fn enum_filters_parse_case_insensitively() {
        let mut p = params();
        p.business_type = Some("Restaurant".to_string());
        p.priority = Some("HOT".to_string());
        let query = p.parse();
        assert_eq!(query.filter.business_type, Some(BusinessType::Restaurant));
        assert_eq!(query.filter.priority, Some(LeadPriority::Hot));
    }

    #[test]
    fn blank_text_filters_are_absent() {
        let mut p = params();
        p.q = Some("   ".to_string());
        p.city = Some("".to_string());
        let query = p.parse();
        assert!(query.filter.query.is_none());
        assert!(query.filter.city.is_none());
    }
}

#[cfg(test)]
mod geo_filter_rules {
    use super::*;

    #[test]
    fn radius_with_known_city_state_activates_geo() {
        let mut p = params();
        p.radius_miles = Some("25".to_string());
        p.city = Some("Camden".to_string());
        p.state = Some("NJ".to_string());
        let geo = p.parse().filter.geo.expect("geo should activate");
        assert_eq!(geo.center, GeoPoint(-75.1196, 39.9259));
    }

    #[test]
    fn explicit_center_wins_over_city_state() {
        let mut p = params();
        p.radius_miles = Some("25".to_string());
        p.lon = Some("-75.0".to_string());
        p.lat = Some("39.9".to_string());
        p.city = Some("Camden".to_string());
        p.state = Some("NJ".to_string());
        let geo = p.parse().filter.geo.unwrap();
        assert_eq!(geo.center, GeoPoint(-75.0, 39.9));
    }

    #[test]
    fn unresolvable_center_drops_geo_but_keeps_other_filters() {
        let mut p = params();
        p.radius_miles = Some("25".to_string());
        p.city = Some("Springfield".to_string());
        p.state = Some("OR".to_string());
        p.business_type = Some("fleet".to_string());
        let query = p.parse();
        assert!(query.filter.geo.is_none());
        assert_eq!(query.filter.business_type, Some(BusinessType::Fleet));
        assert_eq!(query.filter.city.as_deref(), Some("Springfield"));
    }

    #[test]
    fn partial_explicit_center_falls_back_to_lookup() {
        // Only lat given: not a usable explicit center, city/state resolves
        let mut p = params();
        p.radius_miles = Some("25".to_string());
        p.lat = Some("39.9".to_string());
        p.city = Some("Trenton".to_string());
        p.state = Some("NJ".to_string());
        let geo = p.parse().filter.geo.unwrap();
        assert_eq!(geo.center, GeoPoint(-74.7439, 40.2171));
    }

    #[test]
    fn center_without_radius_is_not_a_geo_filter() {
        let mut p = params();
        p.lon = Some("-74.0".to_string());
        p.lat = Some("40.0".to_string());
        assert!(p.parse().filter.geo.is_none());
    }
}

#[cfg(test)]
mod filter_compilation {
    use super::*;

    fn compiled_sql(filter: &LeadFilter) -> String {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT count(*) FROM leads");
        filter.push_where(&mut qb);
        qb.sql().to_string()
    }

    #[test]
    fn empty_filter_compiles_to_bare_where() {
        let sql = compiled_sql(&LeadFilter::default());
        assert!(sql.ends_with("WHERE 1=1"));
    }

    #[test]
    fn each_present_criterion_contributes_one_predicate() {
        let mut p = params();
        p.business_type = Some("restaurant".to_string());
        p.submission_type = Some("strategy".to_string());
        p.score_min = Some("55".to_string());
        p.priority = Some("hot".to_string());
        p.state = Some("NJ".to_string());
        p.city = Some("Newark".to_string());
        p.date_from = Some("2025-01-01".to_string());
        p.date_to = Some("2025-12-31".to_string());
        let sql = compiled_sql(&p.parse().filter);

        assert!(sql.contains("business_type ="));
        assert!(sql.contains("submission_type ="));
        assert!(sql.contains("score >="));
        assert!(sql.contains("priority ="));
        assert!(sql.contains("lower(state) ="));
        assert!(sql.contains("lower(city) ="));
        assert!(sql.contains("created_at >="));
        assert!(sql.contains("created_at <="));
    }

    #[test]
    fn text_query_adds_relevance_stage_and_ranked_ordering() {
        let mut p = params();
        p.q = Some("food waste".to_string());
        let filter = p.parse().filter;

        let sql = compiled_sql(&filter);
        assert!(sql.contains("plainto_tsquery"));

        let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM leads");
        filter.push_where(&mut qb);
        filter.push_order_by(&mut qb);
        let sql = qb.sql().to_string();
        assert!(sql.contains("ts_rank"));
        assert!(sql.contains("created_at DESC"));
    }

    #[test]
    fn geo_predicate_guards_against_missing_coordinates() {
        let mut p = params();
        p.radius_miles = Some("10".to_string());
        p.lon = Some("-74.1979".to_string());
        p.lat = Some("39.9537".to_string());
        let sql = compiled_sql(&p.parse().filter);
        assert!(sql.contains("geo_lon IS NOT NULL"));
        assert!(sql.contains("geo_lat IS NOT NULL"));
        assert!(sql.contains("asin(sqrt"));
    }

    #[test]
    fn no_text_query_orders_newest_first() {
        let filter = LeadFilter::default();
        let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM leads");
        filter.push_order_by(&mut qb);
        assert!(qb.sql().contains("ORDER BY created_at DESC"));
        assert!(!qb.sql().contains("ts_rank"));
    }
}
