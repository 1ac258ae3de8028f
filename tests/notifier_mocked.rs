/// Integration tests for the lead notification webhook, with the receiving
/// end mocked. No real webhook is ever hit.
use chrono::Utc;
use lead_intel_api::models::{
    BusinessType, EnrichmentStatus, GeoPoint, LeadInsights, LeadLocation, LeadPriority,
    LeadRecord, SoftwareTier, SubmissionType,
};
use lead_intel_api::notifier::LeadNotifier;
use uuid::Uuid;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn sample_lead() -> LeadRecord {
    let now = Utc::now();
    LeadRecord {
        id: Uuid::new_v4(),
        name: "Dana Whitfield".to_string(),
        email: "dana@shorecafe.com".to_string(),
        company: "Shore Cafe".to_string(),
        business_type: BusinessType::Restaurant,
        phone: "+17325550177".to_string(),
        message: None,
        submission_type: SubmissionType::Strategy,
        location: LeadLocation {
            city: "Toms River".to_string(),
            state: "NJ".to_string(),
            postal_code: "08753".to_string(),
            coordinates: Some(GeoPoint(-74.1979, 39.9537)),
        },
        estimated_locations: Some(3),
        headcount: Some(40),
        marketing: None,
        created_at: now,
        updated_at: now,
        score: 82,
        priority: LeadPriority::Hot,
        insights: LeadInsights {
            ideal_software_tier: SoftwareTier::Enterprise,
            recommended_product_focus: "Food waste tracking & AP automation".to_string(),
            follow_up_actions: vec![
                "Schedule strategy workshop within 24h".to_string(),
                "Highlight local NJ support team availability".to_string(),
            ],
        },
        enrichment_status: EnrichmentStatus::Pending,
        enrichment_notes: None,
        tags: Some(vec!["restaurant".to_string(), "hot_priority".to_string()]),
    }
}

#[tokio::test]
async fn notification_posts_expected_payload() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/hooks/leads"))
        .and(body_partial_json(serde_json::json!({
            "text": "New HOT lead: Dana Whitfield (Shore Cafe)",
            "fields": {
                "business_type": "restaurant",
                "submission_type": "strategy",
                "location": "Toms River, NJ",
                "score": 82,
            }
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    let notifier = LeadNotifier::new(format!("{}/hooks/leads", mock_server.uri())).unwrap();
    let result = notifier.notify_new_lead(&sample_lead()).await;

    assert!(result.is_ok());
}

#[tokio::test]
async fn follow_up_actions_are_joined_into_one_field() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(body_partial_json(serde_json::json!({
            "fields": {
                "recommended_follow_up":
                    "Schedule strategy workshop within 24h; Highlight local NJ support team availability",
            }
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    let notifier = LeadNotifier::new(mock_server.uri()).unwrap();
    assert!(notifier.notify_new_lead(&sample_lead()).await.is_ok());
}

#[tokio::test]
async fn webhook_error_status_surfaces_as_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let notifier = LeadNotifier::new(mock_server.uri()).unwrap();
    let result = notifier.notify_new_lead(&sample_lead()).await;

    // The submit handler logs and drops this; the client itself reports it
    assert!(result.is_err());
}

#[tokio::test]
async fn unreachable_webhook_is_an_error_not_a_panic() {
    // Port 9 (discard) is almost certainly closed
    let notifier = LeadNotifier::new("http://127.0.0.1:9/hooks/leads".to_string()).unwrap();
    let result = notifier.notify_new_lead(&sample_lead()).await;
    assert!(result.is_err());
}
