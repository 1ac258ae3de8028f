use crate::errors::AppError;
use crate::models::LeadRecord;
use serde_json::json;
use std::time::Duration;

/// Client for announcing new leads to a configured webhook.
///
/// Delivery is best-effort: the caller decides whether to surface errors,
/// and the submit path never does.
#[derive(Clone)]
pub struct LeadNotifier {
    client: reqwest::Client,
    webhook_url: String,
}

impl LeadNotifier {
    pub fn new(webhook_url: String) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| {
                AppError::ExternalApiError(format!("Failed to create notifier client: {}", e))
            })?;

        Ok(Self {
            client,
            webhook_url,
        })
    }

    /// Post a new-lead announcement to the webhook.
    pub async fn notify_new_lead(&self, lead: &LeadRecord) -> Result<(), AppError> {
        let payload = json!({
            "text": format!(
                "New {} lead: {} ({})",
                lead.priority.as_str().to_uppercase(),
                lead.name,
                lead.company
            ),
            "fields": {
                "business_type": lead.business_type.as_str(),
                "submission_type": lead.submission_type.as_str(),
                "email": lead.email,
                "phone": lead.phone,
                "location": format!("{}, {}", lead.location.city, lead.location.state),
                "score": lead.score,
                "recommended_follow_up": lead.insights.follow_up_actions.join("; "),
            },
        });

        let response = self
            .client
            .post(&self.webhook_url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| AppError::ExternalApiError(format!("Webhook request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(AppError::ExternalApiError(format!(
                "Webhook returned {}",
                status
            )));
        }

        tracing::debug!("Lead notification delivered for {}", lead.id);
        Ok(())
    }
}
