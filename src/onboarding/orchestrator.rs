//! "Complete my profile" as a sequence of independent upstream writes.
//!
//! Steps run in a fixed order. A failing step becomes a warning and the
//! remaining steps still run; input validation happens before this point.

use serde_json::{json, Map, Value};
use thiserror::Error;

use crate::aggregate::extract::record_id;
use crate::aggregate::ListShape;
use crate::onboarding::request::OnboardingRequest;
use crate::session::{Role, Session};
use crate::upstream::{UpstreamClient, UpstreamError};

/// A non-fatal step failure. Its `Display` is the user-facing warning.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StepWarning {
    #[error("No progress record was found to update height and weight.")]
    ProgressMissing,
    #[error("Could not save height and weight right now.")]
    ProgressFailed,
    #[error("No subscription was found to update the plan.")]
    SubscriptionMissing,
    #[error("Could not update the plan right now.")]
    SubscriptionFailed,
    #[error("Could not save the {} professional details.", role_label(.0))]
    ProfessionalFailed(Role),
}

fn role_label(role: &Role) -> &'static str {
    match role {
        Role::Trainer => "trainer",
        Role::Nutritionist => "nutritionist",
        Role::User | Role::Admin => "professional",
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OnboardingOutcome {
    pub bmi: f64,
    pub warnings: Vec<StepWarning>,
}

impl OnboardingOutcome {
    pub fn warning_messages(&self) -> Vec<String> {
        self.warnings.iter().map(ToString::to_string).collect()
    }
}

/// Outcome of a lookup-then-update step.
enum StepError {
    NotFound,
    Upstream(UpstreamError),
}

impl From<UpstreamError> for StepError {
    fn from(err: UpstreamError) -> Self {
        StepError::Upstream(err)
    }
}

/// Profile endpoint of a professional role.
pub fn profile_endpoint(role: Role) -> Option<&'static str> {
    match role {
        Role::Trainer => Some("/trainers/profile"),
        Role::Nutritionist => Some("/nutritionists/profile"),
        Role::User | Role::Admin => None,
    }
}

pub struct OnboardingOrchestrator<'a> {
    client: &'a UpstreamClient,
    token: &'a str,
}

impl<'a> OnboardingOrchestrator<'a> {
    pub fn new(client: &'a UpstreamClient, token: &'a str) -> Self {
        Self { client, token }
    }

    pub async fn run(&self, session: &Session, request: &OnboardingRequest) -> OnboardingOutcome {
        let bmi = request.bmi();
        let mut warnings = Vec::new();

        match self.update_progress(request, bmi).await {
            Ok(()) => {}
            Err(StepError::NotFound) => warnings.push(StepWarning::ProgressMissing),
            Err(StepError::Upstream(e)) => {
                tracing::warn!(subject = %session.subject, error = %e, "Progress update failed");
                warnings.push(StepWarning::ProgressFailed);
            }
        }

        match self.update_subscription(request).await {
            Ok(()) => {}
            Err(StepError::NotFound) => warnings.push(StepWarning::SubscriptionMissing),
            Err(StepError::Upstream(e)) => {
                tracing::warn!(subject = %session.subject, error = %e, "Subscription update failed");
                warnings.push(StepWarning::SubscriptionFailed);
            }
        }

        if let Some(path) = profile_endpoint(session.role) {
            let profile = json!({
                "bio": request.bio,
                "yearsExperience": request.years_experience,
            });
            if let Err(e) = self.client.put(path, self.token, &profile).await {
                tracing::warn!(subject = %session.subject, path = %path, error = %e, "Professional profile update failed");
                warnings.push(StepWarning::ProfessionalFailed(session.role));
            }
        }

        tracing::info!(
            subject = %session.subject,
            role = %session.role,
            warnings = warnings.len(),
            "Onboarding completed"
        );
        OnboardingOutcome { bmi, warnings }
    }

    async fn update_progress(&self, request: &OnboardingRequest, bmi: f64) -> Result<(), StepError> {
        let records = self.client.get("/progress", self.token).await?;
        let id = most_recent(&ListShape::decode(&records).records()).ok_or(StepError::NotFound)?;
        let update = json!({
            "weightKg": request.weight_kg,
            "bmi": bmi,
            "notes": format!("Height: {} cm", request.height_cm),
        });
        self.client.put(&format!("/progress/{id}"), self.token, &update).await?;
        Ok(())
    }

    async fn update_subscription(&self, request: &OnboardingRequest) -> Result<(), StepError> {
        let records = self.client.get("/subscriptions", self.token).await?;
        let id = ListShape::decode(&records)
            .records()
            .into_iter()
            .find_map(record_id)
            .ok_or(StepError::NotFound)?;
        let update = json!({
            "planName": request.plan.plan_name(),
            "status": request.plan.status(),
        });
        self.client.put(&format!("/subscriptions/{id}"), self.token, &update).await?;
        Ok(())
    }
}

/// Id of the record with the latest `measuredAt` (then `createdAt`), or of
/// the first record when none carry a timestamp.
fn most_recent(records: &[&Map<String, Value>]) -> Option<String> {
    let stamp = |r: &Map<String, Value>| {
        ["measuredAt", "createdAt"]
            .iter()
            .find_map(|key| r.get(*key).and_then(Value::as_str))
            .map(str::to_string)
    };

    let with_ids: Vec<_> = records
        .iter()
        .filter_map(|r| record_id(*r).map(|id| (id, stamp(*r))))
        .collect();

    // ISO-8601 timestamps order lexicographically.
    with_ids
        .iter()
        .filter(|(_, ts)| ts.is_some())
        .max_by(|a, b| a.1.cmp(&b.1))
        .or_else(|| with_ids.first())
        .map(|(id, _)| id.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records(value: Value) -> Vec<Map<String, Value>> {
        value
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_object().cloned().unwrap())
            .collect()
    }

    #[test]
    fn test_most_recent_by_timestamp() {
        let owned = records(json!([
            {"id": "a", "measuredAt": "2026-01-03T10:00:00Z"},
            {"id": "b", "measuredAt": "2026-03-01T08:00:00Z"},
            {"id": "c"}
        ]));
        let refs: Vec<_> = owned.iter().collect();
        assert_eq!(most_recent(&refs), Some("b".to_string()));
    }

    #[test]
    fn test_most_recent_falls_back_to_first() {
        let owned = records(json!([{"weightKg": 70}, {"id": 12}, {"id": 13}]));
        let refs: Vec<_> = owned.iter().collect();
        assert_eq!(most_recent(&refs), Some("12".to_string()));
        assert_eq!(most_recent(&[]), None);
    }

    #[test]
    fn test_warning_messages() {
        assert_eq!(
            StepWarning::ProfessionalFailed(Role::Nutritionist).to_string(),
            "Could not save the nutritionist professional details."
        );
        let outcome = OnboardingOutcome {
            bmi: 22.86,
            warnings: vec![StepWarning::ProgressFailed],
        };
        assert_eq!(outcome.warning_messages(), vec!["Could not save height and weight right now."]);
    }

    #[test]
    fn test_profile_endpoint() {
        assert_eq!(profile_endpoint(Role::Trainer), Some("/trainers/profile"));
        assert_eq!(profile_endpoint(Role::Nutritionist), Some("/nutritionists/profile"));
        assert_eq!(profile_endpoint(Role::User), None);
        assert_eq!(profile_endpoint(Role::Admin), None);
    }
}
