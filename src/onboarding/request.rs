//! Onboarding input parsing and body-mass-index derivation.

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

/// Raw onboarding body as the browser sends it. Numbers may arrive as JSON
/// numbers or numeric strings.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OnboardingBody {
    #[serde(default)]
    pub height_cm: Option<Value>,
    #[serde(default)]
    pub weight_kg: Option<Value>,
    #[serde(default)]
    pub plan: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub years_experience: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OnboardingInputError {
    #[error("Height and weight are required.")]
    MissingMeasurements,
}

/// Requested plan tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Plan {
    #[default]
    Free,
    Premium,
}

impl Plan {
    /// `PREMIUM` selects the paid tier; `FREE`, `GRATUITO`, and anything else
    /// select the free tier.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some(p) if p.eq_ignore_ascii_case("PREMIUM") => Plan::Premium,
            _ => Plan::Free,
        }
    }

    pub fn plan_name(self) -> &'static str {
        match self {
            Plan::Free => "Free",
            Plan::Premium => "Premium",
        }
    }

    /// Paid plans are active at once, free plans start as a trial.
    pub fn status(self) -> &'static str {
        match self {
            Plan::Free => "TRIALING",
            Plan::Premium => "ACTIVE",
        }
    }
}

/// Validated onboarding input.
#[derive(Debug, Clone, PartialEq)]
pub struct OnboardingRequest {
    pub height_cm: f64,
    pub weight_kg: f64,
    pub plan: Plan,
    pub bio: Option<String>,
    pub years_experience: Option<u32>,
}

impl TryFrom<OnboardingBody> for OnboardingRequest {
    type Error = OnboardingInputError;

    fn try_from(body: OnboardingBody) -> Result<Self, Self::Error> {
        let positive = |v: Option<&Value>| numeric(v).filter(|n| *n > 0.0);
        let (Some(height_cm), Some(weight_kg)) =
            (positive(body.height_cm.as_ref()), positive(body.weight_kg.as_ref()))
        else {
            return Err(OnboardingInputError::MissingMeasurements);
        };

        let years_experience = numeric(body.years_experience.as_ref())
            .filter(|n| *n >= 0.0 && *n <= f64::from(u32::MAX))
            .map(|n| n.round() as u32);

        Ok(Self {
            height_cm,
            weight_kg,
            plan: Plan::parse(body.plan.as_deref()),
            bio: body.bio.map(|b| b.trim().to_string()).filter(|b| !b.is_empty()),
            years_experience,
        })
    }
}

impl OnboardingRequest {
    pub fn bmi(&self) -> f64 {
        bmi(self.height_cm, self.weight_kg)
    }
}

/// Finite number from a JSON number or a numeric string.
fn numeric(value: Option<&Value>) -> Option<f64> {
    let n = match value? {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}

/// `weight_kg / height_m²`, rounded to two decimals.
pub fn bmi(height_cm: f64, weight_kg: f64) -> f64 {
    let height_m = height_cm / 100.0;
    let raw = weight_kg / (height_m * height_m);
    (raw * 100.0).round() / 100.0
}
