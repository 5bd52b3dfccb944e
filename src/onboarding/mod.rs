//! Onboarding orchestration.
//!
//! # Data Flow
//! ```text
//! POST /onboarding/complete body
//!     → request.rs (numeric parsing, hard failure on missing measurements)
//!     → orchestrator.rs (progress → subscription → professional profile)
//!     → warnings collected per step, completion cookie set by the handler
//! ```

pub mod orchestrator;
pub mod request;

pub use orchestrator::{OnboardingOrchestrator, OnboardingOutcome, StepWarning};
pub use request::{bmi, OnboardingBody, OnboardingInputError, OnboardingRequest, Plan};
