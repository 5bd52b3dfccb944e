//! Professional and client lookups with fallback and filtering.
//!
//! The general user listing is tried first. When the upstream forbids it or
//! does not have it (403/404), the role-specific listings are queried
//! concurrently and unioned; a failing secondary listing contributes nothing
//! rather than failing the search. Result order is not guaranteed.

use axum::http::StatusCode;
use futures_util::future::join_all;

use crate::aggregate::extract::{collect_people, people_from_list, CanonicalPerson, PersonSet};
use crate::session::{Role, Session};
use crate::upstream::{UpstreamClient, UpstreamError};

pub const PRIMARY_ENDPOINT: &str = "/users";

/// Role-specific listings used when the primary listing is unavailable.
pub const SECONDARY_ENDPOINTS: [(&str, Role); 2] =
    [("/trainers", Role::Trainer), ("/nutritionists", Role::Nutritionist)];

/// Which roles a search admits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleFilter {
    /// No role restriction, for rosters that are already scoped.
    Any,
    AnyProfessional,
    Only(Role),
}

impl RoleFilter {
    /// `TRAINER` or `NUTRITIONIST` narrow the search; anything else means
    /// any professional role.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some(r) if r.eq_ignore_ascii_case("TRAINER") => RoleFilter::Only(Role::Trainer),
            Some(r) if r.eq_ignore_ascii_case("NUTRITIONIST") => {
                RoleFilter::Only(Role::Nutritionist)
            }
            _ => RoleFilter::AnyProfessional,
        }
    }

    fn admits(self, role: Option<&str>) -> bool {
        if self == RoleFilter::Any {
            return true;
        }
        let Some(role) = role else {
            return false;
        };
        match self {
            RoleFilter::AnyProfessional => {
                role == Role::Trainer.as_str() || role == Role::Nutritionist.as_str()
            }
            RoleFilter::Only(expected) => role == expected.as_str(),
            RoleFilter::Any => true,
        }
    }
}

/// A view over a normalized person set.
#[derive(Debug, Clone)]
pub struct SearchFilter {
    role: RoleFilter,
    query: String,
}

impl SearchFilter {
    pub fn new(role: RoleFilter, query: Option<&str>) -> Self {
        Self {
            role,
            query: query.unwrap_or_default().trim().to_lowercase(),
        }
    }

    pub fn matches(&self, person: &CanonicalPerson) -> bool {
        self.role.admits(person.role.as_deref()) && self.matches_query(person)
    }

    /// Case-insensitive substring of the name, or of the email when the
    /// person has no name.
    fn matches_query(&self, person: &CanonicalPerson) -> bool {
        if self.query.is_empty() {
            return true;
        }
        let haystack = person.name.as_deref().unwrap_or(&person.email);
        haystack.to_lowercase().contains(&self.query)
    }

    pub fn apply<'a>(&self, people: &'a [CanonicalPerson]) -> Vec<&'a CanonicalPerson> {
        people.iter().filter(|p| self.matches(p)).collect()
    }
}

/// All professionals visible to the caller.
pub async fn fetch_professionals(
    client: &UpstreamClient,
    token: &str,
) -> Result<Vec<CanonicalPerson>, UpstreamError> {
    match client.get(PRIMARY_ENDPOINT, token).await {
        Ok(body) => Ok(people_from_list(&body)),
        Err(e) if matches!(e.status(), Some(StatusCode::FORBIDDEN | StatusCode::NOT_FOUND)) => {
            tracing::info!(status = ?e.status(), "Primary listing unavailable, querying role listings");
            Ok(fetch_role_listings(client, token).await)
        }
        Err(e) => Err(e),
    }
}

async fn fetch_role_listings(client: &UpstreamClient, token: &str) -> Vec<CanonicalPerson> {
    let listings = SECONDARY_ENDPOINTS.iter().map(|(path, role)| async move {
        match client.get(path, token).await {
            Ok(body) => people_from_list(&body)
                .into_iter()
                .map(|mut person| {
                    person.role = Some(role.as_str().to_string());
                    person
                })
                .collect::<Vec<_>>(),
            Err(e) => {
                tracing::warn!(path = %path, error = %e, "Role listing failed, continuing without it");
                Vec::new()
            }
        }
    });

    let mut set = PersonSet::default();
    for people in join_all(listings).await {
        set.extend(people);
    }
    set.into_vec()
}

/// Dashboard endpoint listing a professional's clients.
pub fn dashboard_endpoint(role: Role) -> Option<&'static str> {
    match role {
        Role::Trainer => Some("/trainers/dashboard"),
        Role::Nutritionist => Some("/nutritionists/dashboard"),
        Role::User | Role::Admin => None,
    }
}

/// People linked to a professional, excluding the professional. Upstream
/// failures yield an empty roster.
pub async fn fetch_clients(
    client: &UpstreamClient,
    token: &str,
    session: &Session,
) -> Vec<CanonicalPerson> {
    let Some(path) = dashboard_endpoint(session.role) else {
        return Vec::new();
    };

    match client.get(path, token).await {
        Ok(body) => collect_people(&body)
            .into_iter()
            .filter(|p| p.id != session.subject && !p.email.eq_ignore_ascii_case(&session.email))
            .collect(),
        Err(e) => {
            tracing::warn!(path = %path, error = %e, "Dashboard lookup failed, returning empty roster");
            Vec::new()
        }
    }
}
