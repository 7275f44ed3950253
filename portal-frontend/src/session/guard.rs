//! Access decision for protected views.

use std::collections::BTreeSet;

use super::auth_state::{AuthSnapshot, SessionStatus};
use crate::models::Identity;

pub const LOGIN_PATH: &str = "/login";
pub const DEFAULT_VIEW: &str = "/dashboard";

/// Roles a view accepts. Empty means any authenticated identity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccessRequirement {
    roles: BTreeSet<String>,
}

impl AccessRequirement {
    pub fn authenticated() -> Self {
        Self::default()
    }

    pub fn any_of<I, S>(roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            roles: roles.into_iter().map(Into::into).collect(),
        }
    }

    /// True when the requirement is empty or shares at least one role with
    /// the identity. An identity without roles never meets a non-empty one.
    pub fn permits(&self, identity: &Identity) -> bool {
        self.roles.is_empty() || !self.roles.is_disjoint(&identity.roles)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    /// Resolution pending: show a placeholder and nothing else.
    Loading,
    /// No identity: go to login, remembering where the user wanted to be.
    RedirectToLogin,
    /// Signed in but lacking the role: fall back to the default view.
    RedirectToDefault,
    Allow,
}

pub fn evaluate(snapshot: &AuthSnapshot, requirement: &AccessRequirement) -> GuardDecision {
    if snapshot.status == SessionStatus::Pending {
        return GuardDecision::Loading;
    }

    match &snapshot.identity {
        None => GuardDecision::RedirectToLogin,
        Some(identity) if !requirement.permits(identity) => GuardDecision::RedirectToDefault,
        Some(_) => GuardDecision::Allow,
    }
}

/// Login location that brings the user back to `requested` afterwards.
pub fn login_location(requested: &str) -> String {
    let next = safe_next(Some(requested));
    if next == DEFAULT_VIEW {
        LOGIN_PATH.to_string()
    } else {
        format!("{}?next={}", LOGIN_PATH, urlencoding::encode(next))
    }
}

/// Only local absolute paths are followed after login; anything else
/// (other hosts, scheme-relative URLs, the login page itself) goes to the
/// default view.
pub fn safe_next(next: Option<&str>) -> &str {
    match next {
        Some(path) if is_local_path(path) && !path.starts_with(LOGIN_PATH) => path,
        _ => DEFAULT_VIEW,
    }
}

fn is_local_path(path: &str) -> bool {
    // Browsers drop tabs and newlines from locations, so `/\t/host` would
    // still leave the origin.
    if path.chars().any(|c| c.is_control() || c.is_whitespace()) {
        return false;
    }
    let mut chars = path.chars();
    chars.next() == Some('/') && !matches!(chars.next(), Some('/') | Some('\\'))
}
