use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// The signed-in user as reported by `GET /auth/me`.
///
/// Role designations arrive either as a single label or as a list (under
/// `role` and/or `roles`); they are folded into one set at deserialisation so
/// nothing downstream has to care which shape the backend used.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "IdentityWire")]
pub struct Identity {
    pub id: i64,
    pub email: String,
    pub full_name: Option<String>,
    pub is_active: bool,
    pub roles: BTreeSet<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RoleDesignation {
    One(String),
    Many(Vec<String>),
}

impl RoleDesignation {
    fn into_labels(self) -> Vec<String> {
        match self {
            RoleDesignation::One(role) => vec![role],
            RoleDesignation::Many(roles) => roles,
        }
    }
}

#[derive(Deserialize)]
struct IdentityWire {
    id: i64,
    email: String,
    #[serde(default)]
    full_name: Option<String>,
    #[serde(default = "default_active")]
    is_active: bool,
    #[serde(default)]
    role: Option<RoleDesignation>,
    #[serde(default)]
    roles: Option<RoleDesignation>,
}

fn default_active() -> bool {
    true
}

impl From<IdentityWire> for Identity {
    fn from(wire: IdentityWire) -> Self {
        let roles = wire
            .role
            .into_iter()
            .chain(wire.roles)
            .flat_map(RoleDesignation::into_labels)
            .map(|label| label.trim().to_string())
            .filter(|label| !label.is_empty())
            .collect();

        Identity {
            id: wire.id,
            email: wire.email,
            full_name: wire.full_name.filter(|name| !name.trim().is_empty()),
            is_active: wire.is_active,
            roles,
        }
    }
}

impl Identity {
    /// Full name when set, the email address otherwise.
    pub fn display_name(&self) -> &str {
        self.full_name.as_deref().unwrap_or(&self.email)
    }

    pub fn initials(&self) -> String {
        let initials: String = self
            .display_name()
            .split(|c: char| c.is_whitespace() || c == '@' || c == '.')
            .filter_map(|part| part.chars().next())
            .take(2)
            .collect::<String>()
            .to_uppercase();

        if initials.is_empty() {
            "U".to_string()
        } else {
            initials
        }
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.contains(role)
    }

    pub fn roles_label(&self) -> String {
        if self.roles.is_empty() {
            "none".to_string()
        } else {
            self.roles.iter().cloned().collect::<Vec<_>>().join(", ")
        }
    }
}
