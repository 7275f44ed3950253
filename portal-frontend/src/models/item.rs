use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub owner: Option<Owner>,
    #[serde(default)]
    pub owner_id: Option<i64>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Owner as embedded by the backend: a bare name or a user summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Owner {
    Name(String),
    Summary {
        #[serde(default)]
        id: Option<i64>,
        #[serde(default)]
        email: Option<String>,
        #[serde(default)]
        full_name: Option<String>,
    },
}

impl Item {
    pub fn description_text(&self) -> &str {
        self.description
            .as_deref()
            .filter(|d| !d.is_empty())
            .unwrap_or("No description")
    }

    pub fn price_label(&self) -> Option<String> {
        self.price.map(|price| format!("{:.2}", price))
    }

    pub fn is_active(&self) -> bool {
        self.status.as_deref() == Some("active")
    }

    pub fn owner_label(&self) -> Option<String> {
        match self.owner.as_ref()? {
            Owner::Name(name) if !name.is_empty() => Some(name.clone()),
            Owner::Name(_) => None,
            Owner::Summary {
                full_name, email, ..
            } => full_name.clone().or_else(|| email.clone()),
        }
    }

    /// Creation date as `YYYY-MM-DD`; accepts RFC 3339 and naive ISO timestamps.
    pub fn created_label(&self) -> Option<String> {
        let raw = self.created_at.as_deref()?;
        if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
            return Some(parsed.format("%Y-%m-%d").to_string());
        }
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
            .ok()
            .map(|parsed| parsed.format("%Y-%m-%d").to_string())
    }
}

/// Body for `POST /items`.
#[derive(Debug, Clone, Serialize)]
pub struct NewItem {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
}

/// Partial body for `PUT /items/{id}`; unset fields are left untouched.
/// `price: Some(None)` is sent as `null` and clears the stored price.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ItemChanges {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<Option<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

/// `GET /items` answers with a bare array on some deployments and a
/// `{"data": [...]}` envelope on others.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ItemList {
    Plain(Vec<Item>),
    Wrapped { data: Vec<Item> },
}

impl ItemList {
    pub fn into_items(self) -> Vec<Item> {
        match self {
            ItemList::Plain(items) | ItemList::Wrapped { data: items } => items,
        }
    }
}
