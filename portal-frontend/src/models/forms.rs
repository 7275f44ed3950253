//! Browser form payloads.

use secrecy::Secret;
use serde::Deserialize;
use validator::{Validate, ValidationErrors};

use super::item::{Item, ItemChanges, NewItem};

#[derive(Debug, Deserialize, Validate)]
pub struct LoginForm {
    #[validate(email(message = "Enter a valid email address"))]
    pub email: String,
    pub password: Secret<String>,
    /// Where to continue after a successful login.
    #[serde(default)]
    pub next: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterForm {
    #[validate(length(min = 1, message = "Full name is required"))]
    pub full_name: String,
    #[validate(email(message = "Enter a valid email address"))]
    pub email: String,
    pub password: Secret<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ProfileForm {
    #[validate(length(max = 120, message = "Full name is too long"))]
    pub full_name: String,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ItemForm {
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Raw price input; blank means "no price".
    #[serde(default)]
    pub price: String,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginQuery {
    pub next: Option<String>,
    pub registered: Option<String>,
}

impl LoginForm {
    /// Trims the email so login matches what registration stored.
    pub fn normalize(&mut self) {
        trim_in_place(&mut self.email);
    }
}

impl RegisterForm {
    pub fn normalize(&mut self) {
        trim_in_place(&mut self.email);
        trim_in_place(&mut self.full_name);
    }
}

impl ItemForm {
    fn normalized(&self) -> Self {
        let mut form = self.clone();
        trim_in_place(&mut form.title);
        trim_in_place(&mut form.description);
        trim_in_place(&mut form.price);
        form
    }

    pub fn status_value(&self) -> &str {
        self.status.as_deref().unwrap_or("")
    }

    pub fn parsed_price(&self) -> Result<Option<f64>, String> {
        let raw = self.price.trim();
        if raw.is_empty() {
            return Ok(None);
        }
        match raw.parse::<f64>() {
            Ok(price) if price.is_finite() && price >= 0.0 => Ok(Some(price)),
            _ => Err("Price must be a non-negative number".to_string()),
        }
    }

    /// Validates and converts the form into a create payload.
    pub fn to_new_item(&self) -> Result<NewItem, String> {
        let form = self.normalized();
        form.validate().map_err(|e| first_validation_message(&e))?;
        Ok(NewItem {
            price: form.parsed_price()?,
            description: (!form.description.is_empty()).then_some(form.description),
            title: form.title,
        })
    }

    /// Validates and converts the form into an update payload. A blank
    /// price clears the stored one.
    pub fn to_changes(&self) -> Result<ItemChanges, String> {
        let form = self.normalized();
        form.validate().map_err(|e| first_validation_message(&e))?;
        Ok(ItemChanges {
            price: Some(form.parsed_price()?),
            status: form.status.filter(|s| !s.is_empty()),
            title: Some(form.title),
            description: Some(form.description),
        })
    }
}

/// Pre-fills the edit form from the stored item.
impl From<&Item> for ItemForm {
    fn from(item: &Item) -> Self {
        Self {
            title: item.title.clone(),
            description: item.description.clone().unwrap_or_default(),
            price: item.price.map(|p| p.to_string()).unwrap_or_default(),
            status: item.status.clone(),
        }
    }
}

fn trim_in_place(value: &mut String) {
    let trimmed = value.trim();
    if trimmed.len() != value.len() {
        *value = trimmed.to_string();
    }
}

/// One human-readable message out of a validation failure, stable across runs.
pub fn first_validation_message(errors: &ValidationErrors) -> String {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));

    fields
        .into_iter()
        .find_map(|(field, errs)| {
            errs.first().map(|err| match &err.message {
                Some(message) => message.to_string(),
                None => format!("Invalid value for {}", field),
            })
        })
        .unwrap_or_else(|| "Invalid input".to_string())
}
