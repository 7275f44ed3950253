use askama::Template;
use axum::{
    extract::Path,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Form,
};
use service_core::error::AppError;

use super::navigation::navigate;
use crate::models::forms::ItemForm;
use crate::models::{Identity, Item};
use crate::services::ItemsApi;
use crate::session::{AuthSession, CurrentUser};

const ITEMS_VIEW: &str = "/items";

#[derive(Template)]
#[template(path = "items/list.html")]
pub struct ItemListTemplate {
    pub viewer: Option<Identity>,
    pub current_page: &'static str,
    pub items: Vec<Item>,
    pub error: Option<String>,
}

#[derive(Template)]
#[template(path = "items/form.html")]
pub struct ItemFormTemplate {
    pub viewer: Option<Identity>,
    pub current_page: &'static str,
    pub heading: &'static str,
    pub action: String,
    pub form: ItemForm,
    /// Status is only editable on existing items.
    pub editing: bool,
    pub error: Option<String>,
}

impl ItemFormTemplate {
    fn create(user: Identity, form: ItemForm) -> Self {
        Self {
            viewer: Some(user),
            current_page: "items",
            heading: "New item",
            action: format!("{}/new", ITEMS_VIEW),
            form,
            editing: false,
            error: None,
        }
    }

    fn edit(user: Identity, id: i64, form: ItemForm) -> Self {
        Self {
            viewer: Some(user),
            current_page: "items",
            heading: "Edit item",
            action: format!("{}/{}/edit", ITEMS_VIEW, id),
            form,
            editing: true,
            error: None,
        }
    }

    fn with_error(mut self, message: String) -> Response {
        self.error = Some(message);
        (StatusCode::UNPROCESSABLE_ENTITY, self).into_response()
    }
}

pub async fn list_items(session: AuthSession, CurrentUser(user): CurrentUser) -> impl IntoResponse {
    let (items, error) = match ItemsApi::new(&session.gateway).list().await {
        Ok(items) => (items, None),
        Err(failure) => {
            tracing::warn!(user_id = %user.id, message = %failure.message, "Failed to load items");
            (Vec::new(), Some(failure.message))
        }
    };

    ItemListTemplate {
        viewer: Some(user),
        current_page: "items",
        items,
        error,
    }
}

pub async fn new_item_page(CurrentUser(user): CurrentUser) -> impl IntoResponse {
    ItemFormTemplate::create(user, ItemForm::default())
}

pub async fn create_item(
    session: AuthSession,
    CurrentUser(user): CurrentUser,
    headers: HeaderMap,
    Form(form): Form<ItemForm>,
) -> Response {
    let new_item = match form.to_new_item() {
        Ok(new_item) => new_item,
        Err(message) => return ItemFormTemplate::create(user, form).with_error(message),
    };

    match ItemsApi::new(&session.gateway).create(&new_item).await {
        Ok(item) => {
            tracing::info!(user_id = %user.id, item_id = %item.id, "Item created");
            navigate(&headers, ITEMS_VIEW)
        }
        Err(failure) => ItemFormTemplate::create(user, form).with_error(failure.message),
    }
}

pub async fn edit_item_page(
    session: AuthSession,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i64>,
) -> Result<Response, AppError> {
    let item = ItemsApi::new(&session.gateway).get(id).await?;
    Ok(ItemFormTemplate::edit(user, id, ItemForm::from(&item)).into_response())
}

pub async fn update_item(
    session: AuthSession,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i64>,
    headers: HeaderMap,
    Form(form): Form<ItemForm>,
) -> Response {
    let changes = match form.to_changes() {
        Ok(changes) => changes,
        Err(message) => return ItemFormTemplate::edit(user, id, form).with_error(message),
    };

    match ItemsApi::new(&session.gateway).update(id, &changes).await {
        Ok(_) => {
            tracing::info!(user_id = %user.id, item_id = %id, "Item updated");
            navigate(&headers, ITEMS_VIEW)
        }
        Err(failure) => ItemFormTemplate::edit(user, id, form).with_error(failure.message),
    }
}

pub async fn delete_item(
    session: AuthSession,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    ItemsApi::new(&session.gateway).delete(id).await?;
    tracing::info!(user_id = %user.id, item_id = %id, "Item deleted");
    Ok(navigate(&headers, ITEMS_VIEW))
}
