use serde_json::Value;

use super::api_gateway::{ApiFailure, ApiGateway, ApiRequest};
use crate::models::{Item, ItemChanges, ItemList, NewItem};

const ITEMS_PATH: &str = "/items";

pub struct ItemsApi<'a> {
    gateway: &'a ApiGateway,
}

fn item_path(id: i64) -> String {
    format!("{}/{}", ITEMS_PATH, id)
}

fn to_body<T: serde::Serialize>(payload: &T) -> Result<Value, ApiFailure> {
    serde_json::to_value(payload).map_err(|e| ApiFailure {
        status: None,
        message: format!("Could not encode request: {}", e),
    })
}

impl<'a> ItemsApi<'a> {
    pub fn new(gateway: &'a ApiGateway) -> Self {
        Self { gateway }
    }

    pub async fn list(&self) -> Result<Vec<Item>, ApiFailure> {
        let list: ItemList = self.gateway.send(ApiRequest::get(ITEMS_PATH)).await?.json()?;
        Ok(list.into_items())
    }

    pub async fn get(&self, id: i64) -> Result<Item, ApiFailure> {
        self.gateway.send(ApiRequest::get(item_path(id))).await?.json()
    }

    pub async fn create(&self, item: &NewItem) -> Result<Item, ApiFailure> {
        self.gateway
            .send(ApiRequest::post(ITEMS_PATH).json(to_body(item)?))
            .await?
            .json()
    }

    pub async fn update(&self, id: i64, changes: &ItemChanges) -> Result<Item, ApiFailure> {
        self.gateway
            .send(ApiRequest::put(item_path(id)).json(to_body(changes)?))
            .await?
            .json()
    }

    pub async fn delete(&self, id: i64) -> Result<(), ApiFailure> {
        self.gateway.send(ApiRequest::delete(item_path(id))).await?;
        Ok(())
    }
}
