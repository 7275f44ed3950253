pub mod account_api;
pub mod api_gateway;
pub mod auth_client;
pub mod items_api;

pub use account_api::AccountApi;
pub use api_gateway::{ApiFailure, ApiGateway, ApiRequest, ApiResponse, ApiResult, Payload};
pub use auth_client::{AuthClient, LoginError};
pub use items_api::ItemsApi;
