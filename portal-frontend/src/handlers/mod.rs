pub mod admin;
pub mod app;
pub mod auth;
pub mod items;
pub mod metrics;
pub mod navigation;
pub mod pages;
pub mod profile;
pub mod user;
