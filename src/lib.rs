pub mod api;
pub mod config;
pub mod controller_client;
pub mod http_client;
pub mod reconciler;
pub mod screen;
pub mod services;
pub mod settings_store;
pub mod staged;
pub mod types;
pub mod validation;
