pub mod config;
pub mod dispatch;
pub mod domain;
pub mod email_client;
pub mod mail;
pub mod routes;
pub mod startup;
pub mod store;
pub mod telemetry;
