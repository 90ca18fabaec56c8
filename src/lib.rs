pub mod config;
pub mod environment;
pub mod errors;
pub mod kpis;
pub mod log;
pub mod normalization;
pub mod queries;
pub mod report;
pub mod routes;
pub mod store;
pub mod urls;
