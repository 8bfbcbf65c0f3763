pub mod config;
pub mod dashboard;
pub mod fmt;
pub mod insight;
pub mod logging;
pub mod mockdata;
pub mod models;
pub mod provider;
