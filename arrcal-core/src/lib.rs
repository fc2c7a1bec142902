pub mod calendar;
pub mod config;
pub mod error;
pub mod models;
pub mod paths;
pub mod sort;
pub mod sources;
