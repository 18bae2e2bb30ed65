pub mod aggregate;
pub mod catalog;
pub mod config;
pub mod diagnosis;
pub mod distribution;
pub mod engine;
pub mod error;
pub mod jitter;
pub mod load;
pub mod model;
pub mod output;
pub mod persist;
pub mod scenarios;
pub mod state;
pub mod telemetry;
