pub mod analysis;
pub mod api;
pub mod command;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod metrics;
pub mod model;
pub mod pipeline;
pub mod presence;
pub mod rate_limit;
pub mod render;
pub mod report;
pub mod upstream;
