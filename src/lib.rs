pub mod agents;
pub mod config;
pub mod error;
pub mod pretalx;
pub mod report;
pub mod routes;
pub mod state;
pub mod templates;
