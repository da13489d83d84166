//! ARTfinder dashboard core.
//!
//! Turns the report returned by the analysis service into dashboard metrics
//! and drives the two requests a dashboard page makes: the one-shot analyze
//! call and the single-flight chat conversation.

pub mod analysis;
pub mod chat;
pub mod cli;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod models;
pub mod report;
pub mod session;
pub mod terminal;
pub mod transport;

pub use dashboard::{Dashboard, DashboardSnapshot};
pub use error::TransportError;
pub use transport::{HttpTransport, Transport};
