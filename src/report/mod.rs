//! Report access and rendering.

pub mod generator;
pub mod view;

pub use generator::{generate_json_report, generate_markdown_report, write_report};
pub use view::ReportView;
