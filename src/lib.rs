//! Feedback capture and submission for VisiGov civic-recap dashboards.
/// Application directory helpers.
pub mod app_dirs;
/// Feedback drafts, configuration, and the submission gateway.
pub mod feedback;
mod http_client;
/// Background submission jobs for UI hosts.
pub mod jobs;
/// Logging setup.
pub mod logging;
/// egui rendering surface for the feedback widgets.
pub mod panel;
