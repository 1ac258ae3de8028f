//! Lead Intelligence API Library
//!
//! Core functionality for the lead-capture API: deterministic lead scoring
//! and prioritization, geographic resolution, domain-heuristic enrichment,
//! faceted search criteria, and the HTTP handlers that wire them to the
//! database.
//!
//! # Modules
//!
//! - `config`: Configuration management.
//! - `db`: Database connection and pool management.
//! - `enrichment`: Domain-heuristic enrichment and submission validators.
//! - `errors`: Error handling types.
//! - `geo`: Static geographic reference lookup.
//! - `handlers`: HTTP request handlers.
//! - `lead_storage`: Database storage operations.
//! - `models`: Core data models.
//! - `notifier`: New-lead webhook notifications.
//! - `scoring`: Scoring, priority classification, insights, and tags.
//! - `search`: Search criteria parsing and SQL compilation.

pub mod config;
pub mod db;
pub mod enrichment;
pub mod errors;
pub mod geo;
pub mod handlers;
pub mod lead_storage;
pub mod models;
pub mod notifier;
pub mod scoring;
pub mod search;
