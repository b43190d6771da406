//! ROI Narrative Service
//!
//! Illustrative ROI figures for an ambient clinical documentation product,
//! plus audience-tailored narratives from a schema-constrained LLM call:
//! - Computes a clamped, deterministic financial projection
//! - Builds a strict-JSON generation request from inputs + projection
//! - Normalizes whatever the model returns into a fixed-shape result
//! - Keeps only the narratives for the audiences the caller asked for
//!
//! PIPELINE:
//! INPUT → CALCULATE → PROMPT → GENERATE → NORMALIZE → FILTER → RESPOND

pub mod api;
pub mod calculator;
pub mod config;
pub mod error;
pub mod llm;
pub mod models;
pub mod narrative;

pub use error::Result;

// Re-export common types
pub use calculator::compute_financials;
pub use config::AppConfig;
pub use models::*;
pub use narrative::NarrativeService;
