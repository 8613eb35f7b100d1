// crates/schematizer-config/src/lib.rs
// ============================================================================
// Module: Schematizer Config Library
// Description: Canonical config model, loading, and validation.
// Purpose: Single source of truth for schematizer.toml semantics.
// Dependencies: schematizer-core, schematizer-store-sqlite, serde, toml
// ============================================================================

//! ## Overview
//! `schematizer-config` defines the configuration model for the Schematizer
//! CLI: which schema store to open, repository limits, and the default log
//! filter. Loading is strict (`deny_unknown_fields`) and fails closed on
//! invalid values.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;
pub mod examples;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
pub use examples::config_toml_example;
