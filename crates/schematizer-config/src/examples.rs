// crates/schematizer-config/src/examples.rs
// ============================================================================
// Module: Config Examples
// Description: Canonical example configuration payload.
// Purpose: Deterministic example for docs and the CLI.
// Dependencies: std
// ============================================================================

//! ## Overview
//! Canonical example `schematizer.toml`. Kept in sync with the config model
//! by the crate's tests.

/// Returns a canonical example `schematizer.toml` configuration.
#[must_use]
pub fn config_toml_example() -> String {
    String::from(
        r#"[store]
type = "sqlite"
path = "schematizer.db"
busy_timeout_ms = 5000
journal_mode = "wal"
sync_mode = "full"

[registry]
max_schema_bytes = 1048576

[logging]
level = "info"
"#,
    )
}
