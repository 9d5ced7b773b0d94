//! Default values for Delve configuration.
//!
//! All hardcoded defaults are centralized here for easy maintenance.

use crate::policy::ErrorPolicy;

// ============================================================================
// Supervisor Defaults
// ============================================================================

/// Default reaction to a failed researcher dispatch.
pub const DEFAULT_ERROR_POLICY: ErrorPolicy = ErrorPolicy::RecordAndContinue;

/// Tool-call name used for research sub-tasks.
pub const CONDUCT_RESEARCH_TOOL: &str = "ConductResearch";

// ============================================================================
// Logging Defaults
// ============================================================================

/// Default log level (used when `RUST_LOG` is not set).
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Default log output format.
pub const DEFAULT_LOG_FORMAT: &str = "pretty";

// ============================================================================
// Researcher Defaults
// ============================================================================

/// Topic substring that makes the mock researcher fail.
pub const DEFAULT_FAIL_MARKER: &str = "FAIL";

// ============================================================================
// File Locations
// ============================================================================

/// Project-local config file name.
pub const DEFAULT_CONFIG_FILE: &str = "delve.toml";

/// Directory under the user config dir.
pub const DEFAULT_CONFIG_DIR: &str = "delve";

/// Config file name inside the user config dir.
pub const DEFAULT_USER_CONFIG_FILE: &str = "config.toml";
