//! Constants used throughout the MEDICORE core crate.

use crate::access::Module;

/// Product name shown in headers and on the dashboard.
pub const APP_NAME: &str = "MEDICORE HMS";

/// The single password every demo account accepts.
pub const DEMO_PASSWORD: &str = "password";

/// Minimum password length accepted at signup.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Currency label used when none is configured.
pub const DEFAULT_CURRENCY: &str = "Rs.";

/// Module a freshly opened dashboard shows.
pub const INITIAL_MODULE: Module = Module::Dashboard;

/// Seed snapshot compiled into the binary, used when no seed file is configured.
pub const BUNDLED_SEED: &str = include_str!("../seed/hospital.yaml");

/// Environment variable naming a YAML seed file.
pub const SEED_FILE_ENV: &str = "MEDICORE_SEED_FILE";

/// Environment variable pinning "today" (`YYYY-MM-DD`).
pub const TODAY_ENV: &str = "MEDICORE_TODAY";

/// Environment variable overriding the currency label.
pub const CURRENCY_ENV: &str = "MEDICORE_CURRENCY";

/// Placeholder for absent optional values in rendered cells.
pub const EMPTY_CELL: &str = "-";
