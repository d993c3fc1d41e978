pub const DOT_REACH_SETTINGS_CONFIG: &str = "./.reach/Settings.toml";

/// Path to instance's config file with respect to instance's directory.
///
/// # Example
///
/// ```rust
/// # use std::path::Path;
/// # use reach_core::INSTANCE_CONFIG;
/// Path::new("./instances/example").join(INSTANCE_CONFIG);
/// ```
pub const INSTANCE_CONFIG: &str = ".reach/Instance.toml";

pub const QUILT_MODS_DIR: &str = "quilt_mods";
pub const PUZZLE_MODS_DIR: &str = "puzzle_mods";

pub const QUILT_METADATA_FILE: &str = "quilt.mod.json";
pub const PUZZLE_METADATA_FILE: &str = "puzzle.mod.json";
