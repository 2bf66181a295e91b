// config/mod.rs
mod types;

pub use types::{ConfigError, ConfigSection, ConfigTree};

pub const DEFAULT_CONFIG_FILE: &str = "config.yaml";
const APP_DIR: &str = "kube-credential-resolver";

/// Default config location: `<user config dir>/kube-credential-resolver/config.yaml`,
/// falling back to the working directory.
pub fn default_config_path() -> String {
    dirs::config_dir()
        .map(|dir| dir.join(APP_DIR).join(DEFAULT_CONFIG_FILE))
        .and_then(|path| path.to_str().map(str::to_string))
        .unwrap_or_else(|| DEFAULT_CONFIG_FILE.to_string())
}
