mod settings;

pub use settings::{ConfigError, DumpConfig, TomlConfig, EXAMPLE_CONFIG};
