//! Viewer configuration file.
//!
//! Settings live in `~/.globe-carousel/config.ini`. A missing file yields the
//! built-in defaults; present keys overlay them.
//!
//! ```ini
//! [cycling]
//! interval_ms = 10000
//! idle_timeout_ms = 30000
//! auto_start = true
//! timeout_prevented = false
//! recent_bound = 5
//! region = europe
//!
//! [map]
//! api_key = ...
//! load_timeout_secs = 15
//! max_attempts = 3
//! retry_base_delay_ms = 1000
//!
//! [logging]
//! directory = logs
//! file = globe-carousel.log
//! ```

mod file;
mod parser;

pub use file::{
    config_directory, config_file_path, ConfigFileError, LoggingSettings, ViewerConfig,
};
