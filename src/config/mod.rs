pub mod settings;

pub use settings::{get_config, AppConfig};
