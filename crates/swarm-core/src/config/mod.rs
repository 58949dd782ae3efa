//! Configuration system — schema, loading, and env var overrides.
//!
//! # Usage
//! ```no_run
//! use swarm_core::config;
//!
//! config::load_dotenv();
//! let cfg = config::load_config(None);
//! println!("Ollama: {}", cfg.endpoints.ollama);
//! ```

pub mod loader;
pub mod schema;

pub use loader::{get_config_path, load_config, load_dotenv, save_config};
pub use schema::Config;
