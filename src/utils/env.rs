// src/utils/env.rs

use log::{debug, info};

/// Load variables from a `.env` file if one is present.
pub fn load_env() {
    match dotenv::dotenv() {
        Ok(path) => info!("Loaded environment from {}", path.display()),
        Err(e) => debug!("No .env file loaded ({}); using process environment", e),
    }
}
