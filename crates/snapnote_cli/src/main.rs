//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `snapnote_core` linkage.
//! - Show the backend configuration the FFI layer would resolve.

use snapnote_core::BackendConfig;
use std::process::ExitCode;

fn main() -> ExitCode {
    println!("snapnote_core ping={}", snapnote_core::ping());
    println!("snapnote_core version={}", snapnote_core::core_version());

    match BackendConfig::from_env() {
        Ok(config) => {
            println!("config db_path={}", config.db_path.display());
            println!("config media_bucket={}", config.media_bucket);
            println!("config public_base_url={}", config.public_base_url);
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("config error: {err}");
            ExitCode::FAILURE
        }
    }
}
