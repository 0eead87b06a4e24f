//! Kodegen Bundler Lambda - per-module bundles and deployment archives.
//!
//! This binary bundles every handler module with esbuild and writes one
//! `<module>.zip` per module, exiting non-zero if any module fails.

use std::process;

#[tokio::main]
async fn main() {
    // Initialize logging
    env_logger::init();

    // Run CLI and get exit code
    let exit_code = match kodegen_bundler_lambda::cli::run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    };

    process::exit(exit_code);
}
