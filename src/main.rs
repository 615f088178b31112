//! Kodegen Bundler NSIS - Windows installer builder for Rust applications.
//!
//! Packs prepared application directories into an NSIS installer with a
//! signed uninstaller, from Linux, macOS or Windows.

use kodegen_bundler_nsis::cli;
use std::process;

#[tokio::main]
async fn main() {
    // Initialize logging
    env_logger::init();

    // Run CLI and get exit code
    let exit_code = match cli::run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            e.exit_code()
        }
    };

    process::exit(exit_code);
}
