//! xp-engine CLI entry point
//!
//! Installs logging, then hands off to the CLI module. Errors are printed
//! as an error envelope on stdout and `CODE: message` on stderr, and the
//! process exits non-zero.

use tracing_subscriber::EnvFilter;
use xp_engine::cli;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // RUST_LOG overrides; warnings only by default so stdout stays JSON.
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .try_init();

    if let Err(e) = cli::run().await {
        let _ = cli::write_error(e.code_str(), e.message());
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
