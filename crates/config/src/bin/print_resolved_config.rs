//! Print the resolved config (base file or defaults + overrides) as JSON.
//!
//! Usage: `print_resolved_config [BASE_CONFIG_PATH]`. Set `RUST_LOG=debug`
//! to see how the endpoint was derived.

use cluster_overlay_config::{load_base_config_from_path, to_pretty_json, wrap};
use std::io;
use std::io::Write;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

fn main() -> std::process::ExitCode {
    init_tracing();
    match run() {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("error: {error}");
            std::process::ExitCode::from(1)
        },
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .try_init();
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let path = std::env::args_os().nth(1).map(PathBuf::from);
    let base = load_base_config_from_path(path.as_deref())?;
    let config = wrap(base);

    let output = to_pretty_json(&config)?;

    let mut stdout = io::stdout();
    stdout.write_all(output.as_bytes())?;
    stdout.flush()?;

    Ok(())
}
