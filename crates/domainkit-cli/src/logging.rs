use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset.
pub(crate) fn default_log_directive(verbose: u8, quiet: bool) -> &'static str {
    if quiet {
        return "warn";
    }
    match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    }
}

/// Installs the stderr subscriber. Stdout stays reserved for status lines
/// and `--json` output.
pub(crate) fn init_logging(verbose: u8, quiet: bool) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_log_directive(verbose, quiet)));
    // A subscriber may already be set when embedded; keep the existing one.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
