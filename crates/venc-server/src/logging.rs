use env_logger::Env;

/// Initialize logging to stderr.
/// `RUST_LOG` takes precedence over the given level.
pub fn init(level: &str) {
    let env = Env::default().default_filter_or(level);
    env_logger::Builder::from_env(env)
        .format_timestamp_secs()
        .init();
}
