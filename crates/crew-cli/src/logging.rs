use env_logger::Env;

/// Default filter is `info`, or `debug` with `--debug`; `RUST_LOG` wins.
pub fn init_logging(debug: bool) {
    let default_filter = if debug { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_filter))
        .format_timestamp_millis()
        .init();
}
