use std::{backtrace::Backtrace, panic, thread};

use tracing_subscriber::EnvFilter;

/// Sets up logging to stderr, filtered through `RUST_LOG` (`info` if it's unset or bogus).
///
/// Panics are logged too, so that they end up next to whatever led to them.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let default_hook = panic::take_hook();
    panic::set_hook(Box::new(move |info| {
        let payload = info
            .payload()
            .downcast_ref::<&str>()
            .copied()
            .or_else(|| info.payload().downcast_ref::<String>().map(String::as_str))
            .unwrap_or("non-string payload");
        let location = info.location().map_or_else(
            || "an unknown location".to_owned(),
            |location| format!("{}:{}:{}", location.file(), location.line(), location.column()),
        );
        let thread = thread::current();

        tracing::error!(
            thread = thread.name().unwrap_or("<unnamed>"),
            %location,
            "tunglyph panicked: '{payload}'\n{}",
            Backtrace::capture()
        );

        default_hook(info);
    }));
}
