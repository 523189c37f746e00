//! # Summary
//!
//! Structured logging setup via `tracing` + `tracing-subscriber`, the
//! modern idiomatic replacement for the teacher's `log` + `fern`
//! combination (`chatroom/src/main.rs` configures a `fern::Dispatch` keyed
//! off a verbosity-occurrence count). `-v`/`-vv`/`-vvv` raise the default
//! level the same way; `RUST_LOG` overrides it per spec's "errors are
//! annotated with source-location context" via `tracing::error!`'s
//! file/line capture.

use tracing_subscriber::EnvFilter;

/// Initializes the global tracing subscriber. `verbosity` is the `-v`
/// occurrence count from the CLI; 0 is warnings-and-above, each additional
/// `-v` drops the floor by one level.
pub fn init(verbosity: u8) {
    let default_level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();
}
