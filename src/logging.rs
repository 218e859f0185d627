//! Diagnostic logging.
//!
//! Library code logs through `tracing`. User-facing progress is not logging:
//! it goes to stdout through [`output`](crate::output). Diagnostics go to
//! stderr so the two never interleave in a pipe.

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Filter used when `RUST_LOG` is unset.
fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        "justified_gal=debug,info"
    } else {
        "warn"
    }
}

/// Install the global subscriber. Call once, from the binary.
///
/// `RUST_LOG` overrides the default level when set.
pub fn init(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}
