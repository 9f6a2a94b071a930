//! Provide tracing, tailored to this program.
//!
//! The binary calls [`init_stderr`] once at startup to install a subscriber.
//! The rest of the crate uses `use crate::tracing::prelude::*` for the
//! `trace!()`, `debug!()`, `info!()`, `warn!()` and `error!()` macros.
//!
//! Register accesses are logged at TRACE, so `RUST_LOG=fpga_miner=trace`
//! yields a full register-level transcript.

use tracing_subscriber::{
    filter::{EnvFilter, LevelFilter},
    prelude::*,
};

pub mod prelude {
    #[allow(unused_imports)]
    pub use tracing::{debug, error, info, trace, warn};
}

/// Log to stderr, filtering according to environment variable RUST_LOG,
/// overriding the default level (ERROR) to INFO.
///
/// Stdout is left to the program's own output (e.g. the JSON report).
pub fn init_stderr() {
    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .with_env_var("RUST_LOG")
        .from_env_lossy();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .init();
}
