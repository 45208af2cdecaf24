//! Logging setup
//!
//! Every subsystem logs through `tracing` with an explicit target so a
//! filter such as `filecabinet::file=debug` can isolate one backend.
//! Logs go to stderr; stdout carries command output only.

use tracing_subscriber::EnvFilter;

/// Memory backend operations.
pub const MEMORY_TARGET: &str = "filecabinet::memory";
/// File backend operations.
pub const FILE_TARGET: &str = "filecabinet::file";
/// Snapshot restore.
pub const RESTORE_TARGET: &str = "filecabinet::restore";
/// Import/export codecs.
pub const CODEC_TARGET: &str = "filecabinet::codec";
/// Command dispatch.
pub const CLI_TARGET: &str = "filecabinet::cli";

/// Builds the filter: `RUST_LOG` when set, otherwise `default_filter`.
pub fn env_filter(default_filter: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter))
}

/// Installs the global fmt subscriber writing to stderr.
///
/// Returns `false` if a subscriber was already installed, which leaves the
/// existing one in place.
pub fn init_tracing(default_filter: &str) -> bool {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(default_filter))
        .with_writer(std::io::stderr)
        .with_target(true)
        .try_init()
        .is_ok()
}
