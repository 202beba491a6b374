use std::{path::Path, sync::LazyLock};

use anyhow::Result;
use tracing::level_filters::LevelFilter;
use tracing_appender::rolling::Rotation;
use tracing_subscriber::fmt::{format::FmtSpan, writer::MakeWriterExt};

pub const LOGS_DIR: &str = "logs";

/// Which process is writing. Each gets its own rolling file family under [LOGS_DIR].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTarget {
    /// Short lived `sundown` commands.
    Cli,
    /// The tracking loop, whether detached or started with `sundown serve`.
    Daemon,
}

impl LogTarget {
    pub fn prefix(&self) -> &'static str {
        match self {
            LogTarget::Cli => "cli",
            LogTarget::Daemon => "daemon",
        }
    }

    /// Used when neither an explicit level nor `RUST_LOG` is given. The daemon runs for days, so
    /// it skips per-tick debug output.
    fn default_level(&self) -> LevelFilter {
        match self {
            LogTarget::Cli => LevelFilter::DEBUG,
            LogTarget::Daemon => LevelFilter::INFO,
        }
    }
}

/// Writes logs into daily rolling files under `<app_dir>/logs`, optionally mirrored to stdout.
pub fn enable_logging(
    target: LogTarget,
    app_dir: &Path,
    log_level: Option<LevelFilter>,
    show_std: bool,
) -> Result<()> {
    let appender = tracing_appender::rolling::Builder::new()
        .rotation(Rotation::DAILY)
        .max_log_files(5)
        .filename_prefix(target.prefix())
        .build(app_dir.join(LOGS_DIR))?;

    let stdout = std::io::stdout.with_filter(move |_| show_std);

    let level = log_level.map(|v| v.to_string()).unwrap_or_else(|| {
        std::env::var("RUST_LOG").unwrap_or_else(|_| target.default_level().to_string())
    });

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(format!(
            "{}={level}",
            env!("CARGO_PKG_NAME").replace("-", "_"),
        )))
        .with_span_events(FmtSpan::CLOSE)
        .with_writer(stdout.and(appender))
        .pretty()
        .init();
    Ok(())
}

pub static TEST_LOGGING: LazyLock<()> = LazyLock::new(|| {
    tracing_subscriber::fmt()
        .with_max_level(LevelFilter::TRACE)
        .with_test_writer()
        .pretty()
        .init()
});

#[cfg(test)]
mod tests {
    use tracing::level_filters::LevelFilter;

    use super::LogTarget;

    #[test]
    fn test_targets_write_separate_files() {
        assert_eq!(LogTarget::Cli.prefix(), "cli");
        assert_eq!(LogTarget::Daemon.prefix(), "daemon");
        assert_eq!(LogTarget::Daemon.default_level(), LevelFilter::INFO);
    }
}
