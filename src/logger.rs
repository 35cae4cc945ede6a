//! Logging configuration

use std::sync::LazyLock;
use tracing_subscriber::{
    fmt, fmt::time::ChronoLocal, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

static HOSTNAME: LazyLock<String> = LazyLock::new(|| {
    hostname::get()
        .ok()
        .and_then(|h| h.into_string().ok())
        .unwrap_or_else(|| "unknown".to_string())
});

/// Output format of the global subscriber
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Compact,
    /// Compact lines plus a startup record of host and memory
    Detailed,
    #[cfg(feature = "json")]
    Json,
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install the global subscriber. `RUST_LOG` (also read from `.env`)
/// overrides the default `info` level.
pub fn init_logger(format: LogFormat) {
    dotenvy::dotenv().ok();

    match format {
        LogFormat::Compact => {
            tracing_subscriber::registry()
                .with(env_filter())
                .with(
                    fmt::layer()
                        .with_timer(ChronoLocal::rfc_3339())
                        .with_target(false)
                        .with_level(true)
                        .with_ansi(true)
                        .compact(),
                )
                .init();
            tracing::info!("Logger initialized");
        }
        LogFormat::Detailed => {
            tracing_subscriber::registry()
                .with(env_filter())
                .with(
                    fmt::layer()
                        .with_timer(ChronoLocal::rfc_3339())
                        .with_target(true)
                        .with_level(true)
                        .with_file(true)
                        .with_line_number(true)
                        .with_thread_ids(true)
                        .with_ansi(true)
                        .compact(),
                )
                .init();
            tracing::info!(
                hostname = %get_hostname(),
                memory = %get_memory_usage(),
                "Logger initialized (detailed format)"
            );
        }
        #[cfg(feature = "json")]
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(env_filter())
                .with(
                    fmt::layer()
                        .json()
                        .with_target(true)
                        .with_current_span(true)
                        .with_span_list(true),
                )
                .init();
            tracing::info!("Logger initialized (JSON format)");
        }
    }
}

/// Resident memory of this process, e.g. `12.3M`
pub fn get_memory_usage() -> String {
    #[cfg(target_os = "linux")]
    {
        if let Ok(status) = std::fs::read_to_string("/proc/self/status") {
            let rss_kb = status
                .lines()
                .find(|line| line.starts_with("VmRSS:"))
                .and_then(|line| line.split_whitespace().nth(1))
                .and_then(|kb| kb.parse::<f64>().ok());
            if let Some(kb) = rss_kb {
                return format!("{:.1}M", kb / 1024.0);
            }
        }
    }

    use sysinfo::{Pid, System};
    let pid = Pid::from_u32(std::process::id());
    let mut system = System::new();
    system.refresh_process(pid);
    match system.process(pid) {
        Some(process) => format!("{:.1}M", process.memory() as f64 / (1024.0 * 1024.0)),
        None => "N/A".to_string(),
    }
}

pub fn get_hostname() -> &'static str {
    &HOSTNAME
}

#[macro_export]
macro_rules! log_with_context {
    ($level:ident, $($arg:tt)*) => {
        {
            let hostname = $crate::logger::get_hostname();
            let memory = $crate::logger::get_memory_usage();
            tracing::$level!(
                hostname = %hostname,
                memory = %memory,
                $($arg)*
            );
        }
    };
}
