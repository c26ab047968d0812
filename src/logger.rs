use env_logger::{Builder, Env};
use log::Level;
use std::io::Write;

/// Log target that marks an info record as a success line. It sits under the
/// crate path so module filters like `RUST_LOG=planit_fetch=info` keep it.
pub const SUCCESS_TARGET: &str = "planit_fetch::success";

#[macro_export]
macro_rules! success {
    ($($arg:tt)+) => {
        ::log::info!(target: $crate::logger::SUCCESS_TARGET, $($arg)+)
    };
}

/// Timestamped, leveled console output. `RUST_LOG` overrides the default `info` filter.
pub fn init() {
    let _ = Builder::from_env(Env::default().default_filter_or("info"))
        .format(|buf, record| {
            writeln!(
                buf,
                "{} {:<7} {}",
                buf.timestamp_millis(),
                label(record.level(), record.target()),
                record.args()
            )
        })
        .try_init();
}

fn label(level: Level, target: &str) -> &'static str {
    match level {
        Level::Info if target == SUCCESS_TARGET => "SUCCESS",
        Level::Info => "INFO",
        Level::Warn => "WARN",
        Level::Error => "ERROR",
        Level::Debug => "DEBUG",
        Level::Trace => "TRACE",
    }
}
