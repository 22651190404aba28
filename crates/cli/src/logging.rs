// Minimal stderr logger for the `log` facade.
//
// -q silences everything; otherwise `TMIRROR_LOG` wins over -v.

use log::{Level, LevelFilter, Log, Metadata, Record};

pub const ENV_VAR: &str = "TMIRROR_LOG";

struct StderrLogger;

static LOGGER: StderrLogger = StderrLogger;

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        match record.level() {
            Level::Info => eprintln!("{}", record.args()),
            level => eprintln!("{}: {}", level.as_str().to_lowercase(), record.args()),
        }
    }

    fn flush(&self) {}
}

/// Level from flags: -q silences everything, each -v raises one step above `warn`.
pub fn level_from_flags(verbose: u8, quiet: bool) -> LevelFilter {
    if quiet {
        return LevelFilter::Off;
    }
    match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

pub fn parse_level(s: &str) -> Option<LevelFilter> {
    s.trim().parse().ok()
}

pub fn resolve_level(verbose: u8, quiet: bool, env: Option<&str>) -> LevelFilter {
    if quiet {
        return LevelFilter::Off;
    }
    env.and_then(parse_level)
        .unwrap_or_else(|| level_from_flags(verbose, false))
}

pub fn init(verbose: u8, quiet: bool) {
    let env = std::env::var(ENV_VAR).ok();
    let level = resolve_level(verbose, quiet, env.as_deref());
    // A second init (tests) keeps the first logger
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(level);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags() {
        assert_eq!(level_from_flags(0, false), LevelFilter::Warn);
        assert_eq!(level_from_flags(2, false), LevelFilter::Debug);
        assert_eq!(level_from_flags(5, false), LevelFilter::Trace);
        assert_eq!(level_from_flags(3, true), LevelFilter::Off);
    }

    #[test]
    fn quiet_beats_env() {
        assert_eq!(resolve_level(0, true, Some("debug")), LevelFilter::Off);
        assert_eq!(resolve_level(0, false, Some("debug")), LevelFilter::Debug);
        assert_eq!(resolve_level(1, false, Some("nonsense")), LevelFilter::Info);
        assert_eq!(resolve_level(2, false, None), LevelFilter::Debug);
    }

    #[test]
    fn env_values() {
        assert_eq!(parse_level("debug"), Some(LevelFilter::Debug));
        assert_eq!(parse_level(" INFO "), Some(LevelFilter::Info));
        assert_eq!(parse_level("off"), Some(LevelFilter::Off));
        assert_eq!(parse_level("loud"), None);
    }
}
