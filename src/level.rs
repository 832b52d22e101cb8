use std::fmt;

/// Severity of a log entry, ordered from least to most severe.
///
/// A [`Logger`](crate::logger::Logger) drops any entry whose level is
/// below its configured minimum before doing any work, including
/// evaluating lazy message blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    Debug,
    Info,
    Warn,
    Error,
    Fatal,
    /// Sentinel for entries with no resolvable severity. Orders above
    /// [`Level::Fatal`] so it always passes the minimum-level gate.
    Unknown,
}

impl Level {
    /// The five real severities, least severe first. `Unknown` is not a
    /// loggable severity in its own right and is deliberately excluded.
    pub const LEVELS: [Level; 5] = [
        Level::Debug,
        Level::Info,
        Level::Warn,
        Level::Error,
        Level::Fatal,
    ];

    /// Lowercase name as it appears in the `severity` payload field.
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Debug => "debug",
            Level::Info => "info",
            Level::Warn => "warn",
            Level::Error => "error",
            Level::Fatal => "fatal",
            Level::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::Level;

    #[test]
    fn levels_order_from_least_to_most_severe() {
        assert!(Level::Debug < Level::Info);
        assert!(Level::Info < Level::Warn);
        assert!(Level::Warn < Level::Error);
        assert!(Level::Error < Level::Fatal);
    }

    #[test]
    fn unknown_orders_above_every_real_level() {
        for level in Level::LEVELS {
            assert!(Level::Unknown > level);
        }
    }

    #[test]
    fn names_are_lowercase() {
        assert_eq!(Level::Warn.as_str(), "warn");
        assert_eq!(Level::Unknown.to_string(), "unknown");
    }
}
