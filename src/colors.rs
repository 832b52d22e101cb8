use colored::Colorize;

/// Truecolor palette matching the classic xterm-256 indexes used for
/// each severity (info 75, warn 220, debug 252, error/fatal 203) plus
/// the two neutral tones the formatters use for keys and values.
pub(crate) const INFO: (u8, u8, u8) = (95, 175, 255);
pub(crate) const WARN: (u8, u8, u8) = (255, 215, 0);
pub(crate) const DEBUG: (u8, u8, u8) = (208, 208, 208);
pub(crate) const ERROR: (u8, u8, u8) = (255, 95, 95);
pub(crate) const WHITE: (u8, u8, u8) = (238, 238, 238);
pub(crate) const GRAY: (u8, u8, u8) = (118, 118, 118);

pub(crate) fn for_severity_name(severity: &str) -> (u8, u8, u8) {
    match severity {
        "debug" => DEBUG,
        "warn" => WARN,
        "error" | "fatal" => ERROR,
        _ => INFO,
    }
}

pub(crate) fn colorize(text: &str, (r, g, b): (u8, u8, u8)) -> String {
    text.truecolor(r, g, b).to_string()
}
