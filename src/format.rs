use crate::colors;
use crate::highlight;
use crate::payload::Payload;
use serde_json::Value;
use std::str::FromStr;

/// Error returned when parsing a formatter name from configuration.
#[derive(thiserror::Error, Debug)]
#[error("unknown or unsupported formatter name: {0}")]
pub struct UnknownFormatter(pub String);

/// Closed set of output renderings a logger can be built with.
///
/// - `Json`: the payload as a single-line JSON object.
/// - `Simple`: space-joined `key: value` pairs in payload order.
/// - `Go`: `<time> <SEVERITY> <message> <key>=<value> ...`, the style
///   popularized by Go's structured loggers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormatterKind {
    #[default]
    Json,
    Simple,
    Go,
}

impl FromStr for FormatterKind {
    type Err = UnknownFormatter;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "json" => Ok(FormatterKind::Json),
            "simple" => Ok(FormatterKind::Simple),
            "go" => Ok(FormatterKind::Go),
            other => Err(UnknownFormatter(other.to_string())),
        }
    }
}

impl FormatterKind {
    /// Render a finished payload to a newline-terminated line.
    pub fn render(&self, payload: &Payload, highlight: bool) -> String {
        match self {
            FormatterKind::Json => render_json(payload, highlight),
            FormatterKind::Simple => render_simple(payload, highlight),
            FormatterKind::Go => render_go(payload, highlight),
        }
    }
}

fn severity_of(payload: &Payload) -> &str {
    payload
        .get("severity")
        .and_then(Value::as_str)
        .unwrap_or("unknown")
}

/// Scalar rendering for the text formatters: strings print bare, other
/// values serialize, embedded newlines are escaped to keep one record
/// per line.
fn sanitize(value: &Value) -> String {
    let text = match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    text.replace('\n', "\\n")
}

fn maybe_colorize(text: &str, color: (u8, u8, u8), highlight: bool) -> String {
    if highlight {
        colors::colorize(text, color)
    } else {
        text.to_string()
    }
}

fn render_json(payload: &Payload, highlighted: bool) -> String {
    let json = Value::Object(payload.clone()).to_string();
    if !highlighted {
        return json + "\n";
    }

    // Relax the spacing before coloring so the line stays readable.
    let mut json = json.replace("\",\"", "\", \"");
    if let Some(stripped) = json.strip_prefix('{') {
        json = format!("{{ {stripped}");
    }
    if let Some(stripped) = json.strip_suffix('}') {
        json = format!("{stripped} }}");
    }
    highlight::highlight(&json) + "\n"
}

fn render_simple(payload: &Payload, highlight: bool) -> String {
    let color = colors::for_severity_name(severity_of(payload));
    let mut out = String::new();
    for (key, value) in payload {
        if !out.is_empty() {
            out.push(' ');
        }
        let key = maybe_colorize(&format!("{key}:"), color, highlight);
        out.push_str(&key);
        out.push(' ');
        out.push_str(&sanitize(value));
    }
    out + "\n"
}

const GO_EXCLUDED_KEYS: [&str; 3] = ["time", "severity", "message"];

fn render_go(payload: &Payload, highlight: bool) -> String {
    let severity = severity_of(payload);
    let color = colors::for_severity_name(severity);

    let mut out = String::new();
    if let Some(time) = payload.get("time").and_then(Value::as_str) {
        out.push_str(time);
        out.push(' ');
    }
    out.push_str(&maybe_colorize(
        &format!("{:<7}", severity.to_uppercase()),
        color,
        highlight,
    ));
    if let Some(message) = payload.get("message").and_then(Value::as_str) {
        out.push_str(&maybe_colorize(message, colors::WHITE, highlight));
        out.push(' ');
    }
    for (key, value) in payload {
        if GO_EXCLUDED_KEYS.contains(&key.as_str()) {
            continue;
        }
        out.push_str(&maybe_colorize(&format!("{key}="), colors::GRAY, highlight));
        out.push_str(&maybe_colorize(&sanitize(value), colors::WHITE, highlight));
        out.push(' ');
    }
    out.trim_end().to_string() + "\n"
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payload::Payload;
    use serde_json::json;

    fn payload() -> Payload {
        let mut p = Payload::new();
        p.insert("time".into(), json!("2026-08-23 10:00:00 +0000"));
        p.insert("severity".into(), json!("info"));
        p.insert("logger".into(), json!("example"));
        p.insert("message".into(), json!("Hello, world!"));
        p
    }

    #[test]
    fn formatter_names_parse() {
        assert_eq!("json".parse::<FormatterKind>().unwrap(), FormatterKind::Json);
        assert_eq!(
            "simple".parse::<FormatterKind>().unwrap(),
            FormatterKind::Simple
        );
        assert_eq!("go".parse::<FormatterKind>().unwrap(), FormatterKind::Go);
        assert!("logfmt".parse::<FormatterKind>().is_err());
    }

    #[test]
    fn json_renders_one_line_in_payload_order() {
        let line = FormatterKind::Json.render(&payload(), false);
        assert_eq!(
            line,
            "{\"time\":\"2026-08-23 10:00:00 +0000\",\"severity\":\"info\",\
             \"logger\":\"example\",\"message\":\"Hello, world!\"}\n"
        );
    }

    #[test]
    fn simple_renders_space_joined_pairs() {
        let line = FormatterKind::Simple.render(&payload(), false);
        assert_eq!(
            line,
            "time: 2026-08-23 10:00:00 +0000 severity: info logger: example message: Hello, world!\n"
        );
    }

    #[test]
    fn go_renders_padded_severity_and_trailing_tags() {
        let line = FormatterKind::Go.render(&payload(), false);
        assert_eq!(
            line,
            "2026-08-23 10:00:00 +0000 INFO   Hello, world! logger=example\n"
        );
    }

    #[test]
    fn go_omits_the_message_section_when_absent() {
        let mut p = payload();
        p.remove("message");
        p.insert("foo".into(), json!(42));
        let line = FormatterKind::Go.render(&p, false);
        assert_eq!(
            line,
            "2026-08-23 10:00:00 +0000 INFO   logger=example foo=42\n"
        );
    }

    #[test]
    fn text_formatters_escape_newlines_in_values() {
        let mut p = payload();
        p.insert("detail".into(), json!("line1\nline2"));
        let line = FormatterKind::Simple.render(&p, false);
        assert!(line.contains("detail: line1\\nline2"));
        assert_eq!(line.matches('\n').count(), 1);
    }
}
