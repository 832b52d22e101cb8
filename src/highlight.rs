use crate::colors;

/// ANSI highlighter for single-line JSON payloads.
///
/// The theme is keyed off the record's severity, discovered by pattern
/// matching the serialized text itself so the highlighter stays a pure
/// string-to-string pass.
struct Theme {
    text: (u8, u8, u8),
    value: (u8, u8, u8),
    punctuation: (u8, u8, u8),
}

impl Theme {
    fn for_severity(severity: Option<&str>) -> Theme {
        let base = Theme {
            text: (255, 255, 255),
            value: (0x35, 0xAE, 0xFF),
            punctuation: (0x88, 0x88, 0x88),
        };
        match severity {
            Some("error") | Some("fatal") => Theme {
                value: (0xFF, 0x35, 0x5D),
                ..base
            },
            Some("warn") => Theme {
                value: (0xFF, 0xD7, 0x00),
                ..base
            },
            Some("debug") => Theme {
                text: (0x99, 0x99, 0x99),
                value: (0xCC, 0xCC, 0xCC),
                ..base
            },
            _ => base,
        }
    }
}

/// Find the value of a `"severity":"..."` pair in serialized JSON.
fn extract_severity(json: &str) -> Option<&str> {
    let marker = "\"severity\":\"";
    let start = json.find(marker)? + marker.len();
    let rest = &json[start..];
    let end = rest.find('"')?;
    Some(&rest[..end])
}

/// Colorize one line of serialized JSON: strings and numbers take the
/// severity's value color, structural punctuation is dimmed, everything
/// else uses the theme's text color.
pub(crate) fn highlight(json: &str) -> String {
    let theme = Theme::for_severity(extract_severity(json));
    let mut out = String::with_capacity(json.len() * 2);
    let mut chars = json.char_indices().peekable();

    while let Some((start, ch)) = chars.next() {
        match ch {
            '"' => {
                let mut end = start + ch.len_utf8();
                let mut escaped = false;
                for (i, c) in chars.by_ref() {
                    end = i + c.len_utf8();
                    if escaped {
                        escaped = false;
                    } else if c == '\\' {
                        escaped = true;
                    } else if c == '"' {
                        break;
                    }
                }
                out.push_str(&colors::colorize(&json[start..end], theme.value));
            }
            '{' | '}' | '[' | ']' | ':' | ',' => {
                out.push_str(&colors::colorize(
                    &json[start..start + ch.len_utf8()],
                    theme.punctuation,
                ));
            }
            '-' | '0'..='9' => {
                let mut end = start + ch.len_utf8();
                while let Some(&(i, c)) = chars.peek() {
                    if c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '+' | '-') {
                        end = i + c.len_utf8();
                        chars.next();
                    } else {
                        break;
                    }
                }
                out.push_str(&colors::colorize(&json[start..end], theme.value));
            }
            c if c.is_whitespace() => out.push(c),
            _ => {
                // Bare literals (true/false/null) and anything else.
                let mut end = start + ch.len_utf8();
                while let Some(&(i, c)) = chars.peek() {
                    if c.is_ascii_alphabetic() {
                        end = i + c.len_utf8();
                        chars.next();
                    } else {
                        break;
                    }
                }
                out.push_str(&colors::colorize(&json[start..end], theme.text));
            }
        }
    }

    out
}
