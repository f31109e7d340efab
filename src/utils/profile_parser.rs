//! Typed parsing of the free-form `skills` and `experience` profile columns.
//!
//! Both columns were historically written by different forms: sometimes a
//! JSON document, sometimes JSON that was string-escaped once more, sometimes
//! plain text. Parsing never panics and never silently drops input: anything
//! that is not understood comes back as [`ParsedField::Unparseable`] with the
//! raw text so callers can still show it verbatim.

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use serde_json::{Map, Value as JsonValue};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ParsedField<T> {
    Parsed(T),
    Unparseable(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExperienceEntry {
    pub title: String,
    pub company: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
    /// Display form of `start`/`end`, e.g. `03/2021 - Present`.
    pub period: Option<String>,
    pub description: Option<String>,
}

/// Skills are stored either as a JSON array of strings or as a comma /
/// newline / semicolon separated list.
pub fn parse_skills(raw: &str) -> ParsedField<Vec<String>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return ParsedField::Parsed(Vec::new());
    }

    if trimmed.starts_with('[') || trimmed.starts_with('"') {
        return match decode_json(trimmed) {
            Some(JsonValue::Array(items)) => {
                let mut skills = Vec::with_capacity(items.len());
                for item in items {
                    match item {
                        JsonValue::String(s) if !s.trim().is_empty() => {
                            skills.push(s.trim().to_string())
                        }
                        JsonValue::String(_) => {}
                        _ => return ParsedField::Unparseable(raw.to_string()),
                    }
                }
                ParsedField::Parsed(skills)
            }
            _ => ParsedField::Unparseable(raw.to_string()),
        };
    }

    if trimmed.starts_with('{') {
        return ParsedField::Unparseable(raw.to_string());
    }

    let skills = trimmed
        .split(|c: char| c == ',' || c == ';' || c == '\n')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();
    ParsedField::Parsed(skills)
}

/// Experience is a JSON object or array of objects with `title`, `company`,
/// `start`, `end` and `description` keys. Plain prose is unparseable.
pub fn parse_experience(raw: &str) -> ParsedField<Vec<ExperienceEntry>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return ParsedField::Parsed(Vec::new());
    }

    let nodes = match decode_json(trimmed) {
        Some(JsonValue::Array(items)) => items,
        Some(object @ JsonValue::Object(_)) => vec![object],
        _ => return ParsedField::Unparseable(raw.to_string()),
    };

    let mut entries = Vec::with_capacity(nodes.len());
    for node in nodes {
        match node {
            JsonValue::Object(map) => {
                if let Some(entry) = entry_from_map(&map) {
                    entries.push(entry);
                }
            }
            JsonValue::Null => {}
            _ => return ParsedField::Unparseable(raw.to_string()),
        }
    }
    ParsedField::Parsed(entries)
}

/// Parses JSON, unwrapping one level of string escaping if the document was
/// stored as a JSON string literal.
fn decode_json(text: &str) -> Option<JsonValue> {
    match serde_json::from_str::<JsonValue>(text).ok()? {
        JsonValue::String(inner) => {
            let inner = inner.trim();
            if inner.starts_with('[') || inner.starts_with('{') {
                serde_json::from_str(inner).ok()
            } else {
                None
            }
        }
        other => Some(other),
    }
}

fn entry_from_map(map: &Map<String, JsonValue>) -> Option<ExperienceEntry> {
    let title = text_field(map, "title");
    let company = text_field(map, "company");
    let start = text_field(map, "start").map(|s| format_period(&s));
    let end = text_field(map, "end").map(|s| format_period(&s));
    let description = text_field(map, "description");

    if title.is_none() && company.is_none() && start.is_none() && end.is_none() && description.is_none() {
        return None;
    }

    Some(ExperienceEntry {
        title: title.unwrap_or_else(|| "Untitled role".to_string()),
        company,
        period: period_label(start.as_deref(), end.as_deref()),
        start,
        end,
        description,
    })
}

fn period_label(start: Option<&str>, end: Option<&str>) -> Option<String> {
    match (start, end) {
        (Some(start), Some(end)) => Some(format!("{} - {}", start, end)),
        (Some(start), None) => Some(format!("Since {}", start)),
        (None, Some(end)) => Some(format!("Until {}", end)),
        (None, None) => None,
    }
}

fn text_field(map: &Map<String, JsonValue>, key: &str) -> Option<String> {
    let text = match map.get(key)? {
        JsonValue::String(s) => s.trim().to_string(),
        JsonValue::Number(n) => n.to_string(),
        _ => return None,
    };
    (!text.is_empty()).then_some(text)
}

/// `2021-03-15` and `2021-03` render as `03/2021`; `present`/`now`/`current`
/// render as `Present`; anything else is kept as written.
fn format_period(raw: &str) -> String {
    let trimmed = raw.trim();
    if ["present", "now", "current"]
        .iter()
        .any(|word| trimmed.eq_ignore_ascii_case(word))
    {
        return "Present".to_string();
    }
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return date.format("%m/%Y").to_string();
    }
    if let Ok(date) = NaiveDateTime::parse_from_str(&format!("{}-01 00:00", trimmed), "%Y-%m-%d %H:%M") {
        return date.format("%m/%Y").to_string();
    }
    trimmed.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skills_from_json_array() {
        assert_eq!(
            parse_skills(r#"["Rust", " SQL ", ""]"#),
            ParsedField::Parsed(vec!["Rust".to_string(), "SQL".to_string()])
        );
    }

    #[test]
    fn skills_from_delimited_text() {
        assert_eq!(
            parse_skills("Rust, Postgres;\nDocker"),
            ParsedField::Parsed(vec!["Rust".into(), "Postgres".into(), "Docker".into()])
        );
    }

    #[test]
    fn skills_from_double_encoded_json() {
        assert_eq!(
            parse_skills(r#""[\"Go\",\"Kafka\"]""#),
            ParsedField::Parsed(vec!["Go".into(), "Kafka".into()])
        );
    }

    #[test]
    fn broken_json_skills_are_kept_raw() {
        let raw = r#"["Rust", "#;
        assert_eq!(parse_skills(raw), ParsedField::Unparseable(raw.to_string()));
    }

    #[test]
    fn experience_array_is_normalized() {
        let raw = r#"[{"title":"Developer","company":"Acme","start":"2021-03","end":"present"},{}]"#;
        let ParsedField::Parsed(entries) = parse_experience(raw) else {
            panic!("expected parsed experience");
        };
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].start.as_deref(), Some("03/2021"));
        assert_eq!(entries[0].end.as_deref(), Some("Present"));
        assert_eq!(entries[0].period.as_deref(), Some("03/2021 - Present"));
    }

    #[test]
    fn experience_object_without_title_gets_placeholder() {
        let raw = r#"{"company":"Globex","start":"2019-07-01"}"#;
        let ParsedField::Parsed(entries) = parse_experience(raw) else {
            panic!("expected parsed experience");
        };
        assert_eq!(entries[0].title, "Untitled role");
        assert_eq!(entries[0].period.as_deref(), Some("Since 07/2019"));
    }

    #[test]
    fn experience_without_dates_has_no_period() {
        let ParsedField::Parsed(entries) = parse_experience(r#"{"title":"Intern"}"#) else {
            panic!("expected parsed experience");
        };
        assert_eq!(entries[0].period, None);
    }

    #[test]
    fn prose_experience_is_unparseable() {
        let raw = "Five years building payment systems";
        assert_eq!(parse_experience(raw), ParsedField::Unparseable(raw.to_string()));
    }
}
