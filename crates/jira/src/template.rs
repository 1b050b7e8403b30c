//! `{{.Path.To.Field}}` templates rendered against a JIRA issue's JSON.
//!
//! Path segments are written in Go-struct style (`Fields`, `Assignee`) and
//! resolved against the REST field names (`fields`, `assignee`). `Type` maps
//! to `issuetype`.

use serde_json::Value;

use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Part {
    Text(String),
    Field(Vec<String>),
}

/// A parsed template, reusable across issues.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    parts: Vec<Part>,
}

impl Template {
    pub fn parse(source: &str) -> Result<Self> {
        let mut parts = Vec::new();
        let mut rest = source;
        while let Some(open) = rest.find("{{") {
            if open > 0 {
                parts.push(Part::Text(rest[..open].to_string()));
            }
            let after = &rest[open + 2..];
            let close = after
                .find("}}")
                .ok_or_else(|| Error::template(format!("unclosed action in {source:?}")))?;
            let action = after[..close].trim();
            let path = action
                .strip_prefix('.')
                .filter(|p| !p.is_empty() && !p.contains(char::is_whitespace))
                .ok_or_else(|| Error::template(format!("unsupported action {{{{{action}}}}}")))?;
            parts.push(Part::Field(path.split('.').map(str::to_string).collect()));
            rest = &after[close + 2..];
        }
        if !rest.is_empty() {
            parts.push(Part::Text(rest.to_string()));
        }
        Ok(Self { parts })
    }

    pub fn render(&self, issue: &Value) -> Result<String> {
        let mut out = String::new();
        for part in &self.parts {
            match part {
                Part::Text(text) => out.push_str(text),
                Part::Field(path) => out.push_str(&lookup(issue, path)?),
            }
        }
        Ok(out)
    }
}

fn json_key(segment: &str) -> String {
    if segment == "Type" {
        return "issuetype".to_string();
    }
    let mut chars = segment.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn lookup(issue: &Value, path: &[String]) -> Result<String> {
    let mut value = issue;
    for segment in path {
        value = value
            .get(json_key(segment))
            .or_else(|| value.get(segment.as_str()))
            .filter(|v| !v.is_null())
            .ok_or_else(|| Error::template(format!("no value for .{}", path.join("."))))?;
    }
    Ok(match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    })
}

/// Parse and render in one go.
pub fn render(source: &str, issue: &Value) -> Result<String> {
    Template::parse(source)?.render(issue)
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {rstest::rstest, serde_json::json};

    use super::*;

    fn issue() -> Value {
        json!({
            "key": "BOT-12",
            "self": "https://jira.example.com/browse/BOT-12",
            "fields": {
                "summary": "Crash on start",
                "issuetype": {"name": "Bug"},
                "status": {"name": "Open"},
                "assignee": {"key": "alice"},
                "priority": {"id": 3},
                "customfield_10010": "sprint 4"
            }
        })
    }

    #[rstest]
    #[case("{{.Key}}", "BOT-12")]
    #[case("{{ .Fields.Summary }}!", "Crash on start!")]
    #[case("New {{.Fields.Type.Name}}: {{.Key}}", "New Bug: BOT-12")]
    #[case("{{.Fields.Priority.Id}}", "3")]
    #[case("{{.Fields.customfield_10010}}", "sprint 4")]
    #[case("plain text", "plain text")]
    fn renders(#[case] source: &str, #[case] expected: &str) {
        assert_eq!(render(source, &issue()).unwrap(), expected);
    }

    #[rstest]
    #[case("{{.Key")]
    #[case("{{if .Key}}")]
    #[case("{{.}}")]
    fn rejects_bad_templates(#[case] source: &str) {
        assert!(Template::parse(source).is_err());
    }

    #[test]
    fn missing_fields_are_errors() {
        assert!(render("{{.Fields.Resolution.Name}}", &issue()).is_err());
    }
}
