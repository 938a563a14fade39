// Output formatting for CLI

use anyhow::Result;
use serde::Serialize;
use threadrunner_core::ThreadMessage;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
    Yaml,
}

impl OutputFormat {
    pub fn from_str(s: &str) -> Self {
        match s {
            "json" => OutputFormat::Json,
            "yaml" => OutputFormat::Yaml,
            _ => OutputFormat::Text,
        }
    }

    /// Render a value for json/yaml output; `None` for text output
    pub fn render<T: Serialize>(&self, value: &T) -> Result<Option<String>> {
        let rendered = match self {
            OutputFormat::Json => Some(serde_json::to_string_pretty(value)?),
            OutputFormat::Yaml => Some(serde_yaml::to_string(value)?),
            // Text format is handled by each command
            OutputFormat::Text => None,
        };
        Ok(rendered)
    }

    pub fn print_value<T: Serialize>(&self, value: &T) -> Result<()> {
        if let Some(rendered) = self.render(value)? {
            println!("{}", rendered);
        }
        Ok(())
    }

    pub fn is_text(&self) -> bool {
        matches!(self, OutputFormat::Text)
    }
}

/// Print a simple key-value pair for text output
pub fn print_field(label: &str, value: &str) {
    println!("{:<14} {}", format!("{}:", label), value);
}

/// Print a table header
pub fn print_table_header(columns: &[(&str, usize)]) {
    let header: String = columns
        .iter()
        .map(|(name, width)| format!("{:<width$}", name, width = width))
        .collect::<Vec<_>>()
        .join("  ");
    println!("{}", header);
}

/// Print a table row
pub fn print_table_row(values: &[(&str, usize)]) {
    let row: String = values
        .iter()
        .map(|(val, width)| format!("{:<width$}", truncate(val, *width), width = width))
        .collect::<Vec<_>>()
        .join("  ");
    println!("{}", row);
}

/// Shorten to `width` characters, marking the cut with "..."
pub fn truncate(value: &str, width: usize) -> String {
    if value.chars().count() <= width {
        return value.to_string();
    }
    let keep = width.saturating_sub(3);
    format!("{}...", value.chars().take(keep).collect::<String>())
}

/// One "role: content" line per message
pub fn format_transcript(messages: &[ThreadMessage]) -> String {
    messages
        .iter()
        .map(|m| format!("{}: {}", m.role, m.text()))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_str_defaults_to_text() {
        assert_eq!(OutputFormat::from_str("json"), OutputFormat::Json);
        assert_eq!(OutputFormat::from_str("yaml"), OutputFormat::Yaml);
        assert_eq!(OutputFormat::from_str("anything"), OutputFormat::Text);
    }

    #[test]
    fn test_render() {
        let value = json!({"id": "run_1"});
        assert_eq!(OutputFormat::Text.render(&value).unwrap(), None);
        assert!(OutputFormat::Json
            .render(&value)
            .unwrap()
            .unwrap()
            .contains("\"id\": \"run_1\""));
        assert_eq!(
            OutputFormat::Yaml.render(&value).unwrap().unwrap().trim(),
            "id: run_1"
        );
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a very long assistant name", 10), "a very ...");
        assert_eq!(truncate("héllo wörld", 8), "héllo...");
    }

    #[test]
    fn test_format_transcript() {
        let messages: Vec<ThreadMessage> = serde_json::from_value(json!([
            {
                "id": "msg_2", "thread_id": "t", "role": "assistant",
                "content": [{"type": "text", "text": {"value": "Saved a.txt"}}]
            },
            {
                "id": "msg_1", "thread_id": "t", "role": "user",
                "content": [{"type": "text", "text": {"value": "Write a.txt"}}]
            }
        ]))
        .unwrap();

        assert_eq!(
            format_transcript(&messages),
            "assistant: Saved a.txt\nuser: Write a.txt"
        );
    }
}
