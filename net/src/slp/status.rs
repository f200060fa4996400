use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::error::DecodeError;

/// Server list status document, decoded once per successful query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusResponse {
    pub description: Description,
    pub players: Players,
    pub version: Version,
    /// `data:image/png;base64,...` icon.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub favicon: Option<String>,
    /// Any other top-level fields the server sent, kept verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// MOTD, either a bare string or a chat component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Description {
    Text(String),
    Component(Value),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Players {
    pub max: i64,
    pub online: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample: Option<Vec<PlayerSample>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSample {
    pub name: String,
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Version {
    pub name: String,
    pub protocol: i32,
}

impl StatusResponse {
    pub fn from_json(json: &str) -> Result<Self, DecodeError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn online(&self) -> i64 {
        self.players.online
    }
}

impl Description {
    /// MOTD with component structure and `§` formatting codes removed.
    pub fn plain_text(&self) -> String {
        let mut raw = String::new();
        match self {
            Description::Text(text) => raw.push_str(text),
            Description::Component(value) => collect_text(value, &mut raw),
        }
        strip_formatting(&raw)
    }
}

fn collect_text(value: &Value, out: &mut String) {
    match value {
        Value::String(text) => out.push_str(text),
        Value::Array(parts) => parts.iter().for_each(|part| collect_text(part, out)),
        Value::Object(component) => {
            if let Some(Value::String(text)) = component.get("text") {
                out.push_str(text);
            }
            if let Some(extra) = component.get("extra") {
                collect_text(extra, out);
            }
        }
        _ => {}
    }
}

fn strip_formatting(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c == '§' {
            chars.next();
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_minimal_document() {
        let status = StatusResponse::from_json(
            r#"{"description":"A Minecraft Server","players":{"max":20,"online":3},"version":{"name":"1.20.1","protocol":763}}"#,
        )
        .unwrap();

        assert_eq!(status.players.online, 3);
        assert_eq!(status.players.max, 20);
        assert_eq!(status.players.sample, None);
        assert_eq!(status.version.protocol, 763);
        assert_eq!(status.favicon, None);
        assert_eq!(status.description.plain_text(), "A Minecraft Server");
    }

    #[test]
    fn decodes_full_document_and_keeps_unknown_fields() {
        let status = StatusResponse::from_json(
            r#"{
                "version": {"name": "Paper 1.20.4", "protocol": 765},
                "players": {"max": 100, "online": 2, "sample": [
                    {"name": "alice", "id": "4566e69f-c907-48ee-8d71-d7ba5aa00d20"},
                    {"name": "bob", "id": "00000000-0000-0000-0000-000000000000"}
                ]},
                "description": {"text": "§aHello ", "extra": [{"text": "world", "bold": true}]},
                "favicon": "data:image/png;base64,AAAA",
                "enforcesSecureChat": true
            }"#,
        )
        .unwrap();

        let sample = status.players.sample.as_ref().unwrap();
        assert_eq!(sample.len(), 2);
        assert_eq!(sample[0].name, "alice");
        assert_eq!(status.favicon.as_deref(), Some("data:image/png;base64,AAAA"));
        assert_eq!(status.description.plain_text(), "Hello world");
        assert_eq!(status.extra.get("enforcesSecureChat"), Some(&Value::Bool(true)));

        let reencoded = serde_json::to_value(&status).unwrap();
        assert_eq!(reencoded["enforcesSecureChat"], Value::Bool(true));
        assert_eq!(reencoded["players"]["online"], 2);
    }

    #[test]
    fn missing_required_fields_fail() {
        let missing_players =
            r#"{"description":"x","version":{"name":"1.20.1","protocol":763}}"#;
        assert!(matches!(
            StatusResponse::from_json(missing_players),
            Err(DecodeError::Json(_))
        ));

        let missing_online = r#"{"description":"x","players":{"max":20},"version":{"name":"1.20.1","protocol":763}}"#;
        assert!(StatusResponse::from_json(missing_online).is_err());

        assert!(StatusResponse::from_json(r#"{"description":"#).is_err());
    }
}
