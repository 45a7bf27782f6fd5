use std::borrow::Cow;

use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Envelope {
    RoleContent(String),
    NestedMessage(String),
    MessageList(String),
    BareContent(String),
    Opaque,
}

impl Envelope {
    pub fn classify(raw: &str) -> Self {
        if raw.trim().is_empty() {
            return Self::Opaque;
        }

        let Ok(value) = serde_json::from_str::<Value>(raw) else {
            return Self::Opaque;
        };

        match &value {
            Value::Object(object) => classify_object(object),
            Value::Array(items) => classify_list(items),
            _ => Self::Opaque,
        }
    }

    fn into_content(self) -> Option<String> {
        match self {
            Self::RoleContent(content)
            | Self::NestedMessage(content)
            | Self::MessageList(content)
            | Self::BareContent(content) => Some(content),
            Self::Opaque => None,
        }
    }
}

pub fn unwrap_payload(raw: &str) -> Cow<'_, str> {
    match Envelope::classify(raw).into_content() {
        Some(content) => Cow::Owned(content),
        None => Cow::Borrowed(raw),
    }
}

fn classify_object(object: &Map<String, Value>) -> Envelope {
    if non_empty_str(object.get("role")).is_some()
        && let Some(content) = non_empty_str(object.get("content"))
    {
        return Envelope::RoleContent(content.to_string());
    }

    if let Some(Value::Object(message)) = object.get("message")
        && let Some(content) = non_empty_str(message.get("content"))
    {
        return Envelope::NestedMessage(content.to_string());
    }

    match object.get("content") {
        Some(Value::String(content)) => Envelope::BareContent(content.clone()),
        _ => Envelope::Opaque,
    }
}

fn classify_list(items: &[Value]) -> Envelope {
    items
        .iter()
        .filter_map(Value::as_object)
        .find_map(|item| {
            let role = item.get("role").and_then(Value::as_str)?;
            if !role.eq_ignore_ascii_case("assistant") {
                return None;
            }
            non_empty_str(item.get("content")).map(ToOwned::to_owned)
        })
        .map(Envelope::MessageList)
        .unwrap_or(Envelope::Opaque)
}

fn non_empty_str(value: Option<&Value>) -> Option<&str> {
    value
        .and_then(Value::as_str)
        .filter(|text| !text.is_empty())
}
