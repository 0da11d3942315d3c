//! The conversation history that round-trips between the browser and
//! the server. Nothing is stored server side: the caller sends the
//! history it has, the server appends one turn and sends it back.
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::openai::{Message, Role};

/// One item of a caller-supplied history.
///
/// Well-formed turns are parsed into a `Message`. Anything else is
/// kept as the raw JSON value so it can be forwarded to the model and
/// returned to the caller exactly as it was received.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
#[serde(untagged)]
pub enum Entry {
    Message(Message),
    Opaque(Value),
}

impl From<Message> for Entry {
    fn from(msg: Message) -> Self {
        Entry::Message(msg)
    }
}

#[derive(Clone, Default, Serialize, Deserialize, Debug, PartialEq)]
#[serde(transparent)]
pub struct History(Vec<Entry>);

impl History {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Coerce whatever the caller sent as `history` into a
    /// `History`. Anything that isn't a JSON array starts a fresh
    /// conversation.
    pub fn from_value(value: Option<Value>) -> Self {
        match value {
            Some(Value::Array(items)) => Self(
                items
                    .into_iter()
                    .map(|item| {
                        serde_json::from_value::<Message>(item.clone())
                            .map(Entry::Message)
                            .unwrap_or(Entry::Opaque(item))
                    })
                    .collect(),
            ),
            Some(Value::Null) | None => Self::new(),
            Some(other) => {
                tracing::debug!("Ignoring non-array history: {}", other);
                Self::new()
            }
        }
    }

    /// Returns a new history with the user message and the assistant
    /// reply appended. `self` is left untouched.
    pub fn append_turn(&self, user_message: &str, assistant_reply: &str) -> Self {
        let mut entries = Vec::with_capacity(self.0.len() + 2);
        entries.extend(self.0.iter().cloned());
        entries.push(Message::new(Role::User, user_message).into());
        entries.push(Message::new(Role::Assistant, assistant_reply).into());
        Self(entries)
    }

    pub fn entries(&self) -> &[Entry] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Entry> {
        self.0.iter()
    }
}
