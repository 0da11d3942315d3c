use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ai::prompt::compose_messages;
use crate::openai::{Completion, CompletionError};
use super::models::History;
use super::normalize::{NormalizedReply, normalize};

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("message is required")]
    Validation,
    #[error(transparent)]
    Completion(#[from] CompletionError),
}

/// The answer to one chat turn along with the history the caller
/// should send back next time.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub reply: String,
    pub followups: Vec<String>,
    pub history: History,
}

/// The request pipeline shared by every entrypoint: compose the
/// prompt, make one completion call, normalize the output and append
/// the turn to the history.
///
/// Holds no per-conversation state. Everything that varies between
/// requests comes in as arguments.
pub struct ChatService {
    instructions: String,
    client: Arc<dyn Completion>,
}

impl ChatService {
    pub fn new(instructions: &str, client: Arc<dyn Completion>) -> Self {
        Self {
            instructions: instructions.to_string(),
            client,
        }
    }

    pub async fn respond(&self, message: &str, history: &History) -> Result<ChatTurn, ChatError> {
        let message = message.trim();
        if message.is_empty() {
            return Err(ChatError::Validation);
        }

        let messages = compose_messages(&self.instructions, history, message);
        tracing::debug!(
            "Requesting completion with {} history entries",
            history.len()
        );
        let raw = self.client.complete(&messages).await?;

        let NormalizedReply { reply, followups } = normalize(&raw);
        let history = history.append_turn(message, &reply);

        Ok(ChatTurn {
            reply,
            followups,
            history,
        })
    }
}
