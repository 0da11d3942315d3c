mod core;
pub use self::core::{
    Completion, CompletionClient, CompletionError, Message, Role, completion_content,
    completion_url,
};
