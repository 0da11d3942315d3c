mod core;
pub use self::core::{ChatError, ChatService, ChatTurn};

mod models;
pub use models::{Entry, History};

pub mod normalize;
pub use normalize::{NormalizedReply, normalize};
