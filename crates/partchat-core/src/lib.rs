pub mod client;
pub mod config;
pub mod conversation;
pub mod input;
pub mod markup;
pub mod provider;
pub mod state;

// Re-export main types for convenience
pub use client::{ChatBackend, ChatClient, ChatReply, ClientError, ReplyKind};
pub use config::{Config, ConfigError};
pub use conversation::{Conversation, PendingTurn};
pub use input::InputLine;
pub use provider::{Provider, UnknownProvider};
pub use state::{ChatMessage, ChatRole};
