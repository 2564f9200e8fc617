//! # palaver-store
//!
//! In-memory messenger state for Palaver, persisted to three delimited text
//! tables (identities, conversations, groups).
//!
//! The crate exposes a synchronous [`Messenger`] that owns every
//! conversation and group chat, tracks the active session and rewrites the
//! affected table after each mutation.

pub mod codec;
pub mod config;
pub mod conversations;
pub mod directory;
pub mod groups;
pub mod ids;
pub mod messenger;
pub mod models;
pub mod session;
pub mod storage;

mod error;

pub use config::StoreConfig;
pub use conversations::Conversation;
pub use directory::IdentityDirectory;
pub use error::{Result, StoreError};
pub use groups::GroupChat;
pub use messenger::Messenger;
pub use models::*;
pub use palaver_shared::types::{ContainerKind, ConversationId, MessageStatus};
