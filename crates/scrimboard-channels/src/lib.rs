pub mod channel;
pub mod error;
pub mod types;

pub use channel::NotificationChannel;
pub use error::ChannelError;
pub use types::{BoardArtifact, BoardField, MessageHandle, RenderedBoard};
