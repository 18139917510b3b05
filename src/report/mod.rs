pub mod blocks;
pub mod narration;
pub mod publisher;

pub use publisher::NotionPublisher;
