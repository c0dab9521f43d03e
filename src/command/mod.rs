pub mod repost;

pub use repost::repost;
