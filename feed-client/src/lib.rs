//! Typed async client for the feed REST API.

mod error;
mod http_client;
mod models;

pub use error::ClientError;
pub use http_client::FeedClient;
pub use models::{AuthResponse, Author, Comment, Post, User};
