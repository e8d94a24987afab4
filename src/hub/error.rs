//! Hub error types

use std::fmt;

/// Error type for hub operations
#[derive(Debug)]
pub enum HubError {
    /// A topic with this name already exists
    TopicAlreadyExists(String),
    /// No topic with this name is registered
    TopicNotFound(String),
    /// A freshly minted subscriber id collided with a live one
    IdCollision,
    /// The command queue is at capacity
    QueueFull,
}

impl std::error::Error for HubError {}

impl fmt::Display for HubError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HubError::TopicAlreadyExists(name) => write!(f, "topic '{}' already exists", name),
            HubError::TopicNotFound(name) => write!(f, "topic '{}' not found", name),
            HubError::IdCollision => write!(f, "subscriber id collision"),
            HubError::QueueFull => write!(f, "command queue full"),
        }
    }
}
