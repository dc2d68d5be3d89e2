//! Realtime event wire shapes.
//!
//! One event type exists: `comment_message`, emitted to the
//! `comments_<postID>` channel whenever a comment is created.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Event name on the socket transport.
pub const COMMENT_MESSAGE_EVENT: &str = "comment_message";

/// Display format for comment timestamps: "Mon DD, YYYY, HH:MM AM/PM".
pub fn format_display_date(ts: DateTime<Utc>) -> String {
    ts.format("%b %d, %Y, %I:%M %p").to_string()
}

/// The envelope browsers receive.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentMessage {
    #[serde(rename = "type")]
    pub kind: String,
    pub comment: CommentPayload,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentPayload {
    pub author: String,
    pub body: String,
    pub created_date: String,
}

impl CommentMessage {
    pub fn new(
        author: impl Into<String>,
        body: impl Into<String>,
        created: DateTime<Utc>,
    ) -> Self {
        Self {
            kind: COMMENT_MESSAGE_EVENT.to_string(),
            comment: CommentPayload {
                author: author.into(),
                body: body.into(),
                created_date: format_display_date(created),
            },
        }
    }
}
