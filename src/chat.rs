//! Chat rooms with read tracking and likes
//!
//! Delivery and ordering are the backend's job; this module only keeps the
//! bookkeeping the app needs on top: who is in a room, where each member
//! has read up to, and which messages they liked.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;
use uuid::Uuid;

use crate::error::{Result, SquadError, ValidationError};
use crate::models::Profile;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomMember {
    pub user_id: String,
    pub joined_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: Uuid,
    pub room_id: Uuid,
    pub author_id: String,
    pub body: String,
    pub sent_at: DateTime<Utc>,
}

/// Last message timestamp a member has seen in a room
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadMarker {
    pub room_id: Uuid,
    pub user_id: String,
    pub last_read_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageLike {
    pub message_id: Uuid,
    pub user_id: String,
    pub liked_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRoom {
    pub id: Uuid,
    pub name: String,
    members: Vec<RoomMember>,
    messages: Vec<ChatMessage>,
    read_markers: BTreeMap<String, ReadMarker>,
    likes: Vec<MessageLike>,
}

impl ChatRoom {
    pub fn new(name: impl Into<String>) -> Self {
        ChatRoom {
            id: Uuid::new_v4(),
            name: name.into(),
            members: Vec::new(),
            messages: Vec::new(),
            read_markers: BTreeMap::new(),
            likes: Vec::new(),
        }
    }

    pub fn members(&self) -> &[RoomMember] {
        &self.members
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn is_member(&self, user_id: &str) -> bool {
        self.members.iter().any(|m| m.user_id == user_id)
    }

    fn require_member(&self, user_id: &str) -> Result<()> {
        if self.is_member(user_id) {
            Ok(())
        } else {
            Err(SquadError::Authorization(format!(
                "{} is not a member of {}",
                user_id, self.name
            )))
        }
    }

    /// Add a member; staff and admins manage room membership
    pub fn add_member(&mut self, actor: &Profile, user_id: &str, at: DateTime<Utc>) -> Result<()> {
        if !actor.is_staff() {
            return Err(SquadError::Authorization(format!(
                "{} ({}) cannot manage chat members",
                actor.display_name, actor.role
            )));
        }

        if !self.is_member(user_id) {
            self.members.push(RoomMember {
                user_id: user_id.to_string(),
                joined_at: at,
            });
        }
        Ok(())
    }

    /// Post a message from a member
    pub fn post(&mut self, author_id: &str, body: &str, at: DateTime<Utc>) -> Result<&ChatMessage> {
        self.require_member(author_id)?;

        let body = body.trim();
        if body.is_empty() {
            return Err(ValidationError::MissingField {
                field: "body".to_string(),
            }
            .into());
        }

        let message = ChatMessage {
            id: Uuid::new_v4(),
            room_id: self.id,
            author_id: author_id.to_string(),
            body: body.to_string(),
            sent_at: at,
        };

        // Keep messages in send order even if posts arrive out of order
        let index = self.messages.partition_point(|m| m.sent_at <= at);
        self.messages.insert(index, message);
        debug!(room = %self.id, author = author_id, "message posted");
        Ok(&self.messages[index])
    }

    /// Move a member's read marker forward; it never moves back
    pub fn mark_read(&mut self, user_id: &str, at: DateTime<Utc>) -> Result<&ReadMarker> {
        self.require_member(user_id)?;

        let room_id = self.id;
        let marker = self
            .read_markers
            .entry(user_id.to_string())
            .or_insert_with(|| ReadMarker {
                room_id,
                user_id: user_id.to_string(),
                last_read_at: at,
            });
        if at > marker.last_read_at {
            marker.last_read_at = at;
        }
        Ok(marker)
    }

    /// Mark everything currently in the room as read
    pub fn mark_all_read(&mut self, user_id: &str) -> Result<()> {
        self.require_member(user_id)?;

        if let Some(latest) = self.messages.last().map(|m| m.sent_at) {
            self.mark_read(user_id, latest)?;
        }
        Ok(())
    }

    pub fn read_marker(&self, user_id: &str) -> Option<&ReadMarker> {
        self.read_markers.get(user_id)
    }

    /// Messages from others sent after the member's read marker
    pub fn unread_count(&self, user_id: &str) -> Result<usize> {
        self.require_member(user_id)?;

        let last_read = self.read_markers.get(user_id).map(|m| m.last_read_at);

        let unread = self
            .messages
            .iter()
            .filter(|m| m.author_id != user_id)
            .filter(|m| last_read.map_or(true, |read| m.sent_at > read))
            .count();
        Ok(unread)
    }

    /// Like or unlike a message; returns whether the message is now liked
    pub fn toggle_like(&mut self, message_id: Uuid, user_id: &str, at: DateTime<Utc>) -> Result<bool> {
        self.require_member(user_id)?;

        if !self.messages.iter().any(|m| m.id == message_id) {
            return Err(SquadError::NotFound {
                kind: "message".to_string(),
                id: message_id.to_string(),
            });
        }

        if let Some(position) = self
            .likes
            .iter()
            .position(|l| l.message_id == message_id && l.user_id == user_id)
        {
            self.likes.remove(position);
            Ok(false)
        } else {
            self.likes.push(MessageLike {
                message_id,
                user_id: user_id.to_string(),
                liked_at: at,
            });
            Ok(true)
        }
    }

    pub fn like_count(&self, message_id: Uuid) -> usize {
        self.likes.iter().filter(|l| l.message_id == message_id).count()
    }
}
