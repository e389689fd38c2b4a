//! Visibility and ownership rules.
//!
//! Both checks take the current user and the current time as explicit
//! parameters; nothing in this module reads ambient state.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{Category, Comment, Post};

/// Public visibility rule for a post.
///
/// A post is discoverable by anonymous readers iff the post itself is
/// published, its category is published, and its publication moment has
/// passed. `category` must be the post's resolved category row; callers look
/// it up explicitly before asking.
pub fn post_is_visible(post: &Post, category: &Category, now: DateTime<Utc>) -> bool {
    post.is_published && category.is_published && post.pub_date <= now
}

/// Entities owned by exactly one author.
pub trait Authored {
    fn author_id(&self) -> Uuid;
}

impl Authored for Post {
    fn author_id(&self) -> Uuid {
        self.author_id
    }
}

impl Authored for Comment {
    fn author_id(&self) -> Uuid {
        self.author_id
    }
}

/// Ownership check, the sole authorization signal in this service.
///
/// An anonymous requester (`None`) owns nothing. How a failed check is
/// surfaced (silent redirect for posts, hard 403 for comments) is decided by
/// the handler, not here.
pub fn is_owner<E: Authored>(requester: Option<Uuid>, entity: &E) -> bool {
    requester.is_some_and(|id| id == entity.author_id())
}
