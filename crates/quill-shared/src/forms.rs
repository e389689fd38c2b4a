//! Submitted forms and their validation.
//!
//! A form validates to a [`FormErrors`] map; an empty map means the
//! submission is acceptable. Handlers echo the submitted form and its errors
//! back in the rendered document (HTTP 200) instead of failing the request.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Longest accepted post title.
pub const TITLE_MAX_CHARS: usize = 256;

/// Field-level validation messages, keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormErrors(BTreeMap<String, Vec<String>>);

impl FormErrors {
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_owned())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn field(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or_default()
    }
}

/// Submitted post form (create and edit).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PostForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body: String,
    pub pub_date: Option<DateTime<Utc>>,
    pub category_id: Option<Uuid>,
    pub location_id: Option<Uuid>,
}

impl PostForm {
    pub fn validate(&self) -> FormErrors {
        let mut errors = FormErrors::default();

        if self.title.trim().is_empty() {
            errors.add("title", "This field is required.");
        } else if self.title.chars().count() > TITLE_MAX_CHARS {
            errors.add(
                "title",
                format!("Ensure this value has at most {TITLE_MAX_CHARS} characters."),
            );
        }

        if self.body.trim().is_empty() {
            errors.add("body", "This field is required.");
        }

        if self.pub_date.is_none() {
            errors.add("pub_date", "This field is required.");
        }

        if self.category_id.is_none() {
            errors.add("category_id", "This field is required.");
        }

        errors
    }
}

/// Submitted comment form.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CommentForm {
    #[serde(default)]
    pub body: String,
}

impl CommentForm {
    pub fn validate(&self) -> FormErrors {
        let mut errors = FormErrors::default();

        if self.body.trim().is_empty() {
            errors.add("body", "This field is required.");
        }

        errors
    }
}
