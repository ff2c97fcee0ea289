//! Core data types for the sync crate.
//!
//! These mirror the records the RSR Up client keeps locally: project updates
//! received from the API and the projects they belong to.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A project update, reconstructed from one `<object>` element of the feed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Update {
    /// External identifier; an update without one is never stored.
    pub id: String,

    pub title: String,

    pub text: String,

    /// Id of the owning project, taken from the `<project>` resource path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,

    /// Id of the author, taken from the `<user>` resource path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,

    /// Client-generated correlation id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<DateTime<Utc>>,

    /// Remote photo URL (`<photo>`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_credit: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_caption: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,

    /// Unpublished local edit. Set by storage, never by the feed parser.
    #[serde(default)]
    pub draft: bool,

    /// Local path of the cached photo. Set by storage, never by the feed parser.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_filename: Option<String>,
}

impl Update {
    /// Whether the update carries the id needed to store it.
    #[must_use]
    pub fn has_id(&self) -> bool {
        !self.id.is_empty()
    }

    /// Drafts are the only updates a user may still edit.
    #[must_use]
    pub fn is_editable(&self) -> bool {
        self.draft
    }
}

/// A project as known to local storage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,

    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_filename: Option<String>,
}

impl Project {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            ..Self::default()
        }
    }
}

/// Child elements of `<object>` that map onto [`Update`] fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldTag {
    Id,
    Title,
    Text,
    Time,
    Project,
    User,
    Uuid,
    Photo,
    PhotoCredit,
    PhotoCaption,
    Video,
}

impl FieldTag {
    /// All recognized tags, in feed documentation order.
    pub const ALL: [FieldTag; 11] = [
        Self::Id,
        Self::Title,
        Self::Text,
        Self::Time,
        Self::Project,
        Self::User,
        Self::Uuid,
        Self::Photo,
        Self::PhotoCredit,
        Self::PhotoCaption,
        Self::Video,
    ];

    /// Map an element's local name to a field, if it is one.
    #[must_use]
    pub fn from_tag_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tag| tag.as_str() == name)
    }

    /// The element name in the feed.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Title => "title",
            Self::Text => "text",
            Self::Time => "time",
            Self::Project => "project",
            Self::User => "user",
            Self::Uuid => "uuid",
            Self::Photo => "photo",
            Self::PhotoCredit => "photo_credit",
            Self::PhotoCaption => "photo_caption",
            Self::Video => "video",
        }
    }

    /// Photo and video metadata, only present on extended feeds.
    #[must_use]
    pub fn is_extended(&self) -> bool {
        matches!(
            self,
            Self::Photo | Self::PhotoCredit | Self::PhotoCaption | Self::Video
        )
    }
}
