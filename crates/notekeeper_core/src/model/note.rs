//! Note domain model.
//!
//! # Responsibility
//! - Define the persisted note record and the caller-supplied creation input.
//! - Validate title/content before any store mutation.
//! - Provide share/map projections used by detail views.
//!
//! # Invariants
//! - `id` is stable and never reused for another note.
//! - `created_at` never changes after creation.
//! - `updated_at >= created_at`; both use the fixed-width format produced by
//!   [`now_timestamp`], so string order equals chronological order.

use crate::model::id::NoteId;
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// RFC 3339 timestamp string, UTC with millisecond precision (`...T..:..:..sssZ`).
pub type Timestamp = String;

/// Returns the current time as a [`Timestamp`].
pub fn now_timestamp() -> Timestamp {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Geolocation stamp attached to a note.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Map link handed to the platform map-opening intent.
    pub fn map_url(&self) -> String {
        format!(
            "https://www.google.com/maps?q={},{}",
            self.latitude, self.longitude
        )
    }
}

/// Validation failure for note title/content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteValidationError {
    /// Title is empty or whitespace-only.
    EmptyTitle,
    /// Content is empty or whitespace-only.
    EmptyContent,
}

impl Display for NoteValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "note title must not be empty"),
            Self::EmptyContent => write!(f, "note content must not be empty"),
        }
    }
}

impl Error for NoteValidationError {}

/// Caller-supplied fields for a new note.
///
/// Identity and timestamps are assigned by the store.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NoteInput {
    pub title: String,
    pub content: String,
    /// Locator of an externally stored voice recording.
    pub audio_uri: Option<String>,
    /// Locator of an externally stored photo.
    pub image_uri: Option<String>,
    pub location: Option<GeoPoint>,
}

impl NoteInput {
    /// Creates input with title/content and no attachments.
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            ..Self::default()
        }
    }

    pub fn with_audio(mut self, uri: impl Into<String>) -> Self {
        self.audio_uri = Some(uri.into());
        self
    }

    pub fn with_image(mut self, uri: impl Into<String>) -> Self {
        self.image_uri = Some(uri.into());
        self
    }

    pub fn with_location(mut self, location: GeoPoint) -> Self {
        self.location = Some(location);
        self
    }

    /// Validates required text fields.
    pub fn validate(&self) -> Result<(), NoteValidationError> {
        validate_text_fields(&self.title, &self.content)
    }
}

/// Persisted note record.
///
/// Serialized with camelCase keys; the JSON shape is the on-disk blob format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: NoteId,
    pub title: String,
    pub content: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<GeoPoint>,
}

impl Note {
    /// Builds a note from validated input with caller-provided identity.
    ///
    /// Used by the store after id generation; does not validate.
    pub fn from_input(id: NoteId, input: NoteInput, now: Timestamp) -> Self {
        Self {
            id,
            title: input.title,
            content: input.content,
            created_at: now.clone(),
            updated_at: now,
            audio_uri: input.audio_uri,
            image_uri: input.image_uri,
            location: input.location,
        }
    }

    /// Validates required text fields.
    pub fn validate(&self) -> Result<(), NoteValidationError> {
        validate_text_fields(&self.title, &self.content)
    }

    /// Message body handed to the platform share sheet.
    pub fn share_text(&self) -> String {
        format!("{}\n\n{}", self.title, self.content)
    }

    pub fn has_audio(&self) -> bool {
        self.audio_uri.is_some()
    }

    pub fn has_image(&self) -> bool {
        self.image_uri.is_some()
    }

    pub fn has_location(&self) -> bool {
        self.location.is_some()
    }
}

fn validate_text_fields(title: &str, content: &str) -> Result<(), NoteValidationError> {
    if title.trim().is_empty() {
        return Err(NoteValidationError::EmptyTitle);
    }
    if content.trim().is_empty() {
        return Err(NoteValidationError::EmptyContent);
    }
    Ok(())
}
