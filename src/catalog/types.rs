//! Catalog data model (§3): media, questions, options, and sets.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a [`Media`] record.
pub type MediaId = Uuid;
/// Unique identifier for a [`Question`] record.
pub type QuestionId = Uuid;
/// Unique identifier for a [`QuestionOption`] record.
pub type OptionId = Uuid;
/// Unique identifier for a [`QuestionSet`] record.
pub type QuestionSetId = Uuid;

/// A song/clip backing one or more questions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Media {
    pub id: MediaId,
    pub title: String,
    pub artist: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_year: Option<u16>,
    pub youtube_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spotify_uri: Option<String>,
}

/// What flavor of answer a question expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKind {
    Color,
    Character,
    Text,
    Year,
}

/// A question tied to a piece of [`Media`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub id: QuestionId,
    pub kind: QuestionKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub media_id: MediaId,
    #[serde(default = "default_active")]
    pub active: bool,
}

const fn default_active() -> bool {
    true
}

/// One possible answer to a [`Question`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionOption {
    pub id: OptionId,
    pub question_id: QuestionId,
    pub text: String,
    pub is_correct: bool,
}

/// A named, ordered grouping of questions that a lobby can be started from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionSet {
    pub id: QuestionSetId,
    pub name: String,
    pub question_ids: Vec<QuestionId>,
}

/// Summary row returned by [`crate::catalog::Catalog::list_sets`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionSetSummary {
    pub id: QuestionSetId,
    pub name: String,
    pub question_count: usize,
}

/// On-disk/on-wire shape of the persisted catalog blob (§6): a single JSON
/// document replaced wholesale on writes, never partially updated.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogDocument {
    #[serde(default)]
    pub media: Vec<Media>,
    #[serde(default)]
    pub questions: Vec<Question>,
    #[serde(default)]
    pub options: Vec<QuestionOption>,
    #[serde(default)]
    pub sets: Vec<QuestionSet>,
}
