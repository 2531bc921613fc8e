//! Catalog (C1): immutable question/media/set records loaded once at
//! startup, exposing lookup and random alternative sampling (§4.1).

pub mod selection;
pub mod types;

use crate::config::CatalogConfig;
use crate::error::ErrorCode;
use selection::sample_alternatives as sample_alternatives_for;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use thiserror::Error;
use types::{
    CatalogDocument, MediaId, Question, QuestionId, QuestionKind, QuestionOption, QuestionSet,
    QuestionSetId, QuestionSetSummary,
};

pub use types::Media;

/// Catalog-scoped errors. Each variant maps to exactly one [`ErrorCode`].
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("question {0} not found in catalog")]
    QuestionNotFound(QuestionId),
    #[error("catalog has no active questions to draw from")]
    Empty,
    #[error("failed to load catalog: {0}")]
    LoadFailed(String),
    #[error("catalog driver not supported in this deployment: {0}")]
    UnsupportedDriver(String),
}

impl CatalogError {
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::QuestionNotFound(_) => ErrorCode::QuestionNotFound,
            Self::Empty => ErrorCode::EmptyCatalog,
            Self::LoadFailed(_) | Self::UnsupportedDriver(_) => ErrorCode::Internal,
        }
    }
}

/// An immutable, point-in-time view of the catalog. Indexed for O(1) lookups.
#[derive(Debug, Default)]
struct Snapshot {
    media: HashMap<MediaId, Media>,
    questions: HashMap<QuestionId, Question>,
    options_by_question: HashMap<QuestionId, Vec<QuestionOption>>,
    sets: HashMap<QuestionSetId, QuestionSet>,
}

impl Snapshot {
    fn from_document(doc: CatalogDocument) -> Self {
        let media = doc.media.into_iter().map(|m| (m.id, m)).collect();
        let questions: HashMap<QuestionId, Question> =
            doc.questions.into_iter().map(|q| (q.id, q)).collect();

        let mut options_by_question: HashMap<QuestionId, Vec<QuestionOption>> = HashMap::new();
        for option in doc.options {
            options_by_question
                .entry(option.question_id)
                .or_default()
                .push(option);
        }

        let sets = doc.sets.into_iter().map(|s| (s.id, s)).collect();

        Self {
            media,
            questions,
            options_by_question,
            sets,
        }
    }

    fn options_by_kind(&self, kind: QuestionKind) -> HashMap<QuestionId, Vec<QuestionOption>> {
        self.questions
            .values()
            .filter(|q| q.kind == kind && q.active)
            .filter_map(|q| {
                self.options_by_question
                    .get(&q.id)
                    .map(|opts| (q.id, opts.clone()))
            })
            .collect()
    }
}

/// Loads and holds the catalog behind an atomically-swappable snapshot
/// (§4.1): reload replaces the reference; lobbies mid-game keep the
/// reference they already hold.
#[derive(Debug)]
pub struct Catalog {
    inner: RwLock<Arc<Snapshot>>,
    config: CatalogConfig,
}

impl Catalog {
    /// Load the catalog from the configured driver. Fatal at startup on
    /// failure (§7).
    pub async fn load(config: CatalogConfig) -> Result<Self, CatalogError> {
        let document = load_document(&config).await?;
        Ok(Self {
            inner: RwLock::new(Arc::new(Snapshot::from_document(document))),
            config,
        })
    }

    /// Build a catalog directly from an already-parsed document, bypassing
    /// the configured driver. Used by tests and by callers that assemble a
    /// catalog in-process rather than reading it from storage.
    pub fn from_document(document: CatalogDocument) -> Self {
        Self {
            inner: RwLock::new(Arc::new(Snapshot::from_document(document))),
            config: CatalogConfig::Filesystem {
                path: String::new(),
            },
        }
    }

    /// Re-read the backing store and atomically swap in a fresh snapshot.
    /// In-flight lobbies retain the `Arc` they already cloned.
    pub async fn reload(&self) -> Result<(), CatalogError> {
        let document = load_document(&self.config).await?;
        let snapshot = Arc::new(Snapshot::from_document(document));
        let mut guard = self
            .inner
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        *guard = snapshot;
        Ok(())
    }

    fn snapshot(&self) -> Arc<Snapshot> {
        Arc::clone(
            &self
                .inner
                .read()
                .unwrap_or_else(std::sync::PoisonError::into_inner),
        )
    }

    pub fn lookup_question(&self, id: QuestionId) -> Result<Question, CatalogError> {
        self.snapshot()
            .questions
            .get(&id)
            .cloned()
            .ok_or(CatalogError::QuestionNotFound(id))
    }

    pub fn options_for(&self, question_id: QuestionId) -> Vec<QuestionOption> {
        self.snapshot()
            .options_by_question
            .get(&question_id)
            .cloned()
            .unwrap_or_default()
    }

    pub fn list_sets(&self) -> Vec<QuestionSetSummary> {
        self.snapshot()
            .sets
            .values()
            .map(|set| QuestionSetSummary {
                id: set.id,
                name: set.name.clone(),
                question_count: set.question_ids.len(),
            })
            .collect()
    }

    /// Ordered ids of a set's active questions, or every active question in
    /// the catalog when `set_id` is `None` (§4.3 `StartGame`).
    pub fn question_ids_for_set(
        &self,
        set_id: Option<QuestionSetId>,
    ) -> Result<Vec<QuestionId>, CatalogError> {
        let snapshot = self.snapshot();

        let ids: Vec<QuestionId> = match set_id {
            Some(id) => match snapshot.sets.get(&id) {
                Some(set) => set
                    .question_ids
                    .iter()
                    .filter(|qid| snapshot.questions.get(qid).is_some_and(|q| q.active))
                    .copied()
                    .collect(),
                None => Vec::new(),
            },
            None => snapshot
                .questions
                .values()
                .filter(|q| q.active)
                .map(|q| q.id)
                .collect(),
        };

        if ids.is_empty() {
            return Err(CatalogError::Empty);
        }

        Ok(ids)
    }

    /// Displayed alternatives for `question_id` (§4.1), deterministic for a
    /// given `seed` (the lobby derives one seed per round).
    pub fn sample_alternatives(
        &self,
        question_id: QuestionId,
        total: usize,
        seed: u64,
    ) -> Result<Vec<String>, CatalogError> {
        let snapshot = self.snapshot();
        let question = snapshot
            .questions
            .get(&question_id)
            .cloned()
            .ok_or(CatalogError::QuestionNotFound(question_id))?;
        let own_options = snapshot
            .options_by_question
            .get(&question_id)
            .cloned()
            .unwrap_or_default();
        let same_kind = snapshot.options_by_kind(question.kind);

        Ok(sample_alternatives_for(
            &question,
            &own_options,
            &same_kind,
            total,
            seed,
        ))
    }
}

async fn load_document(config: &CatalogConfig) -> Result<CatalogDocument, CatalogError> {
    match config {
        CatalogConfig::Filesystem { path } => {
            let contents = tokio::fs::read_to_string(path)
                .await
                .map_err(|e| CatalogError::LoadFailed(format!("{path}: {e}")))?;
            serde_json::from_str(&contents)
                .map_err(|e| CatalogError::LoadFailed(format!("{path}: {e}")))
        }
        CatalogConfig::S3 { bucket, key } => Err(CatalogError::UnsupportedDriver(format!(
            "s3 driver not implemented in this build (bucket={bucket}, key={key})"
        ))),
    }
}
