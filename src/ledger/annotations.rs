//! Free-text notes attached to journal entries

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::traits::KeyValueStore;
use crate::types::*;
use crate::utils::validation::validate_annotation_content;

/// A note left by a user on a journal entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Annotation {
    pub id: String,
    pub entry_id: String,
    pub user_id: String,
    pub user_name: String,
    pub date: NaiveDateTime,
    pub content: String,
}

/// Store key holding the annotations of an entry
pub fn annotation_key(entry_id: &str) -> String {
    format!("annotation_{entry_id}")
}

/// Annotations of journal entries, kept as JSON arrays in a key-value store
pub struct AnnotationBook<K: KeyValueStore> {
    store: K,
}

impl<K: KeyValueStore> AnnotationBook<K> {
    /// Annotation book backed by `store`
    pub fn new(store: K) -> Self {
        Self { store }
    }

    /// Annotations of an entry, oldest first; empty when none were recorded
    pub async fn get_annotations(&self, entry_id: &str) -> LedgerResult<Vec<Annotation>> {
        match self.store.get(&annotation_key(entry_id)).await? {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => Ok(Vec::new()),
        }
    }

    /// Append an annotation authored by `actor`
    pub async fn add_annotation(
        &mut self,
        entry_id: &str,
        content: &str,
        actor: &Actor,
    ) -> LedgerResult<Annotation> {
        validate_annotation_content(content)?;
        if entry_id.trim().is_empty() {
            return Err(LedgerError::InvalidInput(
                "entry id cannot be empty".to_string(),
            ));
        }

        let mut annotations = self.get_annotations(entry_id).await?;
        let annotation = Annotation {
            id: uuid::Uuid::new_v4().to_string(),
            entry_id: entry_id.to_string(),
            user_id: actor.user_id.clone(),
            user_name: actor.user_name.clone(),
            date: chrono::Utc::now().naive_utc(),
            content: content.trim().to_string(),
        };
        annotations.push(annotation.clone());

        self.store
            .set(&annotation_key(entry_id), serde_json::to_string(&annotations)?)
            .await?;

        tracing::debug!(entry_id, user = %actor.user_id, "annotation added");
        Ok(annotation)
    }
}
