use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard};

use serde::{Deserialize, Serialize};

use crate::error::{Result, StoreError};
use crate::idea::{non_blank, Idea, IdeaId, IdeaKind, NewIdea};
use crate::storage::{IdeaRepository, KeyValueStorage};
use crate::tags::normalize_tags;
use crate::timestamp;

/// Change to apply to an existing idea.
///
/// Fields that do not exist on the idea's type (content on a voice memo,
/// a recording on an image) are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum IdeaMutation {
    SetTitle(String),
    SetContent(String),
    SetDescription(Option<String>),
    SetUri(Option<String>),
    SetRecordingUri(Option<String>),
    SetTags(Vec<String>),
    SetFavorite(bool),
}

/// How an import combines with the existing collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImportMode {
    /// Add ideas whose id is not already present.
    Merge,
    /// Discard the current collection and keep only the imported ideas.
    Replace,
}

/// Outcome of an import.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ImportSummary {
    pub imported: usize,
    pub skipped: usize,
}

/// The authoritative idea collection.
///
/// Holds the collection in memory and writes the whole of it through the
/// repository after every mutation. Mutations are serialized by a single
/// lock held across apply and persist. A mutation is applied to a copy; the
/// copy becomes the live collection only once it has been written, so a
/// failed write leaves memory exactly as it was.
pub struct IdeaStore {
    repository: IdeaRepository,
    ideas: Mutex<Option<Vec<Idea>>>,
}

impl IdeaStore {
    pub fn new(repository: IdeaRepository) -> Self {
        Self {
            repository,
            ideas: Mutex::new(None),
        }
    }

    /// Store over a key-value backend using the default slot.
    pub fn with_storage(backend: impl KeyValueStorage + 'static) -> Self {
        Self::new(IdeaRepository::new(Box::new(backend)))
    }

    /// Load the collection from storage. On failure the store stays
    /// uninitialized and the error is returned; calling again retries.
    pub fn initialize(&self) -> Result<usize> {
        let mut guard = self.lock()?;
        let ideas = self.repository.load().map_err(|e| {
            tracing::error!(slot = self.repository.key(), "failed to load ideas: {}", e);
            StoreError::from(e)
        })?;
        let count = ideas.len();
        *guard = Some(ideas);
        tracing::info!(slot = self.repository.key(), count, "idea store ready");
        Ok(count)
    }

    pub fn is_ready(&self) -> bool {
        self.ideas.lock().map(|g| g.is_some()).unwrap_or(false)
    }

    /// Snapshot of the collection, in storage order.
    pub fn list(&self) -> Result<Vec<Idea>> {
        let guard = self.lock()?;
        guard.as_ref().cloned().ok_or(StoreError::NotInitialized)
    }

    pub fn get(&self, id: &IdeaId) -> Result<Option<Idea>> {
        let guard = self.lock()?;
        let ideas = guard.as_ref().ok_or(StoreError::NotInitialized)?;
        Ok(ideas.iter().find(|i| &i.id == id).cloned())
    }

    /// Validate and add a new idea at the front of the collection.
    pub fn create(&self, new: NewIdea) -> Result<Idea> {
        new.validate()?;

        let now = timestamp::now_after(None);
        let idea = Idea {
            id: IdeaId::generate(),
            title: new.title.trim().to_string(),
            kind: new.kind.normalized(),
            tags: normalize_tags(&new.tags),
            is_favorite: new.is_favorite,
            created_at: now,
            updated_at: now,
        };

        self.mutate(|ideas| {
            debug_assert!(ideas.iter().all(|i| i.id != idea.id));
            ideas.insert(0, idea.clone());
            Ok(())
        })?;

        tracing::debug!(idea = %idea.id, kind = %idea.idea_type(), "created idea");
        Ok(idea)
    }

    /// Apply mutations to an existing idea and refresh its `updated_at`.
    pub fn update(&self, id: &IdeaId, mutations: Vec<IdeaMutation>) -> Result<Idea> {
        let updated = self.mutate(|ideas| apply_update(ideas, id, &mutations))?;
        tracing::debug!(idea = %id, changes = mutations.len(), "updated idea");
        Ok(updated)
    }

    /// Remove an idea. Removing a missing id is not an error.
    pub fn delete(&self, id: &IdeaId) -> Result<()> {
        let removed = self.mutate(|ideas| {
            let before = ideas.len();
            ideas.retain(|i| &i.id != id);
            Ok(before != ideas.len())
        })?;
        if removed {
            tracing::debug!(idea = %id, "deleted idea");
        } else {
            tracing::debug!(idea = %id, "delete of absent idea");
        }
        Ok(())
    }

    pub fn toggle_favorite(&self, id: &IdeaId) -> Result<Idea> {
        self.mutate(|ideas| {
            let current = ideas
                .iter()
                .find(|i| &i.id == id)
                .ok_or_else(|| StoreError::NotFound(id.clone()))?;
            let flipped = !current.is_favorite;
            apply_update(ideas, id, &[IdeaMutation::SetFavorite(flipped)])
        })
    }

    /// Empty the collection and remove the stored slot.
    ///
    /// Also usable on a store whose `initialize` failed; it is ready and
    /// empty afterwards.
    pub fn clear_all(&self) -> Result<()> {
        let mut guard = self.lock()?;
        self.repository.clear()?;
        *guard = Some(Vec::new());
        tracing::info!(slot = self.repository.key(), "cleared all ideas");
        Ok(())
    }

    /// Restore ideas from a backup.
    ///
    /// Every incoming idea is validated before anything changes; one invalid
    /// record rejects the whole import. Duplicate ids within the input keep
    /// their first occurrence.
    pub fn import(&self, incoming: Vec<Idea>, mode: ImportMode) -> Result<ImportSummary> {
        for idea in &incoming {
            idea.validate()?;
        }

        let summary = self.mutate(|ideas| {
            let mut seen: HashSet<IdeaId> = match mode {
                ImportMode::Merge => ideas.iter().map(|i| i.id.clone()).collect(),
                ImportMode::Replace => HashSet::new(),
            };
            let mut accepted = Vec::new();
            let mut skipped = 0;
            for mut idea in incoming {
                if !seen.insert(idea.id.clone()) {
                    skipped += 1;
                    continue;
                }
                idea.tags = normalize_tags(&idea.tags);
                accepted.push(idea);
            }
            let imported = accepted.len();
            match mode {
                ImportMode::Merge => ideas.extend(accepted),
                ImportMode::Replace => *ideas = accepted,
            }
            Ok(ImportSummary { imported, skipped })
        })?;

        tracing::info!(
            imported = summary.imported,
            skipped = summary.skipped,
            ?mode,
            "imported ideas"
        );
        Ok(summary)
    }

    /// Run a mutation against a copy of the collection, persist the copy,
    /// then make it live.
    fn mutate<T>(&self, f: impl FnOnce(&mut Vec<Idea>) -> Result<T>) -> Result<T> {
        let mut guard = self.lock()?;
        let current = guard.as_ref().ok_or(StoreError::NotInitialized)?;

        let mut next = current.clone();
        let out = f(&mut next)?;

        if let Err(e) = self.repository.save(&next) {
            tracing::warn!(slot = self.repository.key(), "save failed, change not applied: {}", e);
            return Err(e.into());
        }
        *guard = Some(next);
        Ok(out)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Option<Vec<Idea>>>> {
        self.ideas
            .lock()
            .map_err(|e| StoreError::StorageUnavailable(format!("store lock poisoned: {}", e)))
    }
}

fn apply_update(ideas: &mut [Idea], id: &IdeaId, mutations: &[IdeaMutation]) -> Result<Idea> {
    let idea = ideas
        .iter_mut()
        .find(|i| &i.id == id)
        .ok_or_else(|| StoreError::NotFound(id.clone()))?;

    let mut next = idea.clone();
    for m in mutations {
        apply_mutation(&mut next, m);
    }
    next.validate()?;
    next.updated_at = timestamp::now_after(Some(idea.updated_at));

    *idea = next.clone();
    Ok(next)
}

fn apply_mutation(idea: &mut Idea, mutation: &IdeaMutation) {
    match (mutation, &mut idea.kind) {
        (IdeaMutation::SetTitle(title), _) => idea.title = title.trim().to_string(),
        (IdeaMutation::SetTags(tags), _) => idea.tags = normalize_tags(tags),
        (IdeaMutation::SetFavorite(fav), _) => idea.is_favorite = *fav,
        (IdeaMutation::SetContent(text), IdeaKind::Text { content }) => {
            *content = text.trim().to_string()
        }
        (
            IdeaMutation::SetDescription(text),
            IdeaKind::Voice { description, .. } | IdeaKind::Image { description, .. },
        ) => *description = non_blank(text.clone()),
        (IdeaMutation::SetUri(value), IdeaKind::Image { uri, .. }) => *uri = non_blank(value.clone()),
        (IdeaMutation::SetRecordingUri(value), IdeaKind::Voice { recording_uri, .. }) => {
            *recording_uri = non_blank(value.clone())
        }
        (m, kind) => {
            tracing::debug!(idea = %idea.id, "ignoring {:?} for {} idea", m, kind.idea_type());
        }
    }
}
