//! JSON backups of the idea collection.
//!
//! Backups use the same array-of-objects shape as the persisted slot, so a
//! backup file can also be dropped in place of the slot by hand.

use crate::error::{Result, StoreError};
use crate::idea::Idea;

/// Pretty-printed JSON array of ideas.
pub fn export_json(ideas: &[Idea]) -> Result<String> {
    serde_json::to_string_pretty(ideas)
        .map_err(|e| StoreError::StorageUnavailable(format!("export: {}", e)))
}

/// Decode a backup produced by [`export_json`] or read from a slot.
pub fn parse_backup(json: &str) -> Result<Vec<Idea>> {
    serde_json::from_str(json).map_err(|e| StoreError::Decode(format!("backup: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::idea::NewIdea;
    use crate::storage::MemoryStorage;
    use crate::store::IdeaStore;

    #[test]
    fn export_then_parse() {
        let store = IdeaStore::with_storage(MemoryStorage::new());
        store.initialize().unwrap();
        store
            .create(NewIdea::text("Backup me", "please").with_tags(["safe"]))
            .unwrap();
        store
            .create(NewIdea::image("Screenshot", "file:///s.png").with_description("error dialog"))
            .unwrap();

        let ideas = store.list().unwrap();
        let json = export_json(&ideas).unwrap();
        assert!(json.contains("\n  {"));
        assert!(json.contains("\"isFavorite\": false"));
        assert_eq!(parse_backup(&json).unwrap(), ideas);
    }

    #[test]
    fn malformed_backup_is_decode_error() {
        assert!(matches!(parse_backup("not json"), Err(StoreError::Decode(_))));
        assert!(matches!(parse_backup("[{\"id\":1}]"), Err(StoreError::Decode(_))));
    }

    #[test]
    fn empty_backup() {
        assert!(parse_backup("[]").unwrap().is_empty());
        assert_eq!(export_json(&[]).unwrap(), "[]");
    }
}
