use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// A per-(product, OS) collection of checklist items and their metadata.
///
/// `items` carries the display order; the three metadata maps are keyed by
/// item name. The name is the sole identity key within a bucket: every name
/// in `items` has exactly one entry in each map (defaults `false` / `""`),
/// and names are unique.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bucket {
    /// Item names in insertion order.
    pub(crate) items: Vec<String>,
    /// Whether each item's validation is automated.
    pub(crate) automated: BTreeMap<String, bool>,
    /// Optional tracker task ID per item.
    pub(crate) task_ids: BTreeMap<String, String>,
    /// Optional free-text description per item.
    pub(crate) descriptions: BTreeMap<String, String>,
}

/// A checklist item with its metadata resolved (defaults applied).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemEntry<'a> {
    /// The item name (identity key within the bucket).
    pub name: &'a str,
    /// The tracker task ID, or `""` if none was recorded.
    pub task_id: &'a str,
    /// The description, or `""` if none was recorded.
    pub description: &'a str,
    /// Whether the item's validation is automated.
    pub automated: bool,
}

/// Rejected user input on an add or edit operation.
///
/// These surface as inline warnings; the bucket is left unchanged.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// The item name was empty after trimming.
    #[error("item name cannot be empty")]
    EmptyName,
    /// An item with the same name already exists in the bucket.
    #[error("item '{0}' already exists")]
    Duplicate(String),
}

impl Bucket {
    /// Appends a new item with the given metadata.
    ///
    /// The name, task ID, and description are trimmed. The name must be
    /// non-empty after trimming and must not collide (case-sensitive exact
    /// match) with an existing item.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] and leaves the bucket unchanged if the
    /// trimmed name is empty or already present.
    pub fn add_item(
        &mut self,
        name: &str,
        task_id: &str,
        description: &str,
        automated: bool,
    ) -> Result<(), ValidationError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyName);
        }
        if self.items.iter().any(|item| item == name) {
            return Err(ValidationError::Duplicate(name.to_string()));
        }

        self.items.push(name.to_string());
        self.automated.insert(name.to_string(), automated);
        self.task_ids
            .insert(name.to_string(), task_id.trim().to_string());
        self.descriptions
            .insert(name.to_string(), description.trim().to_string());
        Ok(())
    }

    /// Removes an item and its metadata.
    ///
    /// Returns `true` if the item was present. Deleting an absent name is a
    /// no-op, not an error.
    pub fn delete_item(&mut self, name: &str) -> bool {
        let Some(position) = self.items.iter().position(|item| item == name) else {
            return false;
        };
        self.items.remove(position);
        self.automated.remove(name);
        self.task_ids.remove(name);
        self.descriptions.remove(name);
        true
    }

    /// Replaces the name and metadata of the item at `index`.
    ///
    /// The new name is trimmed; if it trims to empty the old name is kept.
    /// A rename migrates all three metadata entries to the new key (the old
    /// key is removed, defaulting if it was absent). The task ID,
    /// description, and automated flag are then overwritten unconditionally
    /// with the trimmed new values.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::Duplicate`] and leaves the bucket unchanged
    /// if the rename collides with a different existing item.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range. A stale index is a caller
    /// precondition violation: callers resolve the index against the current
    /// item list before invoking this.
    pub fn edit_item(
        &mut self,
        index: usize,
        new_name: &str,
        new_task_id: &str,
        new_description: &str,
        new_automated: bool,
    ) -> Result<(), ValidationError> {
        assert!(
            index < self.items.len(),
            "edit_item index {index} out of range for bucket of {} items",
            self.items.len()
        );

        let old_name = self.items[index].clone();
        let trimmed = new_name.trim();
        let effective_name = if trimmed.is_empty() {
            old_name.clone()
        } else {
            trimmed.to_string()
        };

        if effective_name != old_name {
            if self.items.iter().any(|item| *item == effective_name) {
                return Err(ValidationError::Duplicate(effective_name));
            }

            let automated = self.automated.remove(&old_name).unwrap_or(false);
            let task_id = self.task_ids.remove(&old_name).unwrap_or_default();
            let description = self.descriptions.remove(&old_name).unwrap_or_default();
            self.automated.insert(effective_name.clone(), automated);
            self.task_ids.insert(effective_name.clone(), task_id);
            self.descriptions
                .insert(effective_name.clone(), description);
            self.items[index] = effective_name.clone();
        }

        self.task_ids
            .insert(effective_name.clone(), new_task_id.trim().to_string());
        self.descriptions
            .insert(effective_name.clone(), new_description.trim().to_string());
        self.automated.insert(effective_name, new_automated);
        Ok(())
    }

    /// Iterates items in stored order with their metadata resolved.
    pub fn entries(&self) -> impl Iterator<Item = ItemEntry<'_>> {
        self.items.iter().map(|name| self.resolve(name))
    }

    /// Returns the item at `index` with its metadata resolved, if in range.
    #[must_use]
    pub fn entry(&self, index: usize) -> Option<ItemEntry<'_>> {
        self.items.get(index).map(|name| self.resolve(name))
    }

    /// The item names in stored order.
    #[must_use]
    pub fn items(&self) -> &[String] {
        &self.items
    }

    /// The number of items in the bucket.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the bucket contains no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn resolve<'a>(&'a self, name: &'a str) -> ItemEntry<'a> {
        ItemEntry {
            name,
            task_id: self.task_ids.get(name).map_or("", String::as_str),
            description: self.descriptions.get(name).map_or("", String::as_str),
            automated: self.automated.get(name).copied().unwrap_or(false),
        }
    }

    /// Restores the bucket invariants after a load.
    ///
    /// Removes duplicate item names (first occurrence wins) and back-fills
    /// missing metadata entries with defaults.
    pub(crate) fn repair(&mut self) {
        let mut seen = BTreeSet::new();
        self.items.retain(|item| seen.insert(item.clone()));

        for item in &self.items {
            self.automated.entry(item.clone()).or_insert(false);
            self.task_ids.entry(item.clone()).or_default();
            self.descriptions.entry(item.clone()).or_default();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bucket_with(items: &[&str]) -> Bucket {
        let mut bucket = Bucket::default();
        for item in items {
            bucket.add_item(item, "", "", false).unwrap();
        }
        bucket
    }

    #[test]
    fn add_item_trims_and_stores_metadata() {
        let mut bucket = Bucket::default();
        bucket
            .add_item("  Build  ", " T-1 ", " smoke test ", true)
            .unwrap();

        let entries: Vec<_> = bucket.entries().collect();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, "Build");
        assert_eq!(entries[0].task_id, "T-1");
        assert_eq!(entries[0].description, "smoke test");
        assert!(entries[0].automated);
    }

    #[test]
    fn add_item_rejects_empty_name() {
        let mut bucket = Bucket::default();
        assert_eq!(
            bucket.add_item("   ", "", "", false),
            Err(ValidationError::EmptyName)
        );
        assert!(bucket.is_empty());
    }

    #[test]
    fn add_item_rejects_duplicate_and_leaves_bucket_unchanged() {
        let mut bucket = Bucket::default();
        bucket.add_item("Build", "T-1", "first", true).unwrap();

        assert_eq!(
            bucket.add_item(" Build ", "T-2", "second", false),
            Err(ValidationError::Duplicate("Build".to_string()))
        );

        let entry = bucket.entry(0).unwrap();
        assert_eq!(bucket.len(), 1);
        assert_eq!(entry.task_id, "T-1");
        assert!(entry.automated);
    }

    #[test]
    fn duplicate_check_is_case_sensitive() {
        let mut bucket = bucket_with(&["Build"]);
        bucket.add_item("build", "", "", false).unwrap();
        assert_eq!(bucket.len(), 2);
    }

    #[test]
    fn delete_item_is_idempotent() {
        let mut bucket = bucket_with(&["Build", "Sign"]);

        assert!(bucket.delete_item("Build"));
        let after_first = bucket.clone();
        assert!(!bucket.delete_item("Build"));

        assert_eq!(bucket, after_first);
        assert_eq!(bucket.items(), ["Sign"]);
    }

    #[test]
    fn delete_item_removes_all_metadata() {
        let mut bucket = Bucket::default();
        bucket.add_item("Build", "T-1", "desc", true).unwrap();
        bucket.delete_item("Build");

        assert!(bucket.automated.is_empty());
        assert!(bucket.task_ids.is_empty());
        assert!(bucket.descriptions.is_empty());
    }

    #[test]
    fn edit_item_renames_and_migrates_metadata() {
        let mut bucket = Bucket::default();
        bucket.add_item("Build", "T-1", "old", true).unwrap();

        bucket.edit_item(0, "Build v2", "T-2", "new", false).unwrap();

        assert_eq!(bucket.items(), ["Build v2"]);
        assert!(!bucket.automated.contains_key("Build"));
        assert!(!bucket.task_ids.contains_key("Build"));
        assert!(!bucket.descriptions.contains_key("Build"));

        let entry = bucket.entry(0).unwrap();
        assert_eq!(entry.name, "Build v2");
        assert_eq!(entry.task_id, "T-2");
        assert_eq!(entry.description, "new");
        assert!(!entry.automated);
    }

    #[test]
    fn edit_item_keeps_old_name_when_new_name_is_blank() {
        let mut bucket = bucket_with(&["Build"]);
        bucket.edit_item(0, "  ", "T-9", "updated", true).unwrap();

        let entry = bucket.entry(0).unwrap();
        assert_eq!(entry.name, "Build");
        assert_eq!(entry.task_id, "T-9");
        assert!(entry.automated);
    }

    #[test]
    fn edit_item_rejects_rename_onto_another_item() {
        let mut bucket = Bucket::default();
        bucket.add_item("Build", "T-1", "", true).unwrap();
        bucket.add_item("Sign", "T-2", "", false).unwrap();
        let before = bucket.clone();

        assert_eq!(
            bucket.edit_item(1, "Build", "T-3", "clobbered", true),
            Err(ValidationError::Duplicate("Build".to_string()))
        );
        assert_eq!(bucket, before);
    }

    #[test]
    fn edit_item_in_place_overwrites_metadata() {
        let mut bucket = Bucket::default();
        bucket.add_item("Build", "T-1", "old", false).unwrap();

        bucket.edit_item(0, "Build", " T-2 ", " new ", true).unwrap();

        let entry = bucket.entry(0).unwrap();
        assert_eq!(entry.task_id, "T-2");
        assert_eq!(entry.description, "new");
        assert!(entry.automated);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn edit_item_panics_on_stale_index() {
        let mut bucket = bucket_with(&["Build"]);
        let _ = bucket.edit_item(1, "X", "", "", false);
    }

    #[test]
    fn entries_apply_defaults_for_missing_metadata() {
        let mut bucket = Bucket::default();
        bucket.items.push("Orphan".to_string());

        let entry = bucket.entry(0).unwrap();
        assert_eq!(entry.task_id, "");
        assert_eq!(entry.description, "");
        assert!(!entry.automated);
    }

    #[test]
    fn repair_removes_duplicates_and_backfills_metadata() {
        let mut bucket = Bucket::default();
        bucket.items = vec![
            "Build".to_string(),
            "Sign".to_string(),
            "Build".to_string(),
        ];
        bucket.automated.insert("Build".to_string(), true);

        bucket.repair();

        assert_eq!(bucket.items(), ["Build", "Sign"]);
        assert_eq!(bucket.automated.get("Build"), Some(&true));
        assert_eq!(bucket.automated.get("Sign"), Some(&false));
        assert_eq!(bucket.task_ids.get("Sign"), Some(&String::new()));
        assert_eq!(bucket.descriptions.get("Build"), Some(&String::new()));
    }
}
