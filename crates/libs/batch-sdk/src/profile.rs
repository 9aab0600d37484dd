//! User profile edit transactions.
//!
//! A [`ProfileEditor`] queues validated [`ProfileOperation`]s. On `save()`
//! the queue is replayed into one [`ProfileDelta`], dispatched to the native
//! runtime as a single unit, then applied to the client's [`ProfileState`]
//! mirror under one write lock.

mod editor;

pub use editor::ProfileEditor;

use crate::types::TypedValue;
use crate::validation::{AttributeKey, Tag};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Clone, Debug, PartialEq)]
pub enum ProfileOperation {
    SetAttribute { key: AttributeKey, value: TypedValue },
    RemoveAttribute { key: AttributeKey },
    ClearAttributes,
    AddTag { collection: AttributeKey, tag: Tag },
    RemoveTag { collection: AttributeKey, tag: Tag },
    ClearTags,
    ClearTagCollection { collection: AttributeKey },
    SetLanguage(Option<String>),
    SetRegion(Option<String>),
    SetIdentifier(Option<String>),
}

/// Final effect on one attribute. Serializes as the typed value, or `null`
/// for a removal.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum AttributeChange {
    Set(TypedValue),
    Removed,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct TagCollectionChange {
    /// Drop every tag of the collection before applying `added`/`removed`.
    #[serde(default)]
    pub cleared: bool,
    #[serde(default)]
    pub added: BTreeSet<Tag>,
    #[serde(default)]
    pub removed: BTreeSet<Tag>,
}

/// The net result of a transaction, dispatched as one payload.
///
/// `language`, `region` and `identifier` use `Some(None)` for "reset" and
/// `None` for "untouched".
#[derive(Clone, Debug, Default, Serialize, PartialEq)]
pub struct ProfileDelta {
    pub clear_attributes: bool,
    pub attributes: BTreeMap<AttributeKey, AttributeChange>,
    pub clear_tags: bool,
    pub tag_collections: BTreeMap<AttributeKey, TagCollectionChange>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identifier: Option<Option<String>>,
}

impl ProfileDelta {
    /// Replay queued operations in call order. Later operations on the same
    /// key win; a clear discards earlier operations of its kind.
    pub fn from_operations(operations: &[ProfileOperation]) -> Self {
        let mut delta = Self::default();
        for operation in operations {
            delta.push(operation);
        }
        delta
    }

    fn push(&mut self, operation: &ProfileOperation) {
        match operation {
            ProfileOperation::SetAttribute { key, value } => {
                self.attributes.insert(key.clone(), AttributeChange::Set(value.clone()));
            }
            ProfileOperation::RemoveAttribute { key } => {
                self.attributes.insert(key.clone(), AttributeChange::Removed);
            }
            ProfileOperation::ClearAttributes => {
                self.attributes.clear();
                self.clear_attributes = true;
            }
            ProfileOperation::AddTag { collection, tag } => {
                let change = self.tag_collections.entry(collection.clone()).or_default();
                change.removed.remove(tag);
                change.added.insert(tag.clone());
            }
            ProfileOperation::RemoveTag { collection, tag } => {
                let change = self.tag_collections.entry(collection.clone()).or_default();
                change.added.remove(tag);
                change.removed.insert(tag.clone());
            }
            ProfileOperation::ClearTags => {
                self.tag_collections.clear();
                self.clear_tags = true;
            }
            ProfileOperation::ClearTagCollection { collection } => {
                self.tag_collections.insert(
                    collection.clone(),
                    TagCollectionChange { cleared: true, ..TagCollectionChange::default() },
                );
            }
            ProfileOperation::SetLanguage(language) => self.language = Some(language.clone()),
            ProfileOperation::SetRegion(region) => self.region = Some(region.clone()),
            ProfileOperation::SetIdentifier(identifier) => {
                self.identifier = Some(identifier.clone());
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn attribute(&self, key: &str) -> Option<&AttributeChange> {
        self.attributes.iter().find(|(k, _)| k.as_str() == key).map(|(_, change)| change)
    }

    pub fn tag_collection(&self, collection: &str) -> Option<&TagCollectionChange> {
        self.tag_collections.iter().find(|(k, _)| k.as_str() == collection).map(|(_, c)| c)
    }
}

/// Client-side view of the profile, as of the last successful save.
#[derive(Clone, Debug, Default, Serialize, PartialEq)]
pub struct ProfileState {
    pub attributes: BTreeMap<AttributeKey, TypedValue>,
    pub tag_collections: BTreeMap<AttributeKey, BTreeSet<Tag>>,
    pub language: Option<String>,
    pub region: Option<String>,
    pub identifier: Option<String>,
}

impl ProfileState {
    pub fn apply(&mut self, delta: &ProfileDelta) {
        if delta.clear_attributes {
            self.attributes.clear();
        }
        for (key, change) in &delta.attributes {
            match change {
                AttributeChange::Set(value) => {
                    self.attributes.insert(key.clone(), value.clone());
                }
                AttributeChange::Removed => {
                    self.attributes.remove(key);
                }
            }
        }

        if delta.clear_tags {
            self.tag_collections.clear();
        }
        for (collection, change) in &delta.tag_collections {
            let tags = self.tag_collections.entry(collection.clone()).or_default();
            if change.cleared {
                tags.clear();
            }
            for tag in &change.removed {
                tags.remove(tag);
            }
            tags.extend(change.added.iter().cloned());
        }
        self.tag_collections.retain(|_, tags| !tags.is_empty());

        if let Some(language) = &delta.language {
            self.language = language.clone();
        }
        if let Some(region) = &delta.region {
            self.region = region.clone();
        }
        if let Some(identifier) = &delta.identifier {
            self.identifier = identifier.clone();
        }
    }

    pub fn attribute(&self, key: &str) -> Option<&TypedValue> {
        self.attributes.iter().find(|(k, _)| k.as_str() == key).map(|(_, value)| value)
    }

    pub fn tags(&self, collection: &str) -> Option<Vec<&str>> {
        self.tag_collections
            .iter()
            .find(|(k, _)| k.as_str() == collection)
            .map(|(_, tags)| tags.iter().map(Tag::as_str).collect())
    }
}
