use super::{ProfileDelta, ProfileOperation};
use crate::client::{to_payload, ClientCore};
use crate::error::SdkError;
use crate::lifecycle::SdkMethod;
use crate::types::AttributeValue;
use crate::validation::{
    validate_attribute_value, validate_identifier, validate_key, validate_locale_code,
    validate_tag, AttributeKey, ValidationWarning,
};
use batch_bridge::{Bridge, OperationKind};
use std::fmt;
use std::sync::Arc;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum EditorState {
    Open,
    Committed,
}

/// One profile edit transaction.
///
/// Mutations are validated immediately; a rejected call leaves the queue
/// untouched. Once `save()` succeeds the editor is committed and every
/// further call fails with `BATCH_EDITOR_ALREADY_COMMITTED`.
pub struct ProfileEditor<B: Bridge> {
    core: Arc<ClientCore<B>>,
    operations: Vec<ProfileOperation>,
    warnings: Vec<(AttributeKey, ValidationWarning)>,
    state: EditorState,
}

impl<B: Bridge> fmt::Debug for ProfileEditor<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProfileEditor")
            .field("operations", &self.operations)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl<B: Bridge> ProfileEditor<B> {
    pub(crate) fn new(core: Arc<ClientCore<B>>) -> Self {
        Self { core, operations: Vec::new(), warnings: Vec::new(), state: EditorState::Open }
    }

    fn ensure_open(&self, method: &'static str) -> Result<(), SdkError> {
        match self.state {
            EditorState::Open => Ok(()),
            EditorState::Committed => Err(SdkError::already_committed(method)),
        }
    }

    fn queue(&mut self, operation: ProfileOperation) -> &mut Self {
        self.operations.push(operation);
        self
    }

    pub fn set_attribute(
        &mut self,
        key: &str,
        value: impl Into<AttributeValue>,
    ) -> Result<&mut Self, SdkError> {
        self.ensure_open("set_attribute")?;
        let key = validate_key(key)?;
        let (value, warnings) = validate_attribute_value(value.into())?.into_parts();
        self.warnings.retain(|(warned, _)| warned != &key);
        for warning in warnings {
            log::warn!("profile attribute '{key}': {warning}");
            self.warnings.push((key.clone(), warning));
        }
        Ok(self.queue(ProfileOperation::SetAttribute { key, value }))
    }

    pub fn remove_attribute(&mut self, key: &str) -> Result<&mut Self, SdkError> {
        self.ensure_open("remove_attribute")?;
        let key = validate_key(key)?;
        self.warnings.retain(|(warned, _)| warned != &key);
        Ok(self.queue(ProfileOperation::RemoveAttribute { key }))
    }

    pub fn clear_attributes(&mut self) -> Result<&mut Self, SdkError> {
        self.ensure_open("clear_attributes")?;
        self.warnings.clear();
        Ok(self.queue(ProfileOperation::ClearAttributes))
    }

    pub fn add_tag(&mut self, collection: &str, tag: &str) -> Result<&mut Self, SdkError> {
        self.ensure_open("add_tag")?;
        let collection = validate_key(collection)?;
        let tag = validate_tag(tag)?;
        Ok(self.queue(ProfileOperation::AddTag { collection, tag }))
    }

    pub fn remove_tag(&mut self, collection: &str, tag: &str) -> Result<&mut Self, SdkError> {
        self.ensure_open("remove_tag")?;
        let collection = validate_key(collection)?;
        let tag = validate_tag(tag)?;
        Ok(self.queue(ProfileOperation::RemoveTag { collection, tag }))
    }

    pub fn clear_tags(&mut self) -> Result<&mut Self, SdkError> {
        self.ensure_open("clear_tags")?;
        Ok(self.queue(ProfileOperation::ClearTags))
    }

    pub fn clear_tag_collection(&mut self, collection: &str) -> Result<&mut Self, SdkError> {
        self.ensure_open("clear_tag_collection")?;
        let collection = validate_key(collection)?;
        Ok(self.queue(ProfileOperation::ClearTagCollection { collection }))
    }

    /// `None` resets to the device language.
    pub fn set_language(&mut self, language: Option<&str>) -> Result<&mut Self, SdkError> {
        self.ensure_open("set_language")?;
        let language = validate_locale_code("language", language)?;
        Ok(self.queue(ProfileOperation::SetLanguage(language)))
    }

    /// `None` resets to the device region.
    pub fn set_region(&mut self, region: Option<&str>) -> Result<&mut Self, SdkError> {
        self.ensure_open("set_region")?;
        let region = validate_locale_code("region", region)?;
        Ok(self.queue(ProfileOperation::SetRegion(region)))
    }

    /// `None` detaches the installation from its custom user identifier.
    pub fn set_identifier(&mut self, identifier: Option<&str>) -> Result<&mut Self, SdkError> {
        self.ensure_open("set_identifier")?;
        let identifier = validate_identifier(identifier)?;
        Ok(self.queue(ProfileOperation::SetIdentifier(identifier)))
    }

    pub fn pending_operations(&self) -> &[ProfileOperation] {
        &self.operations
    }

    pub fn pending_delta(&self) -> ProfileDelta {
        ProfileDelta::from_operations(&self.operations)
    }

    pub fn warnings(&self) -> &[(AttributeKey, ValidationWarning)] {
        &self.warnings
    }

    pub fn is_committed(&self) -> bool {
        self.state == EditorState::Committed
    }

    /// Dispatch the queued operations as one delta and commit the editor.
    ///
    /// A failed dispatch leaves the editor open with its queue intact, so the
    /// caller may retry.
    pub async fn save(&mut self) -> Result<ProfileDelta, SdkError> {
        self.ensure_open("save")?;
        self.core.ensure_method_legal(SdkMethod::SaveProfile)?;

        let delta = self.pending_delta();
        self.core.dispatch(OperationKind::SaveProfile, to_payload(&delta)?).await?;
        self.core.apply_profile_delta(&delta);
        self.state = EditorState::Committed;
        log::debug!("profile transaction committed ({} operations)", self.operations.len());
        Ok(delta)
    }
}
