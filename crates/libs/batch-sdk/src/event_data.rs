use crate::error::{code, ErrorCategory, SdkError};
use crate::types::{AttributeValue, TypedValue};
use crate::validation::{
    validate_attribute_value, validate_event_label, validate_event_name, validate_key,
    validate_tag, AttributeKey, Tag, ValidationWarning,
};
use serde::Serialize;
use serde_json::{json, Map, Value as JsonValue};
use std::collections::{BTreeMap, BTreeSet};

pub const MAX_EVENT_TAGS: usize = 10;
pub const MAX_EVENT_ATTRIBUTES: usize = 15;

/// Tags and typed attributes attached to a single tracked event.
///
/// Owned by the caller until handed to `track_event`, which takes it by
/// value.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct EventData {
    tags: BTreeSet<Tag>,
    attributes: BTreeMap<AttributeKey, TypedValue>,
    #[serde(skip)]
    warnings: Vec<(AttributeKey, ValidationWarning)>,
}

impl EventData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adding a tag that is already present is a no-op.
    pub fn add_tag(&mut self, tag: &str) -> Result<&mut Self, SdkError> {
        let tag = validate_tag(tag)?;
        if !self.tags.contains(&tag) && self.tags.len() >= MAX_EVENT_TAGS {
            return Err(limit_exceeded("tags", MAX_EVENT_TAGS));
        }
        self.tags.insert(tag);
        Ok(self)
    }

    /// Last write wins for a given key.
    pub fn put(
        &mut self,
        key: &str,
        value: impl Into<AttributeValue>,
    ) -> Result<&mut Self, SdkError> {
        let key = validate_key(key)?;
        let (value, warnings) = validate_attribute_value(value.into())?.into_parts();
        if !self.attributes.contains_key(&key) && self.attributes.len() >= MAX_EVENT_ATTRIBUTES {
            return Err(limit_exceeded("attributes", MAX_EVENT_ATTRIBUTES));
        }
        self.warnings.retain(|(warned, _)| warned != &key);
        for warning in warnings {
            log::warn!("event attribute '{key}': {warning}");
            self.warnings.push((key.clone(), warning));
        }
        self.attributes.insert(key, value);
        Ok(self)
    }

    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.tags.iter().map(Tag::as_str)
    }

    pub fn attribute(&self, key: &str) -> Option<&TypedValue> {
        self.attributes.iter().find(|(k, _)| k.as_str() == key).map(|(_, value)| value)
    }

    pub fn attribute_count(&self) -> usize {
        self.attributes.len()
    }

    pub fn warnings(&self) -> &[(AttributeKey, ValidationWarning)] {
        &self.warnings
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty() && self.attributes.is_empty()
    }
}

fn limit_exceeded(what: &'static str, limit: usize) -> SdkError {
    SdkError::new(
        code::VALIDATION_LIMIT_EXCEEDED,
        ErrorCategory::Validation,
        format!("event data cannot hold more than {limit} {what}"),
    )
    .with_user_actionable(true)
    .with_detail("limit_name", JsonValue::String(what.to_owned()))
    .with_detail("limit_value", JsonValue::from(limit))
}

/// Data attached to `track_event`.
#[derive(Clone, Debug, PartialEq)]
pub enum EventPayload {
    Typed(EventData),
    /// A plain key/value map forwarded without client-side validation.
    /// Kept for callers that predate [`EventData`].
    Legacy(Map<String, JsonValue>),
}

impl From<EventData> for EventPayload {
    fn from(data: EventData) -> Self {
        Self::Typed(data)
    }
}

impl From<Map<String, JsonValue>> for EventPayload {
    fn from(map: Map<String, JsonValue>) -> Self {
        Self::Legacy(map)
    }
}

/// Validate a `track_event` call and build the payload dispatched to the
/// native runtime.
pub fn event_payload(
    name: &str,
    label: Option<&str>,
    data: Option<EventPayload>,
) -> Result<JsonValue, SdkError> {
    validate_event_name(name)?;
    if let Some(label) = label {
        validate_event_label(label)?;
    }

    let mut payload = json!({ "name": name, "label": label });
    match data {
        Some(EventPayload::Typed(data)) => {
            payload["data"] = serde_json::to_value(&data).map_err(|err| {
                SdkError::new(code::INTERNAL, ErrorCategory::Internal, err.to_string())
            })?;
        }
        Some(EventPayload::Legacy(map)) => {
            log::debug!("event '{name}' uses legacy untyped data; skipping client validation");
            payload["legacy_data"] = JsonValue::Object(map);
        }
        None => {}
    }
    Ok(payload)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_are_deduplicated_and_case_preserved() {
        let mut data = EventData::new();
        data.add_tag("Summer")
            .expect("tag")
            .add_tag("Summer")
            .expect("tag")
            .add_tag("summer")
            .expect("tag");
        assert_eq!(data.tags().collect::<Vec<_>>(), vec!["Summer", "summer"]);
    }

    #[test]
    fn put_overwrites_previous_value() {
        let mut data = EventData::new();
        data.put("color", "red").expect("put").put("color", true).expect("put");
        assert_eq!(data.attribute("color"), Some(&TypedValue::Boolean(true)));
        assert_eq!(data.attribute_count(), 1);
    }

    #[test]
    fn rejected_calls_leave_data_untouched() {
        let mut data = EventData::new();
        data.put("ok", 1i32).expect("put");
        assert!(data.put("Not OK", 2i32).is_err());
        assert!(data.put("empty", "").is_err());
        assert!(data.add_tag("").is_err());
        assert_eq!(data.attribute_count(), 1);
        assert_eq!(data.tags().count(), 0);
    }

    #[test]
    fn fractional_numbers_are_flagged() {
        let mut data = EventData::new();
        data.put("price", 9.99f64).expect("put");
        assert_eq!(data.warnings().len(), 1);
        assert_eq!(data.warnings()[0].0.as_str(), "price");
    }

    #[test]
    fn overwriting_a_value_drops_its_stale_warning() {
        let mut data = EventData::new();
        data.put("price", 9.99f64).expect("put").put("ratio", 0.5f64).expect("put");
        data.put("price", 10i32).expect("overwrite");
        assert_eq!(data.warnings().len(), 1);
        assert_eq!(data.warnings()[0].0.as_str(), "ratio");
    }

    #[test]
    fn limits_apply_to_new_entries_only() {
        let mut data = EventData::new();
        for i in 0..MAX_EVENT_TAGS {
            data.add_tag(&format!("t{i}")).expect("within limit");
        }
        let err = data.add_tag("overflow").expect_err("tag limit");
        assert_eq!(err.code(), code::VALIDATION_LIMIT_EXCEEDED);
        data.add_tag("t0").expect("existing tag is still a no-op");

        for i in 0..MAX_EVENT_ATTRIBUTES {
            data.put(&format!("k{i}"), i as u32).expect("within limit");
        }
        assert!(data.put("overflow", 1i32).is_err());
        data.put("k0", "replaced").expect("overwrite keeps the count");
    }

    #[test]
    fn typed_payload_shape() {
        let mut data = EventData::new();
        data.add_tag("sale").expect("tag").put("amount", 3i32).expect("put");
        let payload = event_payload("purchase", Some("checkout"), Some(data.into())).expect("ok");
        assert_eq!(
            payload,
            json!({
                "name": "purchase",
                "label": "checkout",
                "data": {
                    "tags": ["sale"],
                    "attributes": {"amount": {"type": "number", "value": 3}}
                }
            })
        );
    }

    #[test]
    fn legacy_payload_is_forwarded_verbatim() {
        let mut legacy = Map::new();
        legacy.insert("Anything Goes".to_owned(), json!({"nested": [1, 2]}));
        let payload = event_payload("opened", None, Some(legacy.clone().into())).expect("ok");
        assert_eq!(payload["legacy_data"], JsonValue::Object(legacy));
        assert_eq!(payload["label"], JsonValue::Null);
        assert!(payload.get("data").is_none());
    }

    #[test]
    fn event_name_and_label_are_checked() {
        assert!(event_payload("", None, None).is_err());
        assert!(event_payload("ok", Some(""), None).is_err());
        assert!(event_payload("ok", Some(&"l".repeat(201)), None).is_err());
    }
}
