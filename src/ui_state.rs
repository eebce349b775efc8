//! Generative-UI payloads pushed by the graph as custom stream events.
//!
//! The graph emits `{"type": "ui", ...}` to insert or replace an entry and
//! `{"type": "remove-ui", "id": ...}` to drop one.  Entries keep the position
//! of their first insertion; replacing an entry does not move it.

use crate::models::{null_default, JsonMap};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UiMessage {
    pub id: String,
    pub name: String,
    #[serde(default, deserialize_with = "null_default")]
    pub props: JsonMap,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<JsonMap>,
}

impl UiMessage {
    /// `metadata.merge == true` asks for props to be merged into the
    /// existing entry instead of replacing them.
    fn wants_merge(&self) -> bool {
        self.metadata
            .as_ref()
            .and_then(|m| m.get("merge"))
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum UiEvent {
    #[serde(rename = "ui")]
    Upsert(UiMessage),
    #[serde(rename = "remove-ui")]
    Remove { id: String },
}

impl UiEvent {
    /// Classify a custom stream event.  Anything that is not a UI upsert or
    /// removal yields `None`.
    pub fn from_custom(event: &Value) -> Option<Self> {
        match event.get("type").and_then(Value::as_str) {
            Some("ui") | Some("remove-ui") => serde_json::from_value(event.clone()).ok(),
            _ => None,
        }
    }
}

/// Insertion-ordered UI entries keyed by id.
#[derive(Debug, Clone, Default)]
pub struct UiStateList {
    entries: BTreeMap<u64, UiMessage>,
    positions: HashMap<String, u64>,
    next_seq: u64,
}

impl UiStateList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&UiMessage> {
        self.positions.get(id).and_then(|seq| self.entries.get(seq))
    }

    pub fn iter(&self) -> impl Iterator<Item = &UiMessage> {
        self.entries.values()
    }

    pub fn apply(&mut self, event: UiEvent) {
        match event {
            UiEvent::Upsert(message) => self.upsert(message),
            UiEvent::Remove { id } => {
                self.remove(&id);
            }
        }
    }

    pub fn apply_all(&mut self, events: impl IntoIterator<Item = UiEvent>) {
        for event in events {
            self.apply(event);
        }
    }

    pub fn upsert(&mut self, mut message: UiMessage) {
        match self.positions.get(&message.id) {
            Some(seq) => {
                if let Some(existing) = self.entries.get_mut(seq) {
                    if message.wants_merge() {
                        let mut props = std::mem::take(&mut existing.props);
                        props.extend(std::mem::take(&mut message.props));
                        message.props = props;
                    }
                    *existing = message;
                }
            }
            None => {
                let seq = self.next_seq;
                self.next_seq += 1;
                self.positions.insert(message.id.clone(), seq);
                self.entries.insert(seq, message);
            }
        }
    }

    /// Returns `false` when nothing was stored under `id`.
    pub fn remove(&mut self, id: &str) -> bool {
        match self.positions.remove(id) {
            Some(seq) => self.entries.remove(&seq).is_some(),
            None => false,
        }
    }
}

impl PartialEq for UiStateList {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl FromIterator<UiMessage> for UiStateList {
    fn from_iter<I: IntoIterator<Item = UiMessage>>(iter: I) -> Self {
        let mut list = UiStateList::new();
        for message in iter {
            list.upsert(message);
        }
        list
    }
}

#[derive(Serialize)]
struct TaggedUiMessage<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    #[serde(flatten)]
    message: &'a UiMessage,
}

impl Serialize for UiStateList {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter().map(|message| TaggedUiMessage {
            kind: "ui",
            message,
        }))
    }
}

impl<'de> Deserialize<'de> for UiStateList {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // Entries the client cannot read are skipped rather than failing the
        // whole thread state.
        let raw = Vec::<Value>::deserialize(deserializer)?;
        Ok(raw
            .into_iter()
            .filter_map(|v| serde_json::from_value::<UiMessage>(v).ok())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ui(id: &str, name: &str, props: Value) -> UiEvent {
        serde_json::from_value(json!({"type": "ui", "id": id, "name": name, "props": props}))
            .unwrap()
    }

    fn ids(list: &UiStateList) -> Vec<&str> {
        list.iter().map(|m| m.id.as_str()).collect()
    }

    #[test]
    fn inserts_keep_arrival_order() {
        let mut list = UiStateList::new();
        list.apply_all([ui("a", "card", json!({})), ui("b", "map", json!({})), ui("c", "card", json!({}))]);
        assert_eq!(ids(&list), ["a", "b", "c"]);
    }

    #[test]
    fn update_replaces_in_place() {
        let mut list = UiStateList::new();
        list.apply_all([ui("a", "card", json!({"n": 1})), ui("b", "map", json!({}))]);
        list.apply(ui("a", "card", json!({"n": 2})));
        assert_eq!(ids(&list), ["a", "b"]);
        assert_eq!(list.get("a").unwrap().props.get("n"), Some(&json!(2)));
    }

    #[test]
    fn merge_metadata_merges_props() {
        let mut list = UiStateList::new();
        list.apply(ui("a", "card", json!({"title": "x", "n": 1})));
        let merge: UiEvent = serde_json::from_value(json!({
            "type": "ui", "id": "a", "name": "card",
            "props": {"n": 2}, "metadata": {"merge": true}
        }))
        .unwrap();
        list.apply(merge);
        let props = &list.get("a").unwrap().props;
        assert_eq!(props.get("title"), Some(&json!("x")));
        assert_eq!(props.get("n"), Some(&json!(2)));
    }

    #[test]
    fn duplicate_remove_is_a_noop() {
        let mut list = UiStateList::new();
        list.apply_all([ui("a", "card", json!({})), ui("b", "map", json!({}))]);
        list.apply(UiEvent::Remove { id: "a".into() });
        let before = list.clone();
        list.apply(UiEvent::Remove { id: "a".into() });
        list.apply(UiEvent::Remove { id: "never-there".into() });
        assert_eq!(list, before);
        assert_eq!(ids(&list), ["b"]);
    }

    #[test]
    fn reinserted_entry_goes_to_the_end() {
        let mut list = UiStateList::new();
        list.apply_all([ui("a", "card", json!({})), ui("b", "map", json!({}))]);
        list.apply(UiEvent::Remove { id: "a".into() });
        list.apply(ui("a", "card", json!({})));
        assert_eq!(ids(&list), ["b", "a"]);
    }

    #[test]
    fn classifies_custom_events() {
        assert!(matches!(
            UiEvent::from_custom(&json!({"type": "remove-ui", "id": "a"})),
            Some(UiEvent::Remove { .. })
        ));
        assert!(UiEvent::from_custom(&json!({"type": "progress", "pct": 10})).is_none());
        assert!(UiEvent::from_custom(&json!("plain string")).is_none());
    }

    #[test]
    fn serializes_as_tagged_array() {
        let mut list = UiStateList::new();
        list.apply(ui("a", "card", json!({"k": "v"})));
        assert_eq!(
            serde_json::to_value(&list).unwrap(),
            json!([{"type": "ui", "id": "a", "name": "card", "props": {"k": "v"}}])
        );
        let back: UiStateList = serde_json::from_value(serde_json::to_value(&list).unwrap()).unwrap();
        assert_eq!(back, list);
    }
}
