//! Integration tests for `#[derive(Model)]`.
//!
//! These tests verify the generated `Model` implementations:
//! - Collection naming, derived and explicit
//! - `_id` access through `id` / `set_id`
//! - Declared indexes
//! - Documents produced from derived models

use std::time::Duration;

use mogo::prelude::*;
use pretty_assertions::assert_eq;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct EmbeddedName {
    name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Model)]
#[mogo(collection = "test")]
struct TestCollection {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    id: Option<ObjectId>,
    test_field_1: String,
    test_field_2: i32,
    #[serde(default)]
    names: Vec<EmbeddedName>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Model)]
#[mogo(index(keys = "email", unique, name = "email_unique"))]
#[mogo(index(keys = "-last_login, region", sparse))]
#[mogo(index(keys = "session_token", expire_after_secs = 3600))]
struct UserAccount {
    #[serde(rename = "_id")]
    id: ObjectId,
    email: String,
    region: Option<String>,
    session_token: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Model)]
struct HttpRequestLog {
    #[mogo(id)]
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    key: Option<ObjectId>,
    path: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Model)]
struct MetricSample {
    name: String,
    value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Model)]
struct Envelope<T> {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    id: Option<ObjectId>,
    body: T,
}

#[test]
fn test_explicit_collection_name() {
    assert_eq!(TestCollection::collection_name(), "test");
}

#[test]
fn test_derived_collection_names() {
    assert_eq!(UserAccount::collection_name(), "user_account");
    assert_eq!(MetricSample::collection_name(), "metric_sample");
    assert_eq!(HttpRequestLog::collection_name(), "http_request_log");
    assert_eq!(Envelope::<String>::collection_name(), "envelope");
}

#[test]
fn test_optional_id_get_and_set() {
    let mut record = TestCollection::default();
    assert_eq!(record.id(), None);

    let id = ObjectId::new();
    record.set_id(id);
    assert_eq!(record.id(), Some(id));
    assert_eq!(record.id, Some(id));
}

#[test]
fn test_required_id_get_and_set() {
    let mut account = UserAccount {
        id: ObjectId::new(),
        email: "a@example.com".into(),
        region: None,
        session_token: None,
    };
    assert_eq!(account.id(), Some(account.id));

    let replacement = ObjectId::new();
    account.set_id(replacement);
    assert_eq!(account.id, replacement);
}

#[test]
fn test_marked_id_field() {
    let mut log = HttpRequestLog {
        key: None,
        path: "/health".into(),
    };
    let id = ObjectId::new();
    log.set_id(id);
    assert_eq!(log.key, Some(id));

    let document = mogo::to_document(&log).unwrap();
    assert_eq!(document.get_object_id("_id").unwrap(), id);
}

#[test]
fn test_model_without_id() {
    let mut sample = MetricSample {
        name: "cpu".into(),
        value: 0.5,
    };
    assert_eq!(sample.id(), None);

    sample.set_id(ObjectId::new());
    assert_eq!(sample.id(), None);
    assert!(MetricSample::indexes().is_empty());
}

#[test]
fn test_generic_model() {
    let mut envelope = Envelope {
        id: None,
        body: 42_i64,
    };
    let id = ObjectId::new();
    envelope.set_id(id);
    assert_eq!(envelope.id(), Some(id));
}

#[test]
fn test_declared_indexes() {
    let indexes = UserAccount::indexes();
    assert_eq!(indexes.len(), 3);

    assert_eq!(
        indexes[0],
        Index::new(["email"]).unique().name("email_unique")
    );
    assert_eq!(
        indexes[1],
        Index::new(["-last_login", "region"]).sparse()
    );
    assert_eq!(indexes[1].keys_document(), doc! { "last_login": -1, "region": 1 });
    assert_eq!(indexes[2].expire_after, Some(Duration::from_secs(3600)));

    for index in &indexes {
        assert!(index.to_index_model().is_ok());
    }
}

#[test]
fn test_unset_id_is_omitted_from_document() {
    let record = TestCollection {
        test_field_1: "test".into(),
        test_field_2: 7777777,
        ..TestCollection::default()
    };

    let document = mogo::to_document(&record).unwrap();
    assert!(!document.contains_key("_id"));
    assert_eq!(document.get_str("test_field_1").unwrap(), "test");

    let back: TestCollection = mogo::from_document(document).unwrap();
    assert_eq!(back, record);
}
