//! Integration tests for query composition.
//!
//! Handles are created lazily, so none of these tests need a running server:
//! they check the filter and options a query would send.

use mogo::prelude::*;
use pretty_assertions::assert_eq;

async fn lazy_db() -> Db {
    Db::connect("127.0.0.1:27017/mogo_compose").await.unwrap()
}

#[tokio::test]
async fn test_where_single_clause_is_sent_verbatim() {
    let db = lazy_db().await;
    let query = db.where_(doc! { "test_field_1": "test3" });
    assert_eq!(query.filter(), doc! { "test_field_1": "test3" });
}

#[tokio::test]
async fn test_or_clauses_keep_insertion_order() {
    let db = lazy_db().await;
    let query = db
        .where_(doc! { "status": "active" })
        .or(doc! { "role": "admin" })
        .or(doc! { "names.name": "test1" });

    assert_eq!(
        query.filter(),
        doc! {
            "$or": [
                { "status": "active" },
                { "role": "admin" },
                { "names.name": "test1" },
            ]
        }
    );
}

#[tokio::test]
async fn test_or_on_empty_query() {
    let db = lazy_db().await;
    assert_eq!(db.query().filter(), doc! {});
    assert_eq!(db.query().or(doc! { "a": 1 }).filter(), doc! { "a": 1 });
}

#[tokio::test]
async fn test_filter_builder_as_clause() {
    let db = lazy_db().await;
    let query = db.where_(
        FilterBuilder::new()
            .gte("age", 18)
            .lt("age", 65)
            .in_array("status", vec!["active", "pending"]),
    );

    assert_eq!(
        query.filter(),
        doc! {
            "age": { "$gte": 18, "$lt": 65 },
            "status": { "$in": ["active", "pending"] },
        }
    );
}

#[tokio::test]
async fn test_sort_keys_accumulate() {
    let db = lazy_db().await;
    let query = db.query().sort("-created_at").sort("name, -age");

    assert_eq!(
        query.find_options().sort,
        Some(doc! { "created_at": -1, "name": 1, "age": -1 })
    );
}

#[tokio::test]
async fn test_paginate() {
    let db = lazy_db().await;

    let page = db.query().paginate(20, 3);
    let options = page.find_options();
    assert_eq!(options.skip, Some(40));
    assert_eq!(options.limit, Some(20));

    // later pagination calls win
    let page = db.query().paginate(20, 3).paginate(5, 2);
    assert_eq!(page.spec().skip, Some(5));
    assert_eq!(page.spec().limit, Some(5));
}

#[tokio::test]
async fn test_limit_resets_skip() {
    let db = lazy_db().await;
    let query = db.query().paginate(10, 9).limit(3);
    let options = query.find_options();
    assert_eq!(options.skip, Some(0));
    assert_eq!(options.limit, Some(3));
}

#[tokio::test]
async fn test_select_sets_projection() {
    let db = lazy_db().await;
    let query = db
        .where_(doc! { "test_field_1": "x" })
        .select(doc! { "test_field_1": 1, "_id": 0 });
    assert_eq!(
        query.find_options().projection,
        Some(doc! { "test_field_1": 1, "_id": 0 })
    );
}

#[tokio::test]
async fn test_queries_are_independent_values() {
    let db = lazy_db().await;
    let base = db.where_(doc! { "kind": "a" });
    let sorted = base.clone().sort("name");

    assert_eq!(base.find_options().sort, None);
    assert_eq!(sorted.find_options().sort, Some(doc! { "name": 1 }));
    assert_eq!(base.filter(), sorted.filter());
}
