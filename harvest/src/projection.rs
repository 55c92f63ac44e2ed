//! Reduction of raw API objects to the fields kept in the output.
//!
//! Field names are the API's own, so projecting an already projected value yields the same record.

use crate::error::Result;
use crate::model::{Comment, Contributor, Issue};
use serde::de::DeserializeOwned;
use serde_json::Value;

pub fn project_contributor(raw: Value) -> Result<Contributor> {
    project(raw)
}

pub fn project_issue(raw: Value) -> Result<Issue> {
    project(raw)
}

pub fn project_comment(raw: Value) -> Result<Comment> {
    project(raw)
}

/// Projects every item, failing on the first item which cannot be projected.
pub fn project_all<T>(raw: Vec<Value>, projection: fn(Value) -> Result<T>) -> Result<Vec<T>> {
    raw.into_iter().map(projection).collect()
}

fn project<T: DeserializeOwned>(raw: Value) -> Result<T> {
    Ok(serde_json::from_value(raw)?)
}
