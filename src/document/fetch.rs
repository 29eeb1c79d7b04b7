//! Typed wrappers over [`ContentStore::fetch`].

use super::{Document, Fetched, Shape};
use crate::store::{ContentStore, Params, StoreError, params};
use serde::{Deserialize, de::DeserializeOwned};
use serde_json::{Value, json};

const BY_TYPE_AND_ID: &str = "*[_type == $type && _id == $id][0]";
const BY_ID: &str = "*[_id == $id][0]";
const IDS_BY_TYPE: &str = "*[_type == $type] | order(_id asc){_id}";

fn shape_mismatch(type_tag: &str) -> impl FnOnce(serde_json::Error) -> StoreError + '_ {
    move |source| StoreError::ShapeMismatch {
        type_tag: type_tag.to_owned(),
        source,
    }
}

/// `null` is absence; anything else must fit `T`.
fn decode_one<T: DeserializeOwned>(value: Value, type_tag: &str) -> Result<Fetched<T>, StoreError> {
    if value.is_null() {
        return Ok(Fetched::NotFound);
    }
    serde_json::from_value(value)
        .map(Fetched::Found)
        .map_err(shape_mismatch(type_tag))
}

/// `null` is an empty list; anything else must be a list of `T`.
fn decode_many<T: DeserializeOwned>(value: Value, type_tag: &str) -> Result<Vec<T>, StoreError> {
    if value.is_null() {
        return Ok(Vec::new());
    }
    serde_json::from_value(value).map_err(shape_mismatch(type_tag))
}

/// Fetch one document of type `T` by id.
pub async fn fetch_by_id<T: Shape, S: ContentStore>(
    store: &S,
    id: &str,
) -> Result<Fetched<T>, StoreError> {
    let value = store
        .fetch(
            BY_TYPE_AND_ID,
            &params([("type", json!(T::TYPE_TAG)), ("id", json!(id))]),
        )
        .await?;
    decode_one(value, T::TYPE_TAG)
}

/// Fetch every document of type `T` in listing order.
pub async fn fetch_all<T: Shape, S: ContentStore>(store: &S) -> Result<Vec<T>, StoreError> {
    let query = format!("*[_type == $type] | order({})", T::ORDERING);
    let value = store
        .fetch(&query, &params([("type", json!(T::TYPE_TAG))]))
        .await?;
    decode_many(value, T::TYPE_TAG)
}

/// Ids of every document with the given type tag.
pub async fn fetch_ids<S: ContentStore>(store: &S, type_tag: &str) -> Result<Vec<String>, StoreError> {
    #[derive(Deserialize)]
    struct IdOnly {
        #[serde(rename = "_id")]
        id: String,
    }

    let value = store
        .fetch(IDS_BY_TYPE, &params([("type", json!(type_tag))]))
        .await?;
    let ids: Vec<IdOnly> = decode_many(value, type_tag)?;
    Ok(ids.into_iter().map(|doc| doc.id).collect())
}

/// Fetch any supported document by id, whatever its type.
pub async fn fetch_document<S: ContentStore>(
    store: &S,
    id: &str,
) -> Result<Fetched<Document>, StoreError> {
    let value = store.fetch(BY_ID, &params([("id", json!(id))])).await?;
    let type_tag = value
        .get("_type")
        .and_then(Value::as_str)
        .unwrap_or("unknown")
        .to_owned();
    decode_one(value, &type_tag)
}

/// Run an arbitrary query whose result is declared as `T`.
///
/// `label` names the shape in a [`StoreError::ShapeMismatch`].
pub async fn fetch_query<T: DeserializeOwned, S: ContentStore>(
    store: &S,
    query: &str,
    params: &Params,
    label: &str,
) -> Result<Fetched<T>, StoreError> {
    let value = store.fetch(query, params).await?;
    decode_one(value, label)
}
