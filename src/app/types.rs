//! Wire types of the sample application.

use serde::{Deserialize, Serialize};
use serde_json::Number;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SampleResource {
    pub public_id: String,
    pub name: String,
    pub age: Option<Number>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceItem {
    pub item: SampleResource,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceList {
    pub items: Vec<SampleResource>,
}

/// `{}` on the wire.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Empty {}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicId {
    pub public_id: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ByPublicId {
    pub params: PublicId,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NewItem {
    pub name: String,
    #[serde(default)]
    pub age: Option<Number>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CreateBody {
    pub item: NewItem,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CreateRequest {
    pub body: CreateBody,
}

/// Fields left out are kept as they are.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ItemPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub age: Option<Number>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UpdateBody {
    pub item: ItemPatch,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UpdateRequest {
    pub params: PublicId,
    pub body: UpdateBody,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WildcardPath {
    #[serde(rename = "*")]
    pub tail: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PageRequest {
    pub params: WildcardPath,
}
