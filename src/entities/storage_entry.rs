//! Storage entry entity - the key-value table that holds the portal document.
//! Each key maps to one serialized JSON document; the portal uses a single key.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Storage entry database model - one serialized document per key
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "local_storage")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i32,
    /// Storage key (e.g., `"rohit-procurement-fresh-v1"`)
    #[sea_orm(unique)]
    pub key: String,
    /// Serialized JSON document
    #[sea_orm(column_type = "Text")]
    pub value: String,
    /// When this entry was last written
    pub updated_at: DateTime,
}

/// `StorageEntry` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
