//! Entity module - `SeaORM` entity definitions for the storage table.
//! The portal keeps its whole state in one JSON document, so the only table is
//! a key-value store.

pub mod storage_entry;

pub use storage_entry::{
    Column as StorageEntryColumn, Entity as StorageEntry, Model as StorageEntryModel,
};
