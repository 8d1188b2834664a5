//! Record transformation: surrogate id assignment, foreign-key rewrite and
//! removal of source-native metadata.

use data_migrator_shared::{
    key_string, EntityDescriptor, Record, DESTINATION_ID_FIELD, REVISION_FIELD, SOURCE_ID_FIELD,
};
use serde_json::Value;

use crate::errors::MigrationError;
use crate::id_map::IdentifierMap;

/// A record ready to be written, with the ids needed to extend the map.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformedRecord {
    /// Source-native id of the original document.
    pub source_id: String,
    /// Surrogate id assigned during this run.
    pub new_id: String,
    /// Destination record.
    pub record: Record,
}

/// Transform one source record of `descriptor.entity`.
///
/// Fails without side effects if the record has no usable `_id`, or if its
/// foreign key is absent or cannot be resolved through `id_map`.
pub fn transform_record(
    descriptor: &EntityDescriptor,
    mut record: Record,
    new_id: String,
    id_map: &IdentifierMap,
) -> Result<TransformedRecord, MigrationError> {
    let entity = descriptor.entity;
    let source_id = record
        .get(SOURCE_ID_FIELD)
        .and_then(key_string)
        .ok_or_else(|| MigrationError::malformed(entity, "record has no usable _id"))?;

    if let Some(fk) = &descriptor.foreign_key {
        let parent_id = record.get(&fk.field).and_then(key_string).ok_or_else(|| {
            MigrationError::MissingForeignKey {
                entity,
                field: fk.field.clone(),
                record_id: source_id.clone(),
            }
        })?;

        let resolved = id_map
            .get(fk.parent, &parent_id)
            .map_err(|e| MigrationError::MissingMapping {
                entity,
                parent: e.parent,
                old_id: e.old_id,
            })?;

        record.insert(fk.field.clone(), Value::String(resolved.to_string()));
    }

    record.remove(SOURCE_ID_FIELD);
    record.remove(REVISION_FIELD);
    record.insert(DESTINATION_ID_FIELD.to_string(), Value::String(new_id.clone()));

    Ok(TransformedRecord {
        source_id,
        new_id,
        record,
    })
}
