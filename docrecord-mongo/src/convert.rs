//! JSON record <-> BSON document conversion

use docrecord_core::{DriverError, Record, RecordId, ID_FIELD};
use mongodb::bson::{self, doc, Bson, Document};

pub fn record_to_document(record: &Record) -> Result<Document, DriverError> {
    Ok(bson::to_document(record.as_map())?)
}

/// Documents come back as relaxed extended JSON, so an ObjectId `_id`
/// surfaces as `{"$oid": "..."}`.
pub fn document_to_record(document: Document) -> Result<Record, DriverError> {
    let value = Bson::Document(document).into_relaxed_extjson();
    Ok(Record::try_from(value)?)
}

/// `{ _id: <id> }`
pub fn id_filter(id: &RecordId) -> Result<Document, DriverError> {
    Ok(doc! { ID_FIELD: bson::to_bson(id.as_value())? })
}
