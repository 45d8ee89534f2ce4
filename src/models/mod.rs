use serde::Serialize;
use serde::de::DeserializeOwned;

pub mod bill;
pub mod bus_event;
pub mod cache_entry;
pub mod order;
pub mod pricing;
pub mod table;

/// Serialize a sub-document for a JSON text column.
pub(crate) fn encode_json<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|err| {
        log::error!("Failed to encode JSON column: {err}");
        "[]".to_string()
    })
}

/// Deserialize a JSON text column that must be well formed.
pub(crate) fn decode_document<T: DeserializeOwned>(
    raw: &str,
    column: &str,
) -> diesel::result::QueryResult<T> {
    serde_json::from_str(raw).map_err(|err| {
        log::error!("Malformed JSON in column {column}: {err}");
        diesel::result::Error::DeserializationError(Box::new(err))
    })
}

/// Deserialize a JSON text column, falling back to the empty value.
pub(crate) fn decode_json<T: DeserializeOwned + Default>(raw: &str, column: &str) -> T {
    serde_json::from_str(raw).unwrap_or_else(|err| {
        log::error!("Malformed JSON in column {column}: {err}");
        T::default()
    })
}
