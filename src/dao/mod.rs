/// Domain records persisted by the engine.
pub mod models;
/// Versioned record store backends (memory, CouchDB, MongoDB).
pub mod record_store;
/// Typed access to records on top of a [`record_store::RecordStore`].
pub mod records;
/// Backend-neutral storage errors.
pub mod storage;
