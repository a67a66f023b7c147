//! Speechops Services Library
//!
//! Upstream proxy clients and pure supporting logic: the speech
//! batch-transcription client, the table-store client, the entity mapper,
//! and the operator identity lookup.

pub mod entity;
pub mod error;
pub mod identity;
pub mod speech;
pub mod tables;

// Re-export commonly used types
pub use entity::{entity_to_wire, wire_to_entity, RESERVED_COLUMNS};
pub use error::{UpstreamError, UpstreamResult};
pub use identity::{IdentityRecord, IdentityStore, InMemoryIdentityStore};
pub use speech::SpeechClient;
pub use tables::{EntityPage, TableClient};
