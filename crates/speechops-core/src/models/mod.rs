pub mod auth;
pub mod tables;
pub mod transcription;

pub use auth::{LoginRequest, LoginResponse, MessageResponse};
pub use tables::{
    TableEntitiesResponse, TableEntityResponse, TableListResponse, UpsertEntityRequest,
};
pub use transcription::{
    DiarizationProperties, EntityReference, TranscriptionError, TranscriptionJob,
    TranscriptionJobRequest, TranscriptionLinks, TranscriptionProperties,
};
