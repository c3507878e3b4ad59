/// All entity primary keys are UUIDs (QR tokens are printed as UUID URLs).
pub type EntityId = uuid::Uuid;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
