//! Enterprise Records

use jiff::Timestamp;
use serde::Serialize;

use crate::uuids::TypedUuid;

/// Enterprise UUID
pub type EnterpriseUuid = TypedUuid<EnterpriseRecord>;

/// Enterprise Record
#[derive(Debug, Clone, Serialize)]
pub struct EnterpriseRecord {
    /// Unique enterprise identifier.
    pub uuid: EnterpriseUuid,

    /// Human-readable enterprise name.
    pub name: String,

    /// Enterprise creation timestamp.
    pub created_at: Timestamp,

    /// Last update timestamp.
    pub updated_at: Timestamp,

    /// Soft-delete timestamp when deleted.
    pub deleted_at: Option<Timestamp>,
}
