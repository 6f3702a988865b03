//! Enterprise Data

use crate::domain::enterprises::records::EnterpriseUuid;

/// New Enterprise Data
#[derive(Debug, Clone, PartialEq)]
pub struct NewEnterprise {
    /// UUID to assign to the enterprise row.
    pub uuid: EnterpriseUuid,

    /// Enterprise name to persist.
    pub name: String,
}
