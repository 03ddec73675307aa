// src/models/mod.rs

pub mod admin;
pub mod organization;
pub mod record;

// Re-exports

pub use admin::{AdminAccount, AdminRole, AdminUpdate, AdminView, NewAdmin};
pub use organization::{NewOrganization, Organization, OrganizationUpdate, DEFAULT_COLOR};
pub use record::{ClearRecord, CredentialRecord, NewRecord, RecordUpdate, SealedFields};
