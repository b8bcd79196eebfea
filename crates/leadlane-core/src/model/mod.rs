//! Domain model: lead records and the vehicle reference catalog.

pub mod lead;
pub mod vehicle;

pub use lead::{Classification, EmptyField, Lead, LeadId, LeadPatch, NewLead, Status, UnknownStatus};
pub use vehicle::Vehicle;
