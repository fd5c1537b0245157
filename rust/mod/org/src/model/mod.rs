mod address;
mod organization;

pub use address::Address;
pub use organization::{CreateOrganization, Organization};
