//! Record types managed by SiteLedger
//!
//! Each record is a closed struct with its own create/update payloads.
//! Wire field names are camelCase; enumerations use fixed snake_case strings.

#[macro_use]
pub mod macros;

pub mod boq;
pub mod inventory;
pub mod invoice;
pub mod material_request;
pub mod payment;
pub mod project;
pub mod user;

pub use boq::{Boq, BoqLineItem, BoqStatus, CreateBoq, UpdateBoq};
pub use inventory::{CreateInventoryItem, InventoryItem, UpdateInventoryItem};
pub use invoice::{BadgeColor, CreateInvoice, Invoice, InvoiceStatus, UpdateInvoice};
pub use material_request::{
    CreateMaterialRequest, MaterialRequest, MaterialRequestItem, MaterialRequestStatus,
    UpdateMaterialRequest,
};
pub use payment::{CreatePayment, Payment, PaymentType, UpdatePayment};
pub use project::{CreateProject, Project, ProjectStatus, UpdateProject};
pub use user::{CreateUser, UpdateUser, User, UserStatus, UserSummary};

use regex::Regex;
use std::borrow::Cow;
use std::sync::OnceLock;

/// Rejects empty and whitespace-only strings
pub(crate) fn not_blank(value: &str) -> Result<(), validator::ValidationError> {
    if value.trim().is_empty() {
        return Err(validator::ValidationError::new("blank")
            .with_message(Cow::Borrowed("must not be blank")));
    }
    Ok(())
}

/// Document numbers such as `INV-2024-001` or `MR/17`
pub(crate) fn document_number(value: &str) -> Result<(), validator::ValidationError> {
    static DOCUMENT_NUMBER: OnceLock<Option<Regex>> = OnceLock::new();
    let valid = DOCUMENT_NUMBER
        .get_or_init(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9/_-]{0,39}$").ok())
        .as_ref()
        .is_some_and(|re| re.is_match(value));
    if !valid {
        return Err(validator::ValidationError::new("document_number").with_message(
            Cow::Borrowed("must be 1-40 letters, digits, '-', '/' or '_'"),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_blank() {
        assert!(not_blank("Tower A").is_ok());
        assert!(not_blank("").is_err());
        assert!(not_blank("   ").is_err());
    }

    #[test]
    fn test_document_number() {
        assert!(document_number("INV-2024-001").is_ok());
        assert!(document_number("MR/17").is_ok());
        assert!(document_number("-leading").is_err());
        assert!(document_number("has space").is_err());
        assert!(document_number("").is_err());
    }
}
