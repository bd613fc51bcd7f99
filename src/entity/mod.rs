//! The record types behind the customer and company screens.

mod company;
mod customer;
pub mod seed;

pub use company::{Company, CompanyDetail, CompanyDraft};
pub use customer::{CompanySummary, Customer, CustomerDetail, CustomerDraft};
