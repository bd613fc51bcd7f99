use serde::{Deserialize, Serialize};

use crate::collection::{EntityNames, MemoryRecord, Record, RecordId};
use crate::display::{Column, Tabular};
use crate::error::{AtriumError, Result};
use crate::utils::validation::{non_blank, require, validate_optional};

use super::Company;

/// The company a customer belongs to, as listed alongside the customer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanySummary {
    pub id: RecordId,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub id: RecordId,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub shopify_id: Option<String>,
    pub company: Option<CompanySummary>,
}

impl Customer {
    /// Full name, else first and last name, else the id.
    pub fn display_name(&self) -> String {
        if let Some(full) = non_blank(self.full_name.as_deref()) {
            return full;
        }
        let parts: Vec<&str> = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .collect();
        if parts.is_empty() {
            format!("customer #{}", self.id)
        } else {
            parts.join(" ")
        }
    }
}

impl Record for Customer {
    const NAMES: EntityNames = EntityNames {
        singular: "customer",
        plural: "customers",
    };

    fn id(&self) -> RecordId {
        self.id
    }

    fn label(&self) -> String {
        self.display_name()
    }
}

impl Tabular for Customer {
    fn columns() -> Vec<Column<Self>> {
        vec![
            Column::new("ID", |c| Some(c.id.to_string())),
            Column::new("Full name", |c| c.full_name.clone()),
            Column::new("First name", |c| c.first_name.clone()),
            Column::new("Last name", |c| c.last_name.clone()),
            Column::new("Phone", |c| c.phone.clone()),
            Column::new("Shopify ID", |c| c.shopify_id.clone()),
            Column::new("Company", |c| c.company.as_ref().map(|co| co.name.clone())),
        ]
    }

    fn details() -> Vec<Column<Self>> {
        vec![
            Column::new("ID", |c| Some(c.id.to_string())),
            Column::new("Full name", |c| c.full_name.clone()),
            Column::new("First name", |c| c.first_name.clone()),
            Column::new("Last name", |c| c.last_name.clone()),
            Column::new("Email", |c| c.email.clone()),
            Column::new("Phone", |c| c.phone.clone()),
            Column::new("Shopify ID", |c| c.shopify_id.clone()),
            Column::new("Company", |c| c.company.as_ref().map(|co| co.name.clone())),
        ]
    }
}

/// A customer together with its full company record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomerDetail {
    pub customer: Customer,
    pub company: Option<Company>,
}

/// Payload for creating or updating a customer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustomerDraft {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub shopify_id: Option<String>,
    pub company_id: Option<RecordId>,
}

impl CustomerDraft {
    /// Check required fields in form order, then the optional ones.
    pub fn validate(&self) -> Result<()> {
        require("First name", &self.first_name)?;
        require("Last name", &self.last_name)?;
        if self.company_id.is_none() {
            return Err(AtriumError::Validation("Company is required.".to_string()));
        }
        require("Email", &self.email)?;
        validate_optional("Full name", self.full_name.as_deref())?;
        validate_optional("Phone", self.phone.as_deref())?;
        validate_optional("Shopify ID", self.shopify_id.as_deref())?;
        Ok(())
    }

    /// Full name as sent: the explicit one, or first and last joined.
    pub fn resolved_full_name(&self) -> String {
        non_blank(self.full_name.as_deref()).unwrap_or_else(|| {
            format!("{} {}", self.first_name.trim(), self.last_name.trim())
        })
    }
}

impl From<&Customer> for CustomerDraft {
    fn from(customer: &Customer) -> Self {
        Self {
            first_name: customer.first_name.clone().unwrap_or_default(),
            last_name: customer.last_name.clone().unwrap_or_default(),
            email: customer.email.clone().unwrap_or_default(),
            full_name: customer.full_name.clone(),
            phone: customer.phone.clone(),
            shopify_id: customer.shopify_id.clone(),
            company_id: customer.company.as_ref().map(|c| c.id),
        }
    }
}

impl MemoryRecord for Customer {
    type Draft = CustomerDraft;

    fn search_text(&self) -> String {
        [
            Some(self.display_name()),
            self.email.clone(),
            self.phone.clone(),
            self.company.as_ref().map(|c| c.name.clone()),
        ]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(" ")
    }

    fn from_draft(id: RecordId, draft: &CustomerDraft) -> Result<Self> {
        draft.validate()?;
        Ok(Customer {
            id,
            first_name: Some(draft.first_name.trim().to_string()),
            last_name: Some(draft.last_name.trim().to_string()),
            full_name: Some(draft.resolved_full_name()),
            email: Some(draft.email.trim().to_string()),
            phone: non_blank(draft.phone.as_deref()),
            shopify_id: non_blank(draft.shopify_id.as_deref()),
            company: draft.company_id.map(|id| CompanySummary {
                id,
                name: String::new(),
            }),
        })
    }
}
