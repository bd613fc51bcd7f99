use serde::{Deserialize, Serialize};

use crate::collection::{EntityNames, MemoryRecord, Record, RecordId};
use crate::display::{Column, Tabular};
use crate::error::Result;
use crate::utils::validation::{non_blank, require, validate_optional};

use super::Customer;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Company {
    pub id: RecordId,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address1: Option<String>,
    pub address2: Option<String>,
    pub city: Option<String>,
    pub province: Option<String>,
    pub zip: Option<String>,
    pub country: Option<String>,
}

impl Record for Company {
    const NAMES: EntityNames = EntityNames {
        singular: "company",
        plural: "companies",
    };

    fn id(&self) -> RecordId {
        self.id
    }

    fn label(&self) -> String {
        if self.name.trim().is_empty() {
            format!("company #{}", self.id)
        } else {
            self.name.clone()
        }
    }
}

impl Tabular for Company {
    fn columns() -> Vec<Column<Self>> {
        vec![
            Column::new("ID", |c| Some(c.id.to_string())),
            Column::new("Name", |c| Some(c.name.clone())),
            Column::new("Email", |c| c.email.clone()),
            Column::new("Phone", |c| c.phone.clone()),
            Column::new("Address1", |c| c.address1.clone()),
            Column::new("Address2", |c| c.address2.clone()),
            Column::new("City", |c| c.city.clone()),
            Column::new("Province", |c| c.province.clone()),
            Column::new("Zip", |c| c.zip.clone()),
            Column::new("Country", |c| c.country.clone()),
        ]
    }
}

/// A company together with the customers that belong to it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompanyDetail {
    pub company: Company,
    pub customers: Vec<Customer>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompanyDraft {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub address1: Option<String>,
    pub address2: Option<String>,
    pub city: Option<String>,
    pub province: Option<String>,
    pub zip: Option<String>,
    pub country: Option<String>,
}

impl CompanyDraft {
    pub fn validate(&self) -> Result<()> {
        require("Name", &self.name)?;
        require("Email", &self.email)?;
        for (label, value) in [
            ("Phone", &self.phone),
            ("Address1", &self.address1),
            ("Address2", &self.address2),
            ("City", &self.city),
            ("Province", &self.province),
            ("Zip", &self.zip),
            ("Country", &self.country),
        ] {
            validate_optional(label, value.as_deref())?;
        }
        Ok(())
    }
}

impl From<&Company> for CompanyDraft {
    fn from(company: &Company) -> Self {
        Self {
            name: company.name.clone(),
            email: company.email.clone().unwrap_or_default(),
            phone: company.phone.clone(),
            address1: company.address1.clone(),
            address2: company.address2.clone(),
            city: company.city.clone(),
            province: company.province.clone(),
            zip: company.zip.clone(),
            country: company.country.clone(),
        }
    }
}

impl MemoryRecord for Company {
    type Draft = CompanyDraft;

    fn search_text(&self) -> String {
        [
            Some(self.name.clone()),
            self.email.clone(),
            self.phone.clone(),
            self.city.clone(),
            self.country.clone(),
        ]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(" ")
    }

    fn from_draft(id: RecordId, draft: &CompanyDraft) -> Result<Self> {
        draft.validate()?;
        Ok(Company {
            id,
            name: draft.name.trim().to_string(),
            email: non_blank(Some(&draft.email)),
            phone: non_blank(draft.phone.as_deref()),
            address1: non_blank(draft.address1.as_deref()),
            address2: non_blank(draft.address2.as_deref()),
            city: non_blank(draft.city.as_deref()),
            province: non_blank(draft.province.as_deref()),
            zip: non_blank(draft.zip.as_deref()),
            country: non_blank(draft.country.as_deref()),
        })
    }
}
