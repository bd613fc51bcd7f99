//! Type-safe cynic operations against the bundled ERP schema.
//!
//! The API keeps snake_case names for the person fields (`first_name`) and
//! camelCase for the rest (`shopifyId`, `totalCount`), so the snake_case
//! fields carry explicit renames.

pub use cynic::{GraphQlResponse, MutationBuilder, QueryBuilder};

// Import schema from the dedicated atrium-schema crate.
// The import MUST be named `schema` for cynic derives to work.
use atrium_schema::erp as schema;

use serde::Deserialize;

use crate::collection::RecordId;
use crate::entity::{
    Company, CompanyDetail, CompanyDraft, CompanySummary, Customer, CustomerDetail,
    CustomerDraft,
};

/// Error extensions the API attaches to GraphQL errors.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ErrorExtensions {
    pub code: Option<String>,
}

// Query Variables

#[derive(cynic::QueryVariables, Debug)]
pub struct PageVariables {
    pub limit: Option<i32>,
    pub offset: Option<i32>,
    pub keyword: Option<String>,
}

#[derive(cynic::QueryVariables, Debug)]
pub struct IdVariables {
    pub id: i32,
}

#[derive(cynic::QueryVariables, Debug)]
pub struct CreateCustomerVariables {
    pub input: CustomerInput,
}

#[derive(cynic::QueryVariables, Debug)]
pub struct UpdateCustomerVariables {
    pub id: i32,
    pub input: CustomerInput,
}

#[derive(cynic::QueryVariables, Debug)]
pub struct CreateCompanyVariables {
    pub input: CompanyInput,
}

#[derive(cynic::QueryVariables, Debug)]
pub struct UpdateCompanyVariables {
    pub id: i32,
    pub input: CompanyInput,
}

// Input Objects

#[derive(cynic::InputObject, Debug, Clone)]
pub struct CustomerInput {
    #[cynic(rename = "first_name")]
    pub first_name: String,
    #[cynic(rename = "last_name")]
    pub last_name: String,
    #[cynic(rename = "full_name")]
    pub full_name: Option<String>,
    pub email: String,
    pub phone: Option<String>,
    #[cynic(rename = "shopifyId")]
    pub shopify_id: Option<String>,
    #[cynic(rename = "companyId")]
    pub company_id: Option<i32>,
}

impl From<&CustomerDraft> for CustomerInput {
    fn from(draft: &CustomerDraft) -> Self {
        Self {
            first_name: draft.first_name.trim().to_string(),
            last_name: draft.last_name.trim().to_string(),
            full_name: Some(draft.resolved_full_name()),
            email: draft.email.trim().to_string(),
            phone: draft.phone.clone(),
            shopify_id: draft.shopify_id.clone(),
            company_id: draft.company_id.map(|id| id.0),
        }
    }
}

#[derive(cynic::InputObject, Debug, Clone)]
pub struct CompanyInput {
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

impl From<&CompanyDraft> for CompanyInput {
    fn from(draft: &CompanyDraft) -> Self {
        Self {
            name: draft.name.trim().to_string(),
            email: draft.email.trim().to_string(),
            phone: draft.phone.clone(),
            address1: draft.address1.clone(),
            address2: draft.address2.clone(),
            city: draft.city.clone(),
            province: draft.province.clone(),
            zip: draft.zip.clone(),
            country: draft.country.clone(),
        }
    }
}

// Fragments

#[derive(cynic::QueryFragment, Debug, Clone)]
#[cynic(graphql_type = "Company")]
pub struct CompanyRef {
    pub id: i32,
    pub name: String,
}

#[derive(cynic::QueryFragment, Debug, Clone)]
#[cynic(graphql_type = "Customer")]
pub struct CustomerNode {
    pub id: i32,
    #[cynic(rename = "first_name")]
    pub first_name: Option<String>,
    #[cynic(rename = "last_name")]
    pub last_name: Option<String>,
    #[cynic(rename = "full_name")]
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    #[cynic(rename = "shopifyId")]
    pub shopify_id: Option<String>,
    pub company: Option<CompanyRef>,
}

impl From<CustomerNode> for Customer {
    fn from(node: CustomerNode) -> Self {
        Customer {
            id: RecordId(node.id),
            first_name: node.first_name,
            last_name: node.last_name,
            full_name: node.full_name,
            email: node.email,
            phone: node.phone,
            shopify_id: node.shopify_id,
            company: node.company.map(|c| CompanySummary {
                id: RecordId(c.id),
                name: c.name,
            }),
        }
    }
}

#[derive(cynic::QueryFragment, Debug, Clone)]
#[cynic(graphql_type = "Company")]
pub struct CompanyNode {
    pub id: i32,
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

impl From<CompanyNode> for Company {
    fn from(node: CompanyNode) -> Self {
        Company {
            id: RecordId(node.id),
            name: node.name,
            email: node.email,
            phone: node.phone,
            address1: node.address1,
            address2: node.address2,
            city: node.city,
            province: node.province,
            zip: node.zip,
            country: node.country,
        }
    }
}

#[derive(cynic::QueryFragment, Debug)]
pub struct CustomerPage {
    pub items: Vec<CustomerNode>,
    pub total_count: i32,
}

#[derive(cynic::QueryFragment, Debug)]
pub struct CompanyPage {
    pub items: Vec<CompanyNode>,
    pub total_count: i32,
}

/// A customer with its full company, for the detail view.
#[derive(cynic::QueryFragment, Debug)]
#[cynic(graphql_type = "Customer")]
pub struct CustomerWithCompany {
    pub id: i32,
    #[cynic(rename = "first_name")]
    pub first_name: Option<String>,
    #[cynic(rename = "last_name")]
    pub last_name: Option<String>,
    #[cynic(rename = "full_name")]
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    #[cynic(rename = "shopifyId")]
    pub shopify_id: Option<String>,
    pub company: Option<CompanyNode>,
}

impl From<CustomerWithCompany> for CustomerDetail {
    fn from(node: CustomerWithCompany) -> Self {
        let company: Option<Company> = node.company.map(Company::from);
        CustomerDetail {
            customer: Customer {
                id: RecordId(node.id),
                first_name: node.first_name,
                last_name: node.last_name,
                full_name: node.full_name,
                email: node.email,
                phone: node.phone,
                shopify_id: node.shopify_id,
                company: company.as_ref().map(|c| CompanySummary {
                    id: c.id,
                    name: c.name.clone(),
                }),
            },
            company,
        }
    }
}

/// A company with the customers that belong to it.
#[derive(cynic::QueryFragment, Debug)]
#[cynic(graphql_type = "Company")]
pub struct CompanyWithCustomers {
    pub id: i32,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address1: Option<String>,
    pub address2: Option<String>,
    pub city: Option<String>,
    pub province: Option<String>,
    pub zip: Option<String>,
    pub country: Option<String>,
    pub customers: Vec<CustomerNode>,
}

impl From<CompanyWithCustomers> for CompanyDetail {
    fn from(node: CompanyWithCustomers) -> Self {
        CompanyDetail {
            company: Company {
                id: RecordId(node.id),
                name: node.name,
                email: node.email,
                phone: node.phone,
                address1: node.address1,
                address2: node.address2,
                city: node.city,
                province: node.province,
                zip: node.zip,
                country: node.country,
            },
            customers: node.customers.into_iter().map(Customer::from).collect(),
        }
    }
}

// Queries

#[derive(cynic::QueryFragment, Debug)]
#[cynic(graphql_type = "Query", variables = "PageVariables")]
pub struct CustomersQuery {
    #[arguments(limit: $limit, offset: $offset, keyword: $keyword)]
    pub customers: CustomerPage,
}

#[derive(cynic::QueryFragment, Debug)]
#[cynic(graphql_type = "Query", variables = "IdVariables")]
pub struct CustomerQuery {
    #[arguments(id: $id)]
    pub customer: Option<CustomerWithCompany>,
}

#[derive(cynic::QueryFragment, Debug)]
#[cynic(graphql_type = "Query", variables = "PageVariables")]
pub struct CompaniesQuery {
    #[arguments(limit: $limit, offset: $offset, keyword: $keyword)]
    pub companies: CompanyPage,
}

#[derive(cynic::QueryFragment, Debug)]
#[cynic(graphql_type = "Query", variables = "IdVariables")]
pub struct CompanyQuery {
    #[arguments(id: $id)]
    pub company: Option<CompanyWithCustomers>,
}

// Mutations

#[derive(cynic::QueryFragment, Debug)]
#[cynic(graphql_type = "Mutation", variables = "CreateCustomerVariables")]
pub struct CreateCustomer {
    #[arguments(input: $input)]
    pub create_customer: CustomerNode,
}

#[derive(cynic::QueryFragment, Debug)]
#[cynic(graphql_type = "Mutation", variables = "UpdateCustomerVariables")]
pub struct UpdateCustomer {
    #[arguments(id: $id, input: $input)]
    pub update_customer: CustomerNode,
}

#[derive(cynic::QueryFragment, Debug)]
#[cynic(graphql_type = "Mutation", variables = "IdVariables")]
pub struct DeleteCustomer {
    #[arguments(id: $id)]
    pub delete_customer: CustomerNode,
}

#[derive(cynic::QueryFragment, Debug)]
#[cynic(graphql_type = "Mutation", variables = "CreateCompanyVariables")]
pub struct CreateCompany {
    #[arguments(input: $input)]
    pub create_company: CompanyNode,
}

#[derive(cynic::QueryFragment, Debug)]
#[cynic(graphql_type = "Mutation", variables = "UpdateCompanyVariables")]
pub struct UpdateCompany {
    #[arguments(id: $id, input: $input)]
    pub update_company: CompanyNode,
}

#[derive(cynic::QueryFragment, Debug)]
#[cynic(graphql_type = "Mutation", variables = "IdVariables")]
pub struct DeleteCompany {
    #[arguments(id: $id)]
    pub delete_company: CompanyNode,
}
