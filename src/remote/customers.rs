use std::sync::Arc;

use async_trait::async_trait;

use crate::collection::{CollectionResult, CollectionSource, RecordId};
use crate::entity::{Customer, CustomerDetail, CustomerDraft};
use crate::error::{AtriumError, Result};
use crate::view::QueryParameters;

use super::GraphQlClient;
use super::graphql::*;

/// Customers collection backed by the GraphQL API.
pub struct CustomerSource {
    client: Arc<GraphQlClient>,
}

impl CustomerSource {
    pub fn new(client: Arc<GraphQlClient>) -> Self {
        Self { client }
    }

    /// One customer with its full company.
    pub async fn detail(&self, id: RecordId) -> Result<CustomerDetail> {
        let operation = CustomerQuery::build(IdVariables { id: id.0 });
        let response = self.client.execute(operation).await?;
        response
            .customer
            .map(CustomerDetail::from)
            .ok_or_else(|| AtriumError::NotFound(format!("customer {id}")))
    }
}

/// Page variables for a fetch; the keyword is omitted when empty.
pub(super) fn page_variables(params: &QueryParameters) -> Result<PageVariables> {
    let limit = i32::try_from(params.limit)
        .map_err(|_| AtriumError::Validation(format!("page size {} too large", params.limit)))?;
    let offset = i32::try_from(params.offset)
        .map_err(|_| AtriumError::Validation(format!("offset {} too large", params.offset)))?;
    Ok(PageVariables {
        limit: Some(limit),
        offset: Some(offset),
        keyword: params.keyword_filter().map(str::to_string),
    })
}

/// Totals are never negative; clamp anything odd the API sends to zero.
pub(super) fn total(count: i32) -> u64 {
    u64::try_from(count).unwrap_or(0)
}

#[async_trait]
impl CollectionSource for CustomerSource {
    type Record = Customer;
    type Draft = CustomerDraft;

    async fn fetch(&self, params: &QueryParameters) -> Result<CollectionResult<Customer>> {
        let operation = CustomersQuery::build(page_variables(params)?);
        let response = self.client.execute(operation).await?;
        let page = response.customers;
        Ok(CollectionResult::new(
            page.items.into_iter().map(Customer::from).collect(),
            total(page.total_count),
        ))
    }

    async fn create(&self, draft: CustomerDraft) -> Result<Customer> {
        draft.validate()?;
        let operation = CreateCustomer::build(CreateCustomerVariables {
            input: CustomerInput::from(&draft),
        });
        let response = self.client.execute(operation).await?;
        Ok(response.create_customer.into())
    }

    async fn update(&self, id: RecordId, draft: CustomerDraft) -> Result<Customer> {
        draft.validate()?;
        let operation = UpdateCustomer::build(UpdateCustomerVariables {
            id: id.0,
            input: CustomerInput::from(&draft),
        });
        let response = self.client.execute(operation).await?;
        Ok(response.update_customer.into())
    }

    async fn delete(&self, id: RecordId) -> Result<Customer> {
        let operation = DeleteCustomer::build(IdVariables { id: id.0 });
        let response = self.client.execute(operation).await?;
        Ok(response.delete_customer.into())
    }
}
