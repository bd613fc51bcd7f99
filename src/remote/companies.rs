use std::sync::Arc;

use async_trait::async_trait;

use crate::collection::{CollectionResult, CollectionSource, RecordId};
use crate::entity::{Company, CompanyDetail, CompanyDraft};
use crate::error::{AtriumError, Result};
use crate::view::QueryParameters;

use super::GraphQlClient;
use super::customers::{page_variables, total};
use super::graphql::*;

/// Companies collection backed by the GraphQL API.
pub struct CompanySource {
    client: Arc<GraphQlClient>,
}

impl CompanySource {
    pub fn new(client: Arc<GraphQlClient>) -> Self {
        Self { client }
    }

    /// One company with its customers.
    pub async fn detail(&self, id: RecordId) -> Result<CompanyDetail> {
        let operation = CompanyQuery::build(IdVariables { id: id.0 });
        let response = self.client.execute(operation).await?;
        response
            .company
            .map(CompanyDetail::from)
            .ok_or_else(|| AtriumError::NotFound(format!("company {id}")))
    }
}

#[async_trait]
impl CollectionSource for CompanySource {
    type Record = Company;
    type Draft = CompanyDraft;

    async fn fetch(&self, params: &QueryParameters) -> Result<CollectionResult<Company>> {
        let operation = CompaniesQuery::build(page_variables(params)?);
        let response = self.client.execute(operation).await?;
        let page = response.companies;
        Ok(CollectionResult::new(
            page.items.into_iter().map(Company::from).collect(),
            total(page.total_count),
        ))
    }

    async fn create(&self, draft: CompanyDraft) -> Result<Company> {
        draft.validate()?;
        let operation = CreateCompany::build(CreateCompanyVariables {
            input: CompanyInput::from(&draft),
        });
        let response = self.client.execute(operation).await?;
        Ok(response.create_company.into())
    }

    async fn update(&self, id: RecordId, draft: CompanyDraft) -> Result<Company> {
        draft.validate()?;
        let operation = UpdateCompany::build(UpdateCompanyVariables {
            id: id.0,
            input: CompanyInput::from(&draft),
        });
        let response = self.client.execute(operation).await?;
        Ok(response.update_company.into())
    }

    async fn delete(&self, id: RecordId) -> Result<Company> {
        let operation = DeleteCompany::build(IdVariables { id: id.0 });
        let response = self.client.execute(operation).await?;
        Ok(response.delete_company.into())
    }
}
