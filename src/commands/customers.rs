use std::sync::Arc;

use owo_colors::OwoColorize;
use serde_json::json;

use super::records::{self, Write};
use super::{Backend, CommandOutput, Context};
use crate::cli::{CustomerAction, CustomerFields};
use crate::collection::{Record, RecordId};
use crate::display::{render_detail, render_table};
use crate::entity::{CustomerDetail, CustomerDraft};
use crate::error::Result;
use crate::remote::CustomerSource;

impl CustomerFields {
    /// Overwrite the fields that were given on the command line.
    pub fn apply_to(self, draft: &mut CustomerDraft) {
        if let Some(first_name) = self.first_name {
            draft.first_name = first_name;
        }
        if let Some(last_name) = self.last_name {
            draft.last_name = last_name;
        }
        if let Some(email) = self.email {
            draft.email = email;
        }
        if self.full_name.is_some() {
            draft.full_name = self.full_name;
        }
        if self.phone.is_some() {
            draft.phone = self.phone;
        }
        if self.shopify_id.is_some() {
            draft.shopify_id = self.shopify_id;
        }
        if self.company_id.is_some() {
            draft.company_id = self.company_id;
        }
    }

    pub fn into_draft(self) -> CustomerDraft {
        let mut draft = CustomerDraft::default();
        self.apply_to(&mut draft);
        draft
    }
}

pub async fn cmd_customers(ctx: &Context, action: CustomerAction) -> Result<()> {
    match action {
        CustomerAction::List(args) => match ctx.backend()? {
            Backend::Remote(client) => {
                let source = Arc::new(CustomerSource::new(Arc::clone(client)));
                records::list(ctx, source, args.keyword, args.page).await
            }
            Backend::Offline(data) => {
                records::list(ctx, Arc::clone(&data.customers), args.keyword, args.page).await
            }
        },
        CustomerAction::Show { id } => {
            let detail = customer_detail(ctx, id).await?;
            let text = render_customer_detail(&detail);
            CommandOutput::new(json!(detail))
                .with_text(text)
                .print(ctx.global.json)
        }
        CustomerAction::Create(fields) => submit(ctx, Write::Create(fields.into_draft())).await,
        CustomerAction::Update { id, fields } => {
            let existing = customer_detail(ctx, id).await?.customer;
            let mut draft = CustomerDraft::from(&existing);
            fields.apply_to(&mut draft);
            submit(ctx, Write::Update(id, draft)).await
        }
        CustomerAction::Delete { id } => {
            let label = customer_detail(ctx, id).await?.customer.label();
            submit(ctx, Write::Delete { id, label }).await
        }
    }
}

async fn customer_detail(ctx: &Context, id: RecordId) -> Result<CustomerDetail> {
    match ctx.backend()? {
        Backend::Remote(client) => {
            let source = CustomerSource::new(Arc::clone(client));
            ctx.guarded(source.detail(id).await)
        }
        Backend::Offline(data) => data.customer_detail(id),
    }
}

async fn submit(ctx: &Context, op: Write<CustomerDraft>) -> Result<()> {
    match ctx.backend()? {
        Backend::Remote(client) => {
            let source = Arc::new(CustomerSource::new(Arc::clone(client)));
            records::write(ctx, source, op).await
        }
        Backend::Offline(data) => records::write(ctx, Arc::clone(&data.customers), op).await,
    }
}

fn render_customer_detail(detail: &CustomerDetail) -> String {
    let mut out = render_detail(&detail.customer);
    if let Some(company) = &detail.company {
        out.push_str(&format!("\n\n{}\n", "Company".cyan().bold()));
        out.push_str(&render_table(std::slice::from_ref(company)));
    }
    out
}
