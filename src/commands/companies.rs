use std::sync::Arc;

use owo_colors::OwoColorize;
use serde_json::json;

use super::records::{self, Write};
use super::{Backend, CommandOutput, Context};
use crate::cli::{CompanyAction, CompanyFields};
use crate::collection::{Record, RecordId};
use crate::display::{render_detail, render_table};
use crate::entity::{CompanyDetail, CompanyDraft};
use crate::error::Result;
use crate::remote::CompanySource;

impl CompanyFields {
    /// Overwrite the fields that were given on the command line.
    pub fn apply_to(self, draft: &mut CompanyDraft) {
        if let Some(name) = self.name {
            draft.name = name;
        }
        if let Some(email) = self.email {
            draft.email = email;
        }
        for (slot, value) in [
            (&mut draft.phone, self.phone),
            (&mut draft.address1, self.address1),
            (&mut draft.address2, self.address2),
            (&mut draft.city, self.city),
            (&mut draft.province, self.province),
            (&mut draft.zip, self.zip),
            (&mut draft.country, self.country),
        ] {
            if value.is_some() {
                *slot = value;
            }
        }
    }

    pub fn into_draft(self) -> CompanyDraft {
        let mut draft = CompanyDraft::default();
        self.apply_to(&mut draft);
        draft
    }
}

pub async fn cmd_companies(ctx: &Context, action: CompanyAction) -> Result<()> {
    match action {
        CompanyAction::List(args) => match ctx.backend()? {
            Backend::Remote(client) => {
                let source = Arc::new(CompanySource::new(Arc::clone(client)));
                records::list(ctx, source, args.keyword, args.page).await
            }
            Backend::Offline(data) => {
                records::list(ctx, Arc::clone(&data.companies), args.keyword, args.page).await
            }
        },
        CompanyAction::Show { id } => {
            let detail = company_detail(ctx, id).await?;
            let text = render_company_detail(&detail);
            CommandOutput::new(json!(detail))
                .with_text(text)
                .print(ctx.global.json)
        }
        CompanyAction::Create(fields) => submit(ctx, Write::Create(fields.into_draft())).await,
        CompanyAction::Update { id, fields } => {
            let existing = company_detail(ctx, id).await?.company;
            let mut draft = CompanyDraft::from(&existing);
            fields.apply_to(&mut draft);
            submit(ctx, Write::Update(id, draft)).await
        }
        CompanyAction::Delete { id } => {
            let label = company_detail(ctx, id).await?.company.label();
            submit(ctx, Write::Delete { id, label }).await
        }
    }
}

async fn company_detail(ctx: &Context, id: RecordId) -> Result<CompanyDetail> {
    match ctx.backend()? {
        Backend::Remote(client) => {
            let source = CompanySource::new(Arc::clone(client));
            ctx.guarded(source.detail(id).await)
        }
        Backend::Offline(data) => data.company_detail(id),
    }
}

async fn submit(ctx: &Context, op: Write<CompanyDraft>) -> Result<()> {
    match ctx.backend()? {
        Backend::Remote(client) => {
            let source = Arc::new(CompanySource::new(Arc::clone(client)));
            records::write(ctx, source, op).await
        }
        Backend::Offline(data) => records::write(ctx, Arc::clone(&data.companies), op).await,
    }
}

fn render_company_detail(detail: &CompanyDetail) -> String {
    let mut out = render_detail(&detail.company);
    out.push_str(&format!("\n\n{}\n", "Customers".cyan().bold()));
    if detail.customers.is_empty() {
        out.push_str(&"No customers.".dimmed().to_string());
    } else {
        out.push_str(&render_table(&detail.customers));
    }
    out
}
