//! Record commands: create, list, view, sign, delete

use super::Context;
use crate::error::{CliError, CliResult};
use crate::output::{
    print_error, print_info, print_output, print_single, print_success, print_warning,
    OutputFormat, RecordRow,
};
use clap::Args;
use consent_document::{
    project, InteractiveRenderer, InteractiveView, ListView, Renderer, SignatureView,
};
use consent_store::{ActiveView, StoreError, ViewSelector};
use consent_types::{
    find_template, ConsentRecord, NewConsentRecord, Party, PartySlot, RecordId, SafetyMeasure,
};
use std::io::IsTerminal;

#[derive(Debug, Default, Args)]
pub struct CreateArgs {
    /// Agreement title (defaults to 同意协议 - today)
    #[arg(long)]
    pub title: Option<String>,

    /// Agreement date (defaults to today, YYYY-MM-DD)
    #[arg(long)]
    pub date: Option<String>,

    /// Start from a built-in template (basic, detailed, long-term)
    #[arg(short, long)]
    pub template: Option<String>,

    #[arg(long)]
    pub party_a_name: Option<String>,

    #[arg(long)]
    pub party_a_id: Option<String>,

    #[arg(long)]
    pub party_b_name: Option<String>,

    #[arg(long)]
    pub party_b_id: Option<String>,

    /// Consent details; overrides the template
    #[arg(long)]
    pub details: Option<String>,

    /// Safety measure, repeatable (contraception, sti-testing, safe-words,
    /// no-recording, other); overrides the template
    #[arg(long = "safety")]
    pub safety: Vec<SafetyMeasure>,

    #[arg(long)]
    pub privacy: Option<String>,

    #[arg(long)]
    pub revocation: Option<String>,

    #[arg(long)]
    pub additional: Option<String>,

    /// Never prompt for missing fields
    #[arg(long)]
    pub no_input: bool,
}

fn ask(value: Option<String>, prompt: &str, interactive: bool) -> CliResult<String> {
    match value {
        Some(value) => Ok(value),
        None if interactive => dialoguer::Input::<String>::new()
            .with_prompt(prompt)
            .interact_text()
            .map_err(|e| CliError::InvalidInput(e.to_string())),
        None => Ok(String::new()),
    }
}

/// Assemble the draft from template, flags and prompts, in that order.
pub fn build_draft(ctx: &Context, args: CreateArgs, interactive: bool) -> CliResult<NewConsentRecord> {
    let mut draft = NewConsentRecord::default();
    if let Some(id) = &args.template {
        let template = find_template(id)
            .ok_or_else(|| CliError::InvalidInput(format!("unknown template: {}", id)))?;
        draft.apply_template(template);
    }

    draft.title = args.title.unwrap_or_default();
    draft.date = args.date.unwrap_or_default();
    draft.party_a = Party::new(
        ask(args.party_a_name, "参与方1 姓名", interactive)?,
        ask(args.party_a_id, "参与方1 身份证号", interactive)?,
    );
    draft.party_b = Party::new(
        ask(args.party_b_name, "参与方2 姓名", interactive)?,
        ask(args.party_b_id, "参与方2 身份证号", interactive)?,
    );
    if let Some(details) = args.details {
        draft.consent_details = details;
    }
    if !args.safety.is_empty() {
        draft.safety_measures = args.safety;
    }
    if let Some(privacy) = args.privacy {
        draft.privacy_terms = privacy;
    }
    if let Some(revocation) = args.revocation {
        draft.revocation_terms = revocation;
    }
    draft.additional_terms = args.additional;

    let today = ctx
        .store
        .clock()
        .now()
        .with_timezone(&ctx.display.offset)
        .date_naive();
    Ok(draft.with_defaults(today))
}

pub fn create(ctx: &Context, args: CreateArgs, format: OutputFormat) -> CliResult<()> {
    let interactive = !args.no_input && std::io::stdin().is_terminal();
    let draft = build_draft(ctx, args, interactive)?;
    let record = match ctx.store.create(draft) {
        Ok(record) => record,
        Err(StoreError::Validation(fields)) => {
            for field in &fields {
                print_error(&field.to_string());
            }
            return Err(StoreError::Validation(fields).into());
        }
        Err(err) => return Err(err.into()),
    };

    match format {
        OutputFormat::Table => {
            print_success(&format!("Created agreement: {}", record.id));
            println!("  {}", record.title);
        }
        _ => print_single(&record, format)?,
    }
    Ok(())
}

pub fn list(ctx: &Context, format: OutputFormat) -> CliResult<()> {
    let records = ctx.store.list()?;
    let list = InteractiveRenderer::new(ctx.display).list(&records);
    match format {
        OutputFormat::Table => {
            let rows: Vec<RecordRow> = list.rows.into_iter().map(RecordRow::from).collect();
            print_output(rows, format, ListView::EMPTY_STATE)
        }
        _ => print_single(&list.rows, format),
    }
}

fn render(ctx: &Context, record: &ConsentRecord) -> CliResult<InteractiveView> {
    let tree = project(record, &SignatureView::of(record), &ctx.display);
    Ok(InteractiveRenderer::new(ctx.display).render(&tree)?)
}

fn show(ctx: &Context, record: &ConsentRecord, format: OutputFormat) -> CliResult<()> {
    let view = render(ctx, record)?;
    match format {
        OutputFormat::Table => print!("{}", view.render_ansi()),
        _ => print_single(&view, format)?,
    }
    Ok(())
}

pub fn view(ctx: &Context, id: &str, format: OutputFormat) -> CliResult<()> {
    let selector = ViewSelector::record(ctx.resolve(id)?);
    let mut active = ActiveView::new();
    if !active.open(&ctx.store, &selector)? {
        print_warning(&format!("协议不存在: {}", id));
        return list(ctx, format);
    }
    match active.current() {
        Some(record) => show(ctx, record, format),
        None => list(ctx, format),
    }
}

pub fn sign(
    ctx: &Context,
    id: &str,
    party: PartySlot,
    yes: bool,
    format: OutputFormat,
) -> CliResult<()> {
    let id = ctx.resolve(id)?;
    let mut active = ActiveView::new();
    if !active.open(&ctx.store, &ViewSelector::record(id.clone()))? {
        return Err(StoreError::NotFound(id).into());
    }
    let Some(record) = active.current() else {
        return Err(StoreError::NoSelection.into());
    };

    let name = record.party(party).name.clone();
    if let Some(at) = record.signature(party).signed_at() {
        print_info(&format!(
            "{} 已于 {} 签署",
            name,
            ctx.display.format_instant(at)
        ));
        return Ok(());
    }

    if !yes {
        let confirm = dialoguer::Confirm::new()
            .with_prompt(format!("{} ({}) 签署《{}》?", name, party.label(), record.title))
            .default(false)
            .interact()
            .unwrap_or(false);

        if !confirm {
            print_error("Aborted");
            return Ok(());
        }
    }

    let outcome = active.sign(&ctx.machine, party)?;
    if outcome.changed {
        print_success(&format!("{} 已签署", name));
    }
    show(ctx, &outcome.record, format)
}

pub fn delete(ctx: &Context, id: &str, yes: bool) -> CliResult<()> {
    let id: RecordId = ctx.resolve(id)?;
    let record = ctx.store.get(&id)?;

    if !yes {
        let confirm = dialoguer::Confirm::new()
            .with_prompt(format!("Delete agreement 《{}》? This cannot be undone.", record.title))
            .default(false)
            .interact()
            .unwrap_or(false);

        if !confirm {
            print_error("Aborted");
            return Ok(());
        }
    }

    ctx.store.delete(&id)?;
    print_success(&format!("Deleted agreement: {}", id));
    Ok(())
}
