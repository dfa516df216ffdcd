use crate::output::{format_last_action, print_json, print_table};
use crate::session::{self, Options};
use anyhow::Context;
use serde::Serialize;
use std::path::Path;
use turnover_core::entity::{Entity, NewEntity};
use turnover_core::status::{self, Summary};
use turnover_core::sync::Reconciler;
use turnover_core::types::Status;

/// One field change applied to an existing consultant.
pub enum Edit {
    Name(String),
    Company(String),
    Mailbox(String),
    Active(bool),
    Action,
}

#[derive(Serialize)]
struct Row<'a> {
    position: usize,
    name: &'a str,
    company: &'a str,
    mailbox: Option<&'a str>,
    status: &'static str,
    label: &'static str,
    last_action: Option<i64>,
    active: bool,
    needs_attention: bool,
}

fn row(position: usize, entity: &Entity, now_ms: i64) -> Row<'_> {
    let eval = status::derive_status(entity, now_ms);
    Row {
        position,
        name: &entity.name,
        company: &entity.company,
        mailbox: entity.mailbox.as_deref(),
        status: eval.status.as_str(),
        label: eval.status.label(),
        last_action: entity.last_action,
        active: entity.active,
        needs_attention: eval.needs_attention,
    }
}

fn rows(rec: &Reconciler) -> Vec<Row<'_>> {
    let now = rec.now_ms();
    rec.roster()
        .iter()
        .enumerate()
        .map(|(i, e)| row(i + 1, e, now))
        .collect()
}

fn table_cells(r: &Row<'_>) -> Vec<String> {
    let status = if r.needs_attention {
        format!("{} !", r.label)
    } else {
        r.label.to_string()
    };
    vec![
        r.position.to_string(),
        r.name.to_string(),
        r.company.to_string(),
        r.mailbox.unwrap_or("-").to_string(),
        status,
        format_last_action(r.last_action),
        if r.active { "yes" } else { "no" }.to_string(),
    ]
}

const HEADERS: [&str; 7] = ["#", "NAME", "COMPANY", "MAILBOX", "STATUS", "LAST ACTION", "ACTIVE"];

fn print_one(rec: &Reconciler, index: usize, json: bool) -> anyhow::Result<()> {
    let entity = rec
        .roster()
        .get(index)
        .with_context(|| format!("no consultant at position {}", index + 1))?;
    let r = row(index + 1, entity, rec.now_ms());
    if json {
        print_json(&r)
    } else {
        print_table(&HEADERS, vec![table_cells(&r)]);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// list / summary
// ---------------------------------------------------------------------------

pub async fn list(root: &Path, opts: Options) -> anyhow::Result<()> {
    let session = session::open(root, opts.offline).await?;
    let rows = rows(&session.reconciler);

    if opts.json {
        return print_json(&rows);
    }
    if rows.is_empty() {
        println!("No consultants.");
        return Ok(());
    }
    print_table(&HEADERS, rows.iter().map(table_cells).collect());
    Ok(())
}

pub async fn summary(root: &Path, opts: Options) -> anyhow::Result<()> {
    let session = session::open(root, opts.offline).await?;
    let summary = session.reconciler.summary();

    if opts.json {
        return print_json(&summary);
    }
    print_table(&["STATUS", "COUNT"], summary_rows(&summary));
    println!();
    println!(
        "{} consultant(s), {} needing attention",
        summary.total(),
        summary.needs_attention()
    );
    Ok(())
}

fn summary_rows(s: &Summary) -> Vec<Vec<String>> {
    [
        (Status::Current, s.current),
        (Status::Warning, s.warning),
        (Status::Overdue, s.overdue),
        (Status::Pending, s.pending),
        (Status::Inactive, s.inactive),
    ]
    .into_iter()
    .map(|(st, n)| vec![st.label().to_string(), n.to_string()])
    .collect()
}

// ---------------------------------------------------------------------------
// add / edit / reset
// ---------------------------------------------------------------------------

pub async fn add(
    root: &Path,
    name: String,
    company: String,
    mailbox: Option<String>,
    opts: Options,
) -> anyhow::Result<()> {
    let mut session = session::open(root, opts.offline).await?;
    let rec = &mut session.reconciler;

    let input = NewEntity {
        name,
        company,
        mailbox,
    };
    let index = rec
        .add_entity(&input)
        .with_context(|| format!("failed to add consultant '{}'", input.name.trim()))?;
    rec.flush().await;

    if !opts.json {
        println!("Added consultant #{}", index + 1);
    }
    print_one(rec, index, opts.json)
}

pub async fn edit(root: &Path, position: usize, edit: Edit, opts: Options) -> anyhow::Result<()> {
    let index = session::index_of(position)?;
    let mut session = session::open(root, opts.offline).await?;
    let rec = &mut session.reconciler;

    let applied = match edit {
        Edit::Name(name) => rec.rename(index, &name),
        Edit::Company(company) => rec.set_company(index, &company),
        Edit::Mailbox(mailbox) => rec.set_mailbox(index, &mailbox),
        Edit::Active(active) => rec.set_active(index, active),
        Edit::Action => rec.record_action(index),
    };
    applied.with_context(|| format!("failed to update consultant #{position}"))?;
    rec.flush().await;

    print_one(rec, index, opts.json)
}

pub async fn reset(root: &Path, opts: Options) -> anyhow::Result<()> {
    let mut session = session::open(root, opts.offline).await?;
    let rec = &mut session.reconciler;
    rec.reset();
    rec.flush().await;

    if opts.json {
        return print_json(&rows(rec));
    }
    println!("Roster reset to {} consultant(s).", rec.roster().len());
    Ok(())
}
