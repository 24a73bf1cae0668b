//! # CLI Commands
//!
//! One public `cmd_*` function per subcommand. Each prints its result
//! (plain text, or JSON with `json = true`) and also returns it so the
//! commands can be driven from tests without the binary.

use crate::config::SyncConfig;
use crate::error::{AppError, Result};
use crate::input::{load_items, load_points, load_responses, load_survey};
use crate::sync::{Account, AccountStore, DsuClient, SyncAdapter, SyncReport};
use ohmage_core::{Fragment, ItemId, RedbBuffer, Responses, StreamBuffer, StreamId, StreamRecord};
use serde_json::json;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::info;

fn print_json(value: &impl serde::Serialize) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Parse `namespace:name:version`.
pub fn parse_stream_id(text: &str) -> Result<StreamId> {
    let mut parts = text.split(':');
    match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(namespace), Some(name), Some(version), None)
            if !namespace.is_empty() && !name.is_empty() && !version.is_empty() =>
        {
            Ok(StreamId::new(namespace, name, version))
        }
        _ => Err(AppError::InvalidInput(format!(
            "stream must be namespace:name:version, got '{}'",
            text
        ))),
    }
}

// =============================================================================
// CONDITION
// =============================================================================

/// Parse a condition and, with `items`, validate it against item definitions.
pub fn cmd_check(condition: &str, items: Option<&Path>, json: bool) -> Result<Fragment> {
    let fragment = Fragment::parse(condition)?;
    if let Some(path) = items {
        fragment.validate(&load_items(path)?)?;
    }

    let referenced: Vec<&str> = fragment
        .referenced_items()
        .into_iter()
        .map(ItemId::as_str)
        .collect();
    if json {
        print_json(&json!({
            "condition": fragment.to_string(),
            "items": referenced,
            "validated": items.is_some(),
        }))?;
    } else {
        println!("OK: {}", fragment);
        if !referenced.is_empty() {
            println!("items: {}", referenced.join(", "));
        }
    }
    Ok(fragment)
}

/// Evaluate a condition against a responses file.
pub fn cmd_eval(condition: &str, responses: &Path, json: bool) -> Result<bool> {
    let fragment = Fragment::parse(condition)?;
    let responses = load_responses(responses)?;
    let result = fragment.evaluate(&responses);

    if json {
        print_json(&json!({ "condition": fragment.to_string(), "result": result }))?;
    } else {
        println!("{}", result);
    }
    Ok(result)
}

// =============================================================================
// SURVEY
// =============================================================================

/// List the items of a survey that are displayed given the responses so far.
pub fn cmd_survey(survey: &Path, responses: Option<&Path>, json: bool) -> Result<Vec<ItemId>> {
    let compiled = load_survey(survey)?.compile()?;
    let responses = match responses {
        Some(path) => load_responses(path)?,
        None => Responses::new(),
    };

    compiled.check_responses(&responses)?;

    let displayed = compiled.displayed_items(&responses);
    let next = displayed
        .iter()
        .find(|item| !responses.contains_key(&item.id))
        .map(|item| item.id.clone());
    let visible: Vec<ItemId> = displayed.into_iter().map(|item| item.id.clone()).collect();

    if json {
        print_json(&json!({
            "survey": compiled.id,
            "displayed": visible,
            "next": next,
        }))?;
    } else {
        for id in &visible {
            println!("{}", id);
        }
        if let Some(next) = &next {
            println!("next: {}", next);
        }
    }
    Ok(visible)
}

// =============================================================================
// STREAM BUFFER
// =============================================================================

/// Buffer the data points in `points` for `account` on `stream`.
pub fn cmd_push(
    buffer: &Path,
    account: &str,
    stream: &str,
    points: &Path,
    json: bool,
) -> Result<usize> {
    let stream = parse_stream_id(stream)?;
    let prepared = load_points(points)?;
    let mut store = RedbBuffer::open(buffer)?;

    for point in &prepared {
        let record = StreamRecord::new(
            point.id.clone(),
            stream.clone(),
            account,
            point.created_at.clone(),
            point.payload.clone(),
        );
        store.append(&record)?;
    }
    info!(count = prepared.len(), stream = %stream, "buffered data points");

    if json {
        print_json(&json!({ "buffered": prepared.len(), "pending": store.len()? }))?;
    } else {
        println!("Buffered {} data points ({} pending)", prepared.len(), store.len()?);
    }
    Ok(prepared.len())
}

/// Pending record counts per account.
pub fn cmd_status(buffer: &Path, json: bool) -> Result<BTreeMap<String, usize>> {
    let store = RedbBuffer::open(buffer)?;
    let accounts = store.accounts()?;

    if json {
        print_json(&accounts)?;
    } else if accounts.is_empty() {
        println!("No pending records");
    } else {
        for (account, count) in &accounts {
            println!("{}: {} pending", account, count);
        }
    }
    Ok(accounts)
}

// =============================================================================
// ACCOUNT + SYNC
// =============================================================================

/// Store the account used by `sync`.
pub fn cmd_login(
    account_file: &Path,
    username: &str,
    access_token: &str,
    refresh_token: &str,
) -> Result<()> {
    if username.is_empty() {
        return Err(AppError::InvalidInput("username must not be empty".to_string()));
    }
    AccountStore::new(account_file).save(&Account::new(username, access_token, refresh_token))?;
    println!("Signed in as {}", username);
    Ok(())
}

/// Upload the stored account's pending records.
pub async fn cmd_sync(
    config: &Path,
    server: Option<&str>,
    buffer: &Path,
    account_file: &Path,
    json: bool,
) -> Result<SyncReport> {
    let mut config = SyncConfig::load(config)?;
    if let Some(server) = server {
        config.server_url = server.to_string();
        config.validate()?;
    }

    let client = DsuClient::new(&config)?;
    let store = RedbBuffer::open(buffer)?;
    let mut adapter = SyncAdapter::new(client, store, &config);
    let report = adapter.perform_sync(&AccountStore::new(account_file)).await?;

    if json {
        print_json(&report)?;
    } else {
        println!(
            "Uploaded {} ({} duplicates, {} rejected) in {} batches",
            report.uploaded, report.duplicates, report.rejected, report.batches
        );
        if report.token_refreshed {
            println!("Access token refreshed");
        }
        if report.unreadable > 0 {
            println!("Dropped {} unreadable records", report.unreadable);
        }
    }
    Ok(report)
}
