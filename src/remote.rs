//! Remote patch lookup against a Gerrit review server.
//!
//! When a requested patch is not in the local corpus, the pipeline falls
//! back to the project's review server and fetches the change with all
//! revisions, files, and messages. The client degrades rather than fails:
//! non-200 responses, timeouts, and malformed payloads all resolve to
//! absence, which the pipeline reports as "patch not found".
//!
//! Gerrit quirks handled here:
//! - Responses are prefixed with the `)]}'` XSSI guard line before the JSON
//!   body; it is stripped before parsing.
//! - "The files of the patch" means the files of revision `_number == 1`,
//!   excluding the `/COMMIT_MSG` and `/MERGE_LIST` pseudo-file entries.
//! - "The latest commit message" comes from the revision with the highest
//!   `_number`, falling back to the change subject.

use anyhow::Result;
use serde_json::Value;
use std::time::Duration;

use crate::corpus::parse_timestamp;
use crate::models::PatchRecord;

/// Bounded timeout for the single lookup request.
const LOOKUP_TIMEOUT: Duration = Duration::from_secs(10);

/// XSSI guard Gerrit prepends to every JSON response.
const MAGIC_PREFIX: &str = ")]}'";

/// Fetch one patch record by change id. Absence (including any network or
/// parse failure) is `None`, never an error.
pub async fn fetch_patch(base_url: &str, patch_id: &str) -> Option<PatchRecord> {
    match try_fetch(base_url, patch_id).await {
        Ok(record) => record,
        Err(err) => {
            tracing::warn!("remote lookup for '{}' failed: {:#}", patch_id, err);
            None
        }
    }
}

async fn try_fetch(base_url: &str, patch_id: &str) -> Result<Option<PatchRecord>> {
    let url = format!(
        "{}/changes/{}?o=ALL_REVISIONS&o=ALL_FILES&o=MESSAGES",
        base_url.trim_end_matches('/'),
        patch_id
    );

    let client = reqwest::Client::builder()
        .timeout(LOOKUP_TIMEOUT)
        .build()?;

    let response = client.get(&url).send().await?;
    if !response.status().is_success() {
        return Ok(None);
    }

    let body = response.text().await?;
    let change: Value = serde_json::from_str(strip_magic_prefix(&body))?;
    Ok(parse_change(&change, patch_id))
}

fn strip_magic_prefix(body: &str) -> &str {
    body.strip_prefix(MAGIC_PREFIX).unwrap_or(body)
}

/// Standardize a Gerrit ChangeInfo payload into a [`PatchRecord`]. Returns
/// `None` when the payload lacks a parseable creation time.
fn parse_change(change: &Value, patch_id: &str) -> Option<PatchRecord> {
    let subject = change
        .get("subject")
        .and_then(Value::as_str)
        .unwrap_or_default();
    let created_time = change
        .get("created")
        .and_then(Value::as_str)
        .and_then(parse_timestamp)?;

    let revisions = change.get("revisions").and_then(Value::as_object);

    // Latest revision carries the current commit message.
    let description = revisions
        .and_then(|revs| {
            revs.values()
                .max_by_key(|rev| rev.get("_number").and_then(Value::as_i64).unwrap_or(0))
        })
        .and_then(|rev| rev.pointer("/commit/message"))
        .and_then(Value::as_str)
        .unwrap_or(subject)
        .to_string();

    // Revision 1 carries the file list used for patch comparison.
    let files = revisions
        .and_then(|revs| {
            revs.values()
                .find(|rev| rev.get("_number").and_then(Value::as_i64) == Some(1))
        })
        .and_then(|rev| rev.get("files"))
        .and_then(Value::as_object)
        .map(|files| {
            files
                .keys()
                .filter(|path| !is_pseudo_file(path))
                .cloned()
                .collect()
        })
        .unwrap_or_default();

    Some(PatchRecord {
        patch_id: patch_id.to_string(),
        title: subject.to_string(),
        description,
        created_time,
        files,
    })
}

/// Pseudo-file entries Gerrit reports alongside real paths.
fn is_pseudo_file(path: &str) -> bool {
    matches!(path, "/COMMIT_MSG" | "/MERGE_LIST")
}
