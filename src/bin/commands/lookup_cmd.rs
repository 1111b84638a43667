use anyhow::Result;
use asnmap::LoadOptions;
use log::warn;
use serde_json::json;
use std::path::PathBuf;

use crate::cli_utils::{load_feed, match_to_json};

pub fn cmd_lookup(
    feed: PathBuf,
    options: LoadOptions,
    queries: Vec<String>,
    quiet: bool,
) -> Result<()> {
    let loaded = load_feed(&feed, &options)?;
    let index = &loaded.index;

    let mut all_found = true;
    let mut results = Vec::with_capacity(queries.len());

    for query in &queries {
        match index.lookup_str(query) {
            Ok(found) => {
                all_found &= found.is_some();
                results.push(match_to_json(query, found.as_ref()));
            }
            Err(err) => {
                warn!("{}", err);
                all_found = false;
                results.push(json!({
                    "ip": query,
                    "found": false,
                    "error": err.to_string(),
                }));
            }
        }
    }

    if !quiet {
        println!("{}", serde_json::to_string_pretty(&json!(results))?);
    }

    std::process::exit(if all_found { 0 } else { 1 });
}
