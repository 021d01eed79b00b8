//! `coach plan` and `coach materials`.
//!
//! `plan` prints the same JSON body the HTTP endpoint returns, so its
//! stdout can be piped straight into other tools. Logs go to stderr.
//! With `--dry-run` it prints the rendered prompt instead and never
//! contacts the generation service.

use anyhow::{bail, Result};

use study_coach_core::pipeline::Reply;
use study_coach_core::request::RawPlanRequest;
use study_coach_core::store::MaterialStore;

use crate::coach::{coach_from_config, offline_coach};
use crate::config::Config;
use crate::json_store::JsonMaterialStore;

pub async fn run_plan(config: &Config, owner: &str, minutes: i64, dry_run: bool) -> Result<()> {
    let raw = RawPlanRequest::new(owner, minutes);

    if dry_run {
        let prepared = offline_coach(config).prepare(&raw).await?;
        println!("{}", prepared.prompt);
        eprintln!(
            "Prompt: {} chars from {} of {} chunks ({})",
            prepared.prompt.chars().count(),
            prepared.context.snippets.len(),
            prepared.context.total_chunks,
            prepared.context.source_filenames.join(", ")
        );
        return Ok(());
    }

    let coach = coach_from_config(config)?;
    match coach.respond(&raw).await {
        Reply::Success(response) => {
            println!("{}", serde_json::to_string_pretty(&response)?);
            Ok(())
        }
        Reply::Rejected(body) | Reply::Failed(body) => {
            println!("{}", serde_json::to_string_pretty(&body)?);
            match body.details {
                Some(details) => bail!("{} ({})", body.error, details),
                None => bail!("{}", body.error),
            }
        }
    }
}

/// Per-file chunk counts for `owner`, in store order.
pub async fn owned_files(store: &dyn MaterialStore, owner: &str) -> Result<Vec<(String, usize)>> {
    let state = store.load().await?;
    let mut files: Vec<(String, usize)> = Vec::new();
    for doc in state.docs.iter().filter(|d| d.is_owned_by(owner)) {
        match files.iter_mut().find(|(name, _)| *name == doc.filename) {
            Some((_, count)) => *count += 1,
            None => files.push((doc.filename.clone(), 1)),
        }
    }
    Ok(files)
}

pub async fn run_materials(config: &Config, owner: &str) -> Result<()> {
    let store = JsonMaterialStore::new(&config.store.path);
    let files = owned_files(&store, owner).await?;

    if files.is_empty() {
        println!("No study material found for '{}'.", owner);
        return Ok(());
    }

    println!("{:<40} CHUNKS", "FILE");
    for (name, count) in &files {
        println!("{:<40} {}", name, count);
    }
    let total: usize = files.iter().map(|(_, c)| c).sum();
    println!();
    println!("{} files, {} chunks", files.len(), total);
    Ok(())
}
