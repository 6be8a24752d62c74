//! The `tagsmith tags` command: one-shot edits over sidecar files.
//!
//! These edits are not recorded anywhere; `tagsmith edit` is the place for
//! changes that should be undoable.

use std::path::{Path, PathBuf};

use clap::{Args, Subcommand};
use serde::Serialize;
use tagsmith_core::pipeline::{StopFlag, TaskSlot};
use tagsmith_core::store::{self, split_unique, TagCount};
use tagsmith_core::{Config, InsertPosition, TagFileStore};

/// Arguments for the `tags` command.
#[derive(Args, Debug)]
pub struct TagsArgs {
    #[command(subcommand)]
    pub command: TagsCommand,
}

/// Subcommands for sidecar editing.
#[derive(Subcommand, Debug)]
pub enum TagsCommand {
    /// Count tag usage across a folder, most common first
    List {
        /// Folder to scan for sidecar files
        dir: PathBuf,

        /// Only show the N most common tags
        #[arg(long)]
        top: Option<usize>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Add tags to one image's sidecar
    Add {
        /// Image or sidecar file
        file: PathBuf,

        /// Comma-separated tags
        tags: String,
    },

    /// Remove a tag from one image's sidecar
    Remove {
        /// Image or sidecar file
        file: PathBuf,

        /// Tag to remove (exact match)
        tag: String,
    },

    /// Add tags to every sidecar in a folder
    BulkAdd {
        /// Folder to edit
        dir: PathBuf,

        /// Comma-separated tags
        tags: String,

        /// Insert at the start of each file instead of the end
        #[arg(long)]
        prepend: bool,
    },

    /// Remove a tag from every sidecar in a folder
    BulkRemove {
        /// Folder to edit
        dir: PathBuf,

        /// Tag to remove (exact match)
        tag: String,
    },
}

/// JSON shape of `tags list --json`.
#[derive(Debug, Serialize)]
struct TagListing<'a> {
    folder: &'a Path,
    files: usize,
    tags: &'a [TagCount],
}

/// Execute the tags command.
pub async fn execute(args: TagsArgs, _config: &Config, worker: &TaskSlot) -> anyhow::Result<()> {
    match args.command {
        TagsCommand::List { dir, top, json } => {
            require_dir(&dir)?;
            let files = store::aggregate::sidecar_files(&dir).len();
            let scan_dir = dir.clone();
            let Some(mut counts) = run_stoppable(worker, move |stop| {
                store::collect_tag_counts(&scan_dir, &stop)
            })
            .await?
            else {
                anyhow::bail!("Tag scan was interrupted");
            };
            if let Some(top) = top {
                counts.truncate(top);
            }

            if json {
                let listing = TagListing {
                    folder: &dir,
                    files,
                    tags: &counts,
                };
                println!("{}", serde_json::to_string_pretty(&listing)?);
            } else {
                for entry in &counts {
                    println!("{:>6}  {}", entry.count, entry.tag);
                }
                eprintln!("{} distinct tag(s) in {files} file(s)", counts.len());
            }
        }

        TagsCommand::Add { file, tags } => {
            let sidecar = resolve_sidecar(&file);
            let tags = split_unique(&tags);
            if tags.is_empty() {
                anyhow::bail!("No tags given");
            }
            if TagFileStore::add(&sidecar, &tags)? {
                println!("Added {} to {}", tags.join(", "), sidecar.display());
            } else {
                println!("{} already has every tag", sidecar.display());
            }
        }

        TagsCommand::Remove { file, tag } => {
            let sidecar = resolve_sidecar(&file);
            if TagFileStore::remove(&sidecar, tag.trim())? {
                println!("Removed '{}' from {}", tag.trim(), sidecar.display());
            } else {
                println!("'{}' not found in {}", tag.trim(), sidecar.display());
            }
        }

        TagsCommand::BulkAdd { dir, tags, prepend } => {
            require_dir(&dir)?;
            let position = if prepend {
                InsertPosition::Prepend
            } else {
                InsertPosition::Append
            };
            let outcome = run_stoppable(worker, move |stop| {
                store::bulk_add(&dir, &[tags], position, &stop)
            })
            .await?;
            if outcome.tags.is_empty() {
                anyhow::bail!("No tags given");
            }
            println!(
                "Added {} to {} file(s)",
                outcome.tags.join(", "),
                outcome.changed_files.len()
            );
            report_partial(outcome.failed, outcome.stopped)?;
        }

        TagsCommand::BulkRemove { dir, tag } => {
            require_dir(&dir)?;
            let outcome =
                run_stoppable(worker, move |stop| store::bulk_remove(&dir, &tag, &stop))
                    .await?;
            println!(
                "Removed '{}' from {} file(s)",
                outcome.tag,
                outcome.file_positions.len()
            );
            report_partial(outcome.failed, outcome.stopped)?;
        }
    }

    Ok(())
}

/// Sidecar for `path`: `.txt` files are used as-is, anything else is
/// treated as an image.
pub(crate) fn resolve_sidecar(path: &Path) -> PathBuf {
    let is_txt = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("txt"));
    if is_txt {
        path.to_path_buf()
    } else {
        TagFileStore::sidecar_path(path)
    }
}

/// Run folder-wide `work` in `slot`; Ctrl-C raises its stop flag.
///
/// Fails with `PipelineError::Busy` if the slot is already taken.
pub(crate) async fn run_stoppable<T, F>(slot: &TaskSlot, work: F) -> anyhow::Result<T>
where
    F: FnOnce(StopFlag) -> T + Send + 'static,
    T: Send + 'static,
{
    let stop = StopFlag::new();
    let ctrl_c = {
        let stop = stop.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                stop.request_stop();
            }
        })
    };

    let result = slot.run_blocking(move || work(stop)).await;
    ctrl_c.abort();
    Ok(result?)
}

fn require_dir(dir: &Path) -> anyhow::Result<()> {
    if !dir.is_dir() {
        anyhow::bail!("Not a folder: {}", dir.display());
    }
    Ok(())
}

fn report_partial(failed: usize, stopped: bool) -> anyhow::Result<()> {
    if stopped {
        anyhow::bail!("Stopped before every file was processed");
    }
    if failed > 0 {
        anyhow::bail!("{failed} file(s) could not be updated");
    }
    Ok(())
}
