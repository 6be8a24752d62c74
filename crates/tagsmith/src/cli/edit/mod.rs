//! The `tagsmith edit` command: a menu-driven editing session over one
//! folder, with undo/redo for every edit made during the session.

mod session;

use std::path::{Path, PathBuf};

use clap::Args;
use console::Style;
use dialoguer::{Input, Select};
use tagsmith_core::pipeline::{FileDiscovery, TaskSlot};
use tagsmith_core::store;
use tagsmith_core::{Config, InsertPosition};

use super::handle_interrupt;
use super::tags::run_stoppable;
use super::theme::{self, tagsmith_theme};
use session::EditSession;

/// Arguments for the `edit` command.
#[derive(Args, Debug)]
pub struct EditArgs {
    /// Folder of images and sidecar files
    pub dir: PathBuf,

    /// Undo history size (defaults to `[history] max_history`)
    #[arg(long)]
    pub max_history: Option<usize>,
}

/// Menu entries; undo/redo labels are filled in per iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MenuItem {
    Show,
    Add,
    Remove,
    BulkAdd,
    BulkRemove,
    List,
    Undo,
    Redo,
    Quit,
}

const MENU: [MenuItem; 9] = [
    MenuItem::Show,
    MenuItem::Add,
    MenuItem::Remove,
    MenuItem::BulkAdd,
    MenuItem::BulkRemove,
    MenuItem::List,
    MenuItem::Undo,
    MenuItem::Redo,
    MenuItem::Quit,
];

fn menu_label(item: MenuItem, session: &EditSession) -> String {
    match item {
        MenuItem::Show => "Show tags of an image".into(),
        MenuItem::Add => "Add tags to an image".into(),
        MenuItem::Remove => "Remove a tag from an image".into(),
        MenuItem::BulkAdd => "Add tags to every file".into(),
        MenuItem::BulkRemove => "Remove a tag from every file".into(),
        MenuItem::List => "List tags in folder".into(),
        MenuItem::Undo => match session.history().undo_description() {
            Some(d) => format!("Undo: {d}"),
            None => "Undo (nothing to undo)".into(),
        },
        MenuItem::Redo => match session.history().redo_description() {
            Some(d) => format!("Redo: {d}"),
            None => "Redo (nothing to redo)".into(),
        },
        MenuItem::Quit => "Quit".into(),
    }
}

/// Execute the edit command.
pub async fn execute(args: EditArgs, config: &Config, worker: &TaskSlot) -> anyhow::Result<()> {
    if !args.dir.is_dir() {
        anyhow::bail!("Not a folder: {}", args.dir.display());
    }
    let max_history = args.max_history.unwrap_or(config.history.max_history);
    if max_history == 0 {
        anyhow::bail!("--max-history must be > 0");
    }

    let images = FileDiscovery::from_config(&config.processing).discover(&args.dir);
    if images.is_empty() {
        tracing::warn!("No supported images in {:?}", args.dir);
    }
    let mut session = EditSession::new(args.dir.clone(), images, max_history);

    theme::print_banner(&args.dir.display().to_string());
    let dim = Style::new().for_stderr().dim();
    eprintln!(
        "  {}",
        dim.apply_to(format!(
            "{} image(s), history of {max_history} edits",
            session.images().len()
        ))
    );
    eprintln!();

    let theme = tagsmith_theme();
    let mut last_image = 0usize;

    loop {
        let labels: Vec<String> = MENU.iter().map(|&i| menu_label(i, &session)).collect();
        let Some(choice) = Select::with_theme(&theme)
            .with_prompt("What would you like to do?")
            .items(&labels)
            .default(0)
            .interact_opt()?
        else {
            break;
        };

        match MENU[choice] {
            MenuItem::Show => {
                if let Some(image) = pick_image(&session, &mut last_image)? {
                    show_tags(&session, &image)?;
                }
            }
            MenuItem::Add => {
                let Some(image) = pick_image(&session, &mut last_image)? else {
                    continue;
                };
                let Some(input) = prompt_text("Tags to add (comma-separated)")? else {
                    continue;
                };
                let added = session.add_tags(&image, &input)?;
                if added.is_empty() {
                    theme::warn("Nothing new to add");
                } else {
                    theme::success(format!("Added {}", added.join(", ")));
                }
            }
            MenuItem::Remove => {
                let Some(image) = pick_image(&session, &mut last_image)? else {
                    continue;
                };
                let tags = session.tags_of(&image)?;
                if tags.is_empty() {
                    theme::warn("This image has no tags");
                    continue;
                }
                let Some(index) = Select::with_theme(&theme)
                    .with_prompt("Tag to remove")
                    .items(&tags)
                    .default(0)
                    .interact_opt()?
                else {
                    continue;
                };
                if session.remove_tag(&image, &tags[index])? {
                    theme::success(format!("Removed '{}'", tags[index]));
                }
            }
            MenuItem::BulkAdd => {
                let Some(input) = prompt_text("Tags to add to every file (comma-separated)")?
                else {
                    continue;
                };
                let positions = ["Append", "Prepend"];
                let Some(pos) = Select::with_theme(&theme)
                    .with_prompt("Where")
                    .items(&positions)
                    .default(0)
                    .interact_opt()?
                else {
                    continue;
                };
                let position = if pos == 1 {
                    InsertPosition::Prepend
                } else {
                    InsertPosition::Append
                };

                let dir = session.folder().to_path_buf();
                let outcome = run_stoppable(worker, move |stop| {
                    store::bulk_add(&dir, &[input], position, &stop)
                })
                .await?;
                if outcome.tags.is_empty() {
                    theme::warn("No tags given");
                    continue;
                }
                session.record_bulk_add(&outcome);
                theme::success(format!(
                    "Added {} to {} file(s)",
                    outcome.tags.join(", "),
                    outcome.changed_files.len()
                ));
                report_partial(outcome.failed, outcome.stopped);
            }
            MenuItem::BulkRemove => {
                let Some(tag) = prompt_text("Tag to remove from every file")? else {
                    continue;
                };
                let dir = session.folder().to_path_buf();
                let outcome =
                    run_stoppable(worker, move |stop| store::bulk_remove(&dir, &tag, &stop))
                        .await?;
                session.record_bulk_remove(&outcome);
                theme::success(format!(
                    "Removed '{}' from {} file(s)",
                    outcome.tag,
                    outcome.file_positions.len()
                ));
                report_partial(outcome.failed, outcome.stopped);
            }
            MenuItem::List => {
                let dir = session.folder().to_path_buf();
                match run_stoppable(worker, move |stop| {
                    store::collect_tag_counts(&dir, &stop)
                })
                .await?
                {
                    Some(counts) => {
                        eprintln!();
                        for entry in &counts {
                            eprintln!("    {:>6}  {}", entry.count, entry.tag);
                        }
                        eprintln!();
                    }
                    None => theme::warn("Tag scan was interrupted"),
                }
            }
            MenuItem::Undo => {
                if !session.history().can_undo() {
                    theme::warn("Nothing to undo");
                } else if let Some(d) = session.undo() {
                    theme::success(format!("Undid {d}"));
                } else {
                    theme::warn("Undo failed; the edit was dropped from history");
                }
            }
            MenuItem::Redo => {
                if !session.history().can_redo() {
                    theme::warn("Nothing to redo");
                } else if let Some(d) = session.redo() {
                    theme::success(format!("Redid {d}"));
                } else {
                    theme::warn("Redo failed; the edit was dropped from history");
                }
            }
            MenuItem::Quit => break,
        }
    }

    Ok(())
}

/// Ask for an image, defaulting to the last one picked.
fn pick_image(session: &EditSession, last: &mut usize) -> anyhow::Result<Option<PathBuf>> {
    if session.images().is_empty() {
        theme::warn("No images in this folder");
        return Ok(None);
    }
    let names: Vec<String> = session
        .images()
        .iter()
        .map(|p| session.display_name(p))
        .collect();
    let choice = Select::with_theme(&tagsmith_theme())
        .with_prompt("Image")
        .items(&names)
        .default((*last).min(names.len() - 1))
        .max_length(15)
        .interact_opt()?;
    Ok(choice.map(|i| {
        *last = i;
        session.images()[i].clone()
    }))
}

fn prompt_text(prompt: &str) -> anyhow::Result<Option<String>> {
    let input = handle_interrupt(
        Input::<String>::with_theme(&tagsmith_theme())
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text(),
    )?;
    Ok(input.filter(|s| !s.trim().is_empty()))
}

fn show_tags(session: &EditSession, image: &Path) -> anyhow::Result<()> {
    let tags = session.tags_of(image)?;
    eprintln!();
    if tags.is_empty() {
        let dim = Style::new().for_stderr().dim();
        eprintln!("  {}", dim.apply_to("(no tags)"));
    } else {
        for (i, tag) in tags.iter().enumerate() {
            eprintln!("  {:>3}. {tag}", i + 1);
        }
    }
    eprintln!();
    Ok(())
}

fn report_partial(failed: usize, stopped: bool) {
    if stopped {
        theme::warn("Stopped before every file was processed");
    }
    if failed > 0 {
        theme::warn(format!("{failed} file(s) could not be updated"));
    }
}
