//! `voxclone sync`: run a clone-and-reconcile for one user.

use anyhow::Result;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use voxclone_types::action::{ActionRecord, ActionVerb};

use crate::state::AppState;

pub async fn sync(state: &AppState, user: &str, json: bool, quiet: bool) -> Result<()> {
    let spinner = if json || quiet {
        ProgressBar::hidden()
    } else {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}")?);
        spinner.set_message(format!("Reconciling templates for {user}..."));
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        spinner
    };

    let result = state.clone_for(user).await;
    spinner.finish_and_clear();

    match result {
        Ok(outcome) => {
            if json {
                println!("{}", serde_json::to_string_pretty(&outcome)?);
                return Ok(());
            }

            println!();
            println!(
                "  {} Templates reconciled for {}",
                style("✓").green().bold(),
                style(user).bold()
            );
            println!("  Tool:      {}", style(&outcome.tool_id).cyan());
            println!("  Assistant: {}", style(&outcome.assistant_id).cyan());
            println!();
            if !quiet {
                println!("{}", action_table(&outcome.actions));
            }
            Ok(())
        }
        Err(err) => {
            let code = err.code();
            let failure = err.into_failure();
            if json {
                println!("{}", serde_json::to_string_pretty(&failure)?);
            } else {
                eprintln!(
                    "  {} {} {}",
                    style("✗").red().bold(),
                    style(code).red().bold(),
                    failure.message
                );
                if !failure.actions.is_empty() {
                    eprintln!("{}", action_table(&failure.actions));
                }
            }
            anyhow::bail!("sync failed with {code}")
        }
    }
}

fn action_table(actions: &[ActionRecord]) -> Table {
    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Kind").fg(Color::White),
        Cell::new("Action").fg(Color::White),
        Cell::new("Resource").fg(Color::White),
    ]);

    for action in actions {
        table.add_row(vec![
            Cell::new(action.kind.singular()),
            Cell::new(verb_label(action.verb)).fg(verb_color(action.verb)),
            Cell::new(&action.id).fg(Color::Cyan),
        ]);
    }
    table
}

fn verb_label(verb: ActionVerb) -> &'static str {
    match verb {
        ActionVerb::Created => "created",
        ActionVerb::Reused => "reused",
        ActionVerb::DeletedOld => "deleted old",
        ActionVerb::DeleteFailed => "delete failed",
        ActionVerb::SkippedNewerExists => "skipped (newer exists)",
    }
}

fn verb_color(verb: ActionVerb) -> Color {
    match verb {
        ActionVerb::Created => Color::Green,
        ActionVerb::Reused => Color::DarkGrey,
        ActionVerb::DeletedOld => Color::Yellow,
        ActionVerb::DeleteFailed => Color::Red,
        ActionVerb::SkippedNewerExists => Color::Magenta,
    }
}
