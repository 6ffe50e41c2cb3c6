//! The paid generate flow: selection preview, spend, progress, result card.

use anyhow::Result;
use comfy_table::{Cell, Color, Table, presets};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use chimera_core::coordinator::{GenerateOutcome, GenerationCoordinator};
use chimera_core::policy::LockPolicy;
use chimera_core::selection::{MIN_SELECTED, SelectionController};
use chimera_core::session::BuilderStore;
use chimera_infra::FileKvStore;
use chimera_types::generation::GenerationEvent;
use chimera_types::part::PartKey;

use crate::state::AppState;

use super::builder::load_session;

pub async fn handle_generate(
    state: &AppState,
    parts: Option<Vec<PartKey>>,
    json: bool,
) -> Result<()> {
    let (mut ledger, store, _) = load_session(state).await;
    let policy = LockPolicy::new(&state.catalog, ledger.ever_topped_up());
    let session = store.session();

    let mut selection = SelectionController::init(&state.catalog, session, &policy);
    if let Some(requested) = parts {
        // Narrow the default selection to the requested slots, respecting
        // the floor and eligibility rules.
        for part in state.catalog.parts.iter().map(|p| p.key) {
            if selection.is_included(part) && !requested.contains(&part) {
                selection.toggle(part, MIN_SELECTED);
            }
        }
        for part in &requested {
            if !selection.is_included(*part) {
                selection.toggle(*part, MIN_SELECTED);
            }
        }
    }

    if !json {
        print_preview(state, &selection, &policy, &store);
        println!(
            "  cost: {} credit(s), balance: {}",
            style(state.config.generate_cost).cyan(),
            style(ledger.balance()).cyan()
        );
    }

    let mut coordinator = GenerationCoordinator::new(
        state.gateway.clone(),
        state.config.generate_cost,
        state.config.effective_steps(),
    );

    let outcome = coordinator
        .generate(&state.catalog, session, &selection, &mut ledger)
        .await;

    match outcome {
        GenerateOutcome::TooFewParts { selected } => {
            println!(
                "  {} pick at least {MIN_SELECTED} unlocked parts ({selected} selected)",
                style("no").red()
            );
        }
        GenerateOutcome::InsufficientCredits { balance, cost } => {
            println!(
                "  {} not enough credits ({balance} < {cost}); top up with `chim credits add`",
                style("no").red()
            );
        }
        GenerateOutcome::Started {
            mut events, card, ..
        } => {
            let bar = progress_bar(json);
            while let Some(event) = events.recv().await {
                match event {
                    GenerationEvent::Started => {}
                    GenerationEvent::Progress { percent, message } => {
                        bar.set_position(u64::from(percent));
                        bar.set_message(message);
                    }
                    GenerationEvent::Completed => {
                        bar.finish_and_clear();
                        if json {
                            println!("{}", serde_json::to_string_pretty(&card)?);
                        } else {
                            println!();
                            println!("  {}", style(&card.name).green().bold());
                            println!("  {}", card.story);
                            println!("  image: {}", style(&card.image).dim());
                        }
                    }
                }
            }
        }
    }
    Ok(())
}

fn progress_bar(json: bool) -> ProgressBar {
    if json {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new(100);
    bar.set_style(
        ProgressStyle::with_template("  {bar:30.cyan/blue} {pos:>3}% {msg}")
            .expect("static template"),
    );
    bar
}

fn print_preview(
    state: &AppState,
    selection: &SelectionController,
    policy: &LockPolicy<'_>,
    store: &BuilderStore<FileKvStore>,
) {
    let session = store.session();
    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_BORDERS_ONLY)
        .set_header(vec!["Part", "Animal", "Included"]);
    for part in &state.catalog.parts {
        let index = session.assigned_index(part.key);
        let disabled = SelectionController::is_row_disabled(part.key, session, policy);
        let included = selection.is_included(part.key);
        let status = if disabled {
            Cell::new("locked").fg(Color::Red)
        } else if included {
            Cell::new("yes").fg(Color::Green)
        } else {
            Cell::new("no")
        };
        table.add_row(vec![
            Cell::new(part.key),
            Cell::new(&state.catalog.animals[index].label),
            status,
        ]);
    }
    println!("{table}");
}
