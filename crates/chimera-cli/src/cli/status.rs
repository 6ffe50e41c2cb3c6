//! Session status table.

use anyhow::Result;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;

use chimera_core::policy::LockPolicy;
use chimera_core::selection::SelectionController;

use crate::state::AppState;

use super::builder::load_session;

pub async fn handle_status(state: &AppState, json: bool) -> Result<()> {
    let (ledger, store, show_tutorial) = load_session(state).await;
    let policy = LockPolicy::new(&state.catalog, ledger.ever_topped_up());
    let session = store.session();

    if json {
        let parts: serde_json::Map<String, serde_json::Value> = state
            .catalog
            .parts
            .iter()
            .map(|part| {
                let index = session.assigned_index(part.key);
                (
                    part.key.to_string(),
                    serde_json::json!({
                        "animal": state.catalog.animals[index].label,
                        "index": index,
                        "locked": SelectionController::is_row_disabled(part.key, session, &policy),
                    }),
                )
            })
            .collect();
        let out = serde_json::json!({
            "active_part": store.active_part(),
            "parts": parts,
            "balance": ledger.balance(),
            "ever_topped_up": ledger.ever_topped_up(),
            "show_tutorial": show_tutorial,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_BORDERS_ONLY)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Part", "Animal", "Index", "Lock"]);

    for part in &state.catalog.parts {
        let index = session.assigned_index(part.key);
        let animal = &state.catalog.animals[index];
        let locked = SelectionController::is_row_disabled(part.key, session, &policy);
        let marker = if part.key == store.active_part() {
            format!("{} *", part.key)
        } else {
            part.key.to_string()
        };
        table.add_row(vec![
            Cell::new(marker),
            Cell::new(&animal.label),
            Cell::new(index),
            if locked {
                Cell::new("locked").fg(Color::Red)
            } else {
                Cell::new("free").fg(Color::Green)
            },
        ]);
    }

    println!("{table}");
    println!(
        "  balance: {}  ever topped up: {}",
        style(ledger.balance()).cyan(),
        style(ledger.ever_topped_up()).cyan()
    );
    if show_tutorial {
        println!("  {} first visit: run `chim tutorial --ack`", style("hint").yellow());
    }
    Ok(())
}
