//! Slot/animal navigation, reset, and tutorial subcommands.

use anyhow::Result;
use console::style;
use rand::SeedableRng;
use rand::rngs::StdRng;

use chimera_core::credits::CreditsLedger;
use chimera_core::policy::LockPolicy;
use chimera_core::session::BuilderStore;
use chimera_infra::FileKvStore;

use crate::state::AppState;

use super::{AnimalCommand, PartCommand};

/// Load the ledger and the builder session from persisted state.
///
/// Returns the ledger first because the store's initialization consults the
/// ever-topped-up flag for its free-tier randomization.
pub async fn load_session(
    state: &AppState,
) -> (
    CreditsLedger<FileKvStore>,
    BuilderStore<FileKvStore>,
    bool,
) {
    let ledger = CreditsLedger::load(state.gateway.clone()).await;
    let mut rng = StdRng::from_entropy();
    let (store, show_tutorial) = BuilderStore::load_or_init(
        state.catalog.clone(),
        state.gateway.clone(),
        ledger.ever_topped_up(),
        &mut rng,
    )
    .await;
    (ledger, store, show_tutorial)
}

fn print_active(state: &AppState, store: &BuilderStore<FileKvStore>, ledger_topped_up: bool) {
    let part = store.active_part();
    let index = store.active_animal_index();
    let animal = &state.catalog.animals[index];
    let policy = LockPolicy::new(&state.catalog, ledger_topped_up);
    let lock = if store.is_active_selection_locked(&policy) {
        style(" [locked]").red().to_string()
    } else {
        String::new()
    };
    println!(
        "  {} -> {} (#{index}){lock}",
        style(part).cyan(),
        style(&animal.label).green(),
    );
}

pub async fn handle_part_command(command: PartCommand, state: &AppState) -> Result<()> {
    let (ledger, mut store, _) = load_session(state).await;
    match command {
        PartCommand::Next => store.next_part().await,
        PartCommand::Prev => store.prev_part().await,
        PartCommand::Set { part } => store.select_part(part).await,
    }
    print_active(state, &store, ledger.ever_topped_up());
    Ok(())
}

pub async fn handle_animal_command(command: AnimalCommand, state: &AppState) -> Result<()> {
    let (ledger, mut store, _) = load_session(state).await;
    match command {
        AnimalCommand::Next => store.next_animal().await,
        AnimalCommand::Prev => store.prev_animal().await,
        AnimalCommand::Set { index } => store.select_animal(index).await,
    }
    print_active(state, &store, ledger.ever_topped_up());
    Ok(())
}

pub async fn handle_reset(state: &AppState) -> Result<()> {
    let (ledger, mut store, _) = load_session(state).await;
    let mut rng = StdRng::from_entropy();
    store.reset(ledger.ever_topped_up(), &mut rng).await;
    println!("  {} session cleared and re-randomized", style("ok").green());
    Ok(())
}

pub async fn handle_tutorial(state: &AppState, ack: bool) -> Result<()> {
    if ack {
        state.gateway.mark_tutorial_seen().await;
        println!("  {} tutorial marked as seen", style("ok").green());
    } else if state.gateway.tutorial_seen().await {
        println!("  tutorial: already seen");
    } else {
        println!("  tutorial: will show on first visit (ack with --ack)");
    }
    Ok(())
}
