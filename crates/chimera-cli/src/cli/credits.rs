//! Credits subcommands.

use anyhow::Result;
use console::style;

use chimera_core::credits::CreditsLedger;

use crate::state::AppState;

use super::CreditsCommand;

pub async fn handle_credits_command(
    command: CreditsCommand,
    state: &AppState,
    json: bool,
) -> Result<()> {
    let mut ledger = CreditsLedger::load(state.gateway.clone()).await;

    match command {
        CreditsCommand::Show => {}
        CreditsCommand::Add { amount } => {
            ledger.add(amount).await;
            if !json {
                println!("  {} credits added", style("ok").green());
            }
        }
        CreditsCommand::Spend { amount } => {
            if ledger.try_spend(amount).await {
                if !json {
                    println!("  {} credits spent", style("ok").green());
                }
            } else if !json {
                println!(
                    "  {} insufficient balance ({} available)",
                    style("no").red(),
                    ledger.balance()
                );
            }
        }
    }

    if json {
        let out = serde_json::json!({
            "balance": ledger.balance(),
            "ever_topped_up": ledger.ever_topped_up(),
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!(
            "  balance: {}  ever topped up: {}",
            style(ledger.balance()).cyan(),
            style(ledger.ever_topped_up()).cyan()
        );
    }
    Ok(())
}
