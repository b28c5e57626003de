use crate::cli::{open_engine, print_json, Cli, InterestCommands};
use anyhow::Result;
use serde_json::json;
use swapmatch_core::InterestPayload;

pub fn run(cmd: &InterestCommands, cli: &Cli) -> Result<()> {
    let engine = open_engine(cli)?;
    let (args, action) = match cmd {
        InterestCommands::Express(args) => (args, "express"),
        InterestCommands::Withdraw(args) => (args, "withdraw"),
        InterestCommands::Accept(args) => (args, "accept"),
        InterestCommands::Remove(args) => (args, "remove"),
        InterestCommands::State(args) => (args, "state"),
    };

    let caller = args.actor.participant();
    let payload = InterestPayload::new(args.other.clone());
    let state = match cmd {
        InterestCommands::Express(_) => engine.express_interest(&caller, &payload)?,
        InterestCommands::Withdraw(_) => engine.withdraw_interest(&caller, &payload)?,
        InterestCommands::Accept(_) => engine.accept_interest(&caller, &payload)?,
        InterestCommands::Remove(_) => engine.remove_match(&caller, &payload)?,
        InterestCommands::State(_) => engine.interest_state(&caller, &payload)?,
    };

    print_json(&json!({
        "action": action,
        "other_user_id": args.other,
        "mutually_confirmed": state.is_confirmed(),
        "interest": state,
    }))
}
