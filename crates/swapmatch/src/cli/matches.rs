use crate::cli::{open_engine, print_json, Cli, MatchCommands};
use anyhow::Result;

pub fn run(cmd: &MatchCommands, cli: &Cli) -> Result<()> {
    let engine = open_engine(cli)?;
    match cmd {
        MatchCommands::Mutual(actor) => {
            let matches = engine.list_mutual_matches(&actor.participant())?;
            tracing::info!("{} mutual match(es) for {}", matches.len(), actor.id);
            print_json(&matches)
        }
        MatchCommands::Cycle(actor) => {
            let matches = engine.list_cycle_matches(&actor.participant())?;
            tracing::info!("{} cycle match(es) for {}", matches.len(), actor.id);
            print_json(&matches)
        }
        MatchCommands::All(args) => {
            let pairs = engine.all_mutual_matches(args.kind.into())?;
            tracing::info!("{} mutual pair(s)", pairs.len());
            print_json(&pairs)
        }
    }
}
