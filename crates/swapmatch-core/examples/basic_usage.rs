use std::sync::Arc;
use swapmatch_core::{
    present, EngineConfig, InterestPayload, MemoryStore, Participant, RequestKind,
    RequestPayload, SwapEngine,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Swapmatch Basic Usage Example ===\n");

    let engine = SwapEngine::new(Arc::new(MemoryStore::new()), EngineConfig::default())?;

    let ana = Participant::new("u-ana", "Ana", "ana@example.edu");
    let ben = Participant::new("u-ben", "Ben", "ben@example.edu");
    let cy = Participant::new("u-cy", "Cy", "cy@example.edu");

    // 1. Ranked preference requests
    println!("1. Creating preference requests...");
    engine.create_request(
        &ana,
        RequestKind::Preference,
        RequestPayload::new()
            .with_held("North 101")
            .with_choices("South 204", "East 310", "West 012"),
    )?;
    engine.create_request(
        &ben,
        RequestKind::Preference,
        RequestPayload::new()
            .with_held("South 204")
            .with_choices("West 012", "North 101", "East 310"),
    )?;
    println!("   ✓ 2 requests stored\n");

    // 2. Mutual matches, contacts hidden
    println!("2. Ana's mutual matches:");
    for m in engine.list_mutual_matches(&ana)? {
        println!(
            "   {} holds {} (mine: {}, theirs: {}) contact: {}",
            m.other_user_name,
            m.other_held_resource,
            m.my_preference_level,
            m.they_want_my_level,
            m.other_contact_display
        );
    }
    println!();

    // 3. Handshake
    println!("3. Confirming interest...");
    engine.express_interest(&ana, &InterestPayload::new("u-ben"))?;
    let state = engine.accept_interest(&ben, &InterestPayload::new("u-ana"))?;
    println!("   ✓ state: {:?}\n", state);

    let confirmed = engine.list_mutual_matches(&ana)?;
    println!("{}\n", serde_json::to_string_pretty(&present(&confirmed)?)?);

    // 4. Three-way chain among cycle requests
    println!("4. Cycle requests...");
    for (who, held, wants) in [
        (&ana, "North 101", "South 204"),
        (&ben, "South 204", "East 310"),
        (&cy, "East 310", "North 101"),
    ] {
        engine.create_request(
            who,
            RequestKind::Cycle,
            RequestPayload::new().with_held(held).with_desired(wants),
        )?;
    }
    for m in engine.list_cycle_matches(&ana)? {
        let third = m.third.as_ref().map(|p| p.user_name.as_str()).unwrap_or("-");
        println!(
            "   {}: Ana -> {} -> {} -> Ana",
            m.match_type, m.other.user_name, third
        );
    }

    println!("\n=== Example Complete ===");
    Ok(())
}
