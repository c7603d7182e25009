//! sandbox - Headless run of a full loot/combat session
//!
//! Usage: `sandbox [class] [seed]`. Log verbosity follows `RUST_LOG`.

use combat_core::{
    Attribute, BattleOutcome, CombatEvent, EquipmentSlot, GameSession, ItemRef, Loot,
    SessionError, Side,
};
use loot_core::make_rng;
use rand_chacha::ChaCha8Rng;
use std::process::ExitCode;

const ENCOUNTERS: usize = 5;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut args = std::env::args().skip(1);
    let class_id = args.next().unwrap_or_else(|| "warrior".to_string());
    let seed = args.next().and_then(|s| s.parse().ok()).unwrap_or(42);

    match run(&class_id, seed) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "sandbox run failed");
            ExitCode::FAILURE
        }
    }
}

fn run(class_id: &str, seed: u64) -> Result<(), SessionError> {
    let mut rng = make_rng(seed);
    let mut session = GameSession::with_defaults("旅人", class_id)?;
    session.allocate(Attribute::Strength, 3)?;
    session.allocate(Attribute::Vitality, 2)?;
    print_character(&session);

    for round in 1..=ENCOUNTERS {
        println!("\n=== Encounter {round} ===");
        let names: Vec<String> = session
            .new_encounter(&mut rng)?
            .iter()
            .map(|e| format!("{} (Lv{})", e.name, e.level))
            .collect();
        println!("Enemies: {}", names.join(", "));

        let outcome = session.fight(0, &mut rng)?;
        for event in session.drain_events() {
            print_event(&event);
        }

        match outcome {
            BattleOutcome::Victory => {
                report_loot(&session);
                gear_up(&mut session, &mut rng)?;
                session.tick(30.0);
                session.rest()?;
            }
            BattleOutcome::Defeat => {
                println!("Defeated. Resting before the next encounter.");
                session.rest()?;
            }
            BattleOutcome::Fled | BattleOutcome::Ongoing => {}
        }
    }

    let save = session.save()?;
    println!("\nSave snapshot: {} bytes", save.len());
    session.load(&save)?;
    print_character(&session);
    Ok(())
}

/// Equip any new piece that beats an empty slot, break down the rest and
/// try to enhance the weapon
fn gear_up(session: &mut GameSession, rng: &mut ChaCha8Rng) -> Result<(), SessionError> {
    loop {
        let character = session.character();
        let free = character
            .inventory
            .iter()
            .position(|item| character.equipped(item.equipment_slot()).is_none());
        let Some(index) = free else {
            break;
        };
        session.equip(index)?;
    }

    if let Some(weapon) = session.character().equipped(EquipmentSlot::Weapon) {
        if !weapon.affixes().is_empty() && !weapon.is_full() {
            let slot = ItemRef::Equipped(EquipmentSlot::Weapon);
            if session.imprint(slot, 0).is_ok() {
                let last = session.character().inscriptions.len() - 1;
                match session.enchant(slot, last, rng) {
                    Ok(outcome) => println!("Enchant weapon: {outcome:?}"),
                    Err(e) => println!("Enchant refused: {e}"),
                }
            }
        }
    }

    while !session.character().inventory.is_empty() {
        let materials = session.disassemble(0)?;
        println!("Disassembled for {materials:?}");
    }
    if session
        .enhance(ItemRef::Equipped(EquipmentSlot::Weapon))
        .is_ok()
    {
        println!("Weapon enhanced");
    }
    Ok(())
}

fn print_character(session: &GameSession) {
    let character = session.character();
    let stats = character.stats();
    println!(
        "{} [{}] Lv{} HP {:.0}/{:.0} MP {:.0} Gold {}",
        character.name,
        character.class.name,
        character.level,
        character.current_health,
        stats.max_health,
        character.mana,
        character.gold
    );
    println!(
        "ATK {:.1} DEF {:.1} CRIT {:.1}% x{:.2} DODGE {:.1}% HIT {:.1}%",
        stats.attack,
        stats.defense,
        stats.crit_chance,
        stats.crit_damage / 100.0,
        stats.dodge_rate,
        stats.hit_rate
    );
    for (slot, item) in &character.equipment {
        println!("  {slot:?}: {} ({})", item.final_name(), item.rarity.as_str());
    }
}

fn print_event(event: &CombatEvent) {
    let who = |side: &Side| match side {
        Side::Player => "You",
        Side::Enemy => "Enemy",
    };
    match event {
        CombatEvent::BattleStarted { enemy, enemy_health } => {
            println!("Battle vs {enemy} ({enemy_health:.0} HP)")
        }
        CombatEvent::Attack {
            attacker,
            skill,
            result,
            target_health,
        } => println!(
            "{}{}: {} -> {:.0} HP left",
            who(attacker),
            if *skill { " [skill]" } else { "" },
            result.summary(),
            target_health
        ),
        CombatEvent::SkillRefused { mana, cost } => {
            println!("Not enough mana ({mana:.0}/{cost:.0})")
        }
        CombatEvent::StatusApplied { target, effect } => {
            println!("{} suffers {}", who(target), effect.description)
        }
        CombatEvent::StatusTick {
            target,
            kind,
            damage,
            remaining_health,
        } => println!("{} takes {damage} from {kind:?} ({remaining_health:.0} HP)", who(target)),
        CombatEvent::TurnSkipped { side, cause } => println!("{} loses the turn ({cause:?})", who(side)),
        CombatEvent::StatusExpired { target, kind } => println!("{kind:?} wears off {}", who(target)),
        CombatEvent::Fled => println!("Fled"),
        CombatEvent::Victory { enemy, experience } => println!("Defeated {enemy}, +{experience} XP"),
        CombatEvent::Defeat => println!("You were defeated"),
    }
}

fn report_loot(session: &GameSession) {
    for drop in session.last_loot() {
        match drop {
            Loot::Gold(amount) => println!("Loot: {amount} gold"),
            Loot::Item(item) => println!("Loot: {} [{}]", item.final_name(), item.rarity.as_str()),
        }
    }
}
