//! Line-oriented command console used by the `pocket-tamer` binary.
//!
//! Each input line maps onto one store command; the resulting state is
//! rendered as a short plain-text summary.

use crate::battle::BattleCommand;
use crate::items::ItemKind;
use crate::model::{GameState, Npc, PartyMonster};
use crate::store::GameStore;
use anyhow::Context;
use std::fmt::Write as _;

pub const HELP: &str = "\
Commands:
  encounter X Y        start a wild battle at tile (X, Y)
  trainer ID           challenge a gym trainer (junior-mia, ace-ryu, leader-nova)
  fight [SKILL]        attack, optionally with a known skill id
  item [ITEM]          use potion, super_potion or antidote
  catch                throw a ball (wild battles only)
  run                  try to flee (wild battles only)
  switch ID            send out another party member
  end                  acknowledge a finished battle
  near shop|pc|none    set which service NPC is in reach
  buy ITEM             buy one item at the shop
  heal                 heal the party at the PC
  move X Y             set the player tile
  save | load | reset  persistence
  status | help | quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    Encounter { x: i32, y: i32 },
    Trainer(String),
    Battle(BattleCommand),
    Switch(String),
    End,
    Near(Option<Npc>),
    Buy(ItemKind),
    Heal,
    Move { x: i32, y: i32 },
    Save,
    Load,
    Reset,
    Status,
    Help,
    Quit,
}

/// Parses one input line. Blank lines and `#` comments yield `None`.
pub fn parse_command(line: &str) -> anyhow::Result<Option<ConsoleCommand>> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }
    let mut words = line.split_whitespace();
    let Some(head) = words.next() else {
        return Ok(None);
    };
    let command = match head.to_ascii_lowercase().as_str() {
        "encounter" => {
            let (x, y) = parse_tile(&mut words, "encounter")?;
            ConsoleCommand::Encounter { x, y }
        }
        "move" => {
            let (x, y) = parse_tile(&mut words, "move")?;
            ConsoleCommand::Move { x, y }
        }
        "trainer" => {
            let id = words
                .next()
                .ok_or_else(|| anyhow::anyhow!("trainer requires an id (e.g. trainer junior-mia)"))?;
            ConsoleCommand::Trainer(id.to_string())
        }
        "fight" => ConsoleCommand::Battle(BattleCommand::Fight {
            skill_id: words.next().map(str::to_string),
        }),
        "item" => {
            let item = words.next().map(parse_item).transpose()?;
            ConsoleCommand::Battle(BattleCommand::Item { item })
        }
        "catch" => ConsoleCommand::Battle(BattleCommand::Catch),
        "run" => ConsoleCommand::Battle(BattleCommand::Run),
        "switch" => {
            let id = words
                .next()
                .ok_or_else(|| anyhow::anyhow!("switch requires a party member id"))?;
            ConsoleCommand::Switch(id.to_string())
        }
        "end" => ConsoleCommand::End,
        "near" => {
            let val = words
                .next()
                .ok_or_else(|| anyhow::anyhow!("near requires shop, pc or none"))?;
            let npc = match val.to_ascii_lowercase().as_str() {
                "shop" => Some(Npc::Shop),
                "pc" => Some(Npc::Pc),
                "none" => None,
                other => anyhow::bail!("Unknown NPC {other} (use shop, pc or none)"),
            };
            ConsoleCommand::Near(npc)
        }
        "buy" => {
            let val = words
                .next()
                .ok_or_else(|| anyhow::anyhow!("buy requires an item id"))?;
            ConsoleCommand::Buy(parse_item(val)?)
        }
        "heal" => ConsoleCommand::Heal,
        "save" => ConsoleCommand::Save,
        "load" => ConsoleCommand::Load,
        "reset" => ConsoleCommand::Reset,
        "status" => ConsoleCommand::Status,
        "help" | "?" => ConsoleCommand::Help,
        "quit" | "exit" => ConsoleCommand::Quit,
        other => anyhow::bail!("Unknown command {other} (try help)"),
    };
    if let Some(extra) = words.next() {
        anyhow::bail!("Unexpected argument {extra} for {head}");
    }
    Ok(Some(command))
}

fn parse_tile<'a>(
    words: &mut impl Iterator<Item = &'a str>,
    name: &str,
) -> anyhow::Result<(i32, i32)> {
    let mut coord = |axis: &str| -> anyhow::Result<i32> {
        let val = words
            .next()
            .ok_or_else(|| anyhow::anyhow!("{name} requires X and Y"))?;
        val.parse()
            .with_context(|| format!("{name}: {axis} must be an integer, got {val}"))
    };
    let x = coord("X")?;
    let y = coord("Y")?;
    Ok((x, y))
}

fn parse_item(val: &str) -> anyhow::Result<ItemKind> {
    ItemKind::from_id(val)
        .ok_or_else(|| anyhow::anyhow!("Unknown item {val} (use potion, super_potion or antidote)"))
}

/// Runs one command against the store and returns the text to print.
pub fn execute(store: &mut GameStore, command: ConsoleCommand) -> anyhow::Result<String> {
    let state = match command {
        ConsoleCommand::Encounter { x, y } => store.trigger_encounter(x, y),
        ConsoleCommand::Trainer(id) => store.trigger_trainer_battle(&id),
        ConsoleCommand::Battle(cmd) => store.choose_battle_command(cmd),
        ConsoleCommand::Switch(id) => store.switch_battle_monster(&id),
        ConsoleCommand::End => store.end_battle(),
        ConsoleCommand::Near(npc) => store.set_nearby_npc(npc),
        ConsoleCommand::Buy(kind) => store.buy_item(kind),
        ConsoleCommand::Heal => store.heal_party_at_pc(),
        ConsoleCommand::Move { x, y } => store.set_player_tile(x, y),
        ConsoleCommand::Save => {
            store.save_game().context("Failed to save game")?;
            return Ok("Game saved.".to_string());
        }
        ConsoleCommand::Load => store.load_game(),
        ConsoleCommand::Reset => store.reset_game(),
        ConsoleCommand::Status => store.state(),
        ConsoleCommand::Help => return Ok(HELP.to_string()),
        ConsoleCommand::Quit => return Ok(String::new()),
    };
    Ok(summarize(state))
}

fn describe(monster: &PartyMonster) -> String {
    let b = &monster.battler;
    let mut line = format!(
        "{} {} Lv{} {}/{} HP [{}]",
        monster.id, b.name, b.level, b.hp, b.max_hp, b.element
    );
    if !b.status.is_none() {
        let _ = write!(line, " {:?}", b.status);
    }
    line
}

/// Plain-text rendering of the parts of the state a player looks at.
pub fn summarize(state: &GameState) -> String {
    let mut out = String::new();
    let battle = &state.battle;
    if battle.active {
        let _ = writeln!(
            out,
            "[{} turn {}] {} {}/{} vs {} Lv{} {}/{}",
            battle.phase.as_str(),
            battle.turn,
            battle.player.battler.name,
            battle.player.battler.hp,
            battle.player.battler.max_hp,
            battle.enemy.name,
            battle.enemy.level,
            battle.enemy.hp,
            battle.enemy.max_hp,
        );
    }
    let _ = writeln!(out, "{}", battle.message);
    if !state.notice.is_empty() {
        let _ = writeln!(out, "{}", state.notice);
    }
    let items: Vec<String> = state
        .items
        .iter()
        .map(|(kind, count)| format!("{} x{count}", kind.id()))
        .collect();
    let _ = writeln!(
        out,
        "Money {} | Items {} | Badges {} | Tile ({}, {})",
        state.money,
        if items.is_empty() { "none".to_string() } else { items.join(", ") },
        if state.badges.is_empty() { "none".to_string() } else { state.badges.join(", ") },
        state.player_tile.x,
        state.player_tile.y,
    );
    for monster in &state.party {
        let _ = writeln!(out, "  {}", describe(monster));
    }
    out.trim_end().to_string()
}
