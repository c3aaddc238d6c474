//! Battle state machine: encounter entry, player commands, the enemy's reply
//! and the end-of-battle bookkeeping.
//!
//! Every entry point mutates a [`GameState`] in place and never fails. Illegal
//! requests leave the state untouched apart from the battle message.

use crate::capture::{calculate_catch_chance, roll_catch, STANDARD_BALL};
use crate::constants::{ESCAPE_CHANCE, LOSS_FINE, PARTY_CAP, RESPAWN_TILE, TRAINER_REWARD, WILD_REWARD};
use crate::damage::{apply_damage, apply_end_turn_status, calculate_damage};
use crate::items::{apply_item, ItemKind, ItemPolicy};
use crate::messages;
use crate::model::{BattleSnapshot, Encounter, GameState, PartyMonster, Phase, Side, SkillCast, TrainerBattle};
use crate::progression::{battle_exp, create_starter_monster, create_wild_enemy, grant_battle_exp, party_monster_from_battler};
use crate::skills::{choose_skill, select_skill, Skill};
use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "lowercase")]
pub enum BattleCommand {
    Fight {
        #[serde(default)]
        skill_id: Option<String>,
    },
    Item {
        #[serde(default)]
        item: Option<ItemKind>,
    },
    Catch,
    Run,
}

impl BattleCommand {
    pub fn fight() -> Self {
        BattleCommand::Fight { skill_id: None }
    }

    pub fn item() -> Self {
        BattleCommand::Item { item: None }
    }
}

/// Starts a wild battle. Ignored while another battle is active.
pub fn start_wild_battle<R: Rng + ?Sized>(
    state: &mut GameState,
    x: i32,
    y: i32,
    at_ms: u64,
    rng: &mut R,
) -> bool {
    if state.battle.active {
        tracing::debug!(x, y, "encounter ignored, battle already active");
        return false;
    }
    promote_healthy_lead(state);
    let Some(lead) = state.lead().cloned() else {
        return false;
    };
    let enemy = create_wild_enemy(lead.battler.level, state.badges.len() as u32, rng);
    state.last_encounter = Some(Encounter { x, y, at: at_ms });
    tracing::info!(enemy = %enemy.name, level = enemy.level, x, y, "wild battle started");
    state.battle = BattleSnapshot {
        active: true,
        phase: Phase::PlayerTurn,
        message: messages::wild_appeared(&enemy.name, enemy.level),
        player: lead,
        enemy,
        last_damage: 0,
        last_skill_cast: None,
        turn: 0,
        trainer_battle: None,
    };
    true
}

/// Starts a scripted trainer battle unless one is active or the trainer
/// was already beaten.
pub fn start_trainer_battle(state: &mut GameState, trainer: &TrainerBattle) -> bool {
    if state.battle.active || state.has_defeated(&trainer.id) {
        tracing::debug!(trainer = %trainer.id, "trainer challenge ignored");
        return false;
    }
    promote_healthy_lead(state);
    let Some(lead) = state.lead().cloned() else {
        return false;
    };
    tracing::info!(trainer = %trainer.id, "trainer battle started");
    state.battle = BattleSnapshot {
        active: true,
        phase: Phase::PlayerTurn,
        message: messages::trainer_challenge(&trainer.name, &trainer.enemy.name),
        player: lead,
        enemy: trainer.enemy.clone(),
        last_damage: 0,
        last_skill_cast: None,
        turn: 0,
        trainer_battle: Some(trainer.clone()),
    };
    true
}

fn promote_healthy_lead(state: &mut GameState) {
    let lead_fainted = state.lead().is_some_and(|m| m.battler.is_fainted());
    if !lead_fainted {
        return;
    }
    if let Some(idx) = state.party.iter().position(|m| !m.battler.is_fainted()) {
        let healthy = state.party.remove(idx);
        state.party.insert(0, healthy);
    }
}

/// Dispatches a player command. Ignored unless it is the player's turn.
pub fn choose_battle_command<R: Rng + ?Sized>(
    state: &mut GameState,
    command: &BattleCommand,
    policy: &dyn ItemPolicy,
    rng: &mut R,
) {
    if !state.battle.accepts_commands() {
        tracing::debug!(phase = ?state.battle.phase, ?command, "command rejected for phase");
        return;
    }
    match command {
        BattleCommand::Fight { skill_id } => fight(state, skill_id.as_deref(), rng),
        BattleCommand::Item { item } => use_item(state, *item, policy, rng),
        BattleCommand::Catch => try_catch(state, rng),
        BattleCommand::Run => try_run(state, rng),
    }
}

fn fight<R: Rng + ?Sized>(state: &mut GameState, skill_id: Option<&str>, rng: &mut R) {
    let player_skill = select_skill(&state.battle.player.battler, skill_id, rng);
    let enemy_skill = choose_skill(&state.battle.enemy, rng);
    // Ties go to the player.
    let player_first = state.battle.player.battler.speed >= state.battle.enemy.speed;
    let mut lines = Vec::new();

    if player_first {
        lines.push(strike(&mut state.battle, Side::Player, player_skill, rng));
        if !state.battle.enemy.is_fainted() {
            lines.push(strike(&mut state.battle, Side::Enemy, enemy_skill, rng));
        }
    } else {
        lines.push(strike(&mut state.battle, Side::Enemy, enemy_skill, rng));
        if !state.battle.player.battler.is_fainted() {
            lines.push(strike(&mut state.battle, Side::Player, player_skill, rng));
        }
    }

    let battle = &mut state.battle;
    for battler in [&mut battle.player.battler, &mut battle.enemy] {
        let chip = apply_end_turn_status(battler);
        if chip > 0 {
            lines.push(messages::status_chip(&battler.name, chip));
        }
    }
    battle.turn += 1;

    if state.battle.enemy.is_fainted() {
        resolve_victory(state, &mut lines);
    } else if state.battle.player.battler.is_fainted() {
        lines.push(messages::defeated(&state.battle.player.battler.name));
        state.battle.phase = Phase::Lost;
        tracing::info!(turn = state.battle.turn, "battle lost");
    } else {
        state.battle.phase = Phase::PlayerTurn;
    }
    state.battle.message = lines.join(" ");
    state.sync_battle_player();
}

/// One hit from `by` against the other side. Returns the battle line.
fn strike<R: Rng + ?Sized>(battle: &mut BattleSnapshot, by: Side, skill: &Skill, rng: &mut R) -> String {
    let (attacker, defender) = match by {
        Side::Player => (&battle.player.battler, &mut battle.enemy),
        Side::Enemy => (&battle.enemy, &mut battle.player.battler),
    };
    let damage = calculate_damage(attacker, defender, skill.power, rng);
    apply_damage(defender, damage);
    let line = messages::attack(&attacker.name, skill.name, damage);
    let nonce = battle.last_skill_cast.as_ref().map_or(1, |cast| cast.nonce + 1);
    battle.last_skill_cast = Some(SkillCast {
        by,
        skill_id: skill.id.to_string(),
        nonce,
    });
    battle.last_damage = damage;
    line
}

fn resolve_victory(state: &mut GameState, lines: &mut Vec<String>) {
    let trainer = state.battle.trainer_battle.clone();
    let foe_level = state.battle.enemy.level;
    let result = grant_battle_exp(&state.battle.player, foe_level, trainer.is_some());
    let reward = if trainer.is_some() { TRAINER_REWARD } else { WILD_REWARD };
    state.money = state.money.saturating_add(reward);

    lines.push(messages::victory(
        &state.battle.enemy.name,
        battle_exp(foe_level, trainer.is_some()),
        reward,
    ));
    if result.leveled_up {
        lines.push(messages::level_up(&state.battle.player.battler.name, result.monster.battler.level));
    }
    if result.evolved {
        lines.push(messages::evolved(&result.monster.battler.name));
    }
    state.battle.player = result.monster;

    if let Some(trainer) = trainer {
        if !state.has_defeated(&trainer.id) {
            state.defeated_trainers.push(trainer.id.clone());
        }
        if !state.badges.contains(&trainer.badge) {
            lines.push(messages::badge_earned(&trainer.badge));
            state.badges.push(trainer.badge);
        }
    }
    state.battle.phase = Phase::Resolved;
    tracing::info!(reward, money = state.money, "battle won");
}

fn try_catch<R: Rng + ?Sized>(state: &mut GameState, rng: &mut R) {
    if state.battle.is_trainer_battle() {
        state.battle.message = messages::cannot_catch_trainer();
        return;
    }
    if state.party.len() >= PARTY_CAP {
        state.battle.message = messages::party_full();
        return;
    }
    let chance = calculate_catch_chance(&state.battle.enemy, STANDARD_BALL);
    if roll_catch(chance, rng) {
        let id = fresh_monster_id(&state.party, &state.battle.enemy.name);
        let caught = party_monster_from_battler(&state.battle.enemy, id);
        tracing::info!(monster = %caught.id, chance, "capture succeeded");
        state.battle.message = messages::caught(&caught.battler.name);
        state.party.push(caught);
        state.battle.phase = Phase::Caught;
    } else {
        tracing::debug!(chance, "capture failed");
        let line = messages::catch_failed(&state.battle.enemy.name);
        yield_to_enemy(state, line, rng);
    }
}

fn fresh_monster_id(party: &[PartyMonster], name: &str) -> String {
    let base = name.to_ascii_lowercase();
    (party.len() + 1..)
        .map(|n| format!("{base}-{n}"))
        .find(|id| party.iter().all(|m| &m.id != id))
        .unwrap_or(base)
}

fn use_item<R: Rng + ?Sized>(
    state: &mut GameState,
    requested: Option<ItemKind>,
    policy: &dyn ItemPolicy,
    rng: &mut R,
) {
    let picked = policy.pick(&state.items, requested, &state.battle.player.battler);
    let Some(kind) = picked.filter(|kind| state.items.take(*kind)) else {
        state.battle.message = messages::no_items();
        return;
    };
    let outcome = apply_item(kind, &mut state.battle.player.battler);
    tracing::debug!(item = kind.id(), ?outcome, "item used");
    let line = messages::used_item(kind, &state.battle.player.battler.name, outcome);
    state.sync_battle_player();
    yield_to_enemy(state, line, rng);
}

fn try_run<R: Rng + ?Sized>(state: &mut GameState, rng: &mut R) {
    if state.battle.is_trainer_battle() {
        state.battle.message = messages::cannot_flee_trainer();
        return;
    }
    if rng.gen::<f64>() < ESCAPE_CHANCE {
        state.battle.phase = Phase::Escaped;
        state.battle.message = messages::escaped();
        tracing::info!("escaped from battle");
    } else {
        yield_to_enemy(state, messages::escape_failed(), rng);
    }
}

/// Switches the active monster. Costs the turn: the enemy attacks the
/// newcomer right away.
pub fn switch_battle_monster<R: Rng + ?Sized>(state: &mut GameState, monster_id: &str, rng: &mut R) {
    if !state.battle.accepts_commands() {
        tracing::debug!(phase = ?state.battle.phase, monster_id, "switch rejected for phase");
        return;
    }
    let Some(idx) = state.party_index(monster_id) else {
        state.battle.message = messages::unknown_monster(monster_id);
        return;
    };
    let target = &state.party[idx];
    if target.id == state.battle.player.id {
        state.battle.message = messages::already_in_battle(&target.battler.name);
        return;
    }
    if target.battler.is_fainted() {
        state.battle.message = messages::cannot_switch_fainted(&target.battler.name);
        return;
    }

    state.sync_battle_player();
    let incoming = state.party.remove(idx);
    state.party.insert(0, incoming.clone());
    tracing::debug!(monster = %incoming.id, "switched active monster");
    let line = messages::switched(&incoming.battler.name);
    state.battle.player = incoming;
    yield_to_enemy(state, line, rng);
}

fn yield_to_enemy<R: Rng + ?Sized>(state: &mut GameState, line: String, rng: &mut R) {
    state.battle.phase = Phase::EnemyTurn;
    state.battle.message = line;
    run_enemy_turn(state, rng);
}

/// The enemy's automatic move. Only acts during `EnemyTurn`.
pub fn run_enemy_turn<R: Rng + ?Sized>(state: &mut GameState, rng: &mut R) {
    if !state.battle.active || state.battle.phase != Phase::EnemyTurn {
        return;
    }
    let skill = choose_skill(&state.battle.enemy, rng);
    let line = strike(&mut state.battle, Side::Enemy, skill, rng);
    let battle = &mut state.battle;
    battle.turn += 1;
    let mut message = std::mem::take(&mut battle.message);
    if !message.is_empty() {
        message.push(' ');
    }
    message.push_str(&line);

    if battle.player.battler.is_fainted() {
        message.push(' ');
        message.push_str(&messages::defeated(&battle.player.battler.name));
        battle.phase = Phase::Lost;
        tracing::info!(turn = battle.turn, "battle lost");
    } else {
        battle.phase = Phase::PlayerTurn;
    }
    battle.message = message;
    state.sync_battle_player();
}

/// Acknowledges a finished battle and resets the snapshot to idle.
///
/// Returns the phase the battle ended in, or `None` when there was nothing
/// to end. A lost battle also applies the loss penalty.
pub fn end_battle(state: &mut GameState) -> Option<Phase> {
    let phase = state.battle.phase;
    if !state.battle.active || !phase.is_terminal() {
        tracing::debug!(?phase, "end battle ignored");
        return None;
    }
    state.sync_battle_player();
    let lost = phase == Phase::Lost;
    if lost {
        apply_loss_penalty(state);
    }
    let lead = state.lead().cloned().unwrap_or_else(create_starter_monster);
    state.battle = BattleSnapshot::idle(&lead);
    if lost {
        state.battle.message = messages::loss_penalty(LOSS_FINE);
    }
    tracing::info!(?phase, "battle ended");
    Some(phase)
}

fn apply_loss_penalty(state: &mut GameState) {
    for monster in &mut state.party {
        monster.battler.restore();
    }
    state.money = state.money.saturating_sub(LOSS_FINE);
    state.player_tile = RESPAWN_TILE.into();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn party_of(n: usize) -> Vec<PartyMonster> {
        let starter = create_starter_monster();
        (0..n)
            .map(|i| PartyMonster {
                id: format!("mon-{i}"),
                ..starter.clone()
            })
            .collect()
    }

    #[test]
    fn fresh_ids_skip_taken_slots() {
        let mut party = party_of(1);
        party[0].id = "aquava-2".to_string();
        assert_eq!(fresh_monster_id(&party, "Aquava"), "aquava-3");
        assert_eq!(fresh_monster_id(&party, "Flameling"), "flameling-2");
    }

    #[test]
    fn fainted_lead_is_replaced_at_battle_start() {
        let mut state = GameState::new_game();
        state.party = party_of(2);
        state.party[0].battler.hp = 0;
        promote_healthy_lead(&mut state);
        assert_eq!(state.party[0].id, "mon-1");
    }

    #[test]
    fn commands_parse_from_tagged_json() {
        let cmd: BattleCommand =
            serde_json::from_str(r#"{"command":"fight","skill_id":"tackle"}"#).unwrap();
        assert_eq!(
            cmd,
            BattleCommand::Fight {
                skill_id: Some("tackle".to_string())
            }
        );
        let cmd: BattleCommand = serde_json::from_str(r#"{"command":"catch"}"#).unwrap();
        assert_eq!(cmd, BattleCommand::Catch);
    }
}
