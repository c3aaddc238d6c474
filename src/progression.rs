//! Experience, level-ups, evolution and creature factories.

use crate::model::{Battler, EvolutionRule, PartyMonster};
use crate::types::{ElementType, StatusEffect};
use rand::seq::SliceRandom;
use rand::Rng;

const NEXT_EXP_BASE: u32 = 18;
const NEXT_EXP_PER_LEVEL: u32 = 6;
const MIN_EXP_AWARD: u32 = 6;
const TRAINER_EXP_BONUS: u32 = 8;

#[derive(Debug, Clone, PartialEq)]
pub struct ProgressionResult {
    pub monster: PartyMonster,
    pub leveled_up: bool,
    pub evolved: bool,
}

pub fn exp_for_next_level(level: u32) -> u32 {
    NEXT_EXP_BASE + level * NEXT_EXP_PER_LEVEL
}

pub fn battle_exp(foe_level: u32, trainer_battle: bool) -> u32 {
    let bonus = if trainer_battle { TRAINER_EXP_BONUS } else { 0 };
    (foe_level * 4 + bonus).max(MIN_EXP_AWARD)
}

pub fn create_starter_monster() -> PartyMonster {
    PartyMonster {
        id: "sproutle-1".to_string(),
        battler: Battler {
            name: "Sproutle".to_string(),
            level: 5,
            hp: 34,
            max_hp: 34,
            attack: 13,
            defense: 11,
            speed: 12,
            element: ElementType::Grass,
            status: StatusEffect::None,
            known_skills: Some(vec!["vine_whip".to_string(), "tackle".to_string()]),
        },
        exp: 0,
        next_level_exp: exp_for_next_level(5),
        evolution_rule: Some(EvolutionRule {
            level: 8,
            to_name: "Florabram".to_string(),
            to_type: Some(ElementType::Grass),
            attack_bonus: 4,
            defense_bonus: 3,
            speed_bonus: 2,
            hp_bonus: 8,
        }),
    }
}

const WILD_ROSTER: [(&str, ElementType); 5] = [
    ("Flameling", ElementType::Fire),
    ("Aquava", ElementType::Water),
    ("Budling", ElementType::Grass),
    ("Sparkit", ElementType::Electric),
    ("Pebbit", ElementType::Normal),
];

/// Rolls a wild opponent scaled to the lead's level and the badges earned.
pub fn create_wild_enemy<R: Rng + ?Sized>(lead_level: u32, badge_count: u32, rng: &mut R) -> Battler {
    let (name, element) = WILD_ROSTER
        .choose(rng)
        .copied()
        .unwrap_or(WILD_ROSTER[0]);
    let spread: u32 = rng.gen_range(0..=2);
    let level = (lead_level + spread).saturating_sub(1).max(2) + badge_count;
    Battler {
        name: name.to_string(),
        level,
        hp: 20 + level * 2,
        max_hp: 20 + level * 2,
        attack: 7 + level,
        defense: 6 + level,
        speed: 6 + level,
        element,
        status: StatusEffect::None,
        known_skills: None,
    }
}

/// Turns a captured battler into a fresh party member.
pub fn party_monster_from_battler(battler: &Battler, id: impl Into<String>) -> PartyMonster {
    PartyMonster {
        id: id.into(),
        battler: battler.clone(),
        exp: 0,
        next_level_exp: exp_for_next_level(battler.level),
        evolution_rule: None,
    }
}

pub fn grant_battle_exp(monster: &PartyMonster, foe_level: u32, trainer_battle: bool) -> ProgressionResult {
    let mut updated = monster.clone();
    updated.exp += battle_exp(foe_level, trainer_battle);
    let mut leveled_up = false;

    while updated.exp >= updated.next_level_exp {
        level_up(&mut updated);
        leveled_up = true;
    }
    if leveled_up {
        tracing::info!(monster = %updated.battler.name, level = updated.battler.level, "level up");
    }

    let evolved = maybe_evolve(&mut updated);
    ProgressionResult {
        monster: updated,
        leveled_up,
        evolved,
    }
}

fn level_up(monster: &mut PartyMonster) {
    monster.exp = monster.exp.saturating_sub(monster.next_level_exp);
    let stats = &mut monster.battler;
    stats.level += 1;
    stats.max_hp += 3;
    stats.hp = stats.max_hp;
    stats.attack += 2;
    stats.defense += 2;
    stats.speed += 1;
    monster.next_level_exp = exp_for_next_level(stats.level);
}

/// Applies the evolution rule once its level is reached, then drops the rule.
pub fn maybe_evolve(monster: &mut PartyMonster) -> bool {
    let ready = matches!(&monster.evolution_rule, Some(rule) if monster.battler.level >= rule.level);
    if !ready {
        return false;
    }
    let Some(rule) = monster.evolution_rule.take() else {
        return false;
    };
    let from = std::mem::replace(&mut monster.battler.name, rule.to_name);
    let stats = &mut monster.battler;
    if let Some(element) = rule.to_type {
        stats.element = element;
    }
    stats.max_hp += rule.hp_bonus;
    stats.hp = stats.max_hp;
    stats.attack += rule.attack_bonus;
    stats.defense += rule.defense_bonus;
    stats.speed += rule.speed_bonus;
    tracing::info!(from = %from, to = %stats.name, "evolution");
    true
}
