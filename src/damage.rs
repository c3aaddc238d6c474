use crate::model::Battler;
use crate::types::{status_multiplier, type_multiplier};
use rand::Rng;

pub const MIN_RANDOM_FACTOR: f64 = 0.85;
pub const MAX_RANDOM_FACTOR: f64 = 1.0;

/// Rolls the variance factor and computes the damage of one hit.
pub fn calculate_damage<R: Rng + ?Sized>(
    attacker: &Battler,
    defender: &Battler,
    power: u32,
    rng: &mut R,
) -> u32 {
    let random_factor = rng.gen_range(MIN_RANDOM_FACTOR..MAX_RANDOM_FACTOR);
    calculate_damage_with_factor(attacker, defender, power, random_factor)
}

pub fn calculate_damage_with_factor(
    attacker: &Battler,
    defender: &Battler,
    power: u32,
    random_factor: f64,
) -> u32 {
    let level = attacker.level as f64;
    let attack = attacker.attack as f64;
    let defense = defender.defense.max(1) as f64;
    let base = ((2.0 * level / 5.0 + 2.0) * power as f64 * (attack / defense)) / 50.0 + 2.0;
    let type_mod = type_multiplier(attacker.element, defender.element);
    let status_mod = status_multiplier(attacker.status);
    let random_factor = random_factor.clamp(MIN_RANDOM_FACTOR, MAX_RANDOM_FACTOR);
    let damage = (base * type_mod * status_mod * random_factor).floor();
    damage.max(1.0) as u32
}

/// Removes `amount` HP, never going below zero. Returns the HP actually lost.
pub fn apply_damage(target: &mut Battler, amount: u32) -> u32 {
    let dealt = amount.min(target.hp);
    target.take_damage(dealt);
    dealt
}

/// Chip damage taken at the end of a turn, before it is applied.
pub fn end_turn_chip(target: &Battler) -> u32 {
    if !target.status.deals_chip_damage() {
        return 0;
    }
    ((target.max_hp as f64 * 0.08).floor() as u32).max(1)
}

/// Applies burn/poison chip damage and returns the amount removed.
pub fn apply_end_turn_status(target: &mut Battler) -> u32 {
    let chip = end_turn_chip(target);
    apply_damage(target, chip)
}
