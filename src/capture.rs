use crate::constants::{CATCH_BASE_RATE, MAX_CATCH_CHANCE, MIN_CATCH_CHANCE, STATUS_CATCH_BONUS};
use crate::model::Battler;
use rand::Rng;

pub const STANDARD_BALL: f64 = 1.0;

/// Probability of catching `target`, always within `[0.05, 0.95]`.
///
/// The HP factor runs from 1/3 at full health up to 1 as HP approaches zero;
/// any status condition multiplies it by 1.35.
pub fn calculate_catch_chance(target: &Battler, ball_modifier: f64) -> f64 {
    let max_hp = target.max_hp.max(1) as f64;
    let hp = target.hp.min(target.max_hp) as f64;
    let hp_factor = (3.0 * max_hp - 2.0 * hp) / (3.0 * max_hp);
    let status_bonus = if target.status.is_none() {
        1.0
    } else {
        STATUS_CATCH_BONUS
    };
    (hp_factor * ball_modifier * status_bonus * CATCH_BASE_RATE)
        .clamp(MIN_CATCH_CHANCE, MAX_CATCH_CHANCE)
}

pub fn roll_catch<R: Rng + ?Sized>(chance: f64, rng: &mut R) -> bool {
    rng.gen::<f64>() < chance
}
