//! Tuning values for battles, the economy and persistence.

use std::time::Duration;

pub const PARTY_CAP: usize = 6;

pub const WILD_REWARD: u32 = 18;
pub const TRAINER_REWARD: u32 = 45;
pub const LOSS_FINE: u32 = 30;

pub const STARTING_MONEY: u32 = 120;
pub const STARTING_POTIONS: u32 = 1;

/// Tile the player is sent back to after losing a battle.
pub const RESPAWN_TILE: (i32, i32) = (3, 2);

pub const ESCAPE_CHANCE: f64 = 0.7;

pub const MIN_CATCH_CHANCE: f64 = 0.05;
pub const MAX_CATCH_CHANCE: f64 = 0.95;
pub const CATCH_BASE_RATE: f64 = 0.55;
pub const STATUS_CATCH_BONUS: f64 = 1.35;

pub const SKILL_SLOTS: usize = 4;
pub const DEFAULT_POWER: u32 = 24;

pub const AUTOSAVE_DELAY: Duration = Duration::from_millis(300);
