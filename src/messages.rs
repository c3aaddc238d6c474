//! User-facing battle and service text.

use crate::items::{ItemKind, ItemOutcome};

pub fn idle_prompt() -> String {
    "Walk in grass to encounter a wild monster.".to_string()
}

pub fn wild_appeared(enemy: &str, level: u32) -> String {
    format!("A wild {enemy} (Lv.{level}) appeared!")
}

pub fn trainer_challenge(trainer: &str, enemy: &str) -> String {
    format!("{trainer} sent out {enemy}!")
}

pub fn attack(attacker: &str, skill: &str, damage: u32) -> String {
    format!("{attacker} used {skill}! ({damage} damage)")
}

pub fn status_chip(name: &str, chip: u32) -> String {
    format!("{name} is hurt by its condition ({chip}).")
}

pub fn victory(enemy: &str, exp: u32, reward: u32) -> String {
    format!("{enemy} fainted! Gained {exp} EXP and {reward} coins.")
}

pub fn level_up(name: &str, level: u32) -> String {
    format!("{name} grew to Lv.{level}!")
}

pub fn evolved(name: &str) -> String {
    format!("It evolved into {name}!")
}

pub fn badge_earned(badge: &str) -> String {
    format!("You earned the {badge}!")
}

pub fn defeated(name: &str) -> String {
    format!("{name} fainted... You blacked out.")
}

pub fn party_full() -> String {
    "Your party is full (6/6). You can't catch more monsters.".to_string()
}

pub fn cannot_catch_trainer() -> String {
    "You can't catch a trainer's monster!".to_string()
}

pub fn caught(name: &str) -> String {
    format!("Gotcha! {name} joined your party.")
}

pub fn catch_failed(name: &str) -> String {
    format!("{name} broke free!")
}

pub fn no_items() -> String {
    "Your bag is empty.".to_string()
}

pub fn used_item(kind: ItemKind, target: &str, outcome: ItemOutcome) -> String {
    match outcome {
        ItemOutcome::Healed(amount) => format!("Used a {kind}. {target} recovered {amount} HP."),
        ItemOutcome::Cured(status) => {
            format!("Used an {kind}. {target} is no longer affected by {status:?}.")
        }
        ItemOutcome::NoEffect => format!("Used a {kind}. It had no effect on {target}."),
    }
}

pub fn cannot_flee_trainer() -> String {
    "You can't run from a trainer battle!".to_string()
}

pub fn escaped() -> String {
    "Got away safely!".to_string()
}

pub fn escape_failed() -> String {
    "Couldn't get away!".to_string()
}

pub fn switched(name: &str) -> String {
    format!("Go, {name}!")
}

pub fn cannot_switch_fainted(name: &str) -> String {
    format!("{name} has no energy left to battle!")
}

pub fn already_in_battle(name: &str) -> String {
    format!("{name} is already in battle!")
}

pub fn unknown_monster(id: &str) -> String {
    format!("No party monster with id {id}.")
}

pub fn bought(kind: ItemKind, money: u32) -> String {
    format!("Bought a {kind}. {money} coins left.")
}

pub fn not_enough_money(kind: ItemKind, price: u32) -> String {
    format!("A {kind} costs {price} coins. You can't afford it.")
}

pub fn no_shop_nearby() -> String {
    "Talk to the shopkeeper to buy items.".to_string()
}

pub fn party_healed() -> String {
    "Your party has been fully restored!".to_string()
}

pub fn no_pc_nearby() -> String {
    "Use the PC to heal your party.".to_string()
}

pub fn busy_in_battle() -> String {
    "You can't do that during a battle.".to_string()
}

pub fn loss_penalty(fine: u32) -> String {
    format!("You paid {fine} coins and hurried back to safety.")
}
