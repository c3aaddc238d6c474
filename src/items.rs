use crate::model::Battler;
use crate::types::StatusEffect;
use phf::phf_map;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    Potion,
    SuperPotion,
    Antidote,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ItemEffect {
    Heal(u32),
    Cure,
}

#[derive(Clone, Copy, Debug)]
pub struct ItemInfo {
    pub name: &'static str,
    pub price: u32,
    pub effect: ItemEffect,
}

static ITEM_IDS: phf::Map<&'static str, ItemKind> = phf_map! {
    "potion" => ItemKind::Potion,
    "super_potion" => ItemKind::SuperPotion,
    "antidote" => ItemKind::Antidote,
};

impl ItemKind {
    pub const ALL: [ItemKind; 3] = [ItemKind::Potion, ItemKind::SuperPotion, ItemKind::Antidote];

    pub fn from_id(id: &str) -> Option<ItemKind> {
        ITEM_IDS.get(id.to_ascii_lowercase().as_str()).copied()
    }

    pub fn id(self) -> &'static str {
        match self {
            ItemKind::Potion => "potion",
            ItemKind::SuperPotion => "super_potion",
            ItemKind::Antidote => "antidote",
        }
    }

    pub fn info(self) -> ItemInfo {
        match self {
            ItemKind::Potion => ItemInfo {
                name: "Potion",
                price: 20,
                effect: ItemEffect::Heal(20),
            },
            ItemKind::SuperPotion => ItemInfo {
                name: "Super Potion",
                price: 50,
                effect: ItemEffect::Heal(50),
            },
            ItemKind::Antidote => ItemInfo {
                name: "Antidote",
                price: 15,
                effect: ItemEffect::Cure,
            },
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.info().name)
    }
}

/// Item counts keyed by kind. Empty entries are removed, so counts stay positive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemBag(BTreeMap<ItemKind, u32>);

impl ItemBag {
    pub fn starting() -> Self {
        let mut bag = ItemBag::default();
        bag.add(ItemKind::Potion, crate::constants::STARTING_POTIONS);
        bag
    }

    pub fn count(&self, kind: ItemKind) -> u32 {
        self.0.get(&kind).copied().unwrap_or(0)
    }

    pub fn add(&mut self, kind: ItemKind, amount: u32) {
        if amount == 0 {
            return;
        }
        *self.0.entry(kind).or_insert(0) += amount;
    }

    /// Removes one unit; false if none was held.
    pub fn take(&mut self, kind: ItemKind) -> bool {
        match self.0.get_mut(&kind) {
            Some(count) if *count > 0 => {
                *count -= 1;
                if *count == 0 {
                    self.0.remove(&kind);
                }
                true
            }
            _ => false,
        }
    }

    pub fn total(&self) -> u32 {
        self.0.values().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = (ItemKind, u32)> + '_ {
        self.0.iter().map(|(kind, count)| (*kind, *count))
    }
}

/// Decides which item the `item` battle command consumes.
pub trait ItemPolicy {
    fn pick(&self, bag: &ItemBag, requested: Option<ItemKind>, target: &Battler) -> Option<ItemKind>;
}

/// Honors an explicit request when it is in the bag, else walks a fixed
/// priority list.
#[derive(Debug, Clone)]
pub struct PriorityItemPolicy {
    pub order: Vec<ItemKind>,
}

impl Default for PriorityItemPolicy {
    fn default() -> Self {
        Self {
            order: vec![ItemKind::SuperPotion, ItemKind::Potion, ItemKind::Antidote],
        }
    }
}

impl ItemPolicy for PriorityItemPolicy {
    fn pick(&self, bag: &ItemBag, requested: Option<ItemKind>, _target: &Battler) -> Option<ItemKind> {
        if let Some(kind) = requested.filter(|kind| bag.count(*kind) > 0) {
            return Some(kind);
        }
        self.order.iter().copied().find(|kind| bag.count(*kind) > 0)
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ItemOutcome {
    Healed(u32),
    Cured(StatusEffect),
    NoEffect,
}

pub fn apply_item(kind: ItemKind, target: &mut Battler) -> ItemOutcome {
    match kind.info().effect {
        ItemEffect::Heal(amount) => match target.heal(amount) {
            0 => ItemOutcome::NoEffect,
            healed => ItemOutcome::Healed(healed),
        },
        ItemEffect::Cure => {
            let previous = std::mem::take(&mut target.status);
            if previous.is_none() {
                ItemOutcome::NoEffect
            } else {
                ItemOutcome::Cured(previous)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ElementType;

    fn target() -> Battler {
        Battler {
            name: "Target".to_string(),
            level: 5,
            hp: 10,
            max_hp: 40,
            attack: 10,
            defense: 10,
            speed: 10,
            element: ElementType::Grass,
            status: StatusEffect::Poison,
            known_skills: None,
        }
    }

    #[test]
    fn take_removes_empty_entries() {
        let mut bag = ItemBag::default();
        bag.add(ItemKind::Antidote, 1);
        assert!(bag.take(ItemKind::Antidote));
        assert!(!bag.take(ItemKind::Antidote));
        assert!(bag.is_empty());
        assert_eq!(bag.iter().count(), 0);
    }

    #[test]
    fn policy_prefers_strongest_heal() {
        let mut bag = ItemBag::default();
        bag.add(ItemKind::Potion, 2);
        bag.add(ItemKind::SuperPotion, 1);
        bag.add(ItemKind::Antidote, 1);
        let policy = PriorityItemPolicy::default();
        assert_eq!(policy.pick(&bag, None, &target()), Some(ItemKind::SuperPotion));
        assert_eq!(policy.pick(&bag, Some(ItemKind::Antidote), &target()), Some(ItemKind::Antidote));
    }

    #[test]
    fn policy_ignores_requests_not_in_bag() {
        let mut bag = ItemBag::default();
        bag.add(ItemKind::Antidote, 1);
        let policy = PriorityItemPolicy::default();
        assert_eq!(policy.pick(&bag, Some(ItemKind::Potion), &target()), Some(ItemKind::Antidote));
        assert_eq!(policy.pick(&ItemBag::default(), None, &target()), None);
    }

    #[test]
    fn potions_heal_up_to_max() {
        let mut mon = target();
        assert_eq!(apply_item(ItemKind::Potion, &mut mon), ItemOutcome::Healed(20));
        assert_eq!(apply_item(ItemKind::SuperPotion, &mut mon), ItemOutcome::Healed(10));
        assert_eq!(apply_item(ItemKind::Potion, &mut mon), ItemOutcome::NoEffect);
        assert_eq!(mon.hp, 40);
    }

    #[test]
    fn antidote_clears_status() {
        let mut mon = target();
        assert_eq!(apply_item(ItemKind::Antidote, &mut mon), ItemOutcome::Cured(StatusEffect::Poison));
        assert_eq!(mon.status, StatusEffect::None);
    }

    #[test]
    fn bag_round_trips_as_id_map() {
        let bag = ItemBag::starting();
        let json = serde_json::to_string(&bag).unwrap();
        assert_eq!(json, r#"{"potion":1}"#);
        assert_eq!(ItemKind::from_id("Super_Potion"), Some(ItemKind::SuperPotion));
    }
}
