//! Versioned save records and the upgrade path from older schemas.
//!
//! Current records carry `"schema": "v2"`. Records without a schema tag come
//! from the legacy store, which kept a bare potion count instead of an item
//! bag and never persisted the battle snapshot.

use crate::constants::{RESPAWN_TILE, STARTING_MONEY};
use crate::items::{ItemBag, ItemKind};
use crate::model::{BattleSnapshot, Encounter, GameState, NarrativeFlags, PartyMonster, Tile};
use crate::progression::create_starter_monster;
use serde::{Deserialize, Serialize};

const SCHEMA_TAG: &str = "schema";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveRecordV2 {
    pub player_tile: Tile,
    #[serde(default)]
    pub last_encounter: Option<Encounter>,
    pub party: Vec<PartyMonster>,
    #[serde(default)]
    pub badges: Vec<String>,
    #[serde(default)]
    pub defeated_trainers: Vec<String>,
    pub money: u32,
    #[serde(default)]
    pub items: ItemBag,
    pub battle: BattleSnapshot,
    #[serde(default)]
    pub flags: NarrativeFlags,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "schema")]
pub enum VersionedRecord {
    #[serde(rename = "v2")]
    V2(SaveRecordV2),
}

fn respawn_tile() -> Tile {
    RESPAWN_TILE.into()
}

fn starting_money() -> u32 {
    STARTING_MONEY
}

/// `party` and `potions` are required: an object without them is not a
/// legacy save, just malformed input.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyRecord {
    #[serde(default = "respawn_tile")]
    pub player_tile: Tile,
    #[serde(default)]
    pub last_encounter: Option<Encounter>,
    pub party: Vec<PartyMonster>,
    #[serde(default)]
    pub badges: Vec<String>,
    #[serde(default)]
    pub defeated_trainers: Vec<String>,
    #[serde(default = "starting_money")]
    pub money: u32,
    pub potions: u32,
}

/// Every schema a stored payload may be in.
#[derive(Debug, Clone, PartialEq)]
pub enum StoredRecord {
    Current(VersionedRecord),
    Legacy(LegacyRecord),
}

impl From<LegacyRecord> for SaveRecordV2 {
    fn from(legacy: LegacyRecord) -> Self {
        let mut party = legacy.party;
        if party.is_empty() {
            party.push(create_starter_monster());
        }
        let mut items = ItemBag::default();
        items.add(ItemKind::Potion, legacy.potions);
        let battle = BattleSnapshot::idle(&party[0]);
        SaveRecordV2 {
            player_tile: legacy.player_tile,
            last_encounter: legacy.last_encounter,
            party,
            badges: legacy.badges,
            defeated_trainers: legacy.defeated_trainers,
            money: legacy.money,
            items,
            battle,
            flags: NarrativeFlags::default(),
        }
    }
}

/// Brings any stored schema up to the current one.
pub fn upgrade(record: StoredRecord) -> SaveRecordV2 {
    match record {
        StoredRecord::Current(VersionedRecord::V2(record)) => record,
        StoredRecord::Legacy(legacy) => {
            tracing::info!(potions = legacy.potions, "upgrading legacy save record");
            legacy.into()
        }
    }
}

pub fn decode_record(raw: &str) -> serde_json::Result<StoredRecord> {
    let value: serde_json::Value = serde_json::from_str(raw)?;
    if value.get(SCHEMA_TAG).is_some() {
        Ok(StoredRecord::Current(serde_json::from_value(value)?))
    } else {
        Ok(StoredRecord::Legacy(serde_json::from_value(value)?))
    }
}

impl SaveRecordV2 {
    pub fn from_state(state: &GameState) -> Self {
        Self {
            player_tile: state.player_tile,
            last_encounter: state.last_encounter,
            party: state.party.clone(),
            badges: state.badges.clone(),
            defeated_trainers: state.defeated_trainers.clone(),
            money: state.money,
            items: state.items.clone(),
            battle: state.battle.clone(),
            flags: state.flags.clone(),
        }
    }

    pub fn into_state(self) -> GameState {
        let mut party = self.party;
        let mut battle = self.battle;
        if party.is_empty() {
            let starter = create_starter_monster();
            battle = BattleSnapshot::idle(&starter);
            party.push(starter);
        }
        GameState {
            party,
            badges: self.badges,
            defeated_trainers: self.defeated_trainers,
            money: self.money,
            items: self.items,
            battle,
            player_tile: self.player_tile,
            last_encounter: self.last_encounter,
            flags: self.flags,
            nearby_npc: None,
            notice: String::new(),
        }
    }
}

pub fn encode_state(state: &GameState) -> serde_json::Result<String> {
    serde_json::to_string(&VersionedRecord::V2(SaveRecordV2::from_state(state)))
}

pub fn decode_state(raw: &str) -> serde_json::Result<GameState> {
    decode_record(raw).map(|record| upgrade(record).into_state())
}
