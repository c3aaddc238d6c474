use crate::items::ItemBag;
use crate::types::{ElementType, StatusEffect};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Battler {
    pub name: String,
    pub level: u32,
    pub hp: u32,
    pub max_hp: u32,
    pub attack: u32,
    pub defense: u32,
    pub speed: u32,
    #[serde(rename = "type")]
    pub element: ElementType,
    #[serde(default)]
    pub status: StatusEffect,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub known_skills: Option<Vec<String>>,
}

impl Battler {
    pub fn is_fainted(&self) -> bool {
        self.hp == 0
    }

    pub fn take_damage(&mut self, amount: u32) {
        self.hp = self.hp.saturating_sub(amount);
    }

    /// Heals up to `amount` and returns how much HP was actually restored.
    pub fn heal(&mut self, amount: u32) -> u32 {
        let before = self.hp;
        self.hp = self.hp.saturating_add(amount).min(self.max_hp);
        self.hp - before
    }

    pub fn restore(&mut self) {
        self.hp = self.max_hp;
        self.status = StatusEffect::None;
    }
}

/// One-shot transformation applied once the owner reaches `level`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvolutionRule {
    pub level: u32,
    pub to_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_type: Option<ElementType>,
    pub attack_bonus: u32,
    pub defense_bonus: u32,
    pub speed_bonus: u32,
    pub hp_bonus: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartyMonster {
    pub id: String,
    #[serde(flatten)]
    pub battler: Battler,
    pub exp: u32,
    pub next_level_exp: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evolution_rule: Option<EvolutionRule>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainerBattle {
    pub id: String,
    pub name: String,
    pub badge: String,
    pub enemy: Battler,
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    #[default]
    Idle,
    PlayerTurn,
    EnemyTurn,
    Resolved,
    Lost,
    Caught,
    Escaped,
}

impl Phase {
    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::PlayerTurn => "player_turn",
            Phase::EnemyTurn => "enemy_turn",
            Phase::Resolved => "resolved",
            Phase::Lost => "lost",
            Phase::Caught => "caught",
            Phase::Escaped => "escaped",
        }
    }

    /// Phases that only wait for the end-of-battle acknowledgement.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            Phase::Resolved | Phase::Lost | Phase::Caught | Phase::Escaped
        )
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Player,
    Enemy,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillCast {
    pub by: Side,
    pub skill_id: String,
    pub nonce: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BattleSnapshot {
    pub active: bool,
    pub phase: Phase,
    pub player: PartyMonster,
    pub enemy: Battler,
    pub message: String,
    pub last_damage: u32,
    #[serde(default)]
    pub last_skill_cast: Option<SkillCast>,
    pub turn: u32,
    #[serde(default)]
    pub trainer_battle: Option<TrainerBattle>,
}

impl BattleSnapshot {
    pub fn idle(lead: &PartyMonster) -> Self {
        Self {
            active: false,
            phase: Phase::Idle,
            player: lead.clone(),
            enemy: placeholder_enemy(),
            message: crate::messages::idle_prompt(),
            last_damage: 0,
            last_skill_cast: None,
            turn: 0,
            trainer_battle: None,
        }
    }

    pub fn is_trainer_battle(&self) -> bool {
        self.trainer_battle.is_some()
    }

    /// Player commands are only accepted here.
    pub fn accepts_commands(&self) -> bool {
        self.active && self.phase == Phase::PlayerTurn
    }
}

fn placeholder_enemy() -> Battler {
    Battler {
        name: "Wildling".to_string(),
        level: 3,
        hp: 22,
        max_hp: 22,
        attack: 10,
        defense: 8,
        speed: 9,
        element: ElementType::Normal,
        status: StatusEffect::None,
        known_skills: None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    pub x: i32,
    pub y: i32,
}

impl From<(i32, i32)> for Tile {
    fn from((x, y): (i32, i32)) -> Self {
        Tile { x, y }
    }
}

/// Where the last wild encounter happened. Display only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Encounter {
    pub x: i32,
    pub y: i32,
    pub at: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NarrativeFlags {
    #[serde(default)]
    pub intro_shown: bool,
}

/// Service NPCs the overworld reports as being in reach.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Npc {
    Shop,
    Pc,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GameState {
    pub party: Vec<PartyMonster>,
    pub badges: Vec<String>,
    pub defeated_trainers: Vec<String>,
    pub money: u32,
    pub items: ItemBag,
    pub battle: BattleSnapshot,
    pub player_tile: Tile,
    pub last_encounter: Option<Encounter>,
    pub flags: NarrativeFlags,
    // Session-only: set by the overworld, never persisted.
    pub nearby_npc: Option<Npc>,
    pub notice: String,
}

impl GameState {
    pub fn new_game() -> Self {
        let starter = crate::progression::create_starter_monster();
        Self {
            battle: BattleSnapshot::idle(&starter),
            party: vec![starter],
            badges: Vec::new(),
            defeated_trainers: Vec::new(),
            money: crate::constants::STARTING_MONEY,
            items: ItemBag::starting(),
            player_tile: crate::constants::RESPAWN_TILE.into(),
            last_encounter: None,
            flags: NarrativeFlags::default(),
            nearby_npc: None,
            notice: String::new(),
        }
    }

    pub fn lead(&self) -> Option<&PartyMonster> {
        self.party.first()
    }

    pub fn has_defeated(&self, trainer_id: &str) -> bool {
        self.defeated_trainers.iter().any(|id| id == trainer_id)
    }

    pub fn party_index(&self, monster_id: &str) -> Option<usize> {
        self.party.iter().position(|m| m.id == monster_id)
    }

    /// Copies the in-battle player back into its party slot.
    pub(crate) fn sync_battle_player(&mut self) {
        let player = self.battle.player.clone();
        if let Some(idx) = self.party_index(&player.id) {
            self.party[idx] = player;
        }
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new_game()
    }
}
