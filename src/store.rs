//! The game state store: the single owner of [`GameState`].
//!
//! All writes go through command methods. Each command notifies subscribers
//! synchronously and re-arms the debounced autosave; `save_game` writes
//! immediately. The host loop drives the autosave timer through [`GameStore::tick`].

use crate::autosave::{Clock, Debouncer, SystemClock};
use crate::battle::{self, BattleCommand};
use crate::constants::AUTOSAVE_DELAY;
use crate::items::{ItemKind, ItemPolicy, PriorityItemPolicy};
use crate::messages;
use crate::model::{GameState, Npc};
use crate::save::{decode_record, encode_state, upgrade, StoredRecord};
use crate::storage::{SaveStorage, StorageError};
use crate::trainers::find_trainer;
use rand::rngs::SmallRng;
use rand::{RngCore, SeedableRng};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

pub type SubscriptionId = u64;

type Listener = Box<dyn FnMut(&GameState)>;

/// Where the state came from when the store last read storage.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LoadSource {
    Defaults,
    Current,
    Legacy,
}

pub struct GameStore {
    state: GameState,
    storage: Box<dyn SaveStorage>,
    clock: Box<dyn Clock>,
    rng: Box<dyn RngCore>,
    item_policy: Box<dyn ItemPolicy>,
    autosave: Debouncer,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: SubscriptionId,
    load_source: LoadSource,
}

impl GameStore {
    /// Loads the saved game from `storage`, or starts a new one.
    pub fn open(storage: impl SaveStorage + 'static) -> Self {
        let mut store = Self::from_state(GameState::new_game(), storage);
        store.reload();
        store
    }

    /// Starts from an explicit state without reading storage.
    pub fn from_state(state: GameState, storage: impl SaveStorage + 'static) -> Self {
        Self {
            state,
            storage: Box::new(storage),
            clock: Box::new(SystemClock::new()),
            rng: Box::new(SmallRng::from_entropy()),
            item_policy: Box::new(PriorityItemPolicy::default()),
            autosave: Debouncer::new(AUTOSAVE_DELAY),
            listeners: Vec::new(),
            next_subscription: 0,
            load_source: LoadSource::Defaults,
        }
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn with_seed(self, seed: u64) -> Self {
        self.with_rng(SmallRng::seed_from_u64(seed))
    }

    pub fn with_rng(mut self, rng: impl RngCore + 'static) -> Self {
        self.set_rng(rng);
        self
    }

    pub fn with_autosave_delay(mut self, delay: Duration) -> Self {
        self.autosave.set_delay(delay);
        self
    }

    pub fn with_item_policy(mut self, policy: impl ItemPolicy + 'static) -> Self {
        self.item_policy = Box::new(policy);
        self
    }

    pub fn set_rng(&mut self, rng: impl RngCore + 'static) {
        self.rng = Box::new(rng);
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn load_source(&self) -> LoadSource {
        self.load_source
    }

    pub fn has_pending_autosave(&self) -> bool {
        self.autosave.is_pending()
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&GameState) + 'static) -> SubscriptionId {
        self.next_subscription += 1;
        let id = self.next_subscription;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sub, _)| *sub != id);
        self.listeners.len() != before
    }

    fn commit(&mut self) -> &GameState {
        for (_, listener) in &mut self.listeners {
            listener(&self.state);
        }
        match encode_state(&self.state) {
            Ok(payload) => {
                if self.autosave.schedule(payload, self.clock.now()) {
                    tracing::trace!(delay = ?self.autosave.delay(), "autosave armed");
                }
            }
            Err(err) => tracing::warn!(%err, "failed to serialize state for autosave"),
        }
        &self.state
    }

    // ---- overworld ---------------------------------------------------------

    pub fn set_player_tile(&mut self, x: i32, y: i32) -> &GameState {
        self.state.player_tile = (x, y).into();
        self.commit()
    }

    pub fn set_nearby_npc(&mut self, npc: Option<Npc>) -> &GameState {
        self.state.nearby_npc = npc;
        self.commit()
    }

    pub fn mark_intro_shown(&mut self) -> &GameState {
        self.state.flags.intro_shown = true;
        self.commit()
    }

    pub fn trigger_encounter(&mut self, x: i32, y: i32) -> &GameState {
        battle::start_wild_battle(&mut self.state, x, y, epoch_millis(), &mut *self.rng);
        self.commit()
    }

    pub fn trigger_trainer_battle(&mut self, trainer_id: &str) -> &GameState {
        match find_trainer(trainer_id) {
            Some(trainer) => {
                battle::start_trainer_battle(&mut self.state, &trainer);
            }
            None => tracing::warn!(trainer_id, "unknown trainer"),
        }
        self.commit()
    }

    // ---- battle ------------------------------------------------------------

    pub fn choose_battle_command(&mut self, command: BattleCommand) -> &GameState {
        battle::choose_battle_command(
            &mut self.state,
            &command,
            self.item_policy.as_ref(),
            &mut *self.rng,
        );
        self.commit()
    }

    pub fn switch_battle_monster(&mut self, monster_id: &str) -> &GameState {
        battle::switch_battle_monster(&mut self.state, monster_id, &mut *self.rng);
        self.commit()
    }

    pub fn end_battle(&mut self) -> &GameState {
        battle::end_battle(&mut self.state);
        self.commit()
    }

    // ---- services ----------------------------------------------------------

    pub fn buy_item(&mut self, kind: ItemKind) -> &GameState {
        let state = &mut self.state;
        let price = kind.info().price;
        state.notice = if state.battle.active {
            messages::busy_in_battle()
        } else if state.nearby_npc != Some(Npc::Shop) {
            messages::no_shop_nearby()
        } else if state.money < price {
            messages::not_enough_money(kind, price)
        } else {
            state.money -= price;
            state.items.add(kind, 1);
            tracing::debug!(item = kind.id(), money = state.money, "bought item");
            messages::bought(kind, state.money)
        };
        self.commit()
    }

    pub fn heal_party_at_pc(&mut self) -> &GameState {
        let state = &mut self.state;
        state.notice = if state.battle.active {
            messages::busy_in_battle()
        } else if state.nearby_npc != Some(Npc::Pc) {
            messages::no_pc_nearby()
        } else {
            for monster in &mut state.party {
                monster.battler.restore();
            }
            if let Some(lead) = state.party.first() {
                state.battle.player = lead.clone();
            }
            messages::party_healed()
        };
        self.commit()
    }

    // ---- persistence -------------------------------------------------------

    /// Writes the current state right away.
    pub fn save_game(&mut self) -> Result<(), StorageError> {
        let payload = encode_state(&self.state)?;
        self.storage.write(&payload)?;
        self.autosave.cancel();
        self.autosave.mark_persisted(payload);
        tracing::info!("game saved");
        Ok(())
    }

    /// Re-reads storage, discarding unsaved changes.
    pub fn load_game(&mut self) -> &GameState {
        self.reload();
        for (_, listener) in &mut self.listeners {
            listener(&self.state);
        }
        &self.state
    }

    /// Starts over from a new game and persists it immediately.
    pub fn reset_game(&mut self) -> &GameState {
        self.state = GameState::new_game();
        if let Err(err) = self.save_game() {
            tracing::warn!(%err, "failed to persist reset game");
        }
        for (_, listener) in &mut self.listeners {
            listener(&self.state);
        }
        &self.state
    }

    /// Fires the autosave if its deadline has passed. Returns true when a
    /// write happened.
    pub fn tick(&mut self) -> bool {
        match self.autosave.take_due(self.clock.now()) {
            Some(payload) => self.persist(payload),
            None => false,
        }
    }

    /// Writes any pending autosave without waiting for the deadline.
    pub fn flush_autosave(&mut self) -> bool {
        match self.autosave.take_pending() {
            Some(payload) => self.persist(payload),
            None => false,
        }
    }

    fn persist(&mut self, payload: String) -> bool {
        match self.storage.write(&payload) {
            Ok(()) => {
                tracing::debug!(bytes = payload.len(), "autosaved");
                self.autosave.mark_persisted(payload);
                true
            }
            Err(err) => {
                tracing::warn!(%err, "autosave failed");
                false
            }
        }
    }

    fn reload(&mut self) {
        let (state, source) = read_state(self.storage.as_ref());
        self.state = state;
        self.load_source = source;
        self.autosave.cancel();
        if source == LoadSource::Current {
            // An untouched game should not be written back.
            if let Ok(payload) = encode_state(&self.state) {
                self.autosave.mark_persisted(payload);
            }
        } else if source == LoadSource::Legacy {
            if let Err(err) = self.save_game() {
                tracing::warn!(%err, "failed to rewrite upgraded save");
            }
        }
    }
}

fn read_state(storage: &dyn SaveStorage) -> (GameState, LoadSource) {
    let raw = match storage.read() {
        Ok(Some(raw)) => raw,
        Ok(None) => {
            tracing::info!("no save found, starting a new game");
            return (GameState::new_game(), LoadSource::Defaults);
        }
        Err(err) => {
            tracing::warn!(%err, "save unreadable, starting a new game");
            return (GameState::new_game(), LoadSource::Defaults);
        }
    };
    match decode_record(&raw) {
        Ok(record) => {
            let source = match record {
                StoredRecord::Current(_) => LoadSource::Current,
                StoredRecord::Legacy(_) => LoadSource::Legacy,
            };
            tracing::info!(?source, "save loaded");
            (upgrade(record).into_state(), source)
        }
        Err(err) => {
            tracing::warn!(%err, "save corrupted, starting a new game");
            (GameState::new_game(), LoadSource::Defaults)
        }
    }
}

fn epoch_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
