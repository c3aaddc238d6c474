use pocket_tamer::autosave::ManualClock;
use pocket_tamer::battle::BattleCommand;
use pocket_tamer::items::ItemKind;
use pocket_tamer::messages;
use pocket_tamer::model::{GameState, Npc, Phase, Tile};
use pocket_tamer::save::{decode_state, encode_state};
use pocket_tamer::storage::{FileStorage, MemoryStorage};
use pocket_tamer::store::{GameStore, LoadSource};
use pocket_tamer::{run_session, CliOptions};
use rand::rngs::mock::StepRng;
use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

const LEGACY_RECORD: &str = r#"{
    "playerTile": {"x": 6, "y": 4},
    "lastEncounter": {"x": 5, "y": 4, "at": 1700000000000},
    "party": [],
    "badges": ["Bud Badge"],
    "defeatedTrainers": ["junior-mia"],
    "money": 75,
    "potions": 3
}"#;

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

/// Store over in-memory storage with a manual clock and "always zero" rolls.
/// Returns handles to the storage and the clock.
fn make_store(state: Option<GameState>) -> (GameStore, MemoryStorage, ManualClock) {
    let storage = MemoryStorage::new();
    let clock = ManualClock::new();
    let store = match state {
        Some(state) => GameStore::from_state(state, storage.clone()),
        None => GameStore::open(storage.clone()),
    }
    .with_clock(clock.clone())
    .with_rng(StepRng::new(0, 0));
    (store, storage, clock)
}

#[test]
fn empty_storage_starts_a_new_game() {
    let (store, storage, _) = make_store(None);
    assert_eq!(store.load_source(), LoadSource::Defaults);
    assert_eq!(store.state(), &GameState::new_game());
    assert_eq!(storage.writes(), 0);
}

#[test]
fn corrupt_save_falls_back_to_defaults() {
    let storage = MemoryStorage::with_payload("{\"schema\":\"v2\",\"party\":");
    let store = GameStore::open(storage.clone());
    assert_eq!(store.load_source(), LoadSource::Defaults);
    assert_eq!(store.state(), &GameState::new_game());
    assert_eq!(storage.writes(), 0);
}

#[test]
fn objects_without_legacy_fields_fall_back_to_defaults() {
    for raw in ["{}", r#"{"hello":"world"}"#, r#"{"money":50,"potions":2}"#] {
        let storage = MemoryStorage::with_payload(raw);
        let store = GameStore::open(storage.clone());
        assert_eq!(store.load_source(), LoadSource::Defaults, "payload {raw}");
        assert_eq!(store.state(), &GameState::new_game(), "payload {raw}");
        assert_eq!(storage.writes(), 0, "payload {raw}");
        assert_eq!(storage.payload().as_deref(), Some(raw));
    }
}

#[test]
fn legacy_save_is_upgraded_in_place() {
    let storage = MemoryStorage::with_payload(LEGACY_RECORD);
    let store = GameStore::open(storage.clone());
    assert_eq!(store.load_source(), LoadSource::Legacy);

    let state = store.state();
    assert_eq!(state.items.count(ItemKind::Potion), 3);
    assert_eq!(state.money, 75);
    assert_eq!(state.player_tile, Tile { x: 6, y: 4 });
    assert_eq!(state.badges, vec!["Bud Badge".to_string()]);
    assert_eq!(state.party[0].id, "sproutle-1");
    assert_eq!(state.battle.phase, Phase::Idle);
    assert!(!state.battle.active);

    assert_eq!(storage.writes(), 1);
    let rewritten = storage.payload().unwrap();
    assert!(rewritten.contains(r#""schema":"v2""#));
    assert_eq!(&decode_state(&rewritten).unwrap(), state);
}

#[test]
fn burst_of_changes_is_written_once() {
    let (mut store, storage, clock) = make_store(None);
    for x in 0..5 {
        store.set_player_tile(x, 1);
        clock.advance(ms(100));
        assert!(!store.tick());
    }
    assert_eq!(storage.writes(), 0);

    clock.advance(ms(200));
    assert!(store.tick());
    assert_eq!(storage.writes(), 1);
    let saved = decode_state(&storage.payload().unwrap()).unwrap();
    assert_eq!(saved.player_tile, Tile { x: 4, y: 1 });

    clock.advance(ms(1_000));
    assert!(!store.tick());
    assert_eq!(storage.writes(), 1);
}

#[test]
fn no_op_commands_do_not_postpone_a_pending_write() {
    let (mut store, storage, clock) = make_store(None);
    store.set_player_tile(5, 6);
    for npc in [Some(Npc::Shop), None, Some(Npc::Pc), None] {
        clock.advance(ms(75));
        store.set_nearby_npc(npc);
        store.choose_battle_command(BattleCommand::Catch);
    }
    assert_eq!(storage.writes(), 0);
    assert!(store.tick());
    assert_eq!(storage.writes(), 1);
    let saved = decode_state(&storage.payload().unwrap()).unwrap();
    assert_eq!(saved.player_tile, Tile { x: 5, y: 6 });
}

#[test]
fn unchanged_snapshot_is_not_rewritten() {
    let (mut store, storage, clock) = make_store(None);
    store.set_player_tile(9, 9);
    clock.advance(ms(300));
    assert!(store.tick());

    store.set_player_tile(9, 9);
    assert!(!store.has_pending_autosave());

    store.set_player_tile(1, 1);
    store.set_player_tile(9, 9);
    assert!(!store.has_pending_autosave());
    clock.advance(ms(300));
    assert!(!store.tick());
    assert_eq!(storage.writes(), 1);
}

#[test]
fn explicit_save_is_immediate_and_cancels_pending() {
    let (mut store, storage, clock) = make_store(None);
    store.mark_intro_shown();
    assert!(store.has_pending_autosave());
    store.save_game().unwrap();
    assert_eq!(storage.writes(), 1);
    assert!(!store.has_pending_autosave());
    clock.advance(ms(300));
    assert!(!store.tick());
    assert_eq!(storage.writes(), 1);
}

#[test]
fn flush_writes_pending_change_early() {
    let (mut store, storage, _) = make_store(None);
    store.set_player_tile(2, 3);
    assert!(store.flush_autosave());
    assert_eq!(storage.writes(), 1);
    assert!(!store.flush_autosave());
}

#[test]
fn saved_game_survives_a_reopen() {
    let (mut store, storage, _) = make_store(None);
    store.trigger_encounter(4, 4);
    store.choose_battle_command(BattleCommand::Catch);
    store.end_battle();
    store.save_game().unwrap();

    let reopened = GameStore::open(storage.clone());
    assert_eq!(reopened.load_source(), LoadSource::Current);
    assert_eq!(reopened.state().party.len(), 2);
    assert_eq!(reopened.state(), store.state());
    assert_eq!(storage.writes(), 1);
}

#[test]
fn load_discards_unsaved_changes_and_reset_persists() {
    let (mut store, storage, _) = make_store(None);
    store.save_game().unwrap();
    store.set_player_tile(8, 8);
    store.load_game();
    assert_eq!(store.state().player_tile, Tile { x: 3, y: 2 });
    assert!(!store.has_pending_autosave());

    let mut rich = GameState::new_game();
    rich.money = 999;
    let (mut store, storage2, _) = make_store(Some(rich));
    store.reset_game();
    assert_eq!(store.state().money, 120);
    assert_eq!(storage2.writes(), 1);
    assert_eq!(
        storage2.payload().unwrap(),
        encode_state(&GameState::new_game()).unwrap()
    );
    assert_eq!(storage.writes(), 1);
}

#[test]
fn subscribers_see_every_change_until_unsubscribed() {
    let (mut store, _, _) = make_store(None);
    let seen = Rc::new(Cell::new(0));
    let last_money = Rc::new(Cell::new(0));
    let id = {
        let seen = Rc::clone(&seen);
        let last_money = Rc::clone(&last_money);
        store.subscribe(move |state| {
            seen.set(seen.get() + 1);
            last_money.set(state.money);
        })
    };

    store.trigger_encounter(1, 1);
    store.choose_battle_command(BattleCommand::Run);
    store.end_battle();
    assert_eq!(seen.get(), 3);
    assert_eq!(last_money.get(), 120);

    assert!(store.unsubscribe(id));
    assert!(!store.unsubscribe(id));
    store.set_player_tile(0, 0);
    assert_eq!(seen.get(), 3);
}

#[test]
fn encounter_catch_end_scenario() {
    let (mut store, _, _) = make_store(None);
    let state = store.trigger_encounter(5, 5);
    assert_eq!(state.battle.phase, Phase::PlayerTurn);
    let state = store.choose_battle_command(BattleCommand::Catch);
    assert_eq!(state.battle.phase, Phase::Caught);
    let state = store.end_battle();
    assert_eq!(state.battle.phase, Phase::Idle);
    assert!(!state.battle.active);
}

#[test]
fn shop_requires_the_shopkeeper() {
    let (mut store, _, _) = make_store(None);
    let state = store.buy_item(ItemKind::Potion);
    assert_eq!(state.notice, messages::no_shop_nearby());
    assert_eq!(state.money, 120);

    store.set_nearby_npc(Some(Npc::Shop));
    let state = store.buy_item(ItemKind::Potion);
    assert_eq!(state.money, 100);
    assert_eq!(state.items.count(ItemKind::Potion), 2);
    assert_eq!(state.notice, messages::bought(ItemKind::Potion, 100));

    store.trigger_encounter(2, 2);
    let state = store.buy_item(ItemKind::Antidote);
    assert_eq!(state.notice, messages::busy_in_battle());
    assert_eq!(state.items.count(ItemKind::Antidote), 0);
}

#[test]
fn shop_refuses_when_money_is_short() {
    let mut poor = GameState::new_game();
    poor.money = 40;
    let (mut store, _, _) = make_store(Some(poor));
    store.set_nearby_npc(Some(Npc::Shop));
    let state = store.buy_item(ItemKind::SuperPotion);
    assert_eq!(state.money, 40);
    assert_eq!(state.items.count(ItemKind::SuperPotion), 0);
    assert_eq!(state.notice, messages::not_enough_money(ItemKind::SuperPotion, 50));
}

#[test]
fn pc_heals_the_whole_party() {
    let mut hurt = GameState::new_game();
    hurt.party[0].battler.hp = 4;
    hurt.party[0].battler.status = pocket_tamer::types::StatusEffect::Burn;
    let (mut store, _, _) = make_store(Some(hurt));

    let state = store.heal_party_at_pc();
    assert_eq!(state.notice, messages::no_pc_nearby());
    assert_eq!(state.party[0].battler.hp, 4);

    store.set_nearby_npc(Some(Npc::Pc));
    let state = store.heal_party_at_pc();
    assert_eq!(state.party[0].battler.hp, 34);
    assert!(state.party[0].battler.status.is_none());
    assert_eq!(state.battle.player, state.party[0]);
}

#[test]
fn unknown_trainer_is_ignored() {
    let (mut store, _, _) = make_store(None);
    let state = store.trigger_trainer_battle("nobody");
    assert!(!state.battle.active);
    let state = store.trigger_trainer_battle("ace-ryu");
    assert!(state.battle.is_trainer_battle());
    assert_eq!(state.battle.enemy.name, "Aquava");
}

#[test]
fn console_session_drives_the_store() {
    let (mut store, storage, _) = make_store(None);
    let input = "encounter 2 2\ncatch\nbogus\nend\nstatus\nquit\nmove 9 9\n";
    let mut output = Vec::new();
    run_session(&mut store, input.as_bytes(), &mut output).unwrap();

    let text = String::from_utf8(output).unwrap();
    assert!(text.contains("error: Unknown command bogus"));
    assert!(text.contains("flameling-2"));
    assert_eq!(store.state().party.len(), 2);
    assert_eq!(store.state().player_tile, Tile { x: 3, y: 2 });
    assert_eq!(storage.writes(), 1);
}

#[test]
fn file_backed_store_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let opts = CliOptions {
        save_path: Some(dir.path().join("save.json")),
        seed: Some(7),
        ..CliOptions::default()
    };
    let config = opts.resolve().unwrap();

    let mut store = pocket_tamer::open_store(&config);
    store.set_player_tile(11, 12);
    store.save_game().unwrap();

    let storage = FileStorage::new(&config.save_path);
    let reopened = GameStore::open(storage);
    assert_eq!(reopened.state().player_tile, Tile { x: 11, y: 12 });
}

#[test]
fn zero_autosave_override_is_rejected() {
    let opts = CliOptions {
        autosave_ms: Some(0),
        ..CliOptions::default()
    };
    assert!(opts.resolve().is_err());
}
