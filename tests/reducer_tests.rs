//! Store-level tests: dispatch actions, check state and emitted effects

use pokeduel::{
    action::Action,
    battle::{MatchState, Outcome, RosterSizes},
    creature::Creature,
    effect::Effect,
    reducer::reducer,
    state::{AppState, Screen, SetupField},
};
use pretty_assertions::assert_eq;
use tui_dispatch::EffectStore;

fn creature(name: &str, hp: u16) -> Creature {
    Creature::new(
        name,
        hp,
        ["tackle", "growl", "vine-whip", "leech-seed", "razor-leaf"]
            .iter()
            .map(|m| m.to_string())
            .collect(),
    )
}

fn setup_store() -> EffectStore<AppState, Action, Effect> {
    let mut state = AppState::new(RosterSizes::new(2, 2));
    state.rng_seed = 17;
    let mut store = EffectStore::new(state, reducer);
    store.dispatch(Action::Init);
    store.dispatch(Action::MatchDidLoad(None));
    store
}

fn battle_store(player: Vec<Creature>, cpu: Vec<Creature>) -> EffectStore<AppState, Action, Effect> {
    let mut store = setup_store();
    let sizes = RosterSizes::new(player.len(), cpu.len());
    store.dispatch(Action::MatchStart(sizes));
    let battle = MatchState::new(player, cpu).unwrap();
    store.dispatch(Action::MatchDidInitialize(Box::new(battle)));
    store
}

#[test]
fn init_requests_saved_match() {
    let mut store = EffectStore::new(AppState::default(), reducer);
    let result = store.dispatch(Action::Init);
    assert!(result.changed);
    assert_eq!(result.effects, vec![Effect::LoadMatch]);
    assert_eq!(store.state().screen, Screen::Loading);
}

#[test]
fn no_save_lands_on_setup() {
    let store = setup_store();
    assert_eq!(store.state().screen, Screen::Setup);
    assert_eq!(store.state().setup.sizes, RosterSizes::new(2, 2));
}

#[test]
fn setup_counts_stay_in_bounds() {
    let mut store = setup_store();
    for _ in 0..10 {
        store.dispatch(Action::SetupCountChange(1));
    }
    assert_eq!(store.state().setup.sizes.player, 6);

    store.dispatch(Action::SetupFieldChange(1));
    assert_eq!(store.state().setup.field, SetupField::Cpu);
    for _ in 0..10 {
        store.dispatch(Action::SetupCountChange(-1));
    }
    assert_eq!(store.state().setup.sizes.cpu, 1);

    store.dispatch(Action::SetupFieldChange(-2));
    assert_eq!(store.state().setup.field, SetupField::Start);
    let result = store.dispatch(Action::SetupCountChange(1));
    assert!(!result.changed);
}

#[test]
fn match_start_requests_initialization() {
    let mut store = setup_store();
    let result = store.dispatch(Action::MatchStart(RosterSizes::new(1, 4)));
    assert_eq!(
        result.effects,
        vec![Effect::InitializeMatch {
            sizes: RosterSizes::new(1, 4)
        }]
    );
    assert_eq!(store.state().screen, Screen::Acquiring);

    // A second request while the first is in flight is ignored.
    let result = store.dispatch(Action::MatchStart(RosterSizes::new(1, 4)));
    assert!(!result.changed);
    assert!(result.effects.is_empty());
}

#[test]
fn oversized_match_is_refused() {
    let mut store = setup_store();
    let result = store.dispatch(Action::MatchStart(RosterSizes::new(9, 1)));
    assert!(result.effects.is_empty());
    assert_eq!(store.state().screen, Screen::Setup);
    assert!(store.state().message.is_some());
}

#[test]
fn acquisition_failure_returns_to_setup() {
    let mut store = setup_store();
    store.dispatch(Action::MatchStart(RosterSizes::new(2, 2)));
    store.dispatch(Action::MatchDidError("catalog returned status 503".into()));
    assert_eq!(store.state().screen, Screen::Setup);
    assert!(store.state().battle.is_none());
    let message = store.state().message.clone().unwrap();
    assert!(message.contains("503"));
}

#[test]
fn initialized_match_is_saved() {
    let mut store = setup_store();
    store.dispatch(Action::MatchStart(RosterSizes::new(1, 1)));
    let battle = MatchState::new(vec![creature("bulbasaur", 45)], vec![creature("rattata", 30)])
        .unwrap();
    let result = store.dispatch(Action::MatchDidInitialize(Box::new(battle.clone())));
    assert_eq!(
        result.effects,
        vec![Effect::SaveMatch {
            state: Box::new(battle.clone())
        }]
    );
    assert_eq!(store.state().screen, Screen::Battle);
    assert_eq!(store.state().battle, Some(battle));
    assert_eq!(store.state().move_slots().len(), 4);
}

#[test]
fn move_use_resolves_exchange_and_saves() {
    let mut store = battle_store(vec![creature("bulbasaur", 500)], vec![creature("rattata", 500)]);
    let result = store.dispatch(Action::MoveUse("vine-whip".into()));
    assert!(result.changed);

    let battle = store.state().battle.clone().unwrap();
    let cpu_hp = battle.cpu.current().unwrap().hit_points;
    let player_hp = battle.player.current().unwrap().hit_points;
    assert!((480..500).contains(&cpu_hp));
    assert!((480..500).contains(&player_hp));
    assert_eq!(
        result.effects,
        vec![Effect::SaveMatch {
            state: Box::new(battle)
        }]
    );
    assert!(store
        .state()
        .log
        .iter()
        .any(|line| line.contains("Vine Whip")));
}

#[test]
fn seeded_exchanges_are_reproducible() {
    let run = || {
        let mut store =
            battle_store(vec![creature("bulbasaur", 500)], vec![creature("rattata", 500)]);
        for _ in 0..3 {
            store.dispatch(Action::MoveUse("tackle".into()));
        }
        store.state().battle.clone()
    };
    assert_eq!(run(), run());
}

#[test]
fn double_knockout_finishes_as_loss() {
    let mut store = battle_store(vec![creature("magikarp", 1)], vec![creature("caterpie", 1)]);
    store.dispatch(Action::MoveUse("tackle".into()));
    assert_eq!(store.state().screen, Screen::Finished);
    assert_eq!(store.state().outcome(), Some(Outcome::PlayerLost));
    assert_eq!(store.state().log.back().map(String::as_str), Some("You Lose!"));

    let result = store.dispatch(Action::MoveUse("tackle".into()));
    assert!(!result.changed);
    assert!(result.effects.is_empty());
}

#[test]
fn knockout_sends_in_next_cpu_creature() {
    let mut store = battle_store(
        vec![creature("onix", 1000)],
        vec![creature("caterpie", 1), creature("weedle", 40)],
    );
    store.dispatch(Action::MoveUse("tackle".into()));
    let state = store.state();
    assert_eq!(state.screen, Screen::Battle);
    let battle = state.battle.as_ref().unwrap();
    assert_eq!(battle.cpu.active_index(), 1);
    assert!(state.log.iter().any(|l| l == "The CPU sends out Weedle!"));
}

#[test]
fn move_select_stays_within_slots() {
    let mut store = battle_store(vec![creature("bulbasaur", 45)], vec![creature("rattata", 30)]);
    assert!(store.dispatch(Action::MoveSelect(3)).changed);
    assert_eq!(store.state().selected_move().as_deref(), Some("leech-seed"));
    assert!(!store.dispatch(Action::MoveSelect(4)).changed);
    assert_eq!(store.state().move_index, 3);
}

#[test]
fn saved_match_resumes_battle() {
    let mut store = EffectStore::new(AppState::default(), reducer);
    store.dispatch(Action::Init);
    let battle = MatchState::new(vec![creature("eevee", 55)], vec![creature("zubat", 40)]).unwrap();
    let result = store.dispatch(Action::MatchDidLoad(Some(Box::new(battle.clone()))));
    assert!(result.effects.is_empty());
    assert_eq!(store.state().screen, Screen::Battle);
    assert_eq!(store.state().battle, Some(battle));
}

#[test]
fn finished_save_resumes_on_result_screen() {
    let mut battle =
        MatchState::new(vec![creature("eevee", 1)], vec![creature("zubat", 40)]).unwrap();
    let mut rng = <rand::rngs::StdRng as rand::SeedableRng>::seed_from_u64(0);
    pokeduel::battle::resolve_exchange(&mut battle, "tackle", &mut rng).unwrap();
    assert_eq!(battle.outcome(), Outcome::PlayerLost);

    let mut store = EffectStore::new(AppState::default(), reducer);
    store.dispatch(Action::Init);
    store.dispatch(Action::MatchDidLoad(Some(Box::new(battle))));
    assert_eq!(store.state().screen, Screen::Finished);
}

#[test]
fn restart_clears_match_and_save() {
    let mut store = battle_store(vec![creature("bulbasaur", 45)], vec![creature("rattata", 30)]);
    store.dispatch(Action::SetupCountChange(1));
    let result = store.dispatch(Action::MatchRestart);
    assert_eq!(result.effects, vec![Effect::ClearMatch]);
    let state = store.state();
    assert_eq!(state.screen, Screen::Setup);
    assert!(state.battle.is_none());
    assert!(state.log.is_empty());
    assert_eq!(state.setup.sizes, RosterSizes::new(2, 2));
}

#[test]
fn persistence_failures_stay_out_of_view() {
    let mut store = battle_store(vec![creature("bulbasaur", 45)], vec![creature("rattata", 30)]);
    let result = store.dispatch(Action::PersistDidFail("disk full".into()));
    assert!(!result.changed);
    assert_eq!(store.state().persist_failures, 1);
    assert!(store.state().message.is_none());
}

#[test]
fn extreme_field_steps_wrap() {
    let mut store = setup_store();
    store.dispatch(Action::SetupFieldChange(i8::MAX));
    assert_eq!(store.state().setup.field, SetupField::Cpu);
    store.dispatch(Action::SetupFieldChange(i8::MIN));
    assert_eq!(store.state().setup.field, SetupField::Start);
}
