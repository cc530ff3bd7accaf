use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{error, info};
use tui_dispatch::DispatchResult;

use crate::action::Action;
use crate::battle::{resolve_exchange, ExchangeReport, MatchState, Outcome, RosterSizes, Side};
use crate::creature::format_name;
use crate::effect::Effect;
use crate::error::BattleError;
use crate::state::{AppState, Screen, SetupState};

pub fn reducer(state: &mut AppState, action: Action) -> DispatchResult<Effect> {
    match action {
        Action::Init => {
            state.screen = Screen::Loading;
            DispatchResult::changed_with(Effect::LoadMatch)
        }
        Action::UiTerminalResize(width, height) => {
            if state.terminal_size != (width, height) {
                state.terminal_size = (width, height);
                DispatchResult::changed()
            } else {
                DispatchResult::unchanged()
            }
        }

        Action::SetupFieldChange(delta) => {
            if state.screen != Screen::Setup {
                return DispatchResult::unchanged();
            }
            state.setup.field = state.setup.field.step(delta);
            DispatchResult::changed()
        }
        Action::SetupCountChange(delta) => {
            if state.screen != Screen::Setup || !state.setup.adjust(delta) {
                return DispatchResult::unchanged();
            }
            DispatchResult::changed()
        }

        Action::MatchStart(sizes) => match_start(state, sizes),
        Action::MatchDidInitialize(battle) => match_initialized(state, *battle),
        Action::MatchDidError(error) => {
            if state.screen != Screen::Acquiring {
                return DispatchResult::unchanged();
            }
            state.screen = Screen::Setup;
            state.message = Some(format!(
                "Could not gather creatures: {error}. Press Enter to try again."
            ));
            DispatchResult::changed()
        }
        Action::MatchDidLoad(saved) => match_loaded(state, saved.map(|battle| *battle)),
        Action::MatchRestart => match_restart(state),

        Action::MoveSelect(index) => {
            if state.screen != Screen::Battle
                || index >= state.move_slots().len()
                || index == state.move_index
            {
                return DispatchResult::unchanged();
            }
            state.move_index = index;
            DispatchResult::changed()
        }
        Action::MoveUse(move_name) => move_use(state, &move_name),

        Action::PersistDidSave => DispatchResult::unchanged(),
        Action::PersistDidFail(_) => {
            state.persist_failures = state.persist_failures.saturating_add(1);
            DispatchResult::unchanged()
        }

        Action::Quit => DispatchResult::unchanged(),
    }
}

fn match_start(state: &mut AppState, sizes: RosterSizes) -> DispatchResult<Effect> {
    if !matches!(state.screen, Screen::Setup) {
        return DispatchResult::unchanged();
    }
    if let Err(err) = sizes.validate() {
        state.message = Some(err.to_string());
        return DispatchResult::changed();
    }
    state.screen = Screen::Acquiring;
    state.setup.sizes = sizes;
    state.message = None;
    DispatchResult::changed_with(Effect::InitializeMatch { sizes })
}

fn match_initialized(state: &mut AppState, battle: MatchState) -> DispatchResult<Effect> {
    if state.screen != Screen::Acquiring {
        return DispatchResult::unchanged();
    }
    state.log.clear();
    state.move_index = 0;
    state.message = None;
    let player = active_name(&battle, Side::Player);
    let cpu = active_name(&battle, Side::Cpu);
    state.push_log(format!("The CPU sends out {cpu}!"));
    state.push_log(format!("Go, {player}!"));
    state.screen = Screen::Battle;
    state.battle = Some(battle.clone());
    DispatchResult::changed_with(Effect::SaveMatch {
        state: Box::new(battle),
    })
}

fn match_loaded(state: &mut AppState, saved: Option<MatchState>) -> DispatchResult<Effect> {
    if state.screen != Screen::Loading {
        return DispatchResult::unchanged();
    }
    let Some(battle) = saved else {
        state.screen = Screen::Setup;
        return DispatchResult::changed();
    };
    info!(outcome = ?battle.outcome(), "resuming saved match");
    state.move_index = 0;
    state.log.clear();
    state.push_log("Resumed the saved match.");
    state.screen = screen_for(battle.outcome());
    state.battle = Some(battle);
    DispatchResult::changed()
}

fn match_restart(state: &mut AppState) -> DispatchResult<Effect> {
    if matches!(state.screen, Screen::Loading | Screen::Acquiring) {
        return DispatchResult::unchanged();
    }
    state.battle = None;
    state.move_index = 0;
    state.log.clear();
    state.setup = SetupState::new(state.default_sizes);
    state.screen = Screen::Setup;
    state.message = None;
    DispatchResult::changed_with(Effect::ClearMatch)
}

fn move_use(state: &mut AppState, move_name: &str) -> DispatchResult<Effect> {
    if state.screen != Screen::Battle {
        return DispatchResult::unchanged();
    }
    let Some(battle) = state.battle.as_mut() else {
        return DispatchResult::unchanged();
    };

    let mut rng = StdRng::seed_from_u64(state.rng_seed);
    let result = resolve_exchange(battle, move_name, &mut rng);
    state.rng_seed = rng.random();

    let report = match result {
        Ok(report) => report,
        Err(BattleError::MatchOver) => {
            state.screen = Screen::Finished;
            return DispatchResult::changed();
        }
        Err(err) => {
            error!(error = %err, "exchange failed");
            state.message = Some(format!("Battle error: {err}"));
            return DispatchResult::changed();
        }
    };

    let snapshot = battle.clone();
    for line in exchange_lines(&report, &snapshot) {
        state.push_log(line);
    }
    if report.fainting.player.is_some() {
        state.move_index = 0;
    }
    state.screen = screen_for(report.outcome);
    DispatchResult::changed_with(Effect::SaveMatch {
        state: Box::new(snapshot),
    })
}

fn exchange_lines(report: &ExchangeReport, battle: &MatchState) -> Vec<String> {
    let attacker = format_name(&report.attacker);
    let defender = format_name(&report.defender);
    let mut lines = vec![
        format!(
            "{attacker} used {}! {defender} took {} damage.",
            format_name(&report.move_name),
            report.damage_dealt
        ),
        format!(
            "{defender} hit back for {} damage.",
            report.counter_damage
        ),
    ];
    for side in [Side::Player, Side::Cpu] {
        let Some(faint) = report.fainting.side(side) else {
            continue;
        };
        let owner = match side {
            Side::Player => "Your",
            Side::Cpu => "The CPU's",
        };
        lines.push(format!("{owner} {} fainted!", format_name(&faint.name)));
        if faint.next_index.is_some() {
            let next = active_name(battle, side);
            lines.push(match side {
                Side::Player => format!("Go, {next}!"),
                Side::Cpu => format!("The CPU sends out {next}!"),
            });
        }
    }
    match report.outcome {
        Outcome::PlayerWon => lines.push("You Win!".to_string()),
        Outcome::PlayerLost => lines.push("You Lose!".to_string()),
        Outcome::InProgress => {}
    }
    lines
}

fn active_name(battle: &MatchState, side: Side) -> String {
    battle
        .roster(side)
        .current()
        .map(|creature| creature.display_name())
        .unwrap_or_else(|| side.label().to_string())
}

fn screen_for(outcome: Outcome) -> Screen {
    if outcome.is_terminal() {
        Screen::Finished
    } else {
        Screen::Battle
    }
}
