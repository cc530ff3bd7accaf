use std::collections::VecDeque;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tui_dispatch_debug::debug::{ron_string, DebugSection, DebugState};

use crate::battle::{MatchState, Outcome, RosterSizes, MAX_ROSTER_SIZE};

/// Battle log lines kept for the command panel.
pub const LOG_CAPACITY: usize = 6;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum Screen {
    Loading,
    Setup,
    Acquiring,
    Battle,
    Finished,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum SetupField {
    Player,
    Cpu,
    Start,
}

impl SetupField {
    pub const ALL: [SetupField; 3] = [SetupField::Player, SetupField::Cpu, SetupField::Start];

    pub fn index(self) -> usize {
        match self {
            SetupField::Player => 0,
            SetupField::Cpu => 1,
            SetupField::Start => 2,
        }
    }

    pub fn step(self, delta: i8) -> Self {
        let len = Self::ALL.len() as i16;
        let next = (self.index() as i16 + delta as i16).rem_euclid(len);
        Self::ALL[next as usize]
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SetupState {
    pub sizes: RosterSizes,
    pub field: SetupField,
}

impl SetupState {
    pub fn new(sizes: RosterSizes) -> Self {
        Self {
            sizes,
            field: SetupField::Player,
        }
    }

    /// Changes the count under the cursor, staying within `1..=MAX_ROSTER_SIZE`.
    pub fn adjust(&mut self, delta: i8) -> bool {
        let count = match self.field {
            SetupField::Player => &mut self.sizes.player,
            SetupField::Cpu => &mut self.sizes.cpu,
            SetupField::Start => return false,
        };
        let next = (*count as i64 + delta as i64).clamp(1, MAX_ROSTER_SIZE as i64) as usize;
        if next == *count {
            return false;
        }
        *count = next;
        true
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AppState {
    pub terminal_size: (u16, u16),
    pub screen: Screen,
    pub setup: SetupState,
    pub default_sizes: RosterSizes,
    pub battle: Option<MatchState>,
    pub move_index: usize,
    #[serde(default)]
    pub log: VecDeque<String>,
    pub message: Option<String>,
    pub rng_seed: u64,
    #[serde(default)]
    pub persist_failures: u32,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(RosterSizes::default())
    }
}

impl AppState {
    pub fn new(default_sizes: RosterSizes) -> Self {
        Self {
            terminal_size: (80, 24),
            screen: Screen::Loading,
            setup: SetupState::new(default_sizes),
            default_sizes,
            battle: None,
            move_index: 0,
            log: VecDeque::new(),
            message: None,
            rng_seed: seed_from_time(),
            persist_failures: 0,
        }
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.battle.as_ref().map(MatchState::outcome)
    }

    /// Moves available to the player's active creature.
    pub fn move_slots(&self) -> Vec<String> {
        self.battle
            .as_ref()
            .and_then(|battle| battle.player.active().ok())
            .map(|creature| {
                creature
                    .move_slots()
                    .into_iter()
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn selected_move(&self) -> Option<String> {
        self.move_slots().into_iter().nth(self.move_index)
    }

    pub fn push_log(&mut self, line: impl Into<String>) {
        self.log.push_back(line.into());
        while self.log.len() > LOG_CAPACITY {
            self.log.pop_front();
        }
    }
}

impl DebugState for AppState {
    fn debug_sections(&self) -> Vec<DebugSection> {
        let mut sections = vec![DebugSection::new("App")
            .entry("screen", ron_string(&self.screen))
            .entry("message", ron_string(&self.message))
            .entry("persist_failures", ron_string(&self.persist_failures))];

        if let Some(battle) = &self.battle {
            let hp = |creature: Option<&crate::creature::Creature>| {
                creature.map(|c| (c.name.clone(), c.hit_points))
            };
            sections.push(
                DebugSection::new("Match")
                    .entry("outcome", ron_string(&battle.outcome()))
                    .entry("player_index", ron_string(&battle.player.active_index()))
                    .entry("player_active", ron_string(&hp(battle.player.current())))
                    .entry("cpu_index", ron_string(&battle.cpu.active_index()))
                    .entry("cpu_active", ron_string(&hp(battle.cpu.current()))),
            );
        }

        sections
    }
}

fn seed_from_time() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    (now.as_secs() << 32) ^ now.subsec_nanos() as u64
}
