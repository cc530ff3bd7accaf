use serde::{Deserialize, Serialize};

use crate::battle::{MatchState, RosterSizes};

#[derive(tui_dispatch::Action, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[action(infer_categories)]
pub enum Action {
    Init,
    UiTerminalResize(u16, u16),

    // Setup screen
    SetupFieldChange(i8),
    SetupCountChange(i8),

    // Match lifecycle
    MatchStart(RosterSizes),
    MatchDidInitialize(Box<MatchState>),
    MatchDidError(String),
    MatchDidLoad(Option<Box<MatchState>>),
    MatchRestart,

    // Battle
    MoveSelect(usize),
    MoveUse(String),

    // Persistence completions, never shown to the player
    PersistDidSave,
    PersistDidFail(String),

    Quit,
}
