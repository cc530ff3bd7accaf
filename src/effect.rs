use crate::battle::{MatchState, RosterSizes};

#[derive(Clone, Debug, PartialEq)]
pub enum Effect {
    LoadMatch,
    InitializeMatch { sizes: RosterSizes },
    SaveMatch { state: Box<MatchState> },
    ClearMatch,
}
