//! Battle engine: match state, exchange resolution and outcomes

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::catalog::{self, CatalogClient};
use crate::creature::Creature;
use crate::error::{BattleError, RosterError};
use crate::roster::Roster;

pub const MIN_DAMAGE: u16 = 1;
pub const MAX_DAMAGE: u16 = 20;

/// Upper bound on creatures per side, keeps the catalog fan-out small.
pub const MAX_ROSTER_SIZE: usize = 6;
pub const DEFAULT_ROSTER_SIZE: usize = 3;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum Side {
    Player,
    Cpu,
}

impl Side {
    pub fn label(self) -> &'static str {
        match self {
            Side::Player => "player",
            Side::Cpu => "cpu",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct RosterSizes {
    pub player: usize,
    pub cpu: usize,
}

impl Default for RosterSizes {
    fn default() -> Self {
        Self {
            player: DEFAULT_ROSTER_SIZE,
            cpu: DEFAULT_ROSTER_SIZE,
        }
    }
}

impl RosterSizes {
    pub fn new(player: usize, cpu: usize) -> Self {
        Self { player, cpu }
    }

    pub fn total(&self) -> usize {
        self.player + self.cpu
    }

    pub fn validate(&self) -> Result<(), BattleError> {
        for (side, count) in [(Side::Player, self.player), (Side::Cpu, self.cpu)] {
            if count == 0 || count > MAX_ROSTER_SIZE {
                return Err(BattleError::InvalidRosterSize { side, count });
            }
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum Outcome {
    InProgress,
    PlayerWon,
    PlayerLost,
}

impl Outcome {
    pub fn is_terminal(self) -> bool {
        !matches!(self, Outcome::InProgress)
    }
}

/// Everything needed to resume a match: both rosters with their cursors and
/// the sizes the match was configured with.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct MatchState {
    pub player: Roster,
    pub cpu: Roster,
    pub roster_sizes: RosterSizes,
}

impl MatchState {
    pub fn new(player: Vec<Creature>, cpu: Vec<Creature>) -> Result<Self, BattleError> {
        let roster_sizes = RosterSizes::new(player.len(), cpu.len());
        Ok(Self {
            player: Roster::new(player)?,
            cpu: Roster::new(cpu)?,
            roster_sizes,
        })
    }

    /// Splits acquired creatures in request order: the first `sizes.player`
    /// go to the player, the rest to the cpu.
    pub fn from_creatures(
        mut creatures: Vec<Creature>,
        sizes: RosterSizes,
    ) -> Result<Self, BattleError> {
        if creatures.len() != sizes.total() {
            return Err(BattleError::Acquisition(format!(
                "expected {} creatures, got {}",
                sizes.total(),
                creatures.len()
            )));
        }
        let cpu = creatures.split_off(sizes.player);
        Self::new(creatures, cpu)
    }

    pub fn roster(&self, side: Side) -> &Roster {
        match side {
            Side::Player => &self.player,
            Side::Cpu => &self.cpu,
        }
    }

    fn roster_mut(&mut self, side: Side) -> &mut Roster {
        match side {
            Side::Player => &mut self.player,
            Side::Cpu => &mut self.cpu,
        }
    }

    pub fn outcome(&self) -> Outcome {
        outcome(self)
    }

    pub fn validate(&self) -> Result<(), RosterError> {
        self.player.validate()?;
        self.cpu.validate()?;
        if self.player.len() != self.roster_sizes.player || self.cpu.len() != self.roster_sizes.cpu
        {
            return Err(RosterError::InvalidTransition(format!(
                "roster sizes {:?} do not match members {}/{}",
                self.roster_sizes,
                self.player.len(),
                self.cpu.len()
            )));
        }
        Ok(())
    }
}

/// Player exhaustion is checked first, so a double knockout is a loss.
pub fn outcome(state: &MatchState) -> Outcome {
    if state.player.is_exhausted() {
        Outcome::PlayerLost
    } else if state.cpu.is_exhausted() {
        Outcome::PlayerWon
    } else {
        Outcome::InProgress
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Faint {
    pub name: String,
    /// Index of the member sent in, `None` when the side has nobody left.
    pub next_index: Option<usize>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct FaintingReport {
    pub player: Option<Faint>,
    pub cpu: Option<Faint>,
}

impl FaintingReport {
    pub fn side(&self, side: Side) -> Option<&Faint> {
        match side {
            Side::Player => self.player.as_ref(),
            Side::Cpu => self.cpu.as_ref(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ExchangeReport {
    pub move_name: String,
    pub attacker: String,
    pub defender: String,
    pub damage_dealt: u16,
    pub counter_damage: u16,
    pub fainting: FaintingReport,
    pub outcome: Outcome,
}

pub fn roll_damage<R: Rng + ?Sized>(rng: &mut R) -> u16 {
    rng.random_range(MIN_DAMAGE..=MAX_DAMAGE)
}

/// Resolves one exchange: the player's hit, the cpu's automatic counter, then
/// fainting. The move name is carried into the report but does not change
/// the damage roll.
pub fn resolve_exchange<R: Rng + ?Sized>(
    state: &mut MatchState,
    move_name: &str,
    rng: &mut R,
) -> Result<ExchangeReport, BattleError> {
    if outcome(state).is_terminal() {
        return Err(BattleError::MatchOver);
    }
    let attacker = state.player.active()?.name.clone();
    let defender = state.cpu.active()?.name.clone();

    let damage_dealt = roll_damage(rng);
    state.cpu.active_mut()?.take_damage(damage_dealt);

    let counter_damage = roll_damage(rng);
    state.player.active_mut()?.take_damage(counter_damage);

    debug!(
        %attacker,
        %defender,
        move_name,
        damage_dealt,
        counter_damage,
        "exchange resolved"
    );

    let fainting = resolve_fainting(state)?;
    let outcome = outcome(state);
    if outcome.is_terminal() {
        info!(?outcome, "match finished");
    }

    Ok(ExchangeReport {
        move_name: move_name.to_string(),
        attacker,
        defender,
        damage_dealt,
        counter_damage,
        fainting,
        outcome,
    })
}

/// Sends in the next member for every side whose active creature fainted.
pub fn resolve_fainting(state: &mut MatchState) -> Result<FaintingReport, BattleError> {
    let mut report = FaintingReport::default();
    for side in [Side::Player, Side::Cpu] {
        let roster = state.roster_mut(side);
        let Some(current) = roster.current() else {
            continue;
        };
        if !current.is_fainted() {
            continue;
        }
        let name = current.name.clone();
        let next_index = if roster.is_exhausted() {
            None
        } else {
            Some(roster.advance()?)
        };
        debug!(%side, %name, ?next_index, "creature fainted");
        let faint = Some(Faint { name, next_index });
        match side {
            Side::Player => report.player = faint,
            Side::Cpu => report.cpu = faint,
        }
    }
    Ok(report)
}

/// Builds a fresh match from the catalog. All fetches run concurrently and
/// the whole call fails if any of them fails or the timeout elapses.
pub async fn initialize(
    catalog: Arc<dyn CatalogClient>,
    sizes: RosterSizes,
    timeout: Duration,
) -> Result<MatchState, BattleError> {
    sizes.validate()?;
    let ids = catalog::draw_catalog_ids(&mut rand::rng(), sizes.total());
    let creatures = match tokio::time::timeout(timeout, catalog::fetch_all(catalog, ids)).await {
        Ok(result) => result?,
        Err(_) => {
            return Err(BattleError::Acquisition(format!(
                "catalog did not answer within {}s",
                timeout.as_secs_f32()
            )))
        }
    };
    let state = MatchState::from_creatures(creatures, sizes)?;
    info!(
        player = sizes.player,
        cpu = sizes.cpu,
        "match initialized"
    );
    Ok(state)
}
