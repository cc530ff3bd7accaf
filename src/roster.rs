use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::creature::Creature;
use crate::error::RosterError;

/// Ordered members of one side plus the cursor of the creature in play.
///
/// The cursor only moves forward, and only past a fainted member. Once the
/// last member faints the roster is exhausted and its owner has lost.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Roster {
    members: Vec<Creature>,
    active_index: usize,
}

impl Roster {
    pub fn new(members: Vec<Creature>) -> Result<Self, RosterError> {
        if members.is_empty() {
            return Err(RosterError::Empty);
        }
        Ok(Self {
            members,
            active_index: 0,
        })
    }

    pub fn members(&self) -> &[Creature] {
        &self.members
    }

    pub fn active_index(&self) -> usize {
        self.active_index
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Members that have not fainted yet.
    pub fn remaining(&self) -> usize {
        self.members.iter().filter(|m| !m.is_fainted()).count()
    }

    /// Member under the cursor, fainted or not. Used for rendering a finished
    /// match, where `active` refuses to answer.
    pub fn current(&self) -> Option<&Creature> {
        self.members.get(self.active_index)
    }

    pub fn active(&self) -> Result<&Creature, RosterError> {
        self.check_active()?;
        Ok(&self.members[self.active_index])
    }

    pub fn active_mut(&mut self) -> Result<&mut Creature, RosterError> {
        self.check_active()?;
        Ok(&mut self.members[self.active_index])
    }

    pub fn is_exhausted(&self) -> bool {
        let last = self.members.len().saturating_sub(1);
        self.active_index == last
            && self
                .members
                .get(self.active_index)
                .map_or(true, Creature::is_fainted)
    }

    /// Moves the cursor past a fainted active member. Returns the new index.
    pub fn advance(&mut self) -> Result<usize, RosterError> {
        let current = self
            .members
            .get(self.active_index)
            .ok_or(RosterError::OutOfRange {
                index: self.active_index,
                len: self.members.len(),
            })?;
        if !current.is_fainted() {
            return Err(RosterError::InvalidTransition(format!(
                "active member {} still has {} hp",
                current.name, current.hit_points
            )));
        }
        if self.is_exhausted() {
            return Err(RosterError::InvalidTransition(
                "roster is exhausted".to_string(),
            ));
        }
        self.active_index += 1;
        Ok(self.active_index)
    }

    /// Checks a roster rebuilt from outside (a save file) against the
    /// invariants `new` and `advance` maintain.
    pub fn validate(&self) -> Result<(), RosterError> {
        if self.members.is_empty() {
            return Err(RosterError::Empty);
        }
        if self.active_index >= self.members.len() {
            return Err(RosterError::OutOfRange {
                index: self.active_index,
                len: self.members.len(),
            });
        }
        if let Some(member) = self.members[..self.active_index]
            .iter()
            .find(|m| !m.is_fainted())
        {
            return Err(RosterError::InvalidTransition(format!(
                "{} was skipped while still standing",
                member.name
            )));
        }
        if let Some(member) = self
            .members
            .iter()
            .find(|m| m.max_hit_points == 0 || m.hit_points > m.max_hit_points)
        {
            return Err(RosterError::InvalidTransition(format!(
                "{} has {}/{} hp",
                member.name, member.hit_points, member.max_hit_points
            )));
        }
        let active = &self.members[self.active_index];
        if active.is_fainted() && self.active_index + 1 < self.members.len() {
            return Err(RosterError::InvalidTransition(format!(
                "{} fainted but was never replaced",
                active.name
            )));
        }
        // Members waiting on the bench have not fought yet.
        if let Some(member) = self.members[self.active_index + 1..]
            .iter()
            .find(|m| m.hit_points != m.max_hit_points)
        {
            return Err(RosterError::InvalidTransition(format!(
                "{} is benched with {}/{} hp",
                member.name, member.hit_points, member.max_hit_points
            )));
        }
        Ok(())
    }

    fn check_active(&self) -> Result<(), RosterError> {
        if self.active_index >= self.members.len() || self.is_exhausted() {
            return Err(RosterError::OutOfRange {
                index: self.active_index,
                len: self.members.len(),
            });
        }
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn members_mut(&mut self) -> &mut [Creature] {
        &mut self.members
    }
}
