use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Number of moves offered to the player for the active creature.
pub const MOVE_SLOTS: usize = 4;

/// Move offered when a creature's move pool is empty.
pub const FALLBACK_MOVE: &str = "struggle";

/// A creature record as returned by the catalog.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Creature {
    pub name: String,
    pub sprite_url: Option<String>,
    pub hit_points: u16,
    pub max_hit_points: u16,
    #[serde(default)]
    pub moves: Vec<String>,
}

impl Creature {
    pub fn new(name: impl Into<String>, hit_points: u16, moves: Vec<String>) -> Self {
        Self {
            name: name.into(),
            sprite_url: None,
            hit_points,
            max_hit_points: hit_points,
            moves,
        }
    }

    pub fn with_sprite(mut self, url: impl Into<String>) -> Self {
        self.sprite_url = Some(url.into());
        self
    }

    pub fn is_fainted(&self) -> bool {
        self.hit_points == 0
    }

    /// Subtracts `damage` hit points, saturating at zero. Returns the amount
    /// actually removed.
    pub fn take_damage(&mut self, damage: u16) -> u16 {
        let before = self.hit_points;
        self.hit_points = self.hit_points.saturating_sub(damage);
        before - self.hit_points
    }

    pub fn move_slots(&self) -> Vec<&str> {
        if self.moves.is_empty() {
            return vec![FALLBACK_MOVE];
        }
        self.moves
            .iter()
            .take(MOVE_SLOTS)
            .map(String::as_str)
            .collect()
    }

    pub fn display_name(&self) -> String {
        format_name(&self.name)
    }
}

pub fn format_name(name: &str) -> String {
    name.split('-')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => {
                    let rest = chars.as_str();
                    format!("{}{}", first.to_ascii_uppercase(), rest)
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
