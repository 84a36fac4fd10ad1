//! Canonical, format-independent macro model
//!
//! Every decoder produces a [`Macro`] and every encoder consumes one. A macro
//! is populated in one shot by a single decoder, optionally mutated by the
//! transforms in [`crate::transform`], then read by exactly one encoder.

use serde::{Deserialize, Serialize};

/// One press or release event
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Action {
    /// Frame index or x-coordinate, see [`Macro::uses_frame_units`]
    pub position: f64,
    /// `true` when the button goes down, `false` on release
    pub hold: bool,
    /// Which of the two players the event belongs to
    pub is_player2: bool,
    /// Auxiliary position some formats store next to the primary one
    /// (the x-coordinate of a frame-based action, or vice versa)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secondary: Option<f64>,
}

impl Action {
    pub fn new(position: f64, hold: bool, is_player2: bool) -> Self {
        Self {
            position,
            hold,
            is_player2,
            secondary: None,
        }
    }

    pub fn with_secondary(mut self, secondary: f64) -> Self {
        self.secondary = Some(secondary);
        self
    }

    pub fn player(&self) -> Player {
        Player::from_is_player2(self.is_player2)
    }
}

/// Player selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Player {
    One,
    Two,
}

impl Player {
    pub fn from_is_player2(is_player2: bool) -> Self {
        if is_player2 { Player::Two } else { Player::One }
    }

    pub fn is_player2(self) -> bool {
        self == Player::Two
    }

    /// Parse "1"/"2" (also accepts "p1"/"p2")
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "1" | "p1" => Some(Player::One),
            "2" | "p2" => Some(Player::Two),
            _ => None,
        }
    }
}

/// Complete macro (in-memory representation)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Macro {
    /// Playback rate
    pub fps: f64,
    /// `true` if positions are integer frame indices, `false` for x-coordinates
    pub uses_frame_units: bool,
    /// Events in file order
    pub actions: Vec<Action>,
    /// Layout variant seen during decode (only meaningful within that format)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format_version: Option<u32>,
}

impl Macro {
    /// Create an empty macro
    pub fn new(fps: f64, uses_frame_units: bool) -> Self {
        Self {
            fps,
            uses_frame_units,
            actions: Vec::new(),
            format_version: None,
        }
    }

    /// Number of actions belonging to `player`
    pub fn count_for(&self, player: Player) -> usize {
        self.actions
            .iter()
            .filter(|a| a.is_player2 == player.is_player2())
            .count()
    }

    /// Whether every action carries a secondary position
    pub fn all_have_secondary(&self) -> bool {
        !self.actions.is_empty() && self.actions.iter().all(|a| a.secondary.is_some())
    }

    /// Human-readable unit name
    pub fn unit_name(&self) -> &'static str {
        if self.uses_frame_units { "frames" } else { "x-position" }
    }
}
