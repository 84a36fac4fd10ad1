//! TASBOT (`.json`) macros
//!
//! ```json
//! { "fps": 60, "macro": [
//!     { "frame": 12,
//!       "player_1": { "click": 1, "x_position": 45.2 },
//!       "player_2": { "click": 0, "x_position": 45.2 } } ] }
//! ```
//!
//! Click codes: 0 = nothing, 1 = press, 2 = release. Older files put the code
//! in flat `player_1_click` / `player_2_click` fields; the nested one wins when
//! both are present.

use super::{Codec, DecodeOptions, MacroFormat, Payload};
use crate::error::FormatError;
use crate::types::{Action, Macro, Player};
use serde::{Deserialize, Serialize};

pub(crate) const CODEC: Codec = Codec { decode, encode };

const CLICK_NONE: u8 = 0;
const CLICK_PRESS: u8 = 1;
const CLICK_RELEASE: u8 = 2;

#[derive(Debug, Serialize, Deserialize)]
struct Document {
    fps: f64,
    #[serde(rename = "macro")]
    entries: Vec<Entry>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Entry {
    #[serde(deserialize_with = "super::integral_frame")]
    frame: i64,
    #[serde(default)]
    player_1: PlayerInput,
    #[serde(default)]
    player_2: PlayerInput,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    player_1_click: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    player_2_click: Option<u8>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct PlayerInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    click: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    x_position: Option<f64>,
}

impl Entry {
    fn action_for(&self, player: Player) -> Option<Action> {
        let (nested, flat) = match player {
            Player::One => (&self.player_1, self.player_1_click),
            Player::Two => (&self.player_2, self.player_2_click),
        };
        let hold = match nested.click.or(flat)? {
            CLICK_NONE => return None,
            CLICK_PRESS => true,
            _ => false,
        };
        let action = Action::new(self.frame as f64, hold, player.is_player2());
        Some(match nested.x_position {
            Some(x) => action.with_secondary(x),
            None => action,
        })
    }
}

fn decode(bytes: &[u8], _options: &DecodeOptions) -> Result<Macro, FormatError> {
    let doc: Document = super::parse_json(bytes)?;

    let mut m = Macro::new(doc.fps, true);
    for entry in &doc.entries {
        m.actions.extend(entry.action_for(Player::One));
        m.actions.extend(entry.action_for(Player::Two));
    }
    Ok(m)
}

fn encode(m: &Macro) -> Result<Payload, FormatError> {
    super::require_units(m, MacroFormat::Tasbot)?;

    let entries = m
        .actions
        .iter()
        .map(|action| {
            let click = if action.hold {
                CLICK_PRESS
            } else {
                CLICK_RELEASE
            };
            let x_position = action.secondary;
            let active = PlayerInput {
                click: Some(click),
                x_position,
            };
            let idle = PlayerInput {
                click: Some(CLICK_NONE),
                x_position,
            };
            let (player_1, player_2) = match action.player() {
                Player::One => (active, idle),
                Player::Two => (idle, active),
            };
            Ok(Entry {
                frame: i64::from(super::frame_u32(action.position)?),
                player_1,
                player_2,
                ..Default::default()
            })
        })
        .collect::<Result<Vec<_>, FormatError>>()?;

    let doc = Document {
        fps: m.fps,
        entries,
    };
    Ok(Payload::Text(serde_json::to_string(&doc)?))
}
