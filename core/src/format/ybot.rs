//! yBot JSON macros
//!
//! A yBot file holds one macro per level, keyed by level name:
//!
//! ```json
//! { "Stereo Madness": { "delta_override": 0.0166, "instructions": [ { "x": 12.5, "press": true, "p2": false } ] } }
//! ```
//!
//! Exports go under the reserved `converted` level key.

use super::{Codec, DecodeOptions, MacroFormat, Payload};
use crate::error::FormatError;
use crate::types::{Action, Macro};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub(crate) const CODEC: Codec = Codec { decode, encode };

/// Level key written on export
pub const CONVERTED_LEVEL: &str = "converted";

#[derive(Debug, Serialize, Deserialize)]
struct Level {
    delta_override: f64,
    instructions: Vec<Instruction>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Instruction {
    x: f64,
    press: bool,
    #[serde(default)]
    p2: bool,
}

/// Level names present in a yBot document (sorted)
pub fn level_names(bytes: &[u8]) -> Result<Vec<String>, FormatError> {
    let doc: serde_json::Map<String, serde_json::Value> = super::parse_json(bytes)?;
    Ok(doc.keys().cloned().collect())
}

fn decode(bytes: &[u8], options: &DecodeOptions) -> Result<Macro, FormatError> {
    let mut doc: serde_json::Map<String, serde_json::Value> = super::parse_json(bytes)?;

    let key = match &options.ybot_level {
        Some(level) => level.clone(),
        None if doc.len() == 1 => doc.keys().next().cloned().unwrap_or_default(),
        None => {
            let names: Vec<&str> = doc.keys().map(String::as_str).collect();
            return Err(FormatError::structural(format!(
                "select a level, file contains: {}",
                names.join(", ")
            )));
        }
    };

    let value = doc.remove(&key).ok_or_else(|| {
        FormatError::structural(format!("level '{key}' not found in yBot macro"))
    })?;
    let level: Level = serde_json::from_value(value)?;
    if level.delta_override <= 0.0 {
        return Err(FormatError::structural(format!(
            "invalid delta_override {}",
            level.delta_override
        )));
    }

    let mut m = Macro::new(1.0 / level.delta_override, false);
    m.actions = level
        .instructions
        .into_iter()
        .map(|i| Action::new(i.x, i.press, i.p2))
        .collect();
    Ok(m)
}

fn encode(m: &Macro) -> Result<Payload, FormatError> {
    super::require_units(m, MacroFormat::Ybot)?;
    super::warn_dropped_secondary(m, MacroFormat::Ybot);

    let level = Level {
        delta_override: 1.0 / m.fps,
        instructions: m
            .actions
            .iter()
            .map(|a| Instruction {
                x: a.position,
                press: a.hold,
                p2: a.is_player2,
            })
            .collect(),
    };
    let doc = BTreeMap::from([(CONVERTED_LEVEL, level)]);
    Ok(Payload::Text(serde_json::to_string(&doc)?))
}
