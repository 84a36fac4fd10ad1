//! DDHOR (`.ddhor`), binary and JSON flavours
//!
//! ```text
//! binary:  "DDHR", i16 fps, i32 p1 count, i32 p2 count
//!          { f32 x, u8 action }*     player 1 run, then player 2 run
//!                                    action 0 = press, anything else = release
//! json:    { "fps": 60, "macro": "x-position",
//!            "inputsP1": [ { "action": "PUSH", "position": 12.5 } ], "inputsP2": [] }
//! ```
//!
//! Both decoders merge the two player runs and stable-sort by position, so
//! equal positions keep player 1 ahead of player 2.

use super::{Codec, DecodeOptions, MacroFormat, Payload};
use crate::cursor::ByteCursor;
use crate::error::FormatError;
use crate::transform;
use crate::types::{Action, Macro};
use serde::{Deserialize, Serialize};

pub(crate) const CODEC: Codec = Codec {
    decode: decode_binary,
    encode: encode_binary,
};

pub(crate) const JSON_CODEC: Codec = Codec {
    decode: decode_json,
    encode: encode_json,
};

pub(crate) const MAGIC: &[u8; 4] = b"DDHR";

const ACTION_PRESS: u8 = 0;
const ACTION_RELEASE: u8 = 1;

const MODE_POSITION: &str = "x-position";

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Document {
    fps: f64,
    #[serde(rename = "macro")]
    mode: String,
    #[serde(default)]
    inputs_p1: Vec<Input>,
    #[serde(default)]
    inputs_p2: Vec<Input>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
enum InputAction {
    Push,
    Release,
}

#[derive(Debug, Serialize, Deserialize)]
struct Input {
    action: InputAction,
    position: f64,
}

fn decode_binary(bytes: &[u8], options: &DecodeOptions) -> Result<Macro, FormatError> {
    let mut cursor = ByteCursor::new(bytes);
    if !cursor.peek_bytes(4).is_ok_and(|magic| magic == MAGIC) {
        tracing::debug!("no DDHR magic, decoding as DDHOR JSON");
        return decode_json(bytes, options);
    }
    cursor.seek(4);

    let fps = cursor.read_i16()?;
    let p1_count = cursor.read_i32()?;
    let p2_count = cursor.read_i32()?;
    let p1_count = usize::try_from(p1_count)
        .map_err(|_| FormatError::structural(format!("negative player 1 count {p1_count}")))?;

    let mut m = Macro::new(f64::from(fps), false);
    let mut index = 0usize;
    while !cursor.is_eof() {
        let position = f64::from(cursor.read_f32()?);
        let hold = cursor.read_u8()? == ACTION_PRESS;
        m.actions.push(Action::new(position, hold, index >= p1_count));
        index += 1;
    }
    if usize::try_from(p2_count).ok().map(|p2| p1_count + p2) != Some(index) {
        tracing::debug!(
            p1_count,
            p2_count,
            records = index,
            "DDHOR header counts disagree with the record count"
        );
    }

    transform::sort_by_position(&mut m);
    Ok(m)
}

fn encode_binary(m: &Macro) -> Result<Payload, FormatError> {
    super::require_units(m, MacroFormat::Ddhor)?;
    super::warn_dropped_secondary(m, MacroFormat::Ddhor);

    let fps = super::fps_i16(m.fps, MacroFormat::Ddhor)?;
    let (p1, p2): (Vec<&Action>, Vec<&Action>) = m.actions.iter().partition(|a| !a.is_player2);
    let count = |n: usize| {
        i32::try_from(n).map_err(|_| FormatError::unrepresentable("more than i32::MAX actions"))
    };

    let mut cursor = ByteCursor::with_size(14 + m.actions.len() * 5);
    cursor.write_bytes(MAGIC)?;
    cursor.write_i16(fps)?;
    cursor.write_i32(count(p1.len())?)?;
    cursor.write_i32(count(p2.len())?)?;
    for action in p1.into_iter().chain(p2) {
        cursor.write_f32(action.position as f32)?;
        cursor.write_u8(if action.hold {
            ACTION_PRESS
        } else {
            ACTION_RELEASE
        })?;
    }
    Ok(Payload::Binary(cursor.into_inner()))
}

fn decode_json(bytes: &[u8], _options: &DecodeOptions) -> Result<Macro, FormatError> {
    let doc: Document = super::parse_json(bytes)?;
    if doc.mode != MODE_POSITION {
        return Err(FormatError::structural(format!(
            "unsupported DDHOR macro type '{}'",
            doc.mode
        )));
    }

    let mut m = Macro::new(doc.fps, false);
    let inputs = doc
        .inputs_p1
        .into_iter()
        .map(|i| (i, false))
        .chain(doc.inputs_p2.into_iter().map(|i| (i, true)));
    m.actions = inputs
        .map(|(input, is_player2)| {
            Action::new(
                input.position,
                matches!(input.action, InputAction::Push),
                is_player2,
            )
        })
        .collect();

    transform::sort_by_position(&mut m);
    Ok(m)
}

fn encode_json(m: &Macro) -> Result<Payload, FormatError> {
    super::require_units(m, MacroFormat::DdhorJson)?;
    super::warn_dropped_secondary(m, MacroFormat::DdhorJson);

    let input = |a: &Action| Input {
        action: if a.hold {
            InputAction::Push
        } else {
            InputAction::Release
        },
        position: a.position,
    };
    let doc = Document {
        fps: m.fps,
        mode: MODE_POSITION.to_string(),
        inputs_p1: m.actions.iter().filter(|a| !a.is_player2).map(input).collect(),
        inputs_p2: m.actions.iter().filter(|a| a.is_player2).map(input).collect(),
    };
    Ok(Payload::Text(serde_json::to_string(&doc)?))
}
