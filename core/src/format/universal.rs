//! Universal Replay Format (binary, no canonical extension)
//!
//! ```text
//! f32 fps, u8 type
//! type 0:  { u8 state, f32 x }*
//! type 1:  { u8 state, u32 frame }*
//! type 2:  { u8 state, f32 x, u32 frame }*
//! ```
//!
//! `state` uses the same packing as ReplayBot. Type 2 records carry both
//! units; the frame becomes the position unless x units were requested, and
//! the other value is kept as the secondary position.

use super::{ActionState, Codec, DecodeOptions, MacroFormat, Payload};
use crate::cursor::ByteCursor;
use crate::error::FormatError;
use crate::types::{Action, Macro};

pub(crate) const CODEC: Codec = Codec { decode, encode };

const TYPE_POSITION: u8 = 0;
const TYPE_FRAME: u8 = 1;
const TYPE_BOTH: u8 = 2;

const HEADER_LEN: usize = 5;

fn decode(bytes: &[u8], options: &DecodeOptions) -> Result<Macro, FormatError> {
    let mut cursor = ByteCursor::new(bytes);
    let fps = f64::from(cursor.read_f32()?);
    let kind = cursor.read_u8()?;

    let frame = match kind {
        TYPE_POSITION => false,
        TYPE_FRAME => true,
        TYPE_BOTH => options.uses_frame_units.unwrap_or(true),
        other => {
            return Err(FormatError::UnsupportedVersion {
                version: u32::from(other),
            });
        }
    };

    let mut m = Macro::new(fps, frame);
    m.format_version = Some(u32::from(kind));
    while !cursor.is_eof() {
        let (hold, is_player2) = ActionState::unpack(cursor.read_u8()?);
        let action = match kind {
            TYPE_POSITION => Action::new(f64::from(cursor.read_f32()?), hold, is_player2),
            TYPE_FRAME => Action::new(f64::from(cursor.read_u32()?), hold, is_player2),
            _ => {
                let x = f64::from(cursor.read_f32()?);
                let frame_index = f64::from(cursor.read_u32()?);
                if frame {
                    Action::new(frame_index, hold, is_player2).with_secondary(x)
                } else {
                    Action::new(x, hold, is_player2).with_secondary(frame_index)
                }
            }
        };
        m.actions.push(action);
    }
    Ok(m)
}

fn encode(m: &Macro) -> Result<Payload, FormatError> {
    let kind = if m.format_version == Some(u32::from(TYPE_BOTH)) && m.all_have_secondary() {
        TYPE_BOTH
    } else if m.uses_frame_units {
        TYPE_FRAME
    } else {
        TYPE_POSITION
    };
    if kind != TYPE_BOTH {
        super::warn_dropped_secondary(m, MacroFormat::Universal);
    }

    let record_len = if kind == TYPE_BOTH { 9 } else { 5 };
    let mut cursor = ByteCursor::with_size(HEADER_LEN + m.actions.len() * record_len);
    cursor.write_f32(m.fps as f32)?;
    cursor.write_u8(kind)?;
    for action in &m.actions {
        cursor.write_u8(ActionState::pack(action.hold, action.is_player2))?;
        match (kind, action.secondary) {
            (TYPE_BOTH, Some(secondary)) => {
                let (x, frame) = if m.uses_frame_units {
                    (secondary, action.position)
                } else {
                    (action.position, secondary)
                };
                cursor.write_f32(x as f32)?;
                cursor.write_u32(super::frame_u32(frame)?)?;
            }
            (TYPE_FRAME, _) => cursor.write_u32(super::frame_u32(action.position)?)?,
            _ => cursor.write_f32(action.position as f32)?,
        }
    }
    Ok(Payload::Binary(cursor.into_inner()))
}
