//! ReplayBot (`.replay`)
//!
//! Two on-disk layouts share the extension:
//!
//! ```text
//! legacy (v0):  f32 fps, then { f32 x, u8 hold, u8 player2 }*
//! RPLY v1:      "RPLY" u8 version=1, f32 fps, then { f32 x, u8 state }*
//! RPLY v2:      "RPLY" u8 version=2, u8 frame, f32 fps, then { f32 x | u32 frame, u8 state }*
//! ```
//!
//! `state` packs hold in bit 0 and player 2 in the remaining bits. The encoder
//! writes v2 unless the macro came from a v0/v1 file and still fits that layout.

use super::{ActionState, Codec, DecodeOptions, MacroFormat, Payload};
use crate::cursor::ByteCursor;
use crate::error::FormatError;
use crate::types::{Action, Macro};

pub(crate) const CODEC: Codec = Codec { decode, encode };

pub(crate) const MAGIC: &[u8; 4] = b"RPLY";

const LEGACY_VERSION: u32 = 0;

fn decode(bytes: &[u8], _options: &DecodeOptions) -> Result<Macro, FormatError> {
    let mut cursor = ByteCursor::new(bytes);

    if cursor.peek_bytes(4).is_ok_and(|magic| magic == MAGIC) {
        cursor.seek(4);
        let version = cursor.read_u8()?;
        if version != 1 && version != 2 {
            return Err(FormatError::UnsupportedVersion {
                version: u32::from(version),
            });
        }
        let frame = version == 2 && cursor.read_u8()? == 1;

        let mut m = Macro::new(f64::from(cursor.read_f32()?), frame);
        m.format_version = Some(u32::from(version));
        while !cursor.is_eof() {
            let position = if frame {
                f64::from(cursor.read_u32()?)
            } else {
                f64::from(cursor.read_f32()?)
            };
            let (hold, is_player2) = ActionState::unpack(cursor.read_u8()?);
            m.actions.push(Action::new(position, hold, is_player2));
        }
        Ok(m)
    } else {
        let mut m = Macro::new(f64::from(cursor.read_f32()?), false);
        m.format_version = Some(LEGACY_VERSION);
        while !cursor.is_eof() {
            let position = f64::from(cursor.read_f32()?);
            let hold = cursor.read_u8()? != 0;
            let is_player2 = cursor.read_u8()? != 0;
            m.actions.push(Action::new(position, hold, is_player2));
        }
        Ok(m)
    }
}

fn encode(m: &Macro) -> Result<Payload, FormatError> {
    super::warn_dropped_secondary(m, MacroFormat::ReplayBot);

    let bytes = match m.format_version {
        Some(LEGACY_VERSION) if !m.uses_frame_units => encode_legacy(m)?,
        Some(1) if !m.uses_frame_units => encode_v1(m)?,
        _ => encode_v2(m)?,
    };
    Ok(Payload::Binary(bytes))
}

fn encode_legacy(m: &Macro) -> Result<Vec<u8>, FormatError> {
    let mut cursor = ByteCursor::with_size(4 + m.actions.len() * 6);
    cursor.write_f32(m.fps as f32)?;
    for action in &m.actions {
        cursor.write_f32(action.position as f32)?;
        cursor.write_u8(u8::from(action.hold))?;
        cursor.write_u8(u8::from(action.is_player2))?;
    }
    Ok(cursor.into_inner())
}

fn encode_v1(m: &Macro) -> Result<Vec<u8>, FormatError> {
    let mut cursor = ByteCursor::with_size(9 + m.actions.len() * 5);
    cursor.write_bytes(MAGIC)?;
    cursor.write_u8(1)?;
    cursor.write_f32(m.fps as f32)?;
    for action in &m.actions {
        cursor.write_f32(action.position as f32)?;
        cursor.write_u8(ActionState::pack(action.hold, action.is_player2))?;
    }
    Ok(cursor.into_inner())
}

fn encode_v2(m: &Macro) -> Result<Vec<u8>, FormatError> {
    let mut cursor = ByteCursor::with_size(10 + m.actions.len() * 5);
    cursor.write_bytes(MAGIC)?;
    cursor.write_u8(2)?;
    cursor.write_u8(u8::from(m.uses_frame_units))?;
    cursor.write_f32(m.fps as f32)?;
    for action in &m.actions {
        if m.uses_frame_units {
            cursor.write_u32(super::frame_u32(action.position)?)?;
        } else {
            cursor.write_f32(action.position as f32)?;
        }
        cursor.write_u8(ActionState::pack(action.hold, action.is_player2))?;
    }
    Ok(cursor.into_inner())
}
