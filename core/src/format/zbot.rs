//! zBot (`.zbot`) and zBot Frame (`.zbf`)
//!
//! ```text
//! f32 delta, f32 speed
//! { f32 x | u32 frame, u8 hold, u8 player1 }*
//! ```
//!
//! Flags are ASCII: `'1'` (0x31) is set, anything else is clear. The second
//! flag marks player 1, so player 2 is stored inverted.

use super::{Codec, DecodeOptions, MacroFormat, Payload};
use crate::cursor::ByteCursor;
use crate::error::FormatError;
use crate::types::{Action, Macro};

pub(crate) const CODEC: Codec = Codec {
    decode: decode_position,
    encode: encode_position,
};

pub(crate) const FRAME_CODEC: Codec = Codec {
    decode: decode_frame,
    encode: encode_frame,
};

const SET: u8 = b'1';
const CLEAR: u8 = b'0';

/// Frame rate from the stored time step and speedhack multiplier
pub(crate) fn fps_from_header(delta: f32, speed: f32) -> f64 {
    1.0 / f64::from(delta) / f64::from(speed)
}

fn decode_position(bytes: &[u8], _options: &DecodeOptions) -> Result<Macro, FormatError> {
    decode(bytes, false)
}

fn decode_frame(bytes: &[u8], _options: &DecodeOptions) -> Result<Macro, FormatError> {
    decode(bytes, true)
}

fn decode(bytes: &[u8], frame: bool) -> Result<Macro, FormatError> {
    let mut cursor = ByteCursor::new(bytes);
    let delta = cursor.read_f32()?;
    let speed = cursor.read_f32()?;
    let fps = fps_from_header(delta, speed);
    if !fps.is_finite() || fps <= 0.0 {
        return Err(FormatError::structural(format!(
            "invalid time step (delta {delta}, speed {speed})"
        )));
    }

    let mut m = Macro::new(fps, frame);
    while !cursor.is_eof() {
        let position = if frame {
            f64::from(cursor.read_u32()?)
        } else {
            f64::from(cursor.read_f32()?)
        };
        let hold = cursor.read_u8()? == SET;
        let is_player2 = cursor.read_u8()? != SET;
        m.actions.push(Action::new(position, hold, is_player2));
    }
    Ok(m)
}

fn encode_position(m: &Macro) -> Result<Payload, FormatError> {
    encode(m, MacroFormat::Zbot)
}

fn encode_frame(m: &Macro) -> Result<Payload, FormatError> {
    encode(m, MacroFormat::ZbotFrame)
}

fn encode(m: &Macro, format: MacroFormat) -> Result<Payload, FormatError> {
    super::require_units(m, format)?;
    super::warn_dropped_secondary(m, format);

    let flag = |set: bool| if set { SET } else { CLEAR };
    let mut cursor = ByteCursor::with_size(8 + m.actions.len() * 6);
    cursor.write_f32((1.0 / m.fps) as f32)?;
    cursor.write_f32(1.0)?;
    for action in &m.actions {
        if m.uses_frame_units {
            cursor.write_u32(super::frame_u32(action.position)?)?;
        } else {
            cursor.write_f32(action.position as f32)?;
        }
        cursor.write_u8(flag(action.hold))?;
        cursor.write_u8(flag(!action.is_player2))?;
    }
    Ok(Payload::Binary(cursor.into_inner()))
}
