//! kdBot macros (binary, frame based)
//!
//! ```text
//! f32 fps
//! { u32 frame, u8 hold, u8 player2 }*
//! ```

use super::{Codec, DecodeOptions, MacroFormat, Payload};
use crate::cursor::ByteCursor;
use crate::error::FormatError;
use crate::types::{Action, Macro};

pub(crate) const CODEC: Codec = Codec { decode, encode };

fn decode(bytes: &[u8], _options: &DecodeOptions) -> Result<Macro, FormatError> {
    let mut cursor = ByteCursor::new(bytes);
    let mut m = Macro::new(f64::from(cursor.read_f32()?), true);
    while !cursor.is_eof() {
        let frame = cursor.read_u32()?;
        let hold = cursor.read_u8()? != 0;
        let is_player2 = cursor.read_u8()? != 0;
        m.actions.push(Action::new(f64::from(frame), hold, is_player2));
    }
    Ok(m)
}

fn encode(m: &Macro) -> Result<Payload, FormatError> {
    super::require_units(m, MacroFormat::Kdbot)?;
    super::warn_dropped_secondary(m, MacroFormat::Kdbot);

    let mut cursor = ByteCursor::with_size(4 + m.actions.len() * 6);
    cursor.write_f32(m.fps as f32)?;
    for action in &m.actions {
        cursor.write_u32(super::frame_u32(action.position)?)?;
        cursor.write_u8(u8::from(action.hold))?;
        cursor.write_u8(u8::from(action.is_player2))?;
    }
    Ok(Payload::Binary(cursor.into_inner()))
}
