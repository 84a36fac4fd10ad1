//! Rush macros (binary, frame based)
//!
//! ```text
//! i16 fps
//! { i32 frame, u8 state }*
//! ```

use super::{ActionState, Codec, DecodeOptions, MacroFormat, Payload};
use crate::cursor::ByteCursor;
use crate::error::FormatError;
use crate::types::{Action, Macro};

pub(crate) const CODEC: Codec = Codec { decode, encode };

fn decode(bytes: &[u8], _options: &DecodeOptions) -> Result<Macro, FormatError> {
    let mut cursor = ByteCursor::new(bytes);
    let mut m = Macro::new(f64::from(cursor.read_i16()?), true);
    while !cursor.is_eof() {
        let frame = cursor.read_i32()?;
        let (hold, is_player2) = ActionState::unpack(cursor.read_u8()?);
        m.actions.push(Action::new(f64::from(frame), hold, is_player2));
    }
    Ok(m)
}

fn encode(m: &Macro) -> Result<Payload, FormatError> {
    super::require_units(m, MacroFormat::Rush)?;
    super::warn_dropped_secondary(m, MacroFormat::Rush);

    let mut cursor = ByteCursor::with_size(2 + m.actions.len() * 5);
    cursor.write_i16(super::fps_i16(m.fps, MacroFormat::Rush)?)?;
    for action in &m.actions {
        cursor.write_i32(super::frame_i32(action.position)?)?;
        cursor.write_u8(ActionState::pack(action.hold, action.is_player2))?;
    }
    Ok(Payload::Binary(cursor.into_inner()))
}
