//! yBot frame macros (binary, no canonical extension)
//!
//! ```text
//! "ybot", f32 fps, u32 count
//! count × { i32 frame, u32 flags }      flags: bit 1 = hold, bit 0 = player 2
//! ```

use super::{Codec, DecodeOptions, MacroFormat, Payload};
use crate::cursor::ByteCursor;
use crate::error::FormatError;
use crate::types::{Action, Macro};

pub(crate) const CODEC: Codec = Codec { decode, encode };

pub(crate) const MAGIC: &[u8; 4] = b"ybot";

const FLAG_PLAYER2: u32 = 0b01;
const FLAG_HOLD: u32 = 0b10;

fn decode(bytes: &[u8], _options: &DecodeOptions) -> Result<Macro, FormatError> {
    let mut cursor = ByteCursor::new(bytes);
    let magic = cursor.read_bytes(4)?;
    if magic != MAGIC {
        return Err(FormatError::structural(format!(
            "expected 'ybot' magic, found {magic:02x?}"
        )));
    }

    let fps = f64::from(cursor.read_f32()?);
    let count = cursor.read_u32()? as usize;

    let mut m = Macro::new(fps, true);
    // Don't trust the count for preallocation, the file may be truncated
    m.actions.reserve(count.min(cursor.remaining() / 8));
    for _ in 0..count {
        let frame = cursor.read_i32()?;
        let flags = cursor.read_u32()?;
        m.actions.push(Action::new(
            f64::from(frame),
            flags & FLAG_HOLD != 0,
            flags & FLAG_PLAYER2 != 0,
        ));
    }
    if !cursor.is_eof() {
        tracing::debug!(
            trailing = cursor.remaining(),
            "ignoring bytes after the last yBot frame record"
        );
    }
    Ok(m)
}

fn encode(m: &Macro) -> Result<Payload, FormatError> {
    super::require_units(m, MacroFormat::YbotFrame)?;
    super::warn_dropped_secondary(m, MacroFormat::YbotFrame);

    let count = u32::try_from(m.actions.len())
        .map_err(|_| FormatError::unrepresentable("more than u32::MAX actions"))?;
    let mut cursor = ByteCursor::with_size(12 + m.actions.len() * 8);
    cursor.write_bytes(MAGIC)?;
    cursor.write_f32(m.fps as f32)?;
    cursor.write_u32(count)?;
    for action in &m.actions {
        let mut flags = 0;
        if action.hold {
            flags |= FLAG_HOLD;
        }
        if action.is_player2 {
            flags |= FLAG_PLAYER2;
        }
        cursor.write_i32(super::frame_i32(action.position)?)?;
        cursor.write_u32(flags)?;
    }
    Ok(Payload::Binary(cursor.into_inner()))
}
