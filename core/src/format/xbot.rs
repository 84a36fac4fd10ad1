//! xBot (`.xbot`) text macros
//!
//! ```text
//! fps: 60
//! pro_plus
//! 1 1107296256
//! 0 1109393408
//! ```
//!
//! The second line is the mode: `pro_plus` stores the raw bit pattern of an
//! `f32` x-position, `frames` stores frame indices. Each record is
//! `state raw`, with hold in bit 0 and player 2 in bit 1.

use super::{ActionState, Codec, DecodeOptions, MacroFormat, Payload};
use crate::error::FormatError;
use crate::types::{Action, Macro};

pub(crate) const CODEC: Codec = Codec { decode, encode };

pub(crate) const FPS_PREFIX: &str = "fps: ";
pub(crate) const MODE_POSITION: &str = "pro_plus";
pub(crate) const MODE_FRAMES: &str = "frames";

fn parse_int<T: std::str::FromStr>(token: &str, line: usize) -> Result<T, FormatError> {
    token.parse().map_err(|_| FormatError::InvalidNumber {
        line,
        value: token.to_string(),
    })
}

fn decode(bytes: &[u8], _options: &DecodeOptions) -> Result<Macro, FormatError> {
    let text = String::from_utf8_lossy(bytes);
    let mut lines = text
        .lines()
        .enumerate()
        .map(|(idx, line)| (idx + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty());

    let (line_no, header) = lines
        .next()
        .ok_or_else(|| FormatError::structural("missing fps line"))?;
    let fps_token = header
        .split(' ')
        .nth(1)
        .ok_or_else(|| FormatError::structural(format!("malformed fps line '{header}'")))?;
    let fps: u32 = parse_int(fps_token, line_no)?;

    let (_, mode) = lines
        .next()
        .ok_or_else(|| FormatError::structural("missing mode line"))?;
    let frame = match mode {
        MODE_FRAMES => true,
        MODE_POSITION => false,
        other => {
            return Err(FormatError::structural(format!(
                "xBot macro is not pro+ (mode '{other}')"
            )));
        }
    };

    let mut m = Macro::new(f64::from(fps), frame);
    for (line_no, line) in lines {
        let mut tokens = line.split(' ');
        let (Some(state), Some(raw)) = (tokens.next(), tokens.next()) else {
            return Err(FormatError::structural(format!(
                "line {line_no}: expected 'state position'"
            )));
        };
        let state: u8 = parse_int(state, line_no)?;
        let raw: u32 = parse_int(raw, line_no)?;
        let position = if frame {
            f64::from(raw)
        } else {
            f64::from(f32::from_bits(raw))
        };
        let (hold, is_player2) = ActionState::unpack(state);
        m.actions.push(Action::new(position, hold, is_player2));
    }
    Ok(m)
}

fn encode(m: &Macro) -> Result<Payload, FormatError> {
    super::warn_dropped_secondary(m, MacroFormat::Xbot);

    let fps = m.fps.round();
    if !fps.is_finite() || fps < 0.0 {
        return Err(FormatError::unrepresentable(format!("{} fps", m.fps)));
    }
    if fps != m.fps {
        tracing::warn!(format = %MacroFormat::Xbot, fps = m.fps, stored = fps, "rounding fps to an integer");
    }

    let mut out = String::with_capacity(32 + m.actions.len() * 14);
    out.push_str(&format!("{FPS_PREFIX}{fps}\n"));
    out.push_str(if m.uses_frame_units {
        MODE_FRAMES
    } else {
        MODE_POSITION
    });
    out.push('\n');
    for action in &m.actions {
        let raw = if m.uses_frame_units {
            super::frame_u32(action.position)?
        } else {
            (action.position as f32).to_bits()
        };
        let state = ActionState::pack(action.hold, action.is_player2);
        out.push_str(&format!("{state} {raw}\n"));
    }
    Ok(Payload::Text(out))
}
