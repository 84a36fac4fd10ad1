//! Plain text macros
//!
//! ```text
//! 60
//! 10.5 1 0
//! 20.25 0 0
//! ```
//!
//! The first line is the frame rate; every following line with exactly three
//! space-separated tokens is `position hold player2`. Anything else is skipped.

use super::{Codec, DecodeOptions, Payload};
use crate::error::FormatError;
use crate::types::{Action, Macro};

pub(crate) const CODEC: Codec = Codec { decode, encode };

fn parse_number(token: &str, line: usize) -> Result<f64, FormatError> {
    token.parse().map_err(|_| FormatError::InvalidNumber {
        line,
        value: token.to_string(),
    })
}

fn decode(bytes: &[u8], options: &DecodeOptions) -> Result<Macro, FormatError> {
    let text = String::from_utf8_lossy(bytes);
    let mut lines = text.lines();

    let header = lines
        .next()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .ok_or_else(|| FormatError::structural("missing fps line"))?;
    let fps = parse_number(header, 1)?;

    let mut m = Macro::new(fps, options.uses_frame_units.unwrap_or(false));
    for (idx, line) in lines.enumerate() {
        let tokens: Vec<&str> = line.trim_end_matches('\r').split(' ').collect();
        let [position, hold, p2] = tokens.as_slice() else {
            continue;
        };
        // Line numbers are 1-based and the header is line 1
        let position = parse_number(position, idx + 2)?;
        m.actions.push(Action::new(position, *hold == "1", *p2 == "1"));
    }
    Ok(m)
}

fn encode(m: &Macro) -> Result<Payload, FormatError> {
    super::warn_dropped_secondary(m, super::MacroFormat::PlainText);

    let mut lines = Vec::with_capacity(m.actions.len() + 1);
    lines.push(m.fps.to_string());
    for action in &m.actions {
        lines.push(format!(
            "{} {} {}",
            action.position,
            u8::from(action.hold),
            u8::from(action.is_player2)
        ));
    }
    Ok(Payload::Text(lines.join("\n")))
}
