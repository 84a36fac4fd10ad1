//! Echo (`.echo`) macros
//!
//! ```json
//! { "FPS": 240, "Starting Frame": 3,
//!   "Echo Replay": [ { "Frame": 10, "Hold": true, "Player 2": false, "X Position": 57.1 } ] }
//! ```
//!
//! Every record carries both a frame and an x-position. The unit mode picks
//! which one becomes the action position; the other is kept as the secondary
//! value. Frames are relative to `Starting Frame`.

use super::{Codec, DecodeOptions, Payload};
use crate::error::FormatError;
use crate::types::{Action, Macro};
use serde::{Deserialize, Serialize};

pub(crate) const CODEC: Codec = Codec { decode, encode };

#[derive(Debug, Serialize, Deserialize)]
struct Document {
    #[serde(rename = "FPS")]
    fps: f64,
    #[serde(
        rename = "Starting Frame",
        default,
        deserialize_with = "super::integral_frame"
    )]
    starting_frame: i64,
    #[serde(rename = "Echo Replay")]
    replay: Vec<Record>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Record {
    #[serde(rename = "Frame", deserialize_with = "super::integral_frame")]
    frame: i64,
    #[serde(rename = "Hold")]
    hold: bool,
    #[serde(rename = "Player 2", default)]
    player2: bool,
    #[serde(rename = "X Position", default)]
    x_position: Option<f64>,
}

fn decode(bytes: &[u8], options: &DecodeOptions) -> Result<Macro, FormatError> {
    let doc: Document = super::parse_json(bytes)?;
    let frame_units = options.uses_frame_units.unwrap_or(true);
    let start = doc.starting_frame;

    let mut m = Macro::new(doc.fps, frame_units);
    m.actions = doc
        .replay
        .into_iter()
        .map(|record| -> Result<Action, FormatError> {
            let frame = record.frame.checked_add(start).ok_or_else(|| {
                FormatError::structural(format!(
                    "Echo frame {} overflows with starting frame {start}",
                    record.frame
                ))
            })? as f64;
            Ok(match (frame_units, record.x_position) {
                (true, Some(x)) => Action::new(frame, record.hold, record.player2).with_secondary(x),
                (true, None) => Action::new(frame, record.hold, record.player2),
                (false, x) => Action::new(x.unwrap_or(0.0), record.hold, record.player2)
                    .with_secondary(frame),
            })
        })
        .collect::<Result<_, _>>()?;
    Ok(m)
}

fn encode(m: &Macro) -> Result<Payload, FormatError> {
    let replay = m
        .actions
        .iter()
        .map(|action| {
            let (frame, x_position) = if m.uses_frame_units {
                (action.position, action.secondary.unwrap_or(0.0))
            } else {
                (action.secondary.unwrap_or(0.0), action.position)
            };
            Ok(Record {
                frame: i64::from(super::frame_i32(frame)?),
                hold: action.hold,
                player2: action.is_player2,
                x_position: Some(x_position),
            })
        })
        .collect::<Result<Vec<_>, FormatError>>()?;

    let doc = Document {
        fps: m.fps,
        starting_frame: 0,
        replay,
    };
    Ok(Payload::Text(serde_json::to_string(&doc)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &[u8] = br#"{ "FPS": 240, "Starting Frame": 100, "Echo Replay": [
        { "Frame": 0, "Hold": true, "Player 2": false, "X Position": 12.5 },
        { "Frame": 7, "Hold": false, "Player 2": true, "X Position": 20.0 }
    ] }"#;

    #[test]
    fn test_frame_mode_adds_starting_frame() {
        let m = decode(SAMPLE, &DecodeOptions::default()).unwrap();
        assert!(m.uses_frame_units);
        assert_eq!(m.fps, 240.0);
        assert_eq!(
            m.actions,
            vec![
                Action::new(100.0, true, false).with_secondary(12.5),
                Action::new(107.0, false, true).with_secondary(20.0),
            ]
        );
    }

    #[test]
    fn test_starting_frame_overflow_is_rejected() {
        let doc = br#"{"FPS":60,"Starting Frame":9223372036854775807,
            "Echo Replay":[{"Frame":1,"Hold":true,"Player 2":false}]}"#;
        let err = decode(doc, &DecodeOptions::default()).unwrap_err();
        assert!(matches!(err, FormatError::StructuralMismatch(_)));
    }

    #[test]
    fn test_integral_float_frames_are_accepted() {
        let doc = br#"{"FPS":60,"Starting Frame":2.0,
            "Echo Replay":[{"Frame":12.0,"Hold":true,"Player 2":false}]}"#;
        let m = decode(doc, &DecodeOptions::default()).unwrap();
        assert_eq!(m.actions, vec![Action::new(14.0, true, false)]);

        let fractional = br#"{"FPS":60,"Echo Replay":[{"Frame":12.5,"Hold":true}]}"#;
        let err = decode(fractional, &DecodeOptions::default()).unwrap_err();
        assert!(matches!(err, FormatError::Json(_)));
    }

    #[test]
    fn test_position_mode_swaps_values() {
        let options = DecodeOptions {
            uses_frame_units: Some(false),
            ..Default::default()
        };
        let m = decode(SAMPLE, &options).unwrap();
        assert!(!m.uses_frame_units);
        assert_eq!(m.actions[1], Action::new(20.0, false, true).with_secondary(107.0));
    }

    #[test]
    fn test_encode_writes_zero_start() {
        let m = decode(SAMPLE, &DecodeOptions::default()).unwrap();
        let Payload::Text(text) = encode(&m).unwrap() else {
            panic!("Echo encodes to text");
        };
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["Starting Frame"], 0);
        assert_eq!(value["Echo Replay"][1]["Frame"], 107);
        assert_eq!(value["Echo Replay"][1]["Player 2"], true);

        let decoded = decode(text.as_bytes(), &DecodeOptions::default()).unwrap();
        assert_eq!(decoded, m);
    }

    #[test]
    fn test_missing_replay_is_json_error() {
        let err = decode(br#"{ "FPS": 60 }"#, &DecodeOptions::default()).unwrap_err();
        assert!(matches!(err, FormatError::Json(_)));
    }
}
