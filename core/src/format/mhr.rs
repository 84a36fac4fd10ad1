//! MH Replay (`.mhr.json`) macros
//!
//! ```json
//! { "events": [ { "frame": 42, "down": true, "p2": false, "a": 0, "r": 0, "x": 130.5, "y": 0 } ],
//!   "meta": { "fps": 240 } }
//! ```
//!
//! Events without `down` are physics snapshots, not inputs, and are skipped.
//! The exporter writes zeroed physics fields and the secondary position as `x`.

use super::{Codec, DecodeOptions, MacroFormat, Payload};
use crate::error::FormatError;
use crate::types::{Action, Macro};
use serde::{Deserialize, Serialize};

pub(crate) const CODEC: Codec = Codec { decode, encode };

const GENERATOR_NOTE: &str = "Generated by macroconv";

#[derive(Debug, Deserialize)]
struct Document {
    meta: Meta,
    #[serde(default)]
    events: Vec<Event>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Meta {
    fps: f64,
}

#[derive(Debug, Deserialize)]
struct Event {
    #[serde(deserialize_with = "super::integral_frame")]
    frame: i64,
    down: Option<bool>,
    #[serde(default)]
    p2: bool,
    x: Option<f64>,
}

#[derive(Debug, Serialize)]
struct OutDocument {
    #[serde(rename = "_")]
    note: &'static str,
    events: Vec<OutEvent>,
    meta: Meta,
}

#[derive(Debug, Serialize)]
struct OutEvent {
    frame: u32,
    down: bool,
    p2: bool,
    a: f64,
    r: f64,
    x: f64,
    y: f64,
}

fn decode(bytes: &[u8], _options: &DecodeOptions) -> Result<Macro, FormatError> {
    let doc: Document = super::parse_json(bytes)?;

    let mut m = Macro::new(doc.meta.fps, true);
    m.actions = doc
        .events
        .into_iter()
        .filter_map(|event| {
            let action = Action::new(event.frame as f64, event.down?, event.p2);
            Some(match event.x {
                Some(x) => action.with_secondary(x),
                None => action,
            })
        })
        .collect();
    Ok(m)
}

fn encode(m: &Macro) -> Result<Payload, FormatError> {
    super::require_units(m, MacroFormat::MhReplay)?;

    let events = m
        .actions
        .iter()
        .map(|action| {
            Ok(OutEvent {
                frame: super::frame_u32(action.position)?,
                down: action.hold,
                p2: action.is_player2,
                a: 0.0,
                r: 0.0,
                x: action.secondary.unwrap_or(0.0),
                y: 0.0,
            })
        })
        .collect::<Result<Vec<_>, FormatError>>()?;

    let doc = OutDocument {
        note: GENERATOR_NOTE,
        events,
        meta: Meta { fps: m.fps },
    };

    let mut out = Vec::with_capacity(64 + m.actions.len() * 96);
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b" ");
    let mut ser = serde_json::Serializer::with_formatter(&mut out, formatter);
    doc.serialize(&mut ser)?;
    String::from_utf8(out)
        .map(Payload::Text)
        .map_err(|err| FormatError::structural(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_skips_physics_events() {
        let json = br#"{ "meta": { "fps": 240 }, "events": [
            { "frame": 3, "down": true, "x": 12.5 },
            { "frame": 4, "a": 0.1, "r": 0, "x": 13.0, "y": 1.0 },
            { "frame": 9, "down": false, "p2": true }
        ] }"#;
        let m = decode(json, &DecodeOptions::default()).unwrap();
        assert!(m.uses_frame_units);
        assert_eq!(m.fps, 240.0);
        assert_eq!(
            m.actions,
            vec![
                Action::new(3.0, true, false).with_secondary(12.5),
                Action::new(9.0, false, true),
            ]
        );
    }

    #[test]
    fn test_float_frame_is_accepted() {
        let json = br#"{ "meta": { "fps": 60 }, "events": [ { "frame": 7.0, "down": true } ] }"#;
        let m = decode(json, &DecodeOptions::default()).unwrap();
        assert_eq!(m.actions, vec![Action::new(7.0, true, false)]);
    }

    #[test]
    fn test_encode_one_space_indent() {
        let mut m = Macro::new(60.0, true);
        m.actions.push(Action::new(5.0, true, true).with_secondary(2.5));
        let Payload::Text(text) = encode(&m).unwrap() else {
            panic!("MH Replay encodes to text");
        };
        assert!(text.starts_with("{\n \"_\": "));
        assert!(text.contains("\n  {\n   \"frame\": 5,"));

        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["events"][0]["y"], 0.0);
        assert_eq!(value["events"][0]["x"], 2.5);
        assert_eq!(value["meta"]["fps"], 60.0);

        assert_eq!(decode(text.as_bytes(), &DecodeOptions::default()).unwrap(), m);
    }

    #[test]
    fn test_missing_meta_is_json_error() {
        let err = decode(br#"{ "events": [] }"#, &DecodeOptions::default()).unwrap_err();
        assert!(matches!(err, FormatError::Json(_)));
    }
}
