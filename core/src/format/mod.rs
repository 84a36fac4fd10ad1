//! Format registry
//!
//! Every supported bot format is a variant of [`MacroFormat`]. Each variant
//! maps to a static [`Codec`], a pair of plain functions that decode bytes into
//! a [`Macro`] and encode a [`Macro`] back into a [`Payload`]. Neither side does
//! any I/O.
//!
//! # Adding a New Format
//!
//! 1. Add a submodule exporting a `CODEC` constant
//! 2. Add a variant to [`MacroFormat`] and to [`MacroFormat::ALL`]
//! 3. Fill in the match arms of `as_str`, `display_name`, `extension`,
//!    `units` and `codec`
//! 4. The compiler flags any arm you missed

pub(crate) mod ddhor;
mod echo;
mod kdbot;
mod mhr;
mod plain_text;
pub(crate) mod replaybot;
mod rush;
mod tasbot;
mod universal;
pub(crate) mod xbot;
pub mod ybot;
pub(crate) mod ybot_frame;
pub(crate) mod zbot;

use crate::error::{ConvertError, FormatError, Result};
use crate::types::Macro;
use std::fmt;
use std::str::FromStr;

/// Decode function signature shared by all codecs
pub type DecodeFn = fn(&[u8], &DecodeOptions) -> std::result::Result<Macro, FormatError>;
/// Encode function signature shared by all codecs
pub type EncodeFn = fn(&Macro) -> std::result::Result<Payload, FormatError>;

/// Static decode/encode pair for one format
#[derive(Clone, Copy)]
pub struct Codec {
    pub decode: DecodeFn,
    pub encode: EncodeFn,
}

/// Every format the converter understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MacroFormat {
    PlainText,
    ReplayBot,
    Zbot,
    ZbotFrame,
    Ybot,
    YbotFrame,
    Xbot,
    Ddhor,
    DdhorJson,
    Tasbot,
    Echo,
    Universal,
    Rush,
    MhReplay,
    Kdbot,
}

/// Position units a format can store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitSupport {
    /// Only x-coordinates
    Position,
    /// Only frame indices
    Frame,
    /// Either, chosen by the macro
    Either,
}

impl MacroFormat {
    /// All formats, in menu order
    pub const ALL: [MacroFormat; 15] = [
        MacroFormat::PlainText,
        MacroFormat::ReplayBot,
        MacroFormat::Zbot,
        MacroFormat::ZbotFrame,
        MacroFormat::Ybot,
        MacroFormat::YbotFrame,
        MacroFormat::Xbot,
        MacroFormat::Tasbot,
        MacroFormat::Echo,
        MacroFormat::Rush,
        MacroFormat::Universal,
        MacroFormat::Ddhor,
        MacroFormat::DdhorJson,
        MacroFormat::MhReplay,
        MacroFormat::Kdbot,
    ];

    /// Stable identifier used on the command line and in config files
    pub fn as_str(&self) -> &'static str {
        match self {
            MacroFormat::PlainText => "plain-text",
            MacroFormat::ReplayBot => "replaybot",
            MacroFormat::Zbot => "zbot",
            MacroFormat::ZbotFrame => "zbot-frame",
            MacroFormat::Ybot => "ybot",
            MacroFormat::YbotFrame => "ybot-frame",
            MacroFormat::Xbot => "xbot",
            MacroFormat::Ddhor => "ddhor",
            MacroFormat::DdhorJson => "ddhor-json",
            MacroFormat::Tasbot => "tasbot",
            MacroFormat::Echo => "echo",
            MacroFormat::Universal => "universal",
            MacroFormat::Rush => "rush",
            MacroFormat::MhReplay => "mh-replay",
            MacroFormat::Kdbot => "kdbot",
        }
    }

    /// Name shown to users
    pub fn display_name(&self) -> &'static str {
        match self {
            MacroFormat::PlainText => "Plain Text",
            MacroFormat::ReplayBot => "ReplayBot",
            MacroFormat::Zbot => "zBot",
            MacroFormat::ZbotFrame => "zBot Frame",
            MacroFormat::Ybot => "yBot",
            MacroFormat::YbotFrame => "yBot Frame",
            MacroFormat::Xbot => "xBot",
            MacroFormat::Ddhor => "DDHOR",
            MacroFormat::DdhorJson => "DDHOR JSON",
            MacroFormat::Tasbot => "TASBOT",
            MacroFormat::Echo => "Echo",
            MacroFormat::Universal => "Universal Replay",
            MacroFormat::Rush => "Rush",
            MacroFormat::MhReplay => "MH Replay",
            MacroFormat::Kdbot => "kdBot",
        }
    }

    /// Canonical file extension, if the format has one
    pub fn extension(&self) -> Option<&'static str> {
        match self {
            MacroFormat::PlainText => Some("txt"),
            MacroFormat::ReplayBot => Some("replay"),
            MacroFormat::Zbot => Some("zbot"),
            MacroFormat::ZbotFrame => Some("zbf"),
            MacroFormat::Ybot => Some("dat"),
            MacroFormat::Xbot => Some("xbot"),
            MacroFormat::Ddhor | MacroFormat::DdhorJson => Some("ddhor"),
            MacroFormat::Tasbot => Some("json"),
            MacroFormat::Echo => Some("echo"),
            MacroFormat::MhReplay => Some("mhr.json"),
            MacroFormat::YbotFrame
            | MacroFormat::Universal
            | MacroFormat::Rush
            | MacroFormat::Kdbot => None,
        }
    }

    /// Which position units the encoder accepts
    pub fn units(&self) -> UnitSupport {
        match self {
            MacroFormat::PlainText
            | MacroFormat::ReplayBot
            | MacroFormat::Xbot
            | MacroFormat::Echo
            | MacroFormat::Universal => UnitSupport::Either,
            MacroFormat::Zbot | MacroFormat::Ybot | MacroFormat::Ddhor | MacroFormat::DdhorJson => {
                UnitSupport::Position
            }
            MacroFormat::ZbotFrame
            | MacroFormat::YbotFrame
            | MacroFormat::Tasbot
            | MacroFormat::Rush
            | MacroFormat::MhReplay
            | MacroFormat::Kdbot => UnitSupport::Frame,
        }
    }

    /// Whether the encoded payload is binary (as opposed to text/JSON)
    pub fn is_binary(&self) -> bool {
        matches!(
            self,
            MacroFormat::ReplayBot
                | MacroFormat::Zbot
                | MacroFormat::ZbotFrame
                | MacroFormat::YbotFrame
                | MacroFormat::Ddhor
                | MacroFormat::Universal
                | MacroFormat::Rush
                | MacroFormat::Kdbot
        )
    }

    /// Static codec for this format
    pub fn codec(&self) -> &'static Codec {
        match self {
            MacroFormat::PlainText => &plain_text::CODEC,
            MacroFormat::ReplayBot => &replaybot::CODEC,
            MacroFormat::Zbot => &zbot::CODEC,
            MacroFormat::ZbotFrame => &zbot::FRAME_CODEC,
            MacroFormat::Ybot => &ybot::CODEC,
            MacroFormat::YbotFrame => &ybot_frame::CODEC,
            MacroFormat::Xbot => &xbot::CODEC,
            MacroFormat::Ddhor => &ddhor::CODEC,
            MacroFormat::DdhorJson => &ddhor::JSON_CODEC,
            MacroFormat::Tasbot => &tasbot::CODEC,
            MacroFormat::Echo => &echo::CODEC,
            MacroFormat::Universal => &universal::CODEC,
            MacroFormat::Rush => &rush::CODEC,
            MacroFormat::MhReplay => &mhr::CODEC,
            MacroFormat::Kdbot => &kdbot::CODEC,
        }
    }
}

impl fmt::Display for MacroFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Unknown format identifier
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown macro format '{0}'")]
pub struct UnknownFormat(pub String);

impl FromStr for MacroFormat {
    type Err = UnknownFormat;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        MacroFormat::ALL
            .into_iter()
            .find(|f| f.as_str() == wanted)
            .ok_or_else(|| UnknownFormat(s.to_string()))
    }
}

// Serialized through the stable id so config files stay readable
impl serde::Serialize for MacroFormat {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.as_str().serialize(serializer)
    }
}

impl<'de> serde::Deserialize<'de> for MacroFormat {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let id = String::deserialize(deserializer)?;
        id.parse().map_err(serde::de::Error::custom)
    }
}

/// Hints a decoder may need beyond the raw bytes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Unit mode for formats that can't tell from their own data
    pub uses_frame_units: Option<bool>,
    /// yBot level key to read
    pub ybot_level: Option<String>,
}

/// Encoder output
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    Binary(Vec<u8>),
    Text(String),
}

impl Payload {
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Payload::Binary(bytes) => bytes,
            Payload::Text(text) => text.as_bytes(),
        }
    }

    pub fn into_bytes(self) -> Vec<u8> {
        match self {
            Payload::Binary(bytes) => bytes,
            Payload::Text(text) => text.into_bytes(),
        }
    }

    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_text(&self) -> bool {
        matches!(self, Payload::Text(_))
    }
}

/// Decode `bytes` as `format`
pub fn decode(format: MacroFormat, bytes: &[u8], options: &DecodeOptions) -> Result<Macro> {
    tracing::debug!(%format, len = bytes.len(), "decoding macro");
    let decoded = (format.codec().decode)(bytes, options)
        .map_err(|source| ConvertError::Decode { format, source })?;
    tracing::debug!(
        %format,
        actions = decoded.actions.len(),
        fps = decoded.fps,
        frames = decoded.uses_frame_units,
        "decoded macro"
    );
    Ok(decoded)
}

/// Encode `m` as `format`
pub fn encode(format: MacroFormat, m: &Macro) -> Result<Payload> {
    tracing::debug!(%format, actions = m.actions.len(), "encoding macro");
    let payload =
        (format.codec().encode)(m).map_err(|source| ConvertError::Encode { format, source })?;
    tracing::debug!(%format, len = payload.len(), "encoded macro");
    Ok(payload)
}

bitflags::bitflags! {
    /// Packed per-action state byte (ReplayBot v1/v2, Universal, Rush)
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub(crate) struct ActionState: u8 {
        const HOLD = 0b0000_0001;
        const PLAYER2 = 0b0000_0010;
    }
}

impl ActionState {
    pub(crate) fn pack(hold: bool, is_player2: bool) -> u8 {
        let mut state = ActionState::empty();
        state.set(ActionState::HOLD, hold);
        state.set(ActionState::PLAYER2, is_player2);
        state.bits()
    }

    /// Returns `(hold, is_player2)`; any bit above the hold bit marks player 2.
    pub(crate) fn unpack(byte: u8) -> (bool, bool) {
        let state = ActionState::from_bits_retain(byte);
        (state.contains(ActionState::HOLD), byte >> 1 != 0)
    }
}

// ============================================================================
// Shared encoder helpers
// ============================================================================

/// Fail unless the macro uses the units `format` can store
pub(crate) fn require_units(m: &Macro, format: MacroFormat) -> std::result::Result<(), FormatError> {
    let ok = match format.units() {
        UnitSupport::Either => true,
        UnitSupport::Frame => m.uses_frame_units,
        UnitSupport::Position => !m.uses_frame_units,
    };
    if ok {
        Ok(())
    } else {
        Err(FormatError::unrepresentable(format!(
            "{} positions, {} only stores {}",
            m.unit_name(),
            format.display_name(),
            if m.uses_frame_units { "x-positions" } else { "frames" }
        )))
    }
}

/// Frame position as an unsigned 32-bit index
pub(crate) fn frame_u32(position: f64) -> std::result::Result<u32, FormatError> {
    let rounded = position.round();
    if !rounded.is_finite() || rounded < 0.0 || rounded > f64::from(u32::MAX) {
        return Err(FormatError::unrepresentable(format!(
            "frame {position} as an unsigned 32-bit index"
        )));
    }
    Ok(rounded as u32)
}

/// Frame position as a signed 32-bit index
pub(crate) fn frame_i32(position: f64) -> std::result::Result<i32, FormatError> {
    let rounded = position.round();
    if !rounded.is_finite() || rounded < f64::from(i32::MIN) || rounded > f64::from(i32::MAX) {
        return Err(FormatError::unrepresentable(format!(
            "frame {position} as a signed 32-bit index"
        )));
    }
    Ok(rounded as i32)
}

/// Frame rate stored as a 16-bit integer (DDHOR, Rush)
pub(crate) fn fps_i16(fps: f64, format: MacroFormat) -> std::result::Result<i16, FormatError> {
    let rounded = fps.round();
    if !rounded.is_finite() || rounded < 0.0 || rounded > f64::from(i16::MAX) {
        return Err(FormatError::unrepresentable(format!(
            "{fps} fps as a 16-bit integer"
        )));
    }
    if rounded != fps {
        tracing::warn!(%format, fps, stored = rounded, "rounding fps to an integer");
    }
    Ok(rounded as i16)
}

/// Log when secondary positions won't survive the target format
pub(crate) fn warn_dropped_secondary(m: &Macro, format: MacroFormat) {
    let dropped = m.actions.iter().filter(|a| a.secondary.is_some()).count();
    if dropped > 0 {
        tracing::warn!(%format, dropped, "secondary positions are not stored by this format");
    }
}

/// Parse a JSON document from raw bytes
pub(crate) fn parse_json<T: serde::de::DeserializeOwned>(
    bytes: &[u8],
) -> std::result::Result<T, FormatError> {
    Ok(serde_json::from_slice(strip_bom(bytes))?)
}

/// Deserialize a JSON frame number, accepting integral floats such as `12.0`
pub(crate) fn integral_frame<'de, D>(deserializer: D) -> std::result::Result<i64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::Deserialize;
    use serde::de::Error;

    let number = serde_json::Number::deserialize(deserializer)?;
    if let Some(frame) = number.as_i64() {
        return Ok(frame);
    }
    match number.as_f64() {
        Some(value)
            if value.fract() == 0.0 && value >= i64::MIN as f64 && value < i64::MAX as f64 =>
        {
            Ok(value as i64)
        }
        _ => Err(D::Error::custom(format!("frame {number} is not an integer"))),
    }
}

fn strip_bom(bytes: &[u8]) -> &[u8] {
    bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes)
}
