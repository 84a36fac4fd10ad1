//! Format detection from a file name and its leading bytes
//!
//! Detection is a best-effort guess and never fails. Extensions win over
//! content; content sniffing only looks at headers. When nothing matches the
//! result falls back to plain text with `confident = false`, and the caller has
//! to pick a format explicitly (see [`Detection::require`]).

use crate::cursor::ByteCursor;
use crate::error::{ConvertError, Result};
use crate::format::{self, DecodeOptions, MacroFormat};
use std::path::Path;

/// Outcome of [`detect`]
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    pub format: MacroFormat,
    /// `false` when the format is only the plain-text fallback
    pub confident: bool,
    /// Unit mode, when the header or extension reveals it
    pub uses_frame_units: Option<bool>,
    /// Frame rate peeked from the header
    pub fps: Option<f64>,
    /// Layout variant peeked from the header
    pub format_version: Option<u32>,
}

impl Detection {
    fn new(format: MacroFormat) -> Self {
        Self {
            format,
            confident: true,
            uses_frame_units: None,
            fps: None,
            format_version: None,
        }
    }

    fn frames(mut self, frames: bool) -> Self {
        self.uses_frame_units = Some(frames);
        self
    }

    fn fallback() -> Self {
        Self {
            confident: false,
            ..Self::new(MacroFormat::PlainText)
        }
    }

    /// Decoder hints derived from this detection
    pub fn decode_options(&self) -> DecodeOptions {
        DecodeOptions {
            uses_frame_units: self.uses_frame_units,
            ..Default::default()
        }
    }

    /// The detected format, or [`ConvertError::DetectionAmbiguous`] for the fallback
    pub fn require(&self, file_name: &str) -> Result<MacroFormat> {
        if self.confident {
            Ok(self.format)
        } else {
            Err(ConvertError::DetectionAmbiguous {
                file_name: file_name.to_string(),
            })
        }
    }
}

pub(crate) const MHR_SUFFIX: &str = ".mhr.json";

/// Guess the format of `bytes`, using `file_name` for its extension
pub fn detect(file_name: &str, bytes: &[u8]) -> Detection {
    let ext = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    let detection = match ext.as_deref() {
        Some("zbot") => peek_zbot(bytes, MacroFormat::Zbot, false),
        Some("zbf") => peek_zbot(bytes, MacroFormat::ZbotFrame, true),
        Some("replay") => peek_replaybot(bytes),
        Some("echo") => Detection::new(MacroFormat::Echo).frames(true),
        Some("ddhor") => {
            if bytes.starts_with(format::ddhor::MAGIC) {
                peek_ddhor(bytes)
            } else {
                Detection::new(MacroFormat::DdhorJson).frames(false)
            }
        }
        Some("json") if file_name.to_ascii_lowercase().ends_with(MHR_SUFFIX) => {
            Detection::new(MacroFormat::MhReplay).frames(true)
        }
        Some("json") => Detection::new(MacroFormat::Tasbot).frames(true),
        _ => sniff(bytes),
    };

    tracing::debug!(
        file_name,
        format = %detection.format,
        confident = detection.confident,
        "detected macro format"
    );
    detection
}

fn sniff(bytes: &[u8]) -> Detection {
    if bytes.starts_with(format::xbot::FPS_PREFIX.as_bytes()) {
        peek_xbot(bytes)
    } else if bytes.starts_with(format::replaybot::MAGIC) {
        peek_replaybot(bytes)
    } else if bytes.starts_with(format::ddhor::MAGIC) {
        peek_ddhor(bytes)
    } else if bytes.starts_with(format::ybot_frame::MAGIC) {
        peek_ybot_frame(bytes)
    } else {
        Detection::fallback()
    }
}

fn peek_zbot(bytes: &[u8], format: MacroFormat, frames: bool) -> Detection {
    let mut cursor = ByteCursor::new(bytes);
    let fps = match (cursor.read_f32(), cursor.read_f32()) {
        (Ok(delta), Ok(speed)) => Some(format::zbot::fps_from_header(delta, speed)),
        _ => None,
    };
    Detection {
        fps: fps.filter(|fps| fps.is_finite() && *fps > 0.0),
        ..Detection::new(format).frames(frames)
    }
}

fn peek_replaybot(bytes: &[u8]) -> Detection {
    let mut cursor = ByteCursor::new(bytes);
    let mut detection = Detection::new(MacroFormat::ReplayBot);

    let mut frames = false;
    if bytes.starts_with(format::replaybot::MAGIC) {
        cursor.seek(format::replaybot::MAGIC.len());
        let version = cursor.read_u8().ok();
        if version == Some(2) {
            frames = cursor.read_u8().is_ok_and(|flag| flag == 1);
        }
        detection.format_version = version.map(u32::from);
    } else {
        detection.format_version = Some(0);
    }
    detection.fps = cursor.read_f32().ok().map(f64::from);
    detection.frames(frames)
}

fn peek_ddhor(bytes: &[u8]) -> Detection {
    let mut cursor = ByteCursor::new(bytes);
    cursor.seek(format::ddhor::MAGIC.len());
    Detection {
        fps: cursor.read_i16().ok().map(f64::from),
        ..Detection::new(MacroFormat::Ddhor).frames(false)
    }
}

fn peek_ybot_frame(bytes: &[u8]) -> Detection {
    let mut cursor = ByteCursor::new(bytes);
    cursor.seek(format::ybot_frame::MAGIC.len());
    Detection {
        fps: cursor.read_f32().ok().map(f64::from),
        ..Detection::new(MacroFormat::YbotFrame).frames(true)
    }
}

fn peek_xbot(bytes: &[u8]) -> Detection {
    let mut cursor = ByteCursor::new(bytes);
    cursor.seek(format::xbot::FPS_PREFIX.len());
    let mut detection = Detection::new(MacroFormat::Xbot);

    detection.fps = cursor
        .read_until(b'\n')
        .ok()
        .and_then(|line| line.trim().parse::<u32>().ok())
        .map(f64::from);

    // The mode line may be the last one, without a trailing newline
    let rest = &bytes[cursor.position().min(bytes.len())..];
    let mode = String::from_utf8_lossy(rest);
    detection.uses_frame_units = match mode.lines().next().map(str::trim) {
        Some(format::xbot::MODE_FRAMES) => Some(true),
        Some(format::xbot::MODE_POSITION) => Some(false),
        _ => None,
    };
    detection
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zbot_extension_peeks_fps() {
        let mut bytes = 0.05f32.to_le_bytes().to_vec();
        bytes.extend_from_slice(&1.0f32.to_le_bytes());

        let d = detect("run.zbot", &bytes);
        assert_eq!(d.format, MacroFormat::Zbot);
        assert!(d.confident);
        assert_eq!(d.uses_frame_units, Some(false));
        assert!((d.fps.unwrap() - 20.0).abs() < 1e-3);

        let d = detect("run.ZBF", &bytes);
        assert_eq!(d.format, MacroFormat::ZbotFrame);
        assert_eq!(d.uses_frame_units, Some(true));
    }

    #[test]
    fn test_replay_extension_reads_header() {
        let mut bytes = b"RPLY\x02\x01".to_vec();
        bytes.extend_from_slice(&240.0f32.to_le_bytes());
        let d = detect("macro.replay", &bytes);
        assert_eq!(d.format, MacroFormat::ReplayBot);
        assert_eq!(d.format_version, Some(2));
        assert_eq!(d.uses_frame_units, Some(true));
        assert_eq!(d.fps, Some(240.0));

        let legacy = 60.0f32.to_le_bytes();
        let d = detect("macro.replay", &legacy);
        assert_eq!(d.format_version, Some(0));
        assert_eq!(d.fps, Some(60.0));
        assert_eq!(d.uses_frame_units, Some(false));
    }

    #[test]
    fn test_ddhor_extension_splits_binary_and_json() {
        let mut bytes = b"DDHR".to_vec();
        bytes.extend_from_slice(&144i16.to_le_bytes());
        let d = detect("a.ddhor", &bytes);
        assert_eq!(d.format, MacroFormat::Ddhor);
        assert_eq!(d.fps, Some(144.0));

        let d = detect("a.ddhor", br#"{"fps":60}"#);
        assert_eq!(d.format, MacroFormat::DdhorJson);
    }

    #[test]
    fn test_mhr_suffix_beats_generic_json() {
        assert_eq!(detect("level.mhr.json", b"{}").format, MacroFormat::MhReplay);
        assert_eq!(detect("level.json", b"{}").format, MacroFormat::Tasbot);
        assert_eq!(detect("level.echo", b"{}").uses_frame_units, Some(true));
    }

    #[test]
    fn test_extension_wins_over_content() {
        // xBot text inside a .json file is still TASBOT
        let d = detect("weird.json", b"fps: 60\nframes\n");
        assert_eq!(d.format, MacroFormat::Tasbot);
    }

    #[test]
    fn test_xbot_header() {
        let d = detect("macro.xbot", b"fps: 240\r\nframes\r\n1 10\r\n");
        assert_eq!(d.format, MacroFormat::Xbot);
        assert_eq!(d.fps, Some(240.0));
        assert_eq!(d.uses_frame_units, Some(true));

        let d = detect("macro", b"fps: 60\npro_plus");
        assert_eq!(d.uses_frame_units, Some(false));
    }

    #[test]
    fn test_magic_scan() {
        assert_eq!(detect("blob.bin", b"RPLY\x01\0\0\x70\x42").format, MacroFormat::ReplayBot);
        assert_eq!(detect("blob.bin", b"DDHR\x3c\0").format, MacroFormat::Ddhor);

        let mut ybot = b"ybot".to_vec();
        ybot.extend_from_slice(&60.0f32.to_le_bytes());
        let d = detect("blob", &ybot);
        assert_eq!(d.format, MacroFormat::YbotFrame);
        assert_eq!(d.fps, Some(60.0));
    }

    #[test]
    fn test_fallback_is_not_confident() {
        let d = detect("notes.txt", b"60\n1 1 0\n");
        assert_eq!(d.format, MacroFormat::PlainText);
        assert!(!d.confident);
        assert!(matches!(
            d.require("notes.txt"),
            Err(ConvertError::DetectionAmbiguous { .. })
        ));
        assert_eq!(d.decode_options(), DecodeOptions::default());
    }

    #[test]
    fn test_empty_input_never_panics() {
        for name in ["a.zbot", "a.replay", "a.ddhor", "a.xbot", "a"] {
            let _ = detect(name, &[]);
        }
    }
}
