//! Conversion pipeline: load, transform, export
//!
//! ```text
//! bytes ──detect/require──► MacroFormat ──decode──► Macro
//!                                                    │ transforms
//!                                                    ▼
//!                                        encode(target) ──► Payload
//! ```
//!
//! Everything here works on in-memory buffers. Reading and writing files is
//! left to the host.

use crate::detect::{self, Detection, MHR_SUFFIX};
use crate::error::Result;
use crate::format::{self, DecodeOptions, MacroFormat, Payload};
use crate::transform::{self, Transform, TransformReport};
use crate::types::Macro;
use std::borrow::Cow;
use std::path::Path;

/// A decoded macro together with how its format was chosen
#[derive(Debug, Clone)]
pub struct LoadedMacro {
    /// Format the bytes were decoded as
    pub format: MacroFormat,
    /// What the detector made of the input, even when the format was given
    pub detection: Detection,
    pub decoded: Macro,
}

/// Everything needed for one conversion
#[derive(Debug, Clone)]
pub struct ConversionRequest<'a> {
    pub bytes: &'a [u8],
    /// Input name, used for detection and diagnostics
    pub file_name: &'a str,
    /// Source format; detected when `None`
    pub source: Option<MacroFormat>,
    pub target: MacroFormat,
    pub options: DecodeOptions,
    /// Applied in order between decode and encode
    pub transforms: Vec<Transform>,
}

/// Result of [`convert`]
#[derive(Debug, Clone)]
pub struct ConversionOutput {
    pub payload: Payload,
    pub source: MacroFormat,
    /// Canonical extension of the target format, if it has one
    pub extension: Option<&'static str>,
    pub report: TransformReport,
    /// Number of actions written
    pub actions: usize,
}

/// Decode `bytes`, detecting the format unless `source` is given
///
/// The detector's unit hint fills `options.uses_frame_units` when the caller
/// left it unset and the detection agrees with the chosen format.
pub fn load(
    bytes: &[u8],
    file_name: &str,
    source: Option<MacroFormat>,
    options: &DecodeOptions,
) -> Result<LoadedMacro> {
    let detection = detect::detect(file_name, bytes);
    let format = match source {
        Some(format) => format,
        None => detection.require(file_name)?,
    };

    let mut options = options.clone();
    if options.uses_frame_units.is_none() && detection.confident && detection.format == format {
        options.uses_frame_units = detection.uses_frame_units;
    }

    let decoded = format::decode(format, bytes, &options)?;
    Ok(LoadedMacro {
        format,
        detection,
        decoded,
    })
}

/// Apply `transforms` in order
pub fn apply_transforms(m: &mut Macro, transforms: &[Transform]) -> TransformReport {
    transform::apply(m, transforms)
}

/// Encode `m`, which was decoded as `source`, into `target`
///
/// The layout variant recorded during decode only carries over when the
/// format stays the same.
pub fn export(m: &Macro, source: MacroFormat, target: MacroFormat) -> Result<Payload> {
    let m = if source != target && m.format_version.is_some() {
        let mut owned = m.clone();
        owned.format_version = None;
        Cow::Owned(owned)
    } else {
        Cow::Borrowed(m)
    };
    format::encode(target, &m)
}

/// Run a full conversion
pub fn convert(request: &ConversionRequest<'_>) -> Result<ConversionOutput> {
    let LoadedMacro {
        format: source,
        decoded: mut m,
        ..
    } = load(
        request.bytes,
        request.file_name,
        request.source,
        &request.options,
    )?;

    let report = apply_transforms(&mut m, &request.transforms);
    let payload = export(&m, source, request.target)?;

    tracing::info!(
        file_name = request.file_name,
        from = %source,
        to = %request.target,
        actions = m.actions.len(),
        removed = report.redundant_removed,
        bytes = payload.len(),
        "converted macro"
    );

    Ok(ConversionOutput {
        payload,
        source,
        extension: request.target.extension(),
        report,
        actions: m.actions.len(),
    })
}

/// Name for the converted file: `input_name` with its extension replaced
///
/// `.mhr.json` counts as a single extension. Formats without a canonical
/// extension get `fallback_ext`; an empty fallback leaves the name bare.
pub fn output_file_name(input_name: &str, target: MacroFormat, fallback_ext: &str) -> String {
    let path = Path::new(input_name);
    let name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or(input_name);
    let stem = strip_extension(name);
    let ext = target.extension().unwrap_or(fallback_ext);
    let renamed = if ext.is_empty() {
        stem.to_string()
    } else {
        format!("{stem}.{ext}")
    };
    path.with_file_name(renamed).to_string_lossy().into_owned()
}

fn strip_extension(name: &str) -> &str {
    let lower = name.to_ascii_lowercase();
    if lower.len() > MHR_SUFFIX.len() && lower.ends_with(MHR_SUFFIX) {
        return &name[..name.len() - MHR_SUFFIX.len()];
    }
    match name.rfind('.') {
        Some(idx) if idx > 0 => &name[..idx],
        _ => name,
    }
}
