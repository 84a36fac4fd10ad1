//! Detect command - guess the format of a macro file

use anyhow::{Context, Result};
use clap::Args;
use macroconv_core::Detection;
use std::path::PathBuf;

/// Arguments for the detect command
#[derive(Args)]
pub struct DetectArgs {
    /// Macro file to inspect
    pub input: PathBuf,

    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,
}

fn render_json(detection: &Detection) -> Result<String> {
    let value = serde_json::json!({
        "format": detection.format,
        "name": detection.format.display_name(),
        "confident": detection.confident,
        "uses_frame_units": detection.uses_frame_units,
        "fps": detection.fps,
        "format_version": detection.format_version,
    });
    Ok(serde_json::to_string_pretty(&value)?)
}

fn render_text(detection: &Detection) -> String {
    let mut lines = vec![format!(
        "Format:  {} ({})",
        detection.format.display_name(),
        detection.format.as_str()
    )];
    if let Some(frames) = detection.uses_frame_units {
        lines.push(format!(
            "Units:   {}",
            if frames { "frames" } else { "x-position" }
        ));
    }
    lines.push(format!(
        "FPS:     {}",
        detection
            .fps
            .map(|fps| fps.to_string())
            .unwrap_or_else(|| "unknown".to_string())
    ));
    if let Some(version) = detection.format_version {
        lines.push(format!("Version: {version}"));
    }
    lines.join("\n")
}

/// Execute the detect command
///
/// Returns whether detection was confident.
pub fn execute(args: DetectArgs) -> Result<bool> {
    let bytes = std::fs::read(&args.input)
        .with_context(|| format!("Failed to read {}", args.input.display()))?;
    let file_name = args
        .input
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    let detection = macroconv_core::detect(&file_name, &bytes);
    if args.json {
        println!("{}", render_json(&detection)?);
    } else if detection.confident {
        println!("{}", render_text(&detection));
    }
    if !detection.confident {
        eprintln!("detection failed, choose --from manually");
    }
    Ok(detection.confident)
}
