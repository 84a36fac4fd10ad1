//! Inspect command - decode a macro and print what's in it

use anyhow::{Context, Result};
use clap::Args;
use macroconv_core::{LoadedMacro, MacroFormat, Player, load};
use std::path::PathBuf;

use crate::convert::decode_options;

/// Arguments for the inspect command
#[derive(Args)]
pub struct InspectArgs {
    /// Macro file to decode
    pub input: PathBuf,

    /// Source format, skips detection
    #[arg(short, long)]
    pub from: Option<MacroFormat>,

    /// Dump the decoded macro as JSON
    #[arg(long)]
    pub json: bool,

    /// yBot level to read when the file holds several
    #[arg(long)]
    pub level: Option<String>,

    /// Treat positions as frame indices
    #[arg(long, conflicts_with = "xpos")]
    pub frames: bool,

    /// Treat positions as x-coordinates
    #[arg(long)]
    pub xpos: bool,
}

fn summary(loaded: &LoadedMacro) -> String {
    let m = &loaded.decoded;
    let holds = m.actions.iter().filter(|a| a.hold).count();
    let mut lines = vec![
        format!(
            "Format:   {} ({})",
            loaded.format.display_name(),
            loaded.format.as_str()
        ),
        format!("FPS:      {}", m.fps),
        format!("Units:    {}", m.unit_name()),
        format!(
            "Actions:  {} ({} press, {} release)",
            m.actions.len(),
            holds,
            m.actions.len() - holds
        ),
        format!("Player 1: {}", m.count_for(Player::One)),
        format!("Player 2: {}", m.count_for(Player::Two)),
    ];

    let positions = m.actions.iter().map(|a| a.position);
    if let (Some(first), Some(last)) = (
        positions.clone().reduce(f64::min),
        positions.reduce(f64::max),
    ) {
        lines.push(format!("Range:    {first} .. {last}"));
    }
    if let Some(version) = m.format_version {
        lines.push(format!("Version:  {version}"));
    }
    lines.join("\n")
}

/// Execute the inspect command
pub fn execute(args: InspectArgs) -> Result<()> {
    let bytes = std::fs::read(&args.input)
        .with_context(|| format!("Failed to read {}", args.input.display()))?;
    let file_name = args
        .input
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    let options = decode_options(args.frames, args.xpos, args.level);
    let loaded = load(&bytes, &file_name, args.from, &options)
        .with_context(|| format!("Failed to decode {}", args.input.display()))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&loaded.decoded)?);
    } else {
        println!("{}", summary(&loaded));
    }
    Ok(())
}
