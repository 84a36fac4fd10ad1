//! Convert command - decode, transform and re-encode a macro file

use anyhow::{Context, Result, bail};
use clap::Args;
use macroconv_core::config::{self, Config};
use macroconv_core::{
    ConversionRequest, DecodeOptions, MacroFormat, Player, Transform, convert, output_file_name,
};
use std::path::{Path, PathBuf};

/// Arguments for the convert command
#[derive(Args)]
pub struct ConvertArgs {
    /// Input macro file
    pub input: PathBuf,

    /// Target format (see `macroconv formats`); defaults to the configured target
    #[arg(short, long)]
    pub to: Option<MacroFormat>,

    /// Source format, skips detection
    #[arg(short, long)]
    pub from: Option<MacroFormat>,

    /// Output file (defaults to the input name with the target's extension)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Add this value to every position
    #[arg(long, allow_hyphen_values = true)]
    pub offset: Option<f64>,

    /// Swap press and release
    #[arg(long)]
    pub flip_hold: bool,

    /// Swap player 1 and player 2
    #[arg(long)]
    pub flip_player: bool,

    /// Keep only one player's actions (1 or 2)
    #[arg(long, value_parser = parse_player)]
    pub only_player: Option<Player>,

    /// Drop presses/releases that don't change the player's state
    #[arg(long)]
    pub remove_redundant: bool,

    /// Sort actions by position before encoding
    #[arg(long)]
    pub sort: bool,

    /// yBot level to read when the file holds several
    #[arg(long)]
    pub level: Option<String>,

    /// Treat positions as frame indices (plain text, Echo, Universal)
    #[arg(long, conflicts_with = "xpos")]
    pub frames: bool,

    /// Treat positions as x-coordinates (plain text, Echo, Universal)
    #[arg(long)]
    pub xpos: bool,

    /// Config file to use instead of the default one
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Overwrite the output file if it exists
    #[arg(long)]
    pub force: bool,
}

fn parse_player(s: &str) -> Result<Player, String> {
    Player::parse(s).ok_or_else(|| format!("invalid player '{s}', expected 1 or 2"))
}

/// Load the config named on the command line, or the default one
pub(crate) fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => config::load_from(path)
            .with_context(|| format!("Failed to load config {}", path.display())),
        None => Ok(config::load()),
    }
}

/// Unit hint and yBot level from the command line
pub(crate) fn decode_options(frames: bool, xpos: bool, level: Option<String>) -> DecodeOptions {
    DecodeOptions {
        uses_frame_units: match (frames, xpos) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        },
        ybot_level: level,
    }
}

/// Transforms in the order they run: edits, filter, cleanup, sort
fn transforms(args: &ConvertArgs, config: &Config) -> Vec<Transform> {
    let mut list = Vec::new();
    if let Some(delta) = args.offset {
        list.push(Transform::Offset(delta));
    }
    if args.flip_hold {
        list.push(Transform::FlipHold);
    }
    if args.flip_player {
        list.push(Transform::FlipPlayer);
    }
    if let Some(player) = args.only_player {
        list.push(Transform::KeepPlayer(player));
    }
    if args.remove_redundant || config.convert.remove_redundant {
        list.push(Transform::RemoveRedundant);
    }
    if args.sort || config.convert.sort_output {
        list.push(Transform::SortByPosition);
    }
    list
}

/// Execute the convert command
///
/// Returns the path of the written file.
pub fn execute(args: ConvertArgs) -> Result<PathBuf> {
    let config = load_config(args.config.as_deref())?;
    let target = args.to.unwrap_or(config.convert.default_target);

    let bytes = std::fs::read(&args.input)
        .with_context(|| format!("Failed to read {}", args.input.display()))?;
    let file_name = args
        .input
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    let request = ConversionRequest {
        bytes: &bytes,
        file_name: &file_name,
        source: args.from,
        target,
        options: decode_options(args.frames, args.xpos, args.level.clone()),
        transforms: transforms(&args, &config),
    };
    let out = convert(&request)
        .with_context(|| format!("Failed to convert {}", args.input.display()))?;

    let output = match &args.output {
        Some(path) => path.clone(),
        None => {
            let derived = PathBuf::from(output_file_name(
                &args.input.to_string_lossy(),
                target,
                &config.convert.fallback_extension,
            ));
            if derived == args.input {
                bail!(
                    "Output would overwrite {}, pass --output",
                    args.input.display()
                );
            }
            derived
        }
    };
    if output.exists() && !args.force {
        bail!("{} already exists (use --force to overwrite)", output.display());
    }

    std::fs::write(&output, out.payload.as_bytes())
        .with_context(|| format!("Failed to write {}", output.display()))?;
    tracing::info!(path = %output.display(), bytes = out.payload.len(), "wrote converted macro");

    println!(
        "Converted {} ({}) -> {} ({}), {} actions",
        args.input.display(),
        out.source,
        output.display(),
        target,
        out.actions
    );
    if out.report.redundant_removed > 0 {
        println!("  Removed {} redundant actions", out.report.redundant_removed);
    }
    if out.report.filtered_out > 0 {
        println!("  Dropped {} actions of the other player", out.report.filtered_out);
    }
    Ok(output)
}
