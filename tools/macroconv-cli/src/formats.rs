//! Formats command - list every supported format

use anyhow::Result;
use macroconv_core::{MacroFormat, UnitSupport};

fn units_label(units: UnitSupport) -> &'static str {
    match units {
        UnitSupport::Position => "x-position",
        UnitSupport::Frame => "frames",
        UnitSupport::Either => "either",
    }
}

fn table() -> String {
    let mut out = format!(
        "{:<12} {:<18} {:<10} {:<11} {}\n",
        "ID", "NAME", "EXT", "UNITS", "KIND"
    );
    for format in MacroFormat::ALL {
        out.push_str(&format!(
            "{:<12} {:<18} {:<10} {:<11} {}\n",
            format.as_str(),
            format.display_name(),
            format.extension().unwrap_or("-"),
            units_label(format.units()),
            if format.is_binary() { "binary" } else { "text" }
        ));
    }
    out
}

/// Execute the formats command
pub fn execute() -> Result<()> {
    print!("{}", table());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_lists_every_format() {
        let table = table();
        assert_eq!(table.lines().count(), MacroFormat::ALL.len() + 1);
        assert!(table.contains("mh-replay    MH Replay          mhr.json   frames      text"));
        assert!(table.contains("rush         Rush               -          frames      binary"));
    }
}
