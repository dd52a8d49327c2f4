use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use serde_json::json;

use grism_conf::{parse_file, read_sensitivity_file, split_by_beam};

/// Parse a trace configuration file (and optionally a sensitivity table)
/// and print the grouped result as JSON.
///
/// Usage: inspect_conf <config-file> [sensitivity-file]
fn main() -> Result<()> {
    env_logger::init();

    let mut args = std::env::args_os().skip(1);
    let Some(conf_path) = args.next().map(PathBuf::from) else {
        bail!("usage: inspect_conf <config-file> [sensitivity-file]");
    };
    let sens_path = args.next().map(PathBuf::from);

    let flat = parse_file(&conf_path)
        .with_context(|| format!("parsing {}", conf_path.display()))?;
    let grouped = split_by_beam(&flat)?;
    log::info!(
        "{}: {} keys, {} beams",
        conf_path.display(),
        flat.len(),
        grouped.len()
    );

    let mut report = json!({
        "flat": flat,
        "beams": grouped,
    });

    if let Some(sens_path) = sens_path {
        let table = read_sensitivity_file(&sens_path)
            .with_context(|| format!("reading {}", sens_path.display()))?;
        report["sensitivity"] = json!({
            "columns": table.column_names,
            "rows": table.columns.values().map(Vec::len).max().unwrap_or(0),
            "wrange": table.wrange,
        });
    }

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
