//! The extract command: run the extractor over a single documentation file and print
//! its section-keyed result, either as JSON or as the rendered .pxd body.

use crate::cli::{ExtractArgs, ExtractFormat};
use crate::commands::pipeline::report_diagnostics;
use crate::config::Config;
use crate::formatter::{format_pxd, PxdSettings};
use crate::parser::{extract_unit, Normalizer};
use crate::types::Diagnostics;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

pub fn run_extract(args: &ExtractArgs, config: Config, root: &Path, verbose: bool) -> Result<()> {
    let path = Config::resolve(root, &args.input);
    let text =
        fs::read_to_string(&path).with_context(|| format!("Failed to read {}", path.display()))?;
    let unit = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "unit".to_string());

    let mut diagnostics = Diagnostics::new();
    let output = render_extract(&unit, &text, &config, args.format, &mut diagnostics)?;
    print!("{}", output);
    report_diagnostics(&diagnostics, verbose);
    Ok(())
}

/// Extract `text` and render it in the requested format
pub fn render_extract(
    unit: &str,
    text: &str,
    config: &Config,
    format: ExtractFormat,
    diagnostics: &mut Diagnostics,
) -> Result<String> {
    let normalizer = Normalizer::new(&config.normalize)?;
    let result = extract_unit(unit, text, &normalizer, diagnostics)?;

    let output = match format {
        ExtractFormat::Json => {
            let mut json = serde_json::to_string_pretty(&result)?;
            json.push('\n');
            json
        }
        ExtractFormat::Pxd => format_pxd(
            unit,
            &result,
            &PxdSettings {
                library: &config.library,
                wrap_header: &config.wrap_header,
                preamble_imports: &config.preamble_imports,
            },
            None,
        ),
    };
    Ok(output)
}
