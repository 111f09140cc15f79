use crate::output;

use std::fs;
use std::path::{Path, PathBuf};

use clap::Args;
use color_eyre::Result;

use matrix_service::{
    BuildOptions, DescriptorParser, GenerateRequest, MatrixGenerator, SortOrder,
};

/// Generate the grouped job matrix from a build-options file
#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Path to the build-options file (JSON or YAML)
    pub options: PathBuf,

    /// Property to group jobs by (default: first root property)
    #[arg(long, value_name = "KEY")]
    pub group_by: Option<String>,

    /// Prefix prepended to every group name
    #[arg(long, value_name = "STR")]
    pub prefix: Option<String>,

    /// Sort groups by group value: asc or desc
    #[arg(long, value_name = "ORDER")]
    pub sort: Option<String>,

    /// Write the matrix JSON to a file instead of stdout
    #[arg(long, short = 'o', value_name = "FILE")]
    pub out: Option<PathBuf>,

    /// Emit compact JSON instead of pretty-printed
    #[arg(long)]
    pub compact: bool,
}

pub fn execute(args: GenerateArgs) -> Result<()> {
    output::status("Reading", &format!("{}", args.options.display()));
    let options = read_options(&args.options)?;

    let mut request = GenerateRequest::new();
    if let Some(group_by) = &args.group_by {
        request = request.with_group_by(group_by.clone());
    }
    if let Some(prefix) = &args.prefix {
        request = request.with_name_prefix(prefix.clone());
    }
    if let Some(order) = &args.sort {
        let order = SortOrder::parse(order).ok_or_else(|| {
            color_eyre::eyre::eyre!("Invalid sort order '{}'. Expected asc or desc", order)
        })?;
        request = request.with_sort(order);
    }

    let matrix = MatrixGenerator::generate(&options, &request)
        .map_err(|e| color_eyre::eyre::eyre!("Generation failed: {}", e.message))?;

    let rendered = if args.compact {
        serde_json::to_string(&matrix)?
    } else {
        serde_json::to_string_pretty(&matrix)?
    };

    match &args.out {
        Some(path) => {
            fs::write(path, &rendered)?;
            output::success(&format!("Matrix written to {}", path.display()));
        }
        None => println!("{}", rendered),
    }

    output::info(&format!(
        "{} group(s), {} job(s)",
        matrix.jobs.len(),
        matrix.total_jobs()
    ));

    Ok(())
}

/// Read and parse a build-options file, choosing the format by extension
/// (`.yml`/`.yaml` for YAML, JSON otherwise).
pub(crate) fn read_options(path: &Path) -> Result<BuildOptions> {
    if !path.exists() {
        color_eyre::eyre::bail!("Build options file not found: {}", path.display());
    }

    let raw = fs::read_to_string(path)?;
    let is_yaml = matches!(
        path.extension().and_then(|ext| ext.to_str()),
        Some("yml") | Some("yaml")
    );

    let parsed = if is_yaml {
        DescriptorParser::parse_yaml(&raw)
    } else {
        DescriptorParser::parse_json(&raw)
    };

    parsed.map_err(|e| color_eyre::eyre::eyre!("Parse error: {}", e))
}
