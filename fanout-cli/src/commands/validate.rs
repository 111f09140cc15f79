use crate::output;

use std::path::PathBuf;

use clap::Args;
use color_eyre::Result;

use matrix_service::BuildOptions;

/// Check a build-options file without generating
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Path to the build-options file (JSON or YAML)
    pub options: PathBuf,
}

pub fn execute(args: ValidateArgs) -> Result<()> {
    let options_path = &args.options;

    if !options_path.exists() {
        color_eyre::eyre::bail!("Build options file not found: {}", options_path.display());
    }

    // Step 1: Parse the descriptor
    output::status("Validating", &format!("{}", options_path.display()));

    let options = match super::generate::read_options(options_path) {
        Ok(options) => options,
        Err(e) => {
            output::error(&format!("{}", e));
            std::process::exit(1);
        }
    };

    output::check("Descriptor syntax valid");

    // Step 2: Structure summary
    let domains = options.domains();
    output::check(&format!(
        "Structure: {} root propert{}, {} include rule(s), {} exclude rule(s)",
        domains.len(),
        if domains.len() == 1 { "y" } else { "ies" },
        options.include.len(),
        options.exclude.len()
    ));

    for (property, values) in &domains {
        output::dim(&format!("  {} ({} value(s))", property, values.len()));
    }

    // Step 3: Lints
    let warnings = collect_lints(&options);
    for warning in &warnings {
        output::warning(warning);
    }

    println!();
    if warnings.is_empty() {
        output::success("Build options are valid");
    } else {
        output::success(&format!(
            "Build options are valid ({} warning(s))",
            warnings.len()
        ));
    }

    Ok(())
}

/// Non-fatal descriptor findings: rules and properties that parse cleanly
/// but will not behave the way a casual reading suggests.
fn collect_lints(options: &BuildOptions) -> Vec<String> {
    let mut warnings = Vec::new();
    let domains = options.domains();

    for (index, rule) in options.exclude.iter().enumerate() {
        if rule.is_empty() {
            warnings.push(format!(
                "exclude[{}] is empty and will exclude every job",
                index
            ));
        }
    }

    for (index, rule) in options.include.iter().enumerate() {
        for (key, value) in rule.iter() {
            let Some(values) = domains.get(key.as_str()) else {
                continue;
            };
            if !values.contains(value) {
                warnings.push(format!(
                    "include[{}] sets {}={} outside the declared values; \
                     it only survives if that value appears for every group",
                    index, key, value
                ));
            }
        }
    }

    for (key, value) in &options.properties {
        if !value.is_array() {
            warnings.push(format!(
                "'{}' is not an array and takes no part in generation",
                key
            ));
        }
    }

    warnings
}
