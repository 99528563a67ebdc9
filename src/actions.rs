//! Top-level actions behind each CLI subcommand.

use std::path::PathBuf;

use crate::config::Settings;
use crate::error::Result;
use crate::survey::{self, Snapshot};
use crate::watchlist::{
    ConfigTarget, EmitOutcome, FileChange, RetractOutcome, TargetFiles, render_rule_file,
    render_rules,
};

#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    pub survey: PathBuf,
    pub baseline: Option<PathBuf>,
    /// Skip writing the per-category target files
    pub no_files: bool,
    /// Print the rules instead of installing them
    pub dry_run: bool,
}

#[derive(Debug)]
pub enum GenerateOutcome {
    Installed {
        snapshot: Snapshot,
        emit: EmitOutcome,
    },
    DryRun {
        snapshot: Snapshot,
        rules: String,
    },
}

impl GenerateOutcome {
    pub fn snapshot(&self) -> &Snapshot {
        match self {
            GenerateOutcome::Installed { snapshot, .. } => snapshot,
            GenerateOutcome::DryRun { snapshot, .. } => snapshot,
        }
    }
}

/// Survey (minus baseline) → optional target files → rule file and include directive.
pub fn generate(options: &GenerateOptions, settings: &Settings) -> Result<GenerateOutcome> {
    let current = survey::load(&options.survey)?;

    let baseline = match &options.baseline {
        Some(path) => survey::load_baseline(path)?,
        None => None,
    };
    let snapshot = survey::apply_baseline(current, baseline.as_ref());
    if snapshot.is_empty() {
        log::info!("No devices beyond the baseline");
    }

    if !options.no_files {
        TargetFiles::new(&settings.targets_dir).write(&snapshot)?;
    }

    if options.dry_run {
        let rules = render_rule_file(&render_rules(&snapshot));
        return Ok(GenerateOutcome::DryRun { snapshot, rules });
    }

    let emit = install(&snapshot, settings)?;
    Ok(GenerateOutcome::Installed { snapshot, emit })
}

/// Install rules built from previously written target files.
pub fn add_targets(settings: &Settings) -> Result<EmitOutcome> {
    let snapshot = TargetFiles::new(&settings.targets_dir).read()?;
    install(&snapshot, settings)
}

/// Remove the per-category target files.
pub fn clean(settings: &Settings) -> Vec<(PathBuf, FileChange)> {
    TargetFiles::new(&settings.targets_dir).clean()
}

/// Take the include directive out of the host config and delete the rule file.
pub fn delete_targets(settings: &Settings) -> Result<RetractOutcome> {
    ConfigTarget::locate(&settings.target)?.authorize()?.retract()
}

fn install(snapshot: &Snapshot, settings: &Settings) -> Result<EmitOutcome> {
    ConfigTarget::locate(&settings.target)?
        .authorize()?
        .emit(snapshot)
}
