//! Host configuration management. Locates the Kismet alert config, keeps exactly one
//! `opt_include=` directive pointing at the generated rule file, and writes or removes
//! that rule file.

use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

use crate::config::TargetSettings;
use crate::error::{Error, Result};
use crate::survey::Snapshot;

use super::rules::{render_rule_file, render_rules};
use super::{remove_if_present, write_atomic};

/// What happened to the include directive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectiveChange {
    Added,
    AlreadyPresent,
    Removed,
    AlreadyAbsent,
}

/// What happened to the generated rule file during retraction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleFileChange {
    Removed,
    AlreadyAbsent,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmitOutcome {
    pub config_dir: PathBuf,
    pub rule_path: PathBuf,
    pub directive: DirectiveChange,
    pub rules_written: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetractOutcome {
    pub config_dir: PathBuf,
    pub directive: DirectiveChange,
    pub rule_file: RuleFileChange,
}

/// `opt_include=<rule path>`
pub fn directive_for(rule_path: &Path) -> String {
    format!("opt_include={}", rule_path.display())
}

/// The config directory chosen for this run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigTarget {
    pub config_dir: PathBuf,
    pub host_config: PathBuf,
    pub rule_path: PathBuf,
}

impl ConfigTarget {
    /// First search directory that exists and holds the host config.
    pub fn locate(settings: &TargetSettings) -> Result<ConfigTarget> {
        for dir in &settings.config_dirs {
            let host_config = dir.join(&settings.host_config_name);
            if dir.is_dir() && host_config.is_file() {
                log::debug!("Using Kismet config directory {}", dir.display());
                return Ok(ConfigTarget {
                    config_dir: dir.clone(),
                    host_config,
                    rule_path: dir.join(&settings.rule_file_name),
                });
            }
            log::debug!("No {} in {}", settings.host_config_name, dir.display());
        }

        Err(Error::NoTargetDirectory {
            checked: settings.config_dirs.clone(),
        })
    }

    /// Check that this process may rewrite the host config and create files next to it.
    pub fn authorize(self) -> Result<AuthorizedTarget> {
        OpenOptions::new()
            .append(true)
            .open(&self.host_config)
            .map_err(|e| Error::io(&self.host_config, e))?;
        // Rewrites land next to the real file, which a symlinked config may keep elsewhere
        let real_config =
            fs::canonicalize(&self.host_config).map_err(|e| Error::io(&self.host_config, e))?;
        let write_dir = real_config.parent().unwrap_or(self.config_dir.as_path());
        tempfile::tempfile_in(write_dir).map_err(|e| Error::io(write_dir, e))?;
        if write_dir != self.config_dir.as_path() {
            tempfile::tempfile_in(&self.config_dir).map_err(|e| Error::io(&self.config_dir, e))?;
        }

        Ok(AuthorizedTarget { target: self })
    }
}

/// A config target whose files this process is allowed to write.
#[derive(Debug)]
pub struct AuthorizedTarget {
    target: ConfigTarget,
}

impl AuthorizedTarget {
    pub fn target(&self) -> &ConfigTarget {
        &self.target
    }

    pub fn directive(&self) -> String {
        directive_for(&self.target.rule_path)
    }

    /// Install the include directive (once) and overwrite the rule file with `snapshot`.
    pub fn emit(&self, snapshot: &Snapshot) -> Result<EmitOutcome> {
        let host_config = &self.target.host_config;
        let directive = self.directive();

        let rules = render_rules(snapshot);
        write_atomic(&self.target.rule_path, render_rule_file(&rules).as_bytes())?;
        log::info!(
            "Wrote {} rules to {}",
            rules.len(),
            self.target.rule_path.display()
        );

        let content = read_host_config(host_config)?;
        let change = if has_directive(&content, &directive) {
            DirectiveChange::AlreadyPresent
        } else {
            write_atomic(host_config, insert_directive(&content, &directive).as_bytes())?;
            log::info!("Added {} to {}", directive, host_config.display());
            DirectiveChange::Added
        };

        Ok(EmitOutcome {
            config_dir: self.target.config_dir.clone(),
            rule_path: self.target.rule_path.clone(),
            directive: change,
            rules_written: rules.len(),
        })
    }

    /// Remove the include directive and the rule file. Safe to repeat.
    pub fn retract(&self) -> Result<RetractOutcome> {
        let host_config = &self.target.host_config;
        let directive = self.directive();

        let content = read_host_config(host_config)?;
        let directive_change = match strip_directive(&content, &directive) {
            Some(stripped) => {
                write_atomic(host_config, stripped.as_bytes())?;
                log::info!("Removed {} from {}", directive, host_config.display());
                DirectiveChange::Removed
            }
            None => DirectiveChange::AlreadyAbsent,
        };

        let rule_file = if remove_if_present(&self.target.rule_path)? {
            log::info!("Deleted {}", self.target.rule_path.display());
            RuleFileChange::Removed
        } else {
            RuleFileChange::AlreadyAbsent
        };

        Ok(RetractOutcome {
            config_dir: self.target.config_dir.clone(),
            directive: directive_change,
            rule_file,
        })
    }
}

fn read_host_config(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| Error::io(path, e))
}

/// Byte ranges of lines that are exactly `directive` (a trailing `\r` is tolerated).
/// Each range covers the line text only, not its terminator.
fn directive_lines(content: &str, directive: &str) -> Vec<(usize, usize)> {
    let mut spans = Vec::new();
    let mut start = 0;
    for line in content.split('\n') {
        let end = start + line.len();
        if line.strip_suffix('\r').unwrap_or(line) == directive {
            spans.push((start, end));
        }
        start = end + 1;
    }
    spans
}

/// Whole-line match only; a longer include line that merely contains the path does not count.
pub(crate) fn has_directive(content: &str, directive: &str) -> bool {
    !directive_lines(content, directive).is_empty()
}

/// Append the directive on its own line, the way it is stripped again later.
pub(crate) fn insert_directive(content: &str, directive: &str) -> String {
    format!("{}\n{}\n", content, directive)
}

/// Content with every directive line removed, or `None` if there was none.
///
/// Handles the directive with a leading newline, trailing newline, both, or neither.
/// A directive that closes the file also takes the blank line [`insert_directive`]
/// puts in front of it, so a newline-terminated config comes back byte for byte.
/// Otherwise only the line and its own terminator go.
pub(crate) fn strip_directive(content: &str, directive: &str) -> Option<String> {
    let spans = directive_lines(content, directive);
    if spans.is_empty() {
        return None;
    }

    let bytes = content.as_bytes();
    let len = content.len();
    let mut out = String::with_capacity(len);
    let mut cursor = 0;

    for (start, end) in spans {
        let at_tail = end == len || end + 1 == len;
        let blank_before = start == 1 || (start >= 2 && bytes[start - 2] == b'\n');
        let (cut_start, cut_end) = if at_tail && blank_before {
            (start - 1, len)
        } else if end < len {
            (start, end + 1)
        } else {
            (start, end)
        };
        // An earlier cut may already have consumed this line's leading newline
        let cut_start = cut_start.max(cursor);
        out.push_str(&content[cursor..cut_start]);
        cursor = cut_end;
    }
    out.push_str(&content[cursor..]);
    Some(out)
}
