//! Own-content digests of individual targets.
//!
//! A target's own digest covers the files it references and its resolved
//! build settings. Dependencies are not part of it; the engine folds those in
//! when composing the final hash.

use std::path::{Path, PathBuf};

use quay_common::{ContentHash, HashComposer};
use quay_graph::manifest::normalize_path;
use quay_graph::{Project, SettingValue, Target};

use crate::error::CacheError;

const OWN_DOMAIN: &str = "quay-own-v1";

/// Computes the own digest of one target.
///
/// Implementations are shared across hashing workers and must be `Sync`.
pub trait ContentHasher: Sync {
    /// Digest of `target`'s sources, resources, headers, and build settings
    /// resolved for `configuration`. `project` owns the target.
    fn own_digest(
        &self,
        project: &Project,
        target: &Target,
        configuration: &str,
    ) -> Result<ContentHash, CacheError>;
}

/// Hashes target files as they exist on disk.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsContentHasher;

impl FsContentHasher {
    /// Computes the XXH3-128 hash of one file referenced by `target`.
    pub fn hash_file(target: &Target, path: &Path) -> Result<ContentHash, CacheError> {
        let content = std::fs::read(path).map_err(|e| CacheError::UnreadableSource {
            target: target.name.clone(),
            path: path.to_path_buf(),
            source: e,
        })?;
        Ok(ContentHash::from_bytes(&content))
    }

    fn write_files(
        composer: &mut HashComposer,
        label: &str,
        project: &Project,
        target: &Target,
        references: &[PathBuf],
    ) -> Result<(), CacheError> {
        let mut keyed: Vec<(String, &PathBuf)> = references
            .iter()
            .map(|reference| (reference_key(reference), reference))
            .collect();
        keyed.sort_by(|a, b| a.0.cmp(&b.0));
        keyed.dedup_by(|a, b| a.0 == b.0);

        composer.write_str(label).write_count(keyed.len());
        for (key, reference) in keyed {
            let hash = Self::hash_file(target, &project.path.join(reference))?;
            composer.write_str(&key).write_hash(&hash);
        }
        Ok(())
    }
}

/// Spelling-independent form of a file reference: `.` and `..` folded,
/// components joined with `/` on every host.
fn reference_key(reference: &Path) -> String {
    normalize_path(reference)
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

impl ContentHasher for FsContentHasher {
    fn own_digest(
        &self,
        project: &Project,
        target: &Target,
        configuration: &str,
    ) -> Result<ContentHash, CacheError> {
        let mut composer = HashComposer::new(OWN_DOMAIN);
        let headers = &target.headers;
        for (label, references) in [
            ("sources", &target.sources),
            ("resources", &target.resources),
            ("headers.public", &headers.public),
            ("headers.private", &headers.private),
            ("headers.project", &headers.project),
        ] {
            Self::write_files(&mut composer, label, project, target, references)?;
        }

        let settings = canonical_settings(target, configuration)?;
        composer.write_str("settings").write_count(settings.len());
        for setting in &settings {
            composer.write_str(setting.kind).write_str(&setting.line);
        }

        composer
            .write_str(target.product.as_str())
            .write_str(configuration);
        Ok(composer.finish())
    }
}

/// One resolved build setting in canonical form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalSetting {
    /// `"string"` or `"list"`.
    pub kind: &'static str,
    /// `KEY=value`, with list values rendered as a JSON array.
    pub line: String,
}

/// Resolves `target`'s settings for `configuration` and renders them as
/// canonical `KEY=value` lines sorted by key.
pub fn canonical_settings(
    target: &Target,
    configuration: &str,
) -> Result<Vec<CanonicalSetting>, CacheError> {
    let invalid = |key: &str, reason: String| CacheError::InvalidSetting {
        target: target.name.clone(),
        key: key.to_string(),
        reason,
    };

    target
        .settings
        .resolved(configuration)
        .into_iter()
        .map(|(key, value)| {
            check_key(key).map_err(|reason| invalid(key, reason))?;
            let (kind, rendered) = match value {
                SettingValue::String(s) => {
                    check_value(s).map_err(|reason| invalid(key, reason))?;
                    ("string", s.clone())
                }
                SettingValue::Array(items) => {
                    for item in items {
                        check_value(item).map_err(|reason| invalid(key, reason))?;
                    }
                    let json = serde_json::to_string(items)
                        .map_err(|e| invalid(key, e.to_string()))?;
                    ("list", json)
                }
            };
            Ok(CanonicalSetting {
                kind,
                line: format!("{key}={rendered}"),
            })
        })
        .collect()
}

// `=` may only appear inside a bracketed condition such as `[sdk=iphoneos*]`.
fn check_key(key: &str) -> Result<(), String> {
    if key.is_empty() {
        return Err("empty key".to_string());
    }
    let mut depth = 0usize;
    for ch in key.chars() {
        match ch {
            c if c.is_whitespace() || c.is_control() => {
                return Err(format!("key contains {c:?}"));
            }
            '[' => depth += 1,
            ']' => {
                depth = depth
                    .checked_sub(1)
                    .ok_or_else(|| "unbalanced ']' in key".to_string())?;
            }
            '=' if depth == 0 => return Err("key contains '='".to_string()),
            _ => {}
        }
    }
    if depth != 0 {
        return Err("unbalanced '[' in key".to_string());
    }
    Ok(())
}

fn check_value(value: &str) -> Result<(), String> {
    match value.chars().find(|c| c.is_control()) {
        Some(c) => Err(format!("value contains control character {c:?}")),
        None => Ok(()),
    }
}
