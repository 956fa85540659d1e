//! Buildable units and the inputs that describe them.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

/// The kind of product a target builds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Product {
    /// An application bundle.
    App,
    /// An app extension.
    AppExtension,
    /// An App Clip.
    AppClip,
    /// A command-line executable.
    CommandLineTool,
    /// A dynamic framework.
    Framework,
    /// A static framework.
    StaticFramework,
    /// A static library.
    StaticLibrary,
    /// A dynamic library.
    DynamicLibrary,
    /// A resource bundle.
    Bundle,
    /// A unit test bundle.
    UnitTests,
    /// A UI test bundle.
    UiTests,
    /// A watchOS application.
    WatchApp,
    /// A watchOS extension.
    WatchExtension,
}

impl Product {
    /// Stable identifier used in hashes and manifests.
    pub fn as_str(self) -> &'static str {
        match self {
            Product::App => "app",
            Product::AppExtension => "app_extension",
            Product::AppClip => "app_clip",
            Product::CommandLineTool => "command_line_tool",
            Product::Framework => "framework",
            Product::StaticFramework => "static_framework",
            Product::StaticLibrary => "static_library",
            Product::DynamicLibrary => "dynamic_library",
            Product::Bundle => "bundle",
            Product::UnitTests => "unit_tests",
            Product::UiTests => "ui_tests",
            Product::WatchApp => "watch_app",
            Product::WatchExtension => "watch_extension",
        }
    }

    /// Returns `true` for unit and UI test bundles.
    pub fn is_test_bundle(self) -> bool {
        matches!(self, Product::UnitTests | Product::UiTests)
    }
}

impl fmt::Display for Product {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A build-setting value: a single string or a list of strings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SettingValue {
    /// A scalar value such as `"YES"` or `"5.5"`.
    String(String),
    /// A list value such as `["-ObjC", "-lz"]`.
    Array(Vec<String>),
}

impl From<&str> for SettingValue {
    fn from(value: &str) -> Self {
        SettingValue::String(value.to_string())
    }
}

impl From<Vec<&str>> for SettingValue {
    fn from(values: Vec<&str>) -> Self {
        SettingValue::Array(values.into_iter().map(str::to_string).collect())
    }
}

/// Build settings: a base table plus per-configuration overrides.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildSettings {
    /// Settings that apply to every configuration.
    #[serde(default)]
    pub base: BTreeMap<String, SettingValue>,
    /// Overrides keyed by configuration name (e.g. `"Debug"`).
    #[serde(default)]
    pub configurations: BTreeMap<String, BTreeMap<String, SettingValue>>,
}

impl BuildSettings {
    /// Returns the effective settings for `configuration`, sorted by key.
    ///
    /// Configuration-specific keys replace base keys of the same name.
    pub fn resolved(&self, configuration: &str) -> BTreeMap<&str, &SettingValue> {
        let mut merged: BTreeMap<&str, &SettingValue> = self
            .base
            .iter()
            .map(|(k, v)| (k.as_str(), v))
            .collect();
        if let Some(overrides) = self.configurations.get(configuration) {
            for (k, v) in overrides {
                merged.insert(k.as_str(), v);
            }
        }
        merged
    }
}

/// Header file references grouped by visibility.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Headers {
    /// Headers exported to dependents.
    #[serde(default)]
    pub public: Vec<PathBuf>,
    /// Headers exported to the owning module only.
    #[serde(default)]
    pub private: Vec<PathBuf>,
    /// Headers visible inside the target only.
    #[serde(default)]
    pub project: Vec<PathBuf>,
}

/// The own content of a buildable unit.
///
/// Dependencies are not stored here: edges live in the [`Graph`](crate::Graph)
/// as [`TargetId`](crate::TargetId) lists. File references are relative to the
/// owning project's directory unless absolute.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    /// Target name, unique within its project.
    pub name: String,
    /// Kind of product built.
    pub product: Product,
    /// Source file references.
    #[serde(default)]
    pub sources: Vec<PathBuf>,
    /// Resource file references.
    #[serde(default)]
    pub resources: Vec<PathBuf>,
    /// Header file references.
    #[serde(default)]
    pub headers: Headers,
    /// Build settings.
    #[serde(default)]
    pub settings: BuildSettings,
}

impl Target {
    /// Creates a target with no files and no settings.
    pub fn new(name: impl Into<String>, product: Product) -> Self {
        Self {
            name: name.into(),
            product,
            sources: Vec::new(),
            resources: Vec::new(),
            headers: Headers::default(),
            settings: BuildSettings::default(),
        }
    }

    /// Replaces the source file references.
    pub fn with_sources<P: Into<PathBuf>>(mut self, sources: impl IntoIterator<Item = P>) -> Self {
        self.sources = sources.into_iter().map(Into::into).collect();
        self
    }

    /// Replaces the resource file references.
    pub fn with_resources<P: Into<PathBuf>>(
        mut self,
        resources: impl IntoIterator<Item = P>,
    ) -> Self {
        self.resources = resources.into_iter().map(Into::into).collect();
        self
    }

    /// Replaces the header references.
    pub fn with_headers(mut self, headers: Headers) -> Self {
        self.headers = headers;
        self
    }

    /// Sets a base build setting.
    pub fn with_setting(mut self, key: &str, value: impl Into<SettingValue>) -> Self {
        self.settings.base.insert(key.to_string(), value.into());
        self
    }

    /// Sets a build setting that only applies to `configuration`.
    pub fn with_configuration_setting(
        mut self,
        configuration: &str,
        key: &str,
        value: impl Into<SettingValue>,
    ) -> Self {
        self.settings
            .configurations
            .entry(configuration.to_string())
            .or_default()
            .insert(key.to_string(), value.into());
        self
    }
}
