use serde::Deserialize;

use crate::error::LoadError;

/// Where the country chain finds its files, relative to the content roots.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Folder of tag-list files.
    pub country_tags_folder: String,
    /// Prefix joined to the paths named in tag lists.
    pub country_file_root: String,
    /// The color overrides file.
    pub colors_file: String,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            country_tags_folder: "common/country_tags".to_string(),
            country_file_root: "common".to_string(),
            colors_file: "common/countries/colors.txt".to_string(),
        }
    }
}

impl LoaderConfig {
    /// Read a config from TOML text. Missing keys keep their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self, LoadError> {
        Ok(toml::from_str(text)?)
    }

    /// Set the tag-list folder.
    pub fn with_country_tags_folder(mut self, folder: impl Into<String>) -> Self {
        self.country_tags_folder = folder.into();
        self
    }

    /// Set the country-file root.
    pub fn with_country_file_root(mut self, root: impl Into<String>) -> Self {
        self.country_file_root = root.into();
        self
    }

    /// Set the color overrides file.
    pub fn with_colors_file(mut self, file: impl Into<String>) -> Self {
        self.colors_file = file.into();
        self
    }

    /// Path of a country definition file named in a tag list.
    pub fn country_file(&self, file: &str) -> String {
        crate::join_path(&self.country_file_root, file)
    }
}
