//! The country chain: tag lists, per-country definition files, and the
//! color overrides file, combined into the country list.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use atlas_core::{
    ColorAttachment, Country, LoadResult, Tag, Warning, WarningSource, convert_color,
    merge_dependencies, merge_warnings,
};
use atlas_script::{Schema, Structured, color_attachment};
use futures::future::join_all;

use crate::config::LoaderConfig;
use crate::error::LoaderResult;
use crate::file::{FileLoader, FileParse, Loaded};
use crate::folder::{FileResult, FolderLoader, FolderMerge, folder_dependency};
use crate::loader::{LoadCache, Loader};
use crate::progress::{Progress, ProgressReporter};
use crate::script::read_structured;
use crate::source::ContentSource;

fn color_schema() -> Schema {
    Schema::Attachment(Box::new(Schema::Enum))
}

/// `TAG = "path"` entries.
pub fn country_tags_schema() -> Schema {
    Schema::Map(Box::new(Schema::String))
}

/// A country definition file; only its `color` is read.
pub fn country_file_schema() -> Schema {
    Schema::Object(vec![("color", color_schema())])
}

/// `TAG = { color = ... }` entries.
pub fn colors_file_schema() -> Schema {
    Schema::Map(Box::new(country_file_schema()))
}

/// Parses one tag-list file. An unreadable file contributes no tags.
#[derive(Debug, Clone, Copy, Default)]
pub struct CountryTagFile;

#[async_trait]
impl FileParse for CountryTagFile {
    type Output = Vec<Tag>;

    async fn load_from_file(
        &self,
        source: &dyn ContentSource,
        file: &str,
        warnings: &mut Vec<Warning>,
        _force: bool,
    ) -> LoaderResult<Loaded<Vec<Tag>>> {
        let mapped = match read_structured(source, file, &country_tags_schema()).await {
            Ok(mapped) => mapped,
            Err(e) => {
                tracing::error!(file, error = %e, "failed to load country tags");
                warnings.push(
                    Warning::new(format!("failed to load country tags: {e}")).with_related_file(file),
                );
                return Ok(Loaded::Raw(Vec::new()));
            }
        };

        let mut tags = Vec::new();
        for entry in mapped.as_map().unwrap_or(&[]) {
            let Some(path) = entry.value.as_str() else {
                continue;
            };
            if path.is_empty() {
                continue;
            }
            match Tag::new(entry.key.as_str(), path) {
                Ok(tag) => tags.push(tag),
                Err(e) => tracing::warn!(file, error = %e, "skipping tag entry"),
            }
        }
        Ok(Loaded::Raw(tags))
    }
}

/// Concatenates the tag lists of a folder, in file order.
///
/// A tag listed by more than one file is kept every time and reported.
#[derive(Debug, Clone, Copy, Default)]
pub struct CountryTags;

impl FolderMerge for CountryTags {
    type File = CountryTagFile;
    type Output = Vec<Tag>;

    fn file_parser(&self, _file: &str) -> CountryTagFile {
        CountryTagFile
    }

    fn merge_files(
        &self,
        folder: &str,
        files: &[FileResult<Vec<Tag>>],
        _force: bool,
    ) -> LoaderResult<LoadResult<Vec<Tag>>> {
        let mut listed_in: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
        for file in files {
            for tag in &file.result.result {
                listed_in.entry(tag.tag.as_str()).or_default().push(file.file.as_str());
            }
        }

        let mut warnings = merge_warnings(files.iter().map(|f| f.result.as_ref()));
        for (tag, sources) in listed_in.iter().filter(|(_, s)| s.len() > 1) {
            tracing::warn!(tag, files = ?sources, "country tag defined more than once");
            let mut warning = Warning::new(format!("country tag {tag} is defined more than once"))
                .with_source(WarningSource::Country {
                    tag: (*tag).to_string(),
                });
            for file in sources {
                warning = warning.with_related_file(*file);
            }
            warnings.push(warning);
        }

        Ok(LoadResult {
            result: files
                .iter()
                .flat_map(|f| f.result.result.iter().cloned())
                .collect(),
            dependencies: vec![folder_dependency(folder)],
            warnings,
        })
    }
}

/// Loader for the tag-list folder.
pub type CountryTagsLoader = FolderLoader<CountryTags>;

/// Parses one country definition file into a [`Country`]. An unreadable
/// or malformed file yields no country.
#[derive(Debug, Clone)]
pub struct CountryFile {
    tag: String,
}

impl CountryFile {
    /// Parser for the definition of `tag`.
    pub fn new(tag: impl Into<String>) -> Self {
        Self { tag: tag.into() }
    }
}

#[async_trait]
impl FileParse for CountryFile {
    type Output = Option<Country>;

    async fn load_from_file(
        &self,
        source: &dyn ContentSource,
        file: &str,
        warnings: &mut Vec<Warning>,
        _force: bool,
    ) -> LoaderResult<Loaded<Option<Country>>> {
        match read_structured(source, file, &country_file_schema()).await {
            Ok(mapped) => {
                let color = mapped.field("color").and_then(color_attachment);
                Ok(Loaded::Raw(Some(Country {
                    tag: self.tag.clone(),
                    color: convert_color(color.as_ref()),
                })))
            }
            Err(e) => {
                tracing::error!(tag = %self.tag, file, error = %e, "failed to load country");
                warnings.push(
                    Warning::new(format!("failed to load country {}: {e}", self.tag))
                        .with_source(WarningSource::Country {
                            tag: self.tag.clone(),
                        })
                        .with_related_file(file),
                );
                Ok(Loaded::Raw(None))
            }
        }
    }
}

/// Loader for one country definition file.
pub type CountryLoader = FileLoader<CountryFile>;

/// Colors from the overrides file, by tag.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColorOverrides {
    colors: HashMap<String, ColorAttachment>,
}

impl ColorOverrides {
    /// Read overrides from a mapped colors file. Entries without a color
    /// are left out.
    pub fn from_structured(mapped: &Structured) -> Self {
        let colors = mapped
            .as_map()
            .unwrap_or(&[])
            .iter()
            .filter_map(|entry| {
                let color = color_attachment(entry.value.field("color")?)?;
                Some((entry.key.clone(), color))
            })
            .collect();
        Self { colors }
    }

    /// The override for `tag`.
    pub fn get(&self, tag: &str) -> Option<&ColorAttachment> {
        self.colors.get(tag)
    }

    /// Number of tags with an override.
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    /// Whether there are no overrides.
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }
}

impl FromIterator<(String, ColorAttachment)> for ColorOverrides {
    fn from_iter<I: IntoIterator<Item = (String, ColorAttachment)>>(iter: I) -> Self {
        Self {
            colors: iter.into_iter().collect(),
        }
    }
}

/// Parses the color overrides file. An unreadable or malformed file
/// means no overrides.
#[derive(Debug, Clone, Copy, Default)]
pub struct ColorsFile;

#[async_trait]
impl FileParse for ColorsFile {
    type Output = ColorOverrides;

    async fn load_from_file(
        &self,
        source: &dyn ContentSource,
        file: &str,
        warnings: &mut Vec<Warning>,
        _force: bool,
    ) -> LoaderResult<Loaded<ColorOverrides>> {
        match read_structured(source, file, &colors_file_schema()).await {
            Ok(mapped) => Ok(Loaded::Raw(ColorOverrides::from_structured(&mapped))),
            Err(e) => {
                tracing::error!(file, error = %e, "failed to load color overrides");
                warnings.push(
                    Warning::new(format!("failed to load color overrides: {e}"))
                        .with_related_file(file),
                );
                Ok(Loaded::Raw(ColorOverrides::default()))
            }
        }
    }
}

/// Loader for the color overrides file.
pub type ColorsLoader = FileLoader<ColorsFile>;

/// Replace the color of every country that has an override.
pub fn apply_color_overrides(countries: &mut [Country], overrides: &ColorOverrides) {
    for country in countries {
        if let Some(color) = overrides.get(&country.tag) {
            country.color = convert_color(Some(color));
        }
    }
}

/// Loads the country list.
///
/// Staleness follows the tag-list folder and the tracked country files.
/// The overrides file is not checked on its own: an edit to it alone is
/// picked up on the next load that something else triggers, or a forced
/// one.
pub struct CountriesLoader {
    source: Arc<dyn ContentSource>,
    config: LoaderConfig,
    tags: CountryTagsLoader,
    // Keyed by tag and resolved definition file.
    countries: HashMap<(String, String), CountryLoader>,
    colors: ColorsLoader,
    progress: ProgressReporter,
    // Set for the duration of `load_impl`; a dropped or failed load leaves it set.
    unfinished: bool,
    cache: LoadCache<Vec<Country>>,
}

impl CountriesLoader {
    /// Wire the chain over `source`.
    pub fn new(source: Arc<dyn ContentSource>, config: LoaderConfig) -> Self {
        let tags = FolderLoader::new(
            Arc::clone(&source),
            config.country_tags_folder.clone(),
            CountryTags,
        );
        let colors = FileLoader::new(Arc::clone(&source), config.colors_file.clone(), ColorsFile);
        Self {
            source,
            config,
            tags,
            countries: HashMap::new(),
            colors,
            progress: ProgressReporter::default(),
            unfinished: false,
            cache: LoadCache::default(),
        }
    }

    /// Report every stage of the chain to `progress`.
    pub fn with_progress(mut self, progress: ProgressReporter) -> Self {
        self.tags = self.tags.with_progress(progress.clone());
        self.colors = self.colors.with_progress(progress.clone());
        self.countries = std::mem::take(&mut self.countries)
            .into_iter()
            .map(|(key, loader)| (key, loader.with_progress(progress.clone())))
            .collect();
        self.progress = progress;
        self
    }

    /// The configuration the chain was built with.
    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    /// Tags that currently have a country loader, sorted and de-duplicated.
    pub fn tracked_tags(&self) -> Vec<&str> {
        let mut tags: Vec<&str> = self.countries.keys().map(|(tag, _)| tag.as_str()).collect();
        tags.sort_unstable();
        tags.dedup();
        tags
    }

    /// Definition files that currently have a country loader, sorted.
    pub fn tracked_files(&self) -> Vec<&str> {
        let mut files: Vec<&str> = self.countries.keys().map(|(_, file)| file.as_str()).collect();
        files.sort_unstable();
        files
    }
}

impl fmt::Debug for CountriesLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CountriesLoader")
            .field("config", &self.config)
            .field("tags", &self.tags)
            .field("countries", &self.tracked_tags())
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Loader for CountriesLoader {
    type Output = Vec<Country>;

    async fn should_reload(&self) -> LoaderResult<bool> {
        if self.unfinished || self.tags.should_reload().await? {
            return Ok(true);
        }

        let checks = join_all(self.countries.values().map(|l| l.should_reload())).await;
        for stale in checks {
            if stale? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    async fn load_impl(&mut self, force: bool) -> LoaderResult<LoadResult<Vec<Country>>> {
        self.unfinished = true;
        let tags = self.tags.load(force).await?;

        // One loader per distinct (tag, file); an exact repeat shares its result.
        let mut previous = std::mem::take(&mut self.countries);
        let mut current: Vec<((String, String), CountryLoader)> = Vec::new();
        let mut slot_of: HashMap<(String, String), usize> = HashMap::new();
        let mut slots = Vec::with_capacity(tags.result.len());
        for tag in &tags.result {
            let key = (tag.tag.clone(), self.config.country_file(&tag.file));
            if let Some(&slot) = slot_of.get(&key) {
                slots.push(slot);
                continue;
            }
            let loader = previous.remove(&key).unwrap_or_else(|| {
                FileLoader::new(Arc::clone(&self.source), key.1.clone(), CountryFile::new(&tag.tag))
                    .with_progress(self.progress.clone())
            });
            slot_of.insert(key.clone(), current.len());
            slots.push(current.len());
            current.push((key, loader));
        }
        tracing::debug!(
            tags = tags.result.len(),
            loaders = current.len(),
            dropped = previous.len(),
            "loading countries"
        );
        drop(previous);
        self.progress.report(Progress::LoadingCountries {
            tags: tags.result.len(),
        });

        let results = join_all(current.iter_mut().map(|(_, l)| l.load(force))).await;
        self.countries = current.into_iter().collect();
        let results = results.into_iter().collect::<LoaderResult<Vec<_>>>()?;
        let country_results: Vec<_> = slots.iter().map(|&i| Arc::clone(&results[i])).collect();

        let colors = self.colors.load(force).await?;

        let mut countries: Vec<Country> = country_results
            .iter()
            .filter_map(|r| r.result.clone())
            .collect();
        apply_color_overrides(&mut countries, &colors.result);

        let mut dependencies = tags.dependencies.clone();
        dependencies.extend(colors.dependencies.iter().cloned());
        dependencies.extend(merge_dependencies(country_results.iter().map(|r| r.as_ref())));

        let mut warnings = tags.warnings.clone();
        warnings.extend(colors.warnings.iter().cloned());
        warnings.extend(merge_warnings(country_results.iter().map(|r| r.as_ref())));

        self.unfinished = false;
        Ok(LoadResult {
            result: countries,
            dependencies,
            warnings,
        })
    }

    fn cache(&self) -> &LoadCache<Vec<Country>> {
        &self.cache
    }

    fn cache_mut(&mut self) -> &mut LoadCache<Vec<Country>> {
        &mut self.cache
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemorySource;

    async fn load_tags(source: MemorySource) -> Arc<LoadResult<Vec<Tag>>> {
        let mut loader = FolderLoader::new(Arc::new(source), "common/country_tags", CountryTags);
        loader.load(false).await.unwrap()
    }

    #[tokio::test]
    async fn tag_files_concatenate_in_order() {
        let result = load_tags(
            MemorySource::new()
                .with_file("common/country_tags/01.txt", "GER = \"countries/Germany.txt\"")
                .with_file(
                    "common/country_tags/00.txt",
                    "ENG = \"countries/England.txt\"\nFRA = countries/France.txt",
                ),
        )
        .await;

        let tags: Vec<_> = result.result.iter().map(|t| t.tag.as_str()).collect();
        assert_eq!(tags, vec!["ENG", "FRA", "GER"]);
        assert_eq!(result.result[0].file, "countries/England.txt");
        assert_eq!(result.dependencies, vec!["common/country_tags/*"]);
        assert!(result.warnings.is_empty());
    }

    #[tokio::test]
    async fn empty_tag_values_are_skipped() {
        let result = load_tags(
            MemorySource::new().with_file("common/country_tags/00.txt", "ENG = \"\"\nFRA = \"f.txt\""),
        )
        .await;
        assert_eq!(result.result.len(), 1);
        assert_eq!(result.result[0].tag, "FRA");
    }

    #[tokio::test]
    async fn broken_tag_file_contributes_nothing() {
        let result = load_tags(
            MemorySource::new()
                .with_file("common/country_tags/00.txt", "ENG = {")
                .with_file("common/country_tags/01.txt", "FRA = \"f.txt\""),
        )
        .await;
        assert_eq!(result.result.len(), 1);
        assert_eq!(result.warnings.len(), 1);
        assert_eq!(result.warnings[0].related_files, vec!["common/country_tags/00.txt"]);
    }

    #[tokio::test]
    async fn duplicate_tags_are_kept_and_reported() {
        let result = load_tags(
            MemorySource::new()
                .with_file("common/country_tags/00.txt", "ENG = \"a.txt\"")
                .with_file("common/country_tags/01.txt", "ENG = \"b.txt\""),
        )
        .await;
        assert_eq!(result.result.len(), 2);
        assert_eq!(result.warnings.len(), 1);
        let warning = &result.warnings[0];
        assert_eq!(
            warning.source,
            vec![WarningSource::Country { tag: "ENG".into() }]
        );
        assert_eq!(
            warning.related_files,
            vec!["common/country_tags/00.txt", "common/country_tags/01.txt"]
        );
    }

    #[tokio::test]
    async fn country_file_color() {
        let source = Arc::new(MemorySource::new().with_file("c.txt", "color = rgb { 200 0 0 }"));
        let mut loader = FileLoader::new(source, "c.txt", CountryFile::new("ENG"));
        let result = loader.load(false).await.unwrap();
        assert_eq!(
            result.result,
            Some(Country {
                tag: "ENG".into(),
                color: 0xC8_00_00
            })
        );
    }

    #[tokio::test]
    async fn country_file_without_color_is_black() {
        let source = Arc::new(MemorySource::new().with_file("c.txt", "graphical_culture = western"));
        let mut loader = FileLoader::new(source, "c.txt", CountryFile::new("ENG"));
        assert_eq!(loader.load(false).await.unwrap().result.as_ref().map(|c| c.color), Some(0));
    }

    #[tokio::test]
    async fn missing_country_file_yields_none_and_warning() {
        let source = Arc::new(MemorySource::new());
        let mut loader = FileLoader::new(source, "c.txt", CountryFile::new("ENG"));
        let result = loader.load(false).await.unwrap();
        assert_eq!(result.result, None);
        assert_eq!(result.dependencies, vec!["c.txt"]);
        assert_eq!(
            result.warnings[0].source,
            vec![WarningSource::Country { tag: "ENG".into() }]
        );
    }

    #[tokio::test]
    async fn colors_file_keeps_entries_with_color() {
        let source = Arc::new(MemorySource::new().with_file(
            "colors.txt",
            "ENG = { color = rgb { 1 2 3 } color_ui = rgb { 4 5 6 } }\nFRA = { color_ui = rgb { 1 1 1 } }",
        ));
        let mut loader = FileLoader::new(source, "colors.txt", ColorsFile);
        let result = loader.load(false).await.unwrap();
        assert_eq!(result.result.len(), 1);
        let eng = result.result.get("ENG").unwrap();
        assert_eq!(eng.space.as_deref(), Some("rgb"));
        assert_eq!(eng.channels, vec![1.0, 2.0, 3.0]);
    }

    #[tokio::test]
    async fn broken_colors_file_means_no_overrides() {
        let source = Arc::new(MemorySource::new().with_file("colors.txt", "ENG = { color = "));
        let mut loader = FileLoader::new(source, "colors.txt", ColorsFile);
        let result = loader.load(false).await.unwrap();
        assert!(result.result.is_empty());
        assert_eq!(result.warnings.len(), 1);
    }

    #[test]
    fn overrides_replace_color() {
        let mut countries = vec![
            Country {
                tag: "ENG".into(),
                color: 1,
            },
            Country {
                tag: "FRA".into(),
                color: 2,
            },
        ];
        let overrides: ColorOverrides = [("FRA".to_string(), ColorAttachment::hsv(0.0, 1.0, 1.0))]
            .into_iter()
            .collect();
        apply_color_overrides(&mut countries, &overrides);
        assert_eq!(countries[0].color, 1);
        assert_eq!(countries[1].color, 0xFF_00_00);
    }
}
