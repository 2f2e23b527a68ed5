//! Site configuration builder.
//!
//! Registrations accumulate in a [`SiteConfigBuilder`]; [`SiteConfigBuilder::build`]
//! produces the immutable [`SiteConfig`] record the build host consumes.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::filter::Filter;
use crate::passthrough::{normalize, PassthroughCopy};
use crate::plugin::{Highlighter, Plugin};
use crate::shortcode::Shortcode;
use crate::site::configure;
use crate::transform::{BuildMode, Transform};

/// Input and output directories, relative to the project root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dirs {
    pub input: PathBuf,
    pub output: PathBuf,
}

impl Dirs {
    pub fn new(input: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
        }
    }
}

impl Default for Dirs {
    fn default() -> Self {
        Self::new(".", "_site")
    }
}

/// Accumulates registrations for a site.
pub struct SiteConfigBuilder {
    filters: BTreeMap<String, Arc<dyn Filter>>,
    shortcodes: BTreeMap<String, Arc<dyn Shortcode>>,
    transforms: Vec<(String, Arc<dyn Transform>)>,
    watch_targets: Vec<PathBuf>,
    passthrough: Vec<PassthroughCopy>,
    plugins: Vec<&'static str>,
    highlighter: Option<Arc<dyn Highlighter>>,
    use_gitignore: bool,
    data_deep_merge: bool,
    dirs: Dirs,
}

impl SiteConfigBuilder {
    /// Create an empty builder with default settings.
    pub fn new() -> Self {
        Self {
            filters: BTreeMap::new(),
            shortcodes: BTreeMap::new(),
            transforms: Vec::new(),
            watch_targets: Vec::new(),
            passthrough: Vec::new(),
            plugins: Vec::new(),
            highlighter: None,
            use_gitignore: true,
            data_deep_merge: false,
            dirs: Dirs::default(),
        }
    }

    /// Create a builder with this site's registrations already applied.
    pub fn configured(mode: BuildMode) -> Self {
        let mut builder = Self::new();
        let dirs = configure(&mut builder, mode);
        builder.dirs(dirs);
        builder
    }

    /// Register a template filter. A later registration under the same name
    /// replaces the earlier one.
    pub fn add_filter(&mut self, name: impl Into<String>, filter: impl Filter + 'static) -> &mut Self {
        let name = name.into();
        if self.filters.insert(name.clone(), Arc::new(filter)).is_some() {
            tracing::debug!("Replaced filter `{}`", name);
        }
        self
    }

    /// Register a template-callable shortcode.
    pub fn add_shortcode(
        &mut self,
        name: impl Into<String>,
        shortcode: impl Shortcode + 'static,
    ) -> &mut Self {
        let name = name.into();
        if self.shortcodes.insert(name.clone(), Arc::new(shortcode)).is_some() {
            tracing::debug!("Replaced shortcode `{}`", name);
        }
        self
    }

    /// Register a content transform. Transforms run in registration order;
    /// replacing a name keeps its original position.
    pub fn add_transform(
        &mut self,
        name: impl Into<String>,
        transform: impl Transform + 'static,
    ) -> &mut Self {
        let name = name.into();
        let transform: Arc<dyn Transform> = Arc::new(transform);

        match self.transforms.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => {
                tracing::debug!("Replaced transform `{}`", name);
                slot.1 = transform;
            }
            None => self.transforms.push((name, transform)),
        }
        self
    }

    /// Declare a path whose modification triggers a rebuild.
    pub fn add_watch_target(&mut self, path: impl AsRef<Path>) -> &mut Self {
        let path = normalize(path.as_ref());
        if !self.watch_targets.contains(&path) {
            self.watch_targets.push(path);
        }
        self
    }

    /// Declare a batch of `source -> destination` passthrough copies.
    pub fn add_passthrough_copy<I, S, D>(&mut self, mapping: I) -> &mut Self
    where
        I: IntoIterator<Item = (S, D)>,
        S: AsRef<Path>,
        D: AsRef<Path>,
    {
        self.passthrough.extend(
            mapping
                .into_iter()
                .map(|(source, dest)| PassthroughCopy::new(source, dest)),
        );
        self
    }

    /// Apply a plugin's registrations.
    pub fn add_plugin(&mut self, plugin: &dyn Plugin) -> &mut Self {
        plugin.register(self);
        self.plugins.push(plugin.name());
        self
    }

    /// Set the code-block highlighter used when rendering markdown.
    pub fn set_highlighter(&mut self, highlighter: Arc<dyn Highlighter>) -> &mut Self {
        self.highlighter = Some(highlighter);
        self
    }

    /// Whether `.gitignore` files exclude input templates.
    pub fn use_gitignore(&mut self, enabled: bool) -> &mut Self {
        self.use_gitignore = enabled;
        self
    }

    /// Whether the data cascade merges objects recursively.
    pub fn data_deep_merge(&mut self, enabled: bool) -> &mut Self {
        self.data_deep_merge = enabled;
        self
    }

    pub fn dirs(&mut self, dirs: Dirs) -> &mut Self {
        self.dirs = dirs;
        self
    }

    /// Finish configuration.
    pub fn build(self) -> SiteConfig {
        SiteConfig {
            filters: self.filters,
            shortcodes: self.shortcodes,
            transforms: self.transforms,
            watch_targets: self.watch_targets,
            passthrough: self.passthrough,
            plugins: self.plugins,
            highlighter: self.highlighter,
            use_gitignore: self.use_gitignore,
            data_deep_merge: self.data_deep_merge,
            dirs: self.dirs,
        }
    }
}

impl Default for SiteConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Everything a build host needs to know about a site.
#[derive(Clone)]
pub struct SiteConfig {
    filters: BTreeMap<String, Arc<dyn Filter>>,
    shortcodes: BTreeMap<String, Arc<dyn Shortcode>>,
    transforms: Vec<(String, Arc<dyn Transform>)>,
    watch_targets: Vec<PathBuf>,
    passthrough: Vec<PassthroughCopy>,
    plugins: Vec<&'static str>,
    highlighter: Option<Arc<dyn Highlighter>>,
    use_gitignore: bool,
    data_deep_merge: bool,
    dirs: Dirs,
}

impl SiteConfig {
    /// This site's configuration for the given build mode.
    pub fn load(mode: BuildMode) -> Self {
        SiteConfigBuilder::configured(mode).build()
    }

    pub fn filters(&self) -> impl Iterator<Item = (&str, &Arc<dyn Filter>)> {
        self.filters.iter().map(|(name, f)| (name.as_str(), f))
    }

    pub fn filter(&self, name: &str) -> Option<&Arc<dyn Filter>> {
        self.filters.get(name)
    }

    pub fn shortcodes(&self) -> impl Iterator<Item = (&str, &Arc<dyn Shortcode>)> {
        self.shortcodes.iter().map(|(name, s)| (name.as_str(), s))
    }

    pub fn shortcode(&self, name: &str) -> Option<&Arc<dyn Shortcode>> {
        self.shortcodes.get(name)
    }

    /// Transforms in the order they run.
    pub fn transforms(&self) -> impl Iterator<Item = (&str, &Arc<dyn Transform>)> {
        self.transforms.iter().map(|(name, t)| (name.as_str(), t))
    }

    pub fn watch_targets(&self) -> &[PathBuf] {
        &self.watch_targets
    }

    pub fn passthrough_copies(&self) -> &[PassthroughCopy] {
        &self.passthrough
    }

    pub fn plugins(&self) -> &[&'static str] {
        &self.plugins
    }

    pub fn highlighter(&self) -> Option<&dyn Highlighter> {
        self.highlighter.as_deref()
    }

    pub fn use_gitignore(&self) -> bool {
        self.use_gitignore
    }

    pub fn data_deep_merge(&self) -> bool {
        self.data_deep_merge
    }

    pub fn dirs(&self) -> &Dirs {
        &self.dirs
    }
}

impl fmt::Debug for SiteConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SiteConfig")
            .field("filters", &self.filters.keys().collect::<Vec<_>>())
            .field("shortcodes", &self.shortcodes.keys().collect::<Vec<_>>())
            .field(
                "transforms",
                &self.transforms.iter().map(|(n, _)| n).collect::<Vec<_>>(),
            )
            .field("watch_targets", &self.watch_targets)
            .field("passthrough", &self.passthrough)
            .field("plugins", &self.plugins)
            .field("highlighter", &self.highlighter.is_some())
            .field("use_gitignore", &self.use_gitignore)
            .field("data_deep_merge", &self.data_deep_merge)
            .field("dirs", &self.dirs)
            .finish()
    }
}
