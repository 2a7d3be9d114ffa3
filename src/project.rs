//! Unit graph and provider registry.
//!
//! A [`Project`] owns every analyzed [`StyleSheet`] plus the provider
//! modules that executable mixins resolve to. Sheets are keyed by the source
//! path imports resolve against; providers by the request path of the module
//! that exports them. Batch analysis and batch transform fan out over units
//! with rayon; everything within one unit stays sequential.

use crate::meta::StyleSheet;
use crate::transformer::{self, TransformOutput, Transformer};
use indexmap::IndexMap;
use rayon::prelude::*;
use smol_str::SmolStr;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("failed to read \"{path}\"")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Failure raised by a provider invocation; converted to a
/// `FAILED_TO_APPLY_MIXIN` diagnostic at the call site, never propagated.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct ProviderError {
    pub message: String,
}

impl ProviderError {
    pub fn new(message: impl Into<String>) -> Self {
        ProviderError { message: message.into() }
    }
}

// ============================================================
// PROVIDER CAPABILITY
// ============================================================

/// An executable style generator: positional string arguments in, a CSS
/// object literal out. The call is synchronous and may fail; how the
/// callable is located and loaded stays outside the compiler.
pub trait MixinProvider: Send + Sync {
    fn apply(&self, args: &[String]) -> Result<MixinObject, ProviderError>;
}

impl<F> MixinProvider for F
where
    F: Fn(&[String]) -> Result<MixinObject, ProviderError> + Send + Sync,
{
    fn apply(&self, args: &[String]) -> Result<MixinObject, ProviderError> {
        self(args)
    }
}

/// Ordered CSS object literal returned by a provider: property declarations
/// and nested selector blocks, in insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MixinObject {
    entries: IndexMap<SmolStr, MixinObjectValue>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MixinObjectValue {
    Decl(String),
    Nested(MixinObject),
}

impl MixinObject {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn decl(mut self, prop: impl Into<SmolStr>, value: impl Into<String>) -> Self {
        self.entries
            .insert(prop.into(), MixinObjectValue::Decl(value.into()));
        self
    }

    pub fn nested(mut self, selector: impl Into<SmolStr>, object: MixinObject) -> Self {
        self.entries
            .insert(selector.into(), MixinObjectValue::Nested(object));
        self
    }

    pub fn entries(&self) -> impl Iterator<Item = (&SmolStr, &MixinObjectValue)> {
        self.entries.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// One named export of a provider module. A `Value` export invoked as a
/// mixin is the not-a-function error case.
#[derive(Clone)]
pub enum ProviderExport {
    Mixin(Arc<dyn MixinProvider>),
    Value(String),
}

/// A loadable module of provider exports, registered under a request path.
#[derive(Clone, Default)]
pub struct ProviderModule {
    exports: IndexMap<SmolStr, ProviderExport>,
}

impl ProviderModule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mixin(
        mut self,
        name: impl Into<SmolStr>,
        provider: impl MixinProvider + 'static,
    ) -> Self {
        self.exports
            .insert(name.into(), ProviderExport::Mixin(Arc::new(provider)));
        self
    }

    pub fn value(mut self, name: impl Into<SmolStr>, value: impl Into<String>) -> Self {
        self.exports
            .insert(name.into(), ProviderExport::Value(value.into()));
        self
    }

    pub fn export(&self, name: &str) -> Option<&ProviderExport> {
        self.exports.get(name)
    }
}

// ============================================================
// PROJECT
// ============================================================

#[derive(Default)]
pub struct Project {
    sheets: IndexMap<Arc<str>, StyleSheet>,
    providers: IndexMap<String, ProviderModule>,
}

impl Project {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and analyze one source, replacing any earlier sheet at `path`.
    pub fn add_source(&mut self, path: impl Into<Arc<str>>, text: impl Into<String>) -> &StyleSheet {
        let sheet = transformer::analyze(path, text.into());
        let source = sheet.source.clone();
        self.sheets.insert(source.clone(), sheet);
        &self.sheets[&source]
    }

    /// Analyze a batch of sources in parallel. Registration order follows
    /// the input order regardless of which unit finishes first.
    pub fn add_sources(&mut self, sources: Vec<(String, String)>) {
        let analyzed: Vec<StyleSheet> = sources
            .into_par_iter()
            .map(|(path, text)| transformer::analyze(path, text))
            .collect();
        for sheet in analyzed {
            self.sheets.insert(sheet.source.clone(), sheet);
        }
    }

    pub fn add_provider(&mut self, request: impl Into<String>, module: ProviderModule) {
        self.providers.insert(request.into(), module);
    }

    pub fn sheet(&self, path: &str) -> Option<&StyleSheet> {
        self.sheets.get(path)
    }

    pub fn provider(&self, request: &str) -> Option<&ProviderModule> {
        self.providers.get(request)
    }

    pub fn sheets(&self) -> impl Iterator<Item = &StyleSheet> {
        self.sheets.values()
    }

    pub fn len(&self) -> usize {
        self.sheets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }

    /// Load every `*.css` file under `dir`. Sheet keys are `/`-separated
    /// paths relative to `dir`, so imports written against the directory
    /// layout resolve without further configuration.
    pub fn load_dir(dir: &Path) -> Result<Project, ProjectError> {
        let mut sources = Vec::new();
        collect_css_files(dir, dir, &mut sources)?;
        debug!(dir = %dir.display(), count = sources.len(), "load project directory");
        let mut project = Project::new();
        project.add_sources(sources);
        Ok(project)
    }

    /// Transform every stitch sheet, in parallel, sharing one memoized
    /// [`Transformer`]. Plain CSS sheets are resolvable but never rewritten.
    pub fn transform_all(&self) -> Vec<(Arc<str>, TransformOutput)> {
        let transformer = Transformer::new(self);
        self.sheets
            .values()
            .filter(|sheet| sheet.is_stitch())
            .collect::<Vec<_>>()
            .into_par_iter()
            .map(|sheet| (sheet.source.clone(), transformer.transform(sheet)))
            .collect()
    }
}

fn collect_css_files(
    root: &Path,
    dir: &Path,
    out: &mut Vec<(String, String)>,
) -> Result<(), ProjectError> {
    let read_dir = fs::read_dir(dir).map_err(|source| ProjectError::Read {
        path: dir.display().to_string(),
        source,
    })?;
    let mut entries: Vec<_> = read_dir.filter_map(Result::ok).map(|e| e.path()).collect();
    entries.sort();
    for path in entries {
        if path.is_dir() {
            collect_css_files(root, &path, out)?;
        } else if path.extension().is_some_and(|ext| ext == "css") {
            let text = fs::read_to_string(&path).map_err(|source| ProjectError::Read {
                path: path.display().to_string(),
                source,
            })?;
            let relative = path
                .strip_prefix(root)
                .unwrap_or(&path)
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            out.push((relative, text));
        }
    }
    Ok(())
}
