//! Cross-unit symbol resolution.
//!
//! Resolution follows two kinds of links: import re-exports (deep resolve)
//! and `-st-extends`/alias chains (extends resolve). Both walks snapshot the
//! symbols they visit into owned [`CssResolve`] entries and guard against
//! revisiting a `(unit, name)` pair, so every returned chain is finite and
//! cycle-free.

use crate::features::st_symbol::{ImportSymbol, StSymbol, SymbolKind};
use crate::meta::StyleSheet;
use crate::project::Project;
use rustc_hash::{FxHashMap, FxHashSet};
use smol_str::SmolStr;
use std::sync::Arc;
use tracing::trace;

/// One resolved step: a symbol snapshot and the unit that defines it.
#[derive(Debug, Clone)]
pub struct CssResolve {
    pub unit: Arc<str>,
    pub symbol: StSymbol,
}

pub type ResolveChain = Vec<CssResolve>;

/// An import that landed on a provider module export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderBinding {
    pub request: String,
    pub export: SmolStr,
}

#[derive(Debug, Clone)]
pub enum ResolvedImport {
    Sheet(CssResolve),
    Provider(ProviderBinding),
}

/// Resolved kind of a local name, as seen after import following.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MainKind {
    Class,
    Element,
    Var,
    Js,
}

/// Every resolution a transform pass needs for one unit, computed once and
/// memoized by the transformer.
#[derive(Debug, Default, Clone)]
pub struct ResolvedSymbols {
    pub class: FxHashMap<SmolStr, ResolveChain>,
    pub element: FxHashMap<SmolStr, ResolveChain>,
    pub js: FxHashMap<SmolStr, ProviderBinding>,
    pub main_namespace: FxHashMap<SmolStr, MainKind>,
}

pub struct Resolver<'p> {
    project: &'p Project,
}

impl<'p> Resolver<'p> {
    pub fn new(project: &'p Project) -> Self {
        Resolver { project }
    }

    /// Lexical join of a relative request onto a base directory. Requests
    /// that are not relative are returned as written; module loading stays
    /// outside the compiler.
    pub fn resolve_path(base_dir: &str, request: &str) -> String {
        if !(request.starts_with("./") || request.starts_with("../")) {
            return request.to_string();
        }
        let absolute = base_dir.starts_with('/');
        let mut segments: Vec<&str> =
            base_dir.split('/').filter(|s| !s.is_empty() && *s != ".").collect();
        for part in request.split('/') {
            match part {
                "" | "." => {}
                ".." => {
                    segments.pop();
                }
                other => segments.push(other),
            }
        }
        let joined = segments.join("/");
        if absolute {
            format!("/{joined}")
        } else {
            joined
        }
    }

    /// Follow an import to its final definition: a symbol on another sheet
    /// (re-exports followed transitively) or a provider module export.
    pub fn resolve_import(
        &self,
        from: &StyleSheet,
        import: &ImportSymbol,
    ) -> Option<ResolvedImport> {
        let mut visited = FxHashSet::default();
        self.resolve_import_inner(from, import, &mut visited)
    }

    fn resolve_import_inner(
        &self,
        from: &StyleSheet,
        import: &ImportSymbol,
        visited: &mut FxHashSet<(Arc<str>, SmolStr)>,
    ) -> Option<ResolvedImport> {
        let request = Self::resolve_path(from.source_dir(), &import.request);
        trace!(from = %from.source, %request, imported = %import.imported, "deep resolve");

        if let Some(target) = self.project.sheet(&request) {
            if !visited.insert((target.source.clone(), import.imported.clone())) {
                return None;
            }
            if import.imported == "default" {
                let symbol = target
                    .symbols
                    .get_kind(&target.root_class, SymbolKind::Class)?
                    .clone();
                return Some(ResolvedImport::Sheet(CssResolve {
                    unit: target.source.clone(),
                    symbol,
                }));
            }
            return match target.symbols.get(&import.imported) {
                Some(StSymbol::Import(re_export)) => {
                    self.resolve_import_inner(target, re_export, visited)
                }
                Some(symbol) => Some(ResolvedImport::Sheet(CssResolve {
                    unit: target.source.clone(),
                    symbol: symbol.clone(),
                })),
                None => None,
            };
        }

        if let Some(provider) = self.project.provider(&request) {
            let export = import.imported.clone();
            provider.export(&export)?;
            return Some(ResolvedImport::Provider(ProviderBinding { request, export }));
        }
        None
    }

    /// Chain walk from a local symbol outward, following `-st-extends` when
    /// present and the import alias otherwise. Each hop is deep-resolved;
    /// the walk stops at a missing link, an unresolvable hop, or a repeat.
    pub fn resolve_extends(
        &self,
        sheet: &StyleSheet,
        name: &str,
        kind: SymbolKind,
    ) -> ResolveChain {
        let mut chain = ResolveChain::new();
        let Some(start) = sheet.symbols.get_kind(name, kind) else {
            return chain;
        };
        let mut visited = FxHashSet::default();
        let mut current_sheet = sheet;
        let mut current = start.clone();

        loop {
            let key = (current_sheet.source.clone(), current.name().clone());
            if !visited.insert(key) {
                break;
            }
            trace!(unit = %current_sheet.source, symbol = %current.name(), "extends hop");
            chain.push(CssResolve {
                unit: current_sheet.source.clone(),
                symbol: current.clone(),
            });

            // Aliased symbols hop through their own import record; an
            // extends target is a name in the defining unit's table.
            let next = match &current {
                StSymbol::Class(class) => match (&class.extends, &class.alias) {
                    (Some(target), _) => match current_sheet.symbols.get(target) {
                        Some(StSymbol::Import(import)) => {
                            self.hop_import(current_sheet, import)
                        }
                        Some(symbol @ (StSymbol::Class(_) | StSymbol::Element(_))) => {
                            Some((current_sheet, symbol.clone()))
                        }
                        _ => None,
                    },
                    (None, Some(import)) => self.hop_import(current_sheet, import),
                    (None, None) => None,
                },
                StSymbol::Element(element) => element
                    .alias
                    .as_ref()
                    .and_then(|import| self.hop_import(current_sheet, import)),
                _ => None,
            };
            match next {
                Some((next_sheet, next_symbol)) => {
                    current_sheet = next_sheet;
                    current = next_symbol;
                }
                None => break,
            }
        }
        chain
    }

    /// One extends-walk hop across an import: deep-resolve the record and
    /// land on the target sheet's symbol. Provider bindings end the walk.
    fn hop_import<'b>(
        &'b self,
        from: &StyleSheet,
        import: &ImportSymbol,
    ) -> Option<(&'b StyleSheet, StSymbol)> {
        match self.resolve_import(from, import)? {
            ResolvedImport::Sheet(resolve) => {
                self.project.sheet(&resolve.unit).map(|s| (s, resolve.symbol))
            }
            ResolvedImport::Provider(_) => None,
        }
    }

    /// Compute the full resolution set of one unit.
    pub fn resolve_symbols(&self, sheet: &StyleSheet) -> ResolvedSymbols {
        let mut out = ResolvedSymbols::default();
        for symbol in sheet.symbols.iter() {
            let name = symbol.name().clone();
            match symbol {
                StSymbol::Class(_) => {
                    let chain = self.resolve_extends(sheet, &name, SymbolKind::Class);
                    out.main_namespace.insert(name.clone(), MainKind::Class);
                    out.class.insert(name, chain);
                }
                StSymbol::Element(_) => {
                    let chain = self.resolve_extends(sheet, &name, SymbolKind::Element);
                    out.main_namespace.insert(name.clone(), MainKind::Element);
                    out.element.insert(name, chain);
                }
                StSymbol::Var(_) => {
                    out.main_namespace.insert(name, MainKind::Var);
                }
                StSymbol::Import(import) => match self.resolve_import(sheet, import) {
                    Some(ResolvedImport::Sheet(resolve)) => match resolve.symbol.kind() {
                        // Imported classes and elements carry the chain of
                        // their foreign definition under the local name.
                        SymbolKind::Class => {
                            let chain = self.foreign_chain(&resolve, SymbolKind::Class);
                            out.main_namespace.insert(name.clone(), MainKind::Class);
                            out.class.insert(name, chain);
                        }
                        SymbolKind::Element => {
                            let chain = self.foreign_chain(&resolve, SymbolKind::Element);
                            out.main_namespace.insert(name.clone(), MainKind::Element);
                            out.element.insert(name, chain);
                        }
                        SymbolKind::Var => {
                            out.main_namespace.insert(name, MainKind::Var);
                        }
                        SymbolKind::Import => {}
                    },
                    Some(ResolvedImport::Provider(binding)) => {
                        out.main_namespace.insert(name.clone(), MainKind::Js);
                        out.js.insert(name, binding);
                    }
                    None => {}
                },
            }
        }
        out
    }

    fn foreign_chain(&self, resolve: &CssResolve, kind: SymbolKind) -> ResolveChain {
        match self.project.sheet(&resolve.unit) {
            Some(target) => self.resolve_extends(target, resolve.symbol.name(), kind),
            None => vec![resolve.clone()],
        }
    }
}

/// First chain entry that is not a pure import alias; pure aliases forward
/// to their target without defining anything of their own.
pub fn origin_definition(chain: &[CssResolve]) -> Option<&CssResolve> {
    chain
        .iter()
        .find(|entry| !is_pure_alias(&entry.symbol))
        .or_else(|| chain.first())
}

fn is_pure_alias(symbol: &StSymbol) -> bool {
    match symbol {
        StSymbol::Class(class) => class.alias.is_some() && class.extends.is_none(),
        StSymbol::Element(element) => element.alias.is_some(),
        _ => false,
    }
}
