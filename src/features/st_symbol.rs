//! Symbol kinds and the per-sheet symbol table.
//!
//! One table per sheet maps a local name to exactly one [`StSymbol`].
//! Insertion order is kept; an unsafe redeclaration keeps the first symbol
//! and reports `REDECLARE_SYMBOL`, a safe one replaces the value without
//! moving the name's position.

use super::{AnalyzeContext, Feature};
use crate::diagnostics::{codes, Diagnostic, Diagnostics};
use indexmap::IndexMap;
use smol_str::SmolStr;
use text_size::TextRange;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSymbol {
    /// Local binding name.
    pub name: SmolStr,
    /// Name on the source sheet, `"default"` for the default binding.
    pub imported: SmolStr,
    /// Request specifier as written.
    pub request: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassSymbol {
    pub name: SmolStr,
    /// Set when the class name aliases an import.
    pub alias: Option<ImportSymbol>,
    /// Local name of the `-st-extends` target, when declared.
    pub extends: Option<SmolStr>,
    pub is_root: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementSymbol {
    pub name: SmolStr,
    pub alias: Option<ImportSymbol>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VarSymbol {
    pub name: SmolStr,
    /// Raw definition text, resolved lazily by the evaluator.
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StSymbol {
    Class(ClassSymbol),
    Element(ElementSymbol),
    Import(ImportSymbol),
    Var(VarSymbol),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    Class,
    Element,
    Import,
    Var,
}

impl StSymbol {
    pub fn name(&self) -> &SmolStr {
        match self {
            StSymbol::Class(s) => &s.name,
            StSymbol::Element(s) => &s.name,
            StSymbol::Import(s) => &s.name,
            StSymbol::Var(s) => &s.name,
        }
    }

    pub fn kind(&self) -> SymbolKind {
        match self {
            StSymbol::Class(_) => SymbolKind::Class,
            StSymbol::Element(_) => SymbolKind::Element,
            StSymbol::Import(_) => SymbolKind::Import,
            StSymbol::Var(_) => SymbolKind::Var,
        }
    }

    pub fn as_class(&self) -> Option<&ClassSymbol> {
        match self {
            StSymbol::Class(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_import(&self) -> Option<&ImportSymbol> {
        match self {
            StSymbol::Import(s) => Some(s),
            _ => None,
        }
    }

    /// The import linkage of the symbol: its own record for imports, the
    /// alias for classes and elements.
    pub fn import_ref(&self) -> Option<&ImportSymbol> {
        match self {
            StSymbol::Import(s) => Some(s),
            StSymbol::Class(s) => s.alias.as_ref(),
            StSymbol::Element(s) => s.alias.as_ref(),
            StSymbol::Var(_) => None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    symbols: IndexMap<SmolStr, StSymbol>,
}

impl SymbolTable {
    pub fn get(&self, name: &str) -> Option<&StSymbol> {
        self.symbols.get(name)
    }

    pub fn get_kind(&self, name: &str, kind: SymbolKind) -> Option<&StSymbol> {
        self.symbols.get(name).filter(|s| s.kind() == kind)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut StSymbol> {
        self.symbols.get_mut(name)
    }

    /// Symbols of one kind, in insertion order.
    pub fn get_all_by_type(&self, kind: SymbolKind) -> impl Iterator<Item = &StSymbol> {
        self.symbols.values().filter(move |s| s.kind() == kind)
    }

    pub fn iter(&self) -> impl Iterator<Item = &StSymbol> {
        self.symbols.values()
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Insert or replace without redeclaration checks. A replaced name keeps
    /// its table position.
    pub fn insert_unchecked(&mut self, symbol: StSymbol) {
        self.symbols.insert(symbol.name().clone(), symbol);
    }

    /// Register a symbol. A name collision keeps the first symbol and
    /// reports `REDECLARE_SYMBOL` unless `safe_redeclare` is set, in which
    /// case the value is replaced in place.
    pub fn add_symbol(
        &mut self,
        symbol: StSymbol,
        safe_redeclare: bool,
        diagnostics: &Diagnostics,
        span: Option<TextRange>,
    ) {
        let name = symbol.name().clone();
        if self.symbols.contains_key(&name) {
            if safe_redeclare {
                self.symbols.insert(name, symbol);
            } else {
                let mut diagnostic = Diagnostic::warning(
                    codes::REDECLARE_SYMBOL,
                    format!("redeclare symbol \"{name}\""),
                )
                .with_word(name);
                if let Some(span) = span {
                    diagnostic = diagnostic.with_span(span);
                }
                diagnostics.push(diagnostic);
            }
        } else {
            self.symbols.insert(name, symbol);
        }
    }
}

pub struct StSymbolFeature;

impl Feature for StSymbolFeature {
    fn meta_init(&self, ctx: &mut AnalyzeContext<'_>) {
        if ctx.meta.is_stitch() {
            let name = ctx.meta.root_class.clone();
            ctx.meta.symbols.insert_unchecked(StSymbol::Class(ClassSymbol {
                name,
                alias: None,
                extends: None,
                is_root: true,
            }));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn class(name: &str) -> StSymbol {
        StSymbol::Class(ClassSymbol {
            name: name.into(),
            alias: None,
            extends: None,
            is_root: false,
        })
    }

    fn var(name: &str, text: &str) -> StSymbol {
        StSymbol::Var(VarSymbol { name: name.into(), text: text.to_string() })
    }

    #[test]
    fn test_add_and_get_by_kind() {
        let mut table = SymbolTable::default();
        let diagnostics = Diagnostics::new();
        table.add_symbol(class("a"), false, &diagnostics, None);
        table.add_symbol(var("a2", "red"), false, &diagnostics, None);
        assert!(table.get_kind("a", SymbolKind::Class).is_some());
        assert!(table.get_kind("a", SymbolKind::Var).is_none());
        assert_eq!(table.len(), 2);
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_redeclare_keeps_first_and_warns() {
        let mut table = SymbolTable::default();
        let diagnostics = Diagnostics::new();
        table.add_symbol(var("x", "red"), false, &diagnostics, None);
        table.add_symbol(var("x", "blue"), false, &diagnostics, None);
        match table.get("x") {
            Some(StSymbol::Var(v)) => assert_eq!(v.text, "red"),
            other => panic!("expected var, got {other:?}"),
        }
        let collected = diagnostics.take();
        assert_eq!(collected.len(), 1);
        assert_eq!(collected[0].code, codes::REDECLARE_SYMBOL);
        assert_eq!(collected[0].message, "redeclare symbol \"x\"");
    }

    #[test]
    fn test_safe_redeclare_replaces_in_place() {
        let mut table = SymbolTable::default();
        let diagnostics = Diagnostics::new();
        table.add_symbol(
            StSymbol::Import(ImportSymbol {
                name: "a".into(),
                imported: "default".into(),
                request: "./a.st.css".to_string(),
            }),
            false,
            &diagnostics,
            None,
        );
        table.add_symbol(class("b"), false, &diagnostics, None);
        table.add_symbol(class("a"), true, &diagnostics, None);
        assert!(diagnostics.is_empty());
        let names: Vec<&str> = table.iter().map(|s| s.name().as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert!(matches!(table.get("a"), Some(StSymbol::Class(_))));
    }

    #[test]
    fn test_get_all_by_type_insertion_order() {
        let mut table = SymbolTable::default();
        let diagnostics = Diagnostics::new();
        table.add_symbol(var("b", "1"), false, &diagnostics, None);
        table.add_symbol(class("c"), false, &diagnostics, None);
        table.add_symbol(var("a", "2"), false, &diagnostics, None);
        let vars: Vec<&str> = table
            .get_all_by_type(SymbolKind::Var)
            .map(|s| s.name().as_str())
            .collect();
        assert_eq!(vars, vec!["b", "a"]);
    }
}
