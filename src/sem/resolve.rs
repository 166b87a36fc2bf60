//! Tag-to-symbol resolution.
//!
//! A tag `<div>` references the class `x_div`. Where that class lives
//! depends on how the tag was written: a dotted tag name carries its
//! namespace explicitly, while an unqualified tag may resolve into the
//! html module of an imported pyxl package when that module (or its
//! re-exports) declares the class. Everything else falls through to
//! the host framework's ordinary same-scope lookup.
//!
//! A [`TagReference`] is as short-lived as the node it wraps: the host
//! creates one per resolution pass and discards it when the underlying
//! source changes. The import-derived name set is computed lazily on
//! first use and cached for the instance's lifetime, even when it
//! comes out empty.

use once_cell::unsync::OnceCell;
use rustc_hash::FxHashSet;
use smol_str::SmolStr;
use tracing::debug;

use super::facts::{FileFacts, ImportRef};
use super::modules::ModuleIndex;
use crate::syntax::TagBegin;

/// Prefix mapping tag names to class names: `<div>` references `x_div`.
pub const TAG_CLASS_PREFIX: &str = "x_";

/// Last path component marking a namespace package as tag-bearing.
pub const PYXL_PACKAGE: &str = "pyxl";

/// The module whose top-level classes become implicitly resolvable.
pub const HTML_MODULE: &str = "html";

/// Apply the tag-to-class name transform: prefix the local name with
/// [`TAG_CLASS_PREFIX`]. The prefix is always applied, even to names
/// that already carry it.
pub fn tag_class_name(local_name: &str) -> SmolStr {
    SmolStr::new(format!("{TAG_CLASS_PREFIX}{local_name}"))
}

// ============================================================================
// REFERENCE CAPABILITY
// ============================================================================

/// The namespace a reference resolves through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Qualifier {
    /// Written by the author as a dotted prefix.
    Explicit(SmolStr),
    /// Inferred from the file's imports; the handle names the import
    /// element whose module acts as the namespace.
    Implicit(ImportRef),
}

/// Capability interface the host reference machinery calls through.
///
/// One trait, few implementers: [`TagReference`] for regular tags and
/// [`CondTagReference`] for the conditional family.
pub trait Reference {
    /// The symbol name this reference denotes.
    fn referenced_name(&self) -> SmolStr;

    /// The namespace the reference resolves through, or `None` when
    /// ordinary same-scope lookup applies.
    fn qualifier(&self) -> Option<Qualifier>;
}

// ============================================================================
// TAG REFERENCE
// ============================================================================

/// Resolves one tag-begin node against its file's import facts.
///
/// Not `Sync`: resolution is called synchronously by the host on a
/// single thread, and the lazy cache relies on that.
pub struct TagReference<'a> {
    tag: &'a TagBegin,
    facts: &'a FileFacts,
    modules: &'a ModuleIndex,
    special_names: OnceCell<FxHashSet<SmolStr>>,
}

impl<'a> TagReference<'a> {
    /// Create a reference for one tag-begin node.
    pub fn new(tag: &'a TagBegin, facts: &'a FileFacts, modules: &'a ModuleIndex) -> Self {
        Self {
            tag,
            facts,
            modules,
            special_names: OnceCell::new(),
        }
    }

    /// The node this reference wraps.
    pub fn tag(&self) -> &TagBegin {
        self.tag
    }

    /// The class name the tag references, e.g. `x_widget` for
    /// `<ui.widget>`.
    pub fn referenced_symbol_name(&self) -> SmolStr {
        tag_class_name(self.tag.local_name())
    }

    /// The namespace prefix as written, when the tag name is dotted.
    pub fn explicit_qualifier(&self) -> Option<&str> {
        self.tag.explicit_qualifier()
    }

    /// The import element acting as an implied namespace, when the tag
    /// is unqualified and its class name is in the import-derived set.
    /// `None` means the host's default same-scope lookup applies.
    pub fn implicit_qualifier_source(&self) -> Option<ImportRef> {
        if self.tag.explicit_qualifier().is_some() {
            return None;
        }
        let name = self.referenced_symbol_name();
        if !self.special_tag_names().contains(name.as_str()) {
            return None;
        }
        self.html_module_import()
    }

    /// The import-derived symbol set: class names treated as belonging
    /// to an imported html module. Computed once per reference, on
    /// first need; the cached set is returned ever after, even when
    /// empty.
    pub fn special_tag_names(&self) -> &FxHashSet<SmolStr> {
        self.special_names
            .get_or_init(|| compute_special_tag_names(self.facts, self.modules))
    }

    /// First import element bringing in a resolvable html module from
    /// a pyxl package.
    fn html_module_import(&self) -> Option<ImportRef> {
        for (import_idx, import) in self.facts.imports().iter().enumerate() {
            if import.last_component() != PYXL_PACKAGE {
                continue;
            }
            for (element_idx, element) in import.elements().iter().enumerate() {
                if element.name() != HTML_MODULE {
                    continue;
                }
                let path = module_path(import.source(), element.name());
                if self.modules.get(&path).is_some() {
                    return Some(ImportRef {
                        file: self.facts.file(),
                        import: import_idx as u32,
                        element: element_idx as u32,
                    });
                }
            }
        }
        None
    }
}

impl Reference for TagReference<'_> {
    fn referenced_name(&self) -> SmolStr {
        self.referenced_symbol_name()
    }

    fn qualifier(&self) -> Option<Qualifier> {
        if let Some(explicit) = self.tag.explicit_qualifier() {
            return Some(Qualifier::Explicit(SmolStr::new(explicit)));
        }
        self.implicit_qualifier_source().map(Qualifier::Implicit)
    }
}

/// Reference for `<if>`/`<else>` tags. The conditional family resolves
/// exactly like regular tags; the separate type lets the host register
/// a distinct implementer for the conditional token kinds.
pub struct CondTagReference<'a>(TagReference<'a>);

impl<'a> CondTagReference<'a> {
    /// Create a reference for one conditional tag-begin node.
    pub fn new(tag: &'a TagBegin, facts: &'a FileFacts, modules: &'a ModuleIndex) -> Self {
        Self(TagReference::new(tag, facts, modules))
    }
}

impl Reference for CondTagReference<'_> {
    fn referenced_name(&self) -> SmolStr {
        self.0.referenced_name()
    }

    fn qualifier(&self) -> Option<Qualifier> {
        self.0.qualifier()
    }
}

// ============================================================================
// ONE-CALL SURFACE
// ============================================================================

/// The outcome of resolving one tag-begin node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// The class name the tag references.
    pub symbol_name: SmolStr,
    /// The namespace prefix as written, when present.
    pub explicit_qualifier: Option<SmolStr>,
    /// The import element acting as an implied namespace, when one
    /// applies.
    pub implicit_qualifier_source: Option<ImportRef>,
}

/// Resolve a tag-begin node against its file's facts. Idempotent;
/// callable any number of times.
pub fn resolve(tag: &TagBegin, facts: &FileFacts, modules: &ModuleIndex) -> Resolution {
    let reference = TagReference::new(tag, facts, modules);
    Resolution {
        symbol_name: reference.referenced_symbol_name(),
        explicit_qualifier: tag.explicit_qualifier().map(SmolStr::new),
        implicit_qualifier_source: reference.implicit_qualifier_source(),
    }
}

// ============================================================================
// IMPORT-DERIVED SYMBOL SET
// ============================================================================

fn module_path(source: &str, module: &str) -> SmolStr {
    SmolStr::new(format!("{source}.{module}"))
}

/// Walk every qualifying import and collect the class names its html
/// module makes implicitly resolvable. No early exit: each qualifying
/// statement contributes.
fn compute_special_tag_names(facts: &FileFacts, modules: &ModuleIndex) -> FxHashSet<SmolStr> {
    let mut names = FxHashSet::default();

    for import in facts.imports() {
        if import.last_component() != PYXL_PACKAGE {
            continue;
        }
        for element in import.elements() {
            if element.name() != HTML_MODULE {
                continue;
            }
            let path = module_path(import.source(), element.name());
            let Some(module) = modules.get(&path) else {
                continue;
            };

            for class in module.classes() {
                names.insert(class.clone());
            }

            // Transient classes the module re-exports at its top
            // level. Swallowing every import whose visible name starts
            // with x_ is not technically correct (any class can use
            // the prefix), but it is good enough for our purposes.
            for nested in module.imports() {
                for nested_element in nested.elements() {
                    if nested_element.visible_name().starts_with(TAG_CLASS_PREFIX) {
                        names.insert(SmolStr::new(nested_element.visible_name()));
                    }
                }
            }
        }
    }

    debug!(count = names.len(), "computed implicit tag name set");
    names
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::{FileId, TextRange, TextSize};
    use crate::sem::facts::{FromImport, ImportElement, ModuleFacts};

    fn tag(raw: &str) -> TagBegin {
        TagBegin::new(
            raw,
            TextRange::new(TextSize::from(0), TextSize::from(raw.len() as u32)),
        )
    }

    fn html_module(classes: &[&str]) -> ModuleFacts {
        let mut facts = ModuleFacts::new();
        for class in classes {
            facts.add_class(*class);
        }
        facts
    }

    fn pyxl_facts() -> (FileFacts, ModuleIndex) {
        let facts = FileFacts::with_imports(
            FileId::new(0),
            vec![FromImport::new(
                "webpage.pyxl",
                vec![ImportElement::new("html")],
            )],
        );
        let modules = ModuleIndex::new();
        modules.insert("webpage.pyxl.html", html_module(&["x_div", "x_span"]));
        (facts, modules)
    }

    #[test]
    fn test_name_transform() {
        assert_eq!(tag_class_name("div"), "x_div");
        assert_eq!(tag_class_name("widget"), "x_widget");
        // the prefix is applied unconditionally
        assert_eq!(tag_class_name("x_already"), "x_x_already");
    }

    #[test]
    fn test_referenced_name_uses_local_part() {
        let (facts, modules) = pyxl_facts();

        let t = tag("<ui.widgets.card");
        let reference = TagReference::new(&t, &facts, &modules);
        assert_eq!(reference.referenced_symbol_name(), "x_card");

        let t = tag("<div");
        let reference = TagReference::new(&t, &facts, &modules);
        assert_eq!(reference.referenced_symbol_name(), "x_div");
    }

    #[test]
    fn test_implicit_qualifier_for_html_class() {
        let (facts, modules) = pyxl_facts();
        let t = tag("<div");

        let resolution = resolve(&t, &facts, &modules);
        assert_eq!(resolution.symbol_name, "x_div");
        assert_eq!(resolution.explicit_qualifier, None);

        let handle = resolution.implicit_qualifier_source.unwrap();
        let (import, element) = facts.import_element(handle).unwrap();
        assert_eq!(import.source(), "webpage.pyxl");
        assert_eq!(element.name(), "html");
    }

    #[test]
    fn test_no_import_means_no_implicit_qualifier() {
        let facts = FileFacts::new(FileId::new(0));
        let modules = ModuleIndex::new();
        let t = tag("<div");

        let resolution = resolve(&t, &facts, &modules);
        assert_eq!(resolution.symbol_name, "x_div");
        assert_eq!(resolution.implicit_qualifier_source, None);
    }

    #[test]
    fn test_unknown_tag_gets_no_implicit_qualifier() {
        let (facts, modules) = pyxl_facts();
        let t = tag("<carousel");

        let resolution = resolve(&t, &facts, &modules);
        assert_eq!(resolution.symbol_name, "x_carousel");
        assert_eq!(resolution.implicit_qualifier_source, None);
    }

    #[test]
    fn test_explicit_qualifier_wins() {
        let (facts, modules) = pyxl_facts();
        let t = tag("<ui.div");

        let resolution = resolve(&t, &facts, &modules);
        assert_eq!(resolution.explicit_qualifier.as_deref(), Some("ui"));
        // even though x_div is in the import-derived set
        assert_eq!(resolution.implicit_qualifier_source, None);

        let reference = TagReference::new(&t, &facts, &modules);
        assert_eq!(
            reference.qualifier(),
            Some(Qualifier::Explicit(SmolStr::new("ui")))
        );
    }

    #[test]
    fn test_unresolvable_module_contributes_nothing() {
        let facts = FileFacts::with_imports(
            FileId::new(0),
            vec![FromImport::new(
                "webpage.pyxl",
                vec![ImportElement::new("html")],
            )],
        );
        // the module index has never seen webpage.pyxl.html
        let modules = ModuleIndex::new();
        let t = tag("<div");

        assert_eq!(resolve(&t, &facts, &modules).implicit_qualifier_source, None);
    }

    #[test]
    fn test_aliased_html_element_still_qualifies() {
        let facts = FileFacts::with_imports(
            FileId::new(0),
            vec![FromImport::new(
                "webpage.pyxl",
                vec![ImportElement::aliased("html", "h")],
            )],
        );
        let modules = ModuleIndex::new();
        modules.insert("webpage.pyxl.html", html_module(&["x_div"]));
        let t = tag("<div");

        assert!(resolve(&t, &facts, &modules).implicit_qualifier_source.is_some());
    }

    #[test]
    fn test_all_qualifying_imports_contribute() {
        let facts = FileFacts::with_imports(
            FileId::new(0),
            vec![
                FromImport::new("first.pyxl", vec![ImportElement::new("html")]),
                FromImport::new("second.pyxl", vec![ImportElement::new("html")]),
            ],
        );
        let modules = ModuleIndex::new();
        modules.insert("first.pyxl.html", html_module(&["x_div"]));
        modules.insert("second.pyxl.html", html_module(&["x_chart"]));

        let t = tag("<chart");
        let resolution = resolve(&t, &facts, &modules);

        // the set carries names from both statements, and the handle
        // points at the first statement whose module resolves
        let handle = resolution.implicit_qualifier_source.unwrap();
        assert_eq!(handle.import, 0);
    }

    #[test]
    fn test_transient_prefixed_imports_are_swallowed() {
        let mut module = html_module(&["x_div"]);
        module.add_import(FromImport::new(
            "helpers",
            vec![
                ImportElement::new("x_card"),
                ImportElement::new("helper_fn"),
                ImportElement::aliased("card2", "x_card2"),
            ],
        ));
        let facts = FileFacts::with_imports(
            FileId::new(0),
            vec![FromImport::new(
                "webpage.pyxl",
                vec![ImportElement::new("html")],
            )],
        );
        let modules = ModuleIndex::new();
        modules.insert("webpage.pyxl.html", module);

        let t = tag("<card");
        let reference = TagReference::new(&t, &facts, &modules);
        let names = reference.special_tag_names();

        assert!(names.contains("x_div"));
        assert!(names.contains("x_card"));
        // visible name is what counts for the prefix heuristic
        assert!(names.contains("x_card2"));
        assert!(!names.contains("helper_fn"));

        assert!(reference.implicit_qualifier_source().is_some());
    }

    #[test]
    fn test_non_pyxl_import_does_not_qualify() {
        let facts = FileFacts::with_imports(
            FileId::new(0),
            vec![FromImport::new(
                "webpage.templates",
                vec![ImportElement::new("html")],
            )],
        );
        let modules = ModuleIndex::new();
        modules.insert("webpage.templates.html", html_module(&["x_div"]));
        let t = tag("<div");

        assert_eq!(resolve(&t, &facts, &modules).implicit_qualifier_source, None);
    }

    #[test]
    fn test_special_names_computed_once() {
        let (facts, modules) = pyxl_facts();
        let t = tag("<div");
        let reference = TagReference::new(&t, &facts, &modules);

        let first = reference.special_tag_names();
        let second = reference.special_tag_names();
        assert!(std::ptr::eq(first, second));

        // the cache holds even for the empty set
        let empty_facts = FileFacts::new(FileId::new(1));
        let empty_reference = TagReference::new(&t, &empty_facts, &modules);
        let first = empty_reference.special_tag_names();
        assert!(first.is_empty());
        let second = empty_reference.special_tag_names();
        assert!(std::ptr::eq(first, second));
    }

    #[test]
    fn test_resolve_is_idempotent() {
        let (facts, modules) = pyxl_facts();
        let t = tag("<span");

        assert_eq!(resolve(&t, &facts, &modules), resolve(&t, &facts, &modules));
    }

    #[test]
    fn test_conditional_reference_resolves_like_regular() {
        let (facts, modules) = pyxl_facts();
        let t = tag("<if");

        let reference = CondTagReference::new(&t, &facts, &modules);
        assert_eq!(reference.referenced_name(), "x_if");
        // x_if is not declared by the html module fixture
        assert_eq!(reference.qualifier(), None);
    }
}
