//! Import facts: the per-file view resolution reads.
//!
//! These are plain data types. The host framework fills them from its
//! own index, or [`host_scan`](crate::sem::host_scan) derives them from
//! source text. Resolution never fails on absent data: an empty
//! [`FileFacts`] simply yields no implicit qualifiers.

use smol_str::SmolStr;

use crate::base::FileId;

/// One `from X import a, b as c` statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FromImport {
    /// The dotted source path, e.g. `pkg.pyxl`.
    source: SmolStr,
    /// The imported elements, in written order.
    elements: Vec<ImportElement>,
}

impl FromImport {
    /// Create a new from-import statement.
    pub fn new(source: impl Into<SmolStr>, elements: Vec<ImportElement>) -> Self {
        Self {
            source: source.into(),
            elements,
        }
    }

    /// The dotted source path as written.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// The last component of the source path (`pyxl` for `pkg.pyxl`).
    pub fn last_component(&self) -> &str {
        self.source.rsplit('.').next().unwrap_or(&self.source)
    }

    /// The imported elements.
    pub fn elements(&self) -> &[ImportElement] {
        &self.elements
    }
}

/// One imported element of a from-import: `name` or `name as alias`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportElement {
    name: SmolStr,
    alias: Option<SmolStr>,
}

impl ImportElement {
    /// An element imported under its own name.
    pub fn new(name: impl Into<SmolStr>) -> Self {
        Self {
            name: name.into(),
            alias: None,
        }
    }

    /// An element imported under an alias.
    pub fn aliased(name: impl Into<SmolStr>, alias: impl Into<SmolStr>) -> Self {
        Self {
            name: name.into(),
            alias: Some(alias.into()),
        }
    }

    /// The name as exported by the source module.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The `as` alias, when one was written.
    pub fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    /// The name this element is visible under in the importing file.
    pub fn visible_name(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }
}

/// What resolution needs to know about one module: its top-level class
/// names and its own first-level from-imports.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModuleFacts {
    classes: Vec<SmolStr>,
    imports: Vec<FromImport>,
}

impl ModuleFacts {
    /// Create empty module facts.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a top-level class declared in the module.
    pub fn add_class(&mut self, name: impl Into<SmolStr>) {
        self.classes.push(name.into());
    }

    /// Record a first-level from-import of the module.
    pub fn add_import(&mut self, import: FromImport) {
        self.imports.push(import);
    }

    /// Top-level class names, in declaration order.
    pub fn classes(&self) -> &[SmolStr] {
        &self.classes
    }

    /// First-level from-imports, in written order.
    pub fn imports(&self) -> &[FromImport] {
        &self.imports
    }
}

/// One host file's import declarations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileFacts {
    file: FileId,
    imports: Vec<FromImport>,
}

impl FileFacts {
    /// Create an empty view for a file. A file whose contents could
    /// not be analyzed at all is represented the same way: no imports,
    /// so no implicit qualifiers.
    pub fn new(file: FileId) -> Self {
        Self {
            file,
            imports: Vec::new(),
        }
    }

    /// Create a view with a ready list of imports.
    pub fn with_imports(file: FileId, imports: Vec<FromImport>) -> Self {
        Self { file, imports }
    }

    /// The file this view describes.
    pub fn file(&self) -> FileId {
        self.file
    }

    /// Record a top-level from-import.
    pub fn add_import(&mut self, import: FromImport) {
        self.imports.push(import);
    }

    /// The file's top-level from-imports, in written order.
    pub fn imports(&self) -> &[FromImport] {
        &self.imports
    }

    /// Map a qualifier handle back to the statement and element it
    /// points at. `None` when the handle belongs to different facts.
    pub fn import_element(&self, handle: ImportRef) -> Option<(&FromImport, &ImportElement)> {
        if handle.file != self.file {
            return None;
        }
        let import = self.imports.get(handle.import as usize)?;
        let element = import.elements().get(handle.element as usize)?;
        Some((import, element))
    }
}

/// Opaque handle identifying one import element within one file.
///
/// Resolution returns this as the implicit-qualifier source; the host
/// reference machinery treats the tag as if the element's module had
/// been written as an explicit namespace prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ImportRef {
    /// The file whose facts the handle indexes into.
    pub file: FileId,
    /// Index of the from-import statement.
    pub import: u32,
    /// Index of the element within the statement.
    pub element: u32,
}
