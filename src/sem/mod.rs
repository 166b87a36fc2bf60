//! Tag-to-symbol resolution.
//!
//! Maps a parsed tag name to the `x_`-prefixed class it references.
//! Resolution reads a per-file view of import declarations
//! ([`FileFacts`]) and a registry of known modules ([`ModuleIndex`]);
//! both are plain data the host framework constructs, or that
//! [`host_scan`] derives from Python-like source text.

pub mod facts;
pub mod host_scan;
pub mod modules;
pub mod resolve;

pub use facts::{FileFacts, FromImport, ImportElement, ImportRef, ModuleFacts};
pub use host_scan::{scan_file_facts, scan_module_facts};
pub use modules::ModuleIndex;
pub use resolve::{
    CondTagReference, HTML_MODULE, PYXL_PACKAGE, Qualifier, Reference, Resolution,
    TAG_CLASS_PREFIX, TagReference, resolve, tag_class_name,
};
