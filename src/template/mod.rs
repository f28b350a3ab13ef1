//! Template inheritance for markup and structured-text sources
//!
//! Readers extract each top-level declaration into a [`DraftDefinition`].
//! [`resolve_templates`] then follows `parent` links within the same source
//! and merges every template's constructor arguments and properties beneath
//! the child's own.
//!
//! ```text
//! base   (abstract)  args [A, B]
//! child  parent=base args [_, C, D]   =>   [A, C, D]
//! ```

mod draft;
mod resolver;

pub use draft::{DraftDefinition, ExtractedArgs};
pub use resolver::{resolve_templates, TemplateSet};
