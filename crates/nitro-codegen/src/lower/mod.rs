//! Lowering passes: IR with markup and SQL in, IR with emission ops out.
//!
//! ```text
//! Module -> sql (selects -> query calls) -> classify (markup -> components,
//!           loops -> decompose) -> Lowered
//! ```
//!
//! One [`NameSource`] is shared by every pass so generated names never
//! collide.

mod component;
mod decompose;
mod error;
mod names;
mod sql;

pub use component::{classify, Classifier, SymbolTable};
pub use error::{LowerError, Pass};
pub use names::NameSource;
pub use sql::lower_sql;

use tracing::debug;

use crate::ir::{Blob, ComponentDef, Module};

/// A fully lowered program, ready for code generation.
#[derive(Debug, Clone, PartialEq)]
pub struct Lowered {
    /// User definitions plus generated records and queries, with every
    /// markup-producing function turned into a component.
    pub module: Module,
    /// Static markup text, in allocation order.
    pub blobs: Vec<Blob>,
    /// Components generated while flattening, in creation order.
    pub components: Vec<ComponentDef>,
}

/// Run SQL lowering and markup flattening over `module`.
///
/// # Errors
///
/// Returns the first internal-consistency or unsupported-construct error.
pub fn lower(module: &Module) -> Result<Lowered, LowerError> {
    let mut names = NameSource::new();
    let module = lower_sql(module, &mut names)?;
    let lowered = classify(&module, &mut names)?;
    debug!(
        definitions = lowered.module.definitions.len(),
        blobs = lowered.blobs.len(),
        components = lowered.components.len(),
        "lowered module"
    );
    Ok(lowered)
}
