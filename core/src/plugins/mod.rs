//! Built-in demo units, one per export-semantics flavor

mod cjs;
mod esm;

pub use cjs::CjsPluginUnit;
pub use esm::EsmPluginUnit;
