//! # modscope-core — module units and binding observation
//!
//! A small module-unit runtime: units declare and evaluate their exports,
//! a process-scoped registry loads each unit at most once, and the binding
//! observer reports how the two export-semantics flavors behave when a
//! unit mutates its own state.
//!
//! ## The two flavors
//!
//! - **live binding**: the exported name resolves to the current value of
//!   its source slot at every read
//! - **snapshot**: the named binding is a copy taken when the unit body ran;
//!   only the shared default-export object still shows later mutation
//!
//! ## Usage
//!
//! ```rust
//! use modscope_core::{Observer, UnitBuilder};
//!
//! let registry = UnitBuilder::default().build();
//! let records = Observer::default().observe(&registry)?;
//! for record in &records {
//!     println!("{} {}", record.label, record.value);
//! }
//! # Ok::<(), modscope_core::ObserveError>(())
//! ```

pub mod builder;
pub mod error;
pub mod loader;
pub mod observer;
pub mod plugins;
pub mod unit;
pub mod value;

pub use builder::UnitBuilder;
pub use error::{InvokeError, LoadError, ObserveError};
pub use loader::{LoadedUnit, Namespace, Registry};
pub use observer::{Observer, Record};
pub use unit::{Binding, UnitDef, UnitInfo};
pub use value::{FunctionRef, ObjectRef, Value};
