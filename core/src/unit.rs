//! Module unit definitions and their export surface
//!
//! A unit first declares the names it will export, then evaluates its body
//! against an [`Exports`] collector. Exports come in two flavors:
//!
//! - **live** — the binding holds an accessor into the unit's internal slot,
//!   so every read observes the current value (ESM `export let` semantics)
//! - **const** — the binding holds a value captured when the unit body ran
//!   (the copy a CommonJS wrapper hands out at link time)

use std::fmt;
use std::rc::Rc;

use indexmap::{IndexMap, IndexSet};

use crate::error::LoadResult;
use crate::value::{ObjectRef, Value};

/// Name of the designated single export a unit exposes for unqualified import
pub const DEFAULT_EXPORT: &str = "default";

/// An exported binding of a module unit
#[derive(Clone)]
pub enum Binding {
    /// Re-reads the defining unit's internal slot on every access
    Live(Rc<dyn Fn() -> Value>),
    /// Fixed at evaluation time. A `Const` holding an object still observes
    /// field mutation through the shared object identity.
    Const(Value),
}

impl Binding {
    pub fn read(&self) -> Value {
        match self {
            Binding::Live(accessor) => accessor(),
            Binding::Const(value) => value.clone(),
        }
    }

    pub fn is_live(&self) -> bool {
        matches!(self, Binding::Live(_))
    }
}

impl fmt::Debug for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Binding::Live(_) => write!(f, "Live({})", self.read()),
            Binding::Const(value) => write!(f, "Const({})", value),
        }
    }
}

/// Export names a unit announces before its body runs
#[derive(Debug, Default)]
pub struct Declarations {
    names: IndexSet<String>,
}

impl Declarations {
    pub fn declare<N: Into<String>>(&mut self, name: N) -> LoadResult<()> {
        self.names.insert(name.into());
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }
}

/// Collector a unit body exports into while evaluating
#[derive(Default)]
pub struct Exports {
    bindings: IndexMap<String, Binding>,
}

impl Exports {
    /// Export a value captured now
    pub fn export<N: Into<String>>(&mut self, name: N, value: Value) -> LoadResult<()> {
        self.bindings.insert(name.into(), Binding::Const(value));
        Ok(())
    }

    /// Export a live accessor over the unit's internal state
    pub fn export_live<N, F>(&mut self, name: N, accessor: F) -> LoadResult<()>
    where
        N: Into<String>,
        F: Fn() -> Value + 'static,
    {
        self.bindings
            .insert(name.into(), Binding::Live(Rc::new(accessor)));
        Ok(())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.bindings.keys().map(String::as_str)
    }

    pub(crate) fn into_bindings(self) -> IndexMap<String, Binding> {
        self.bindings
    }
}

/// Build a default export object and re-export its fields as named bindings.
///
/// The named bindings are copies taken when the unit body runs; the
/// `default` binding is the object itself, so fields mutated later remain
/// readable through it. This is the CommonJS-wrapped-for-ESM shape.
pub fn export_default<F>(exports: &mut Exports, f: F) -> LoadResult<()>
where
    F: FnOnce(&ObjectRef) -> LoadResult<()>,
{
    let default = ObjectRef::new();
    f(&default)?;

    for name in default.keys() {
        let value = default.get(&name).unwrap_or(Value::Undefined);
        exports.export(name, value)?;
    }

    exports.export(DEFAULT_EXPORT, Value::Object(default))?;

    Ok(())
}

/// A module unit: declared export names plus a body that fills them in
pub trait UnitDef {
    fn declare(declare: &mut Declarations) -> LoadResult<()>;
    fn evaluate(exports: &mut Exports) -> LoadResult<()>;
}

/// Pairs a unit definition with the specifier name it registers under
pub struct UnitInfo<T: UnitDef> {
    pub name: &'static str,
    pub unit: T,
}
