//! Module resolution, evaluation, and the process-scoped registry
//!
//! The pipeline mirrors a host module loader: a [`Resolver`] maps import
//! specifiers to registered unit names, a [`Loader`] evaluates a unit body
//! into a [`LoadedUnit`], and the [`Registry`] caches the result so a unit
//! evaluates at most once per registry. Cache entries are immutable once
//! set and live as long as the registry, which in the binary is the process
//! lifetime.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;
use itertools::Itertools;

use crate::error::{InvokeError, InvokeResult, LoadError, LoadResult};
use crate::unit::{Binding, Declarations, Exports, UnitDef, DEFAULT_EXPORT};
use crate::value::Value;

// Specifier suffixes the resolver strips before lookup
const UNIT_EXTENSIONS: &[&str] = &[".mjs", ".cjs", ".js"];

/// Maps import specifiers to registered unit names
#[derive(Debug, Default)]
pub struct Resolver {
    names: HashSet<&'static str>,
}

impl Resolver {
    pub fn add_name(mut self, name: &'static str) -> Self {
        self.names.insert(name);
        self
    }

    /// Resolve a specifier such as `./plugin-esm.mjs` to a unit name
    pub fn resolve(&self, specifier: &str) -> LoadResult<&'static str> {
        let name = normalize_specifier(specifier);
        self.names
            .get(name)
            .copied()
            .ok_or_else(|| LoadError::Resolution {
                specifier: specifier.to_string(),
                message: format!("Cannot find module '{}'", name),
            })
    }
}

fn normalize_specifier(specifier: &str) -> &str {
    let mut name = specifier.strip_prefix("./").unwrap_or(specifier);
    for ext in UNIT_EXTENSIONS {
        if let Some(stripped) = name.strip_suffix(ext) {
            name = stripped;
            break;
        }
    }
    name
}

type UnitFactory = Box<dyn Fn(&str) -> LoadResult<LoadedUnit>>;

/// Evaluates registered unit definitions on demand
#[derive(Default)]
pub struct Loader {
    factories: HashMap<&'static str, UnitFactory>,
}

impl Loader {
    pub fn with_unit<U: UnitDef + 'static>(mut self, name: &'static str) -> Self {
        self.factories
            .insert(name, Box::new(|name: &str| evaluate_unit::<U>(name)));
        self
    }

    pub fn load(&self, name: &str) -> LoadResult<LoadedUnit> {
        let factory = self.factories.get(name).ok_or_else(|| LoadError::Resolution {
            specifier: name.to_string(),
            message: format!("Cannot find module '{}'", name),
        })?;
        factory(name)
    }
}

/// Run a unit body: declare, evaluate, then check the export surface
fn evaluate_unit<U: UnitDef>(name: &str) -> LoadResult<LoadedUnit> {
    let mut declarations = Declarations::default();
    U::declare(&mut declarations)?;

    let mut exports = Exports::default();
    U::evaluate(&mut exports)?;

    if let Some(undeclared) = exports.names().find(|n| !declarations.contains(n)) {
        return Err(LoadError::Evaluation {
            name: name.to_string(),
            message: format!("export '{}' was never declared", undeclared),
        });
    }

    Ok(LoadedUnit::new(name, exports))
}

/// The all-bindings view of a loaded unit
#[derive(Clone)]
pub struct Namespace {
    unit: Rc<str>,
    bindings: Rc<IndexMap<String, Binding>>,
}

impl Namespace {
    pub fn unit(&self) -> &str {
        &self.unit
    }

    pub fn get(&self, name: &str) -> Option<&Binding> {
        self.bindings.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.bindings.keys().map(String::as_str)
    }

    /// Read an export through its binding
    pub fn read(&self, name: &str) -> InvokeResult<Value> {
        self.get(name)
            .map(Binding::read)
            .ok_or_else(|| InvokeError::MissingExport {
                unit: self.unit.to_string(),
                name: name.to_string(),
            })
    }

    /// Call a function-valued export
    pub fn invoke(&self, name: &str) -> InvokeResult<Value> {
        let value = self.read(name)?;
        let function = value.as_function().ok_or_else(|| InvokeError::NotCallable {
            unit: self.unit.to_string(),
            name: name.to_string(),
        })?;
        tracing::debug!(module = %self.unit, export = name, "invoking export");
        function.call().map_err(|message| InvokeError::Threw {
            unit: self.unit.to_string(),
            name: name.to_string(),
            message,
        })
    }

    /// True when both views come from the same load
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.bindings, &other.bindings)
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[Module: {}] {{ {} }}",
            self.unit,
            self.bindings
                .iter()
                .map(|(name, binding)| format!("{}: {}", name, binding.read()))
                .join(", ")
        )
    }
}

/// A unit after evaluation: its namespace view plus the default export
pub struct LoadedUnit {
    name: String,
    namespace: Namespace,
}

impl fmt::Debug for LoadedUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadedUnit")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl LoadedUnit {
    fn new(name: &str, exports: Exports) -> Self {
        Self {
            name: name.to_string(),
            namespace: Namespace {
                unit: Rc::from(name),
                bindings: Rc::new(exports.into_bindings()),
            },
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    /// The designated `default` binding, if the unit exports one. Reading it
    /// does not invalidate the namespace view; both stay observable.
    pub fn default_export(&self) -> InvokeResult<Binding> {
        self.namespace
            .get(DEFAULT_EXPORT)
            .cloned()
            .ok_or_else(|| InvokeError::MissingExport {
                unit: self.name.clone(),
                name: DEFAULT_EXPORT.to_string(),
            })
    }
}

/// Process-scoped registry of loaded units
///
/// Populated lazily, immutable once set. Loading the same specifier twice
/// yields the identical record.
pub struct Registry {
    resolver: Resolver,
    loader: Loader,
    cache: RefCell<HashMap<&'static str, Rc<LoadedUnit>>>,
}

impl Registry {
    pub fn new(resolver: Resolver, loader: Loader) -> Self {
        Self {
            resolver,
            loader,
            cache: RefCell::new(HashMap::new()),
        }
    }

    pub fn load(&self, specifier: &str) -> LoadResult<Rc<LoadedUnit>> {
        let name = self.resolver.resolve(specifier)?;

        if let Some(unit) = self.cache.borrow().get(name) {
            tracing::debug!(module = name, "registry cache hit");
            return Ok(unit.clone());
        }

        tracing::debug!(module = name, "evaluating module unit");
        let unit = Rc::new(self.loader.load(name)?);
        self.cache.borrow_mut().insert(name, unit.clone());
        Ok(unit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LoadResult;
    use crate::unit::{Declarations, Exports, UnitDef};
    use crate::value::Value;

    struct CounterUnit;

    impl UnitDef for CounterUnit {
        fn declare(declare: &mut Declarations) -> LoadResult<()> {
            declare.declare("count")?;
            Ok(())
        }

        fn evaluate(exports: &mut Exports) -> LoadResult<()> {
            exports.export("count", Value::Int(0))
        }
    }

    struct UndeclaredExportUnit;

    impl UnitDef for UndeclaredExportUnit {
        fn declare(_declare: &mut Declarations) -> LoadResult<()> {
            Ok(())
        }

        fn evaluate(exports: &mut Exports) -> LoadResult<()> {
            exports.export("sneaky", Value::Int(1))
        }
    }

    fn registry() -> Registry {
        Registry::new(
            Resolver::default().add_name("counter").add_name("broken"),
            Loader::default()
                .with_unit::<CounterUnit>("counter")
                .with_unit::<UndeclaredExportUnit>("broken"),
        )
    }

    #[test]
    fn test_normalize_specifier() {
        assert_eq!(normalize_specifier("./counter.mjs"), "counter");
        assert_eq!(normalize_specifier("./counter.cjs"), "counter");
        assert_eq!(normalize_specifier("counter.js"), "counter");
        assert_eq!(normalize_specifier("counter"), "counter");
    }

    #[test]
    fn test_resolve_unknown_specifier() {
        let registry = registry();
        let err = registry.load("./missing.mjs").unwrap_err();
        assert!(matches!(err, LoadError::Resolution { .. }));
    }

    #[test]
    fn test_load_is_idempotent() {
        let registry = registry();
        let first = registry.load("./counter.mjs").unwrap();
        let second = registry.load("counter").unwrap();
        assert!(Rc::ptr_eq(&first, &second));
        assert!(first.namespace().ptr_eq(second.namespace()));
    }

    #[test]
    fn test_undeclared_export_is_an_evaluation_error() {
        let registry = registry();
        let err = registry.load("broken").unwrap_err();
        match err {
            LoadError::Evaluation { name, message } => {
                assert_eq!(name, "broken");
                assert!(message.contains("sneaky"));
            }
            other => panic!("expected evaluation error, got {other}"),
        }
    }

    #[test]
    fn test_missing_export_read() {
        let registry = registry();
        let unit = registry.load("counter").unwrap();
        assert_eq!(unit.namespace().read("count").unwrap(), Value::Int(0));
        let err = unit.namespace().read("nope").unwrap_err();
        assert!(matches!(err, InvokeError::MissingExport { .. }));
    }

    #[test]
    fn test_invoke_non_function_export() {
        let registry = registry();
        let unit = registry.load("counter").unwrap();
        let err = unit.namespace().invoke("count").unwrap_err();
        assert!(matches!(err, InvokeError::NotCallable { .. }));
    }

    #[test]
    fn test_default_export_missing() {
        let registry = registry();
        let unit = registry.load("counter").unwrap();
        let err = unit.default_export().unwrap_err();
        assert!(matches!(err, InvokeError::MissingExport { .. }));
    }
}
