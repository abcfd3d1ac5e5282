//! Live-binding demo unit
//!
//! Models an ES module of the shape:
//!
//! ```js
//! export let foo = 1;
//! export function update() { foo = 2; }
//! export default { name: "plugin-esm" };
//! ```
//!
//! `foo` is exported as an accessor over the unit's internal slot, so reads
//! after `update()` observe the new value without any re-export step.

use std::cell::Cell;
use std::rc::Rc;

use crate::error::LoadResult;
use crate::unit::{Declarations, Exports, UnitDef, UnitInfo, DEFAULT_EXPORT};
use crate::value::{FunctionRef, ObjectRef, Value};

pub struct EsmPluginUnit;

impl UnitDef for EsmPluginUnit {
    fn declare(declare: &mut Declarations) -> LoadResult<()> {
        declare.declare("foo")?;
        declare.declare("update")?;
        declare.declare(DEFAULT_EXPORT)?;
        Ok(())
    }

    fn evaluate(exports: &mut Exports) -> LoadResult<()> {
        let slot = Rc::new(Cell::new(1i64));

        let read = slot.clone();
        exports.export_live("foo", move || Value::Int(read.get()))?;

        let write = slot.clone();
        exports.export(
            "update",
            Value::Function(FunctionRef::new("update", move || {
                write.set(2);
                Ok(Value::Undefined)
            })),
        )?;

        let default = ObjectRef::new();
        default.set("name", Value::Str("plugin-esm".into()));
        exports.export(DEFAULT_EXPORT, Value::Object(default))?;

        Ok(())
    }
}

impl From<EsmPluginUnit> for UnitInfo<EsmPluginUnit> {
    fn from(unit: EsmPluginUnit) -> Self {
        UnitInfo {
            name: "plugin-esm",
            unit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::{Loader, Registry, Resolver};

    fn registry() -> Registry {
        Registry::new(
            Resolver::default().add_name("plugin-esm"),
            Loader::default().with_unit::<EsmPluginUnit>("plugin-esm"),
        )
    }

    #[test]
    fn test_foo_is_a_live_binding() {
        let registry = registry();
        let unit = registry.load("./plugin-esm.mjs").unwrap();
        let ns = unit.namespace();

        assert!(ns.get("foo").unwrap().is_live());
        assert_eq!(ns.read("foo").unwrap(), Value::Int(1));
        ns.invoke("update").unwrap();
        assert_eq!(ns.read("foo").unwrap(), Value::Int(2));
    }

    #[test]
    fn test_namespace_surface_lists_exports_in_declaration_order() {
        let registry = registry();
        let unit = registry.load("plugin-esm").unwrap();
        let names: Vec<&str> = unit.namespace().names().collect();
        assert_eq!(names, ["foo", "update", "default"]);
    }

    #[test]
    fn test_namespace_and_default_coexist() {
        let registry = registry();
        let unit = registry.load("plugin-esm").unwrap();

        let default = unit.default_export().unwrap().read();
        let obj = default.as_object().expect("object default export");
        assert_eq!(obj.get("name"), Some(Value::Str("plugin-esm".into())));

        // reading the default export does not disturb the namespace view
        assert_eq!(unit.namespace().read("foo").unwrap(), Value::Int(1));
    }
}
