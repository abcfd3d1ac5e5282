//! Snapshot demo unit
//!
//! Models a CommonJS module wrapped for namespace import:
//!
//! ```js
//! module.exports = { foo: 1, update() { module.exports.foo = 2; } };
//! ```
//!
//! The named `foo` binding is a copy taken when the unit body ran, so it
//! never changes. The `default` export is the exports object itself, and
//! `foo` read through that object does observe `update()` — not because of
//! live-binding machinery, but because the object reference is shared.

use crate::error::LoadResult;
use crate::unit::{export_default, Declarations, Exports, UnitDef, UnitInfo, DEFAULT_EXPORT};
use crate::value::{FunctionRef, Value};

pub struct CjsPluginUnit;

impl UnitDef for CjsPluginUnit {
    fn declare(declare: &mut Declarations) -> LoadResult<()> {
        declare.declare("foo")?;
        declare.declare("update")?;
        declare.declare(DEFAULT_EXPORT)?;
        Ok(())
    }

    fn evaluate(exports: &mut Exports) -> LoadResult<()> {
        export_default(exports, |default| {
            default.set("foo", Value::Int(1));

            let target = default.clone();
            default.set(
                "update",
                Value::Function(FunctionRef::new("update", move || {
                    target.set("foo", Value::Int(2));
                    Ok(Value::Undefined)
                })),
            );
            Ok(())
        })
    }
}

impl From<CjsPluginUnit> for UnitInfo<CjsPluginUnit> {
    fn from(unit: CjsPluginUnit) -> Self {
        UnitInfo {
            name: "plugin-cjs",
            unit,
        }
    }
}
