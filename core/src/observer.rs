//! The binding observer
//!
//! Loads two module units, reads `foo`, invokes `update()`, and re-reads
//! `foo` through the same access path, reporting every observation as a
//! labeled record. The live unit is read through its namespace binding; the
//! snapshot unit is read through its default-export object, matching how a
//! default import is actually used.
//!
//! The record order is fixed and the steps run strictly in sequence: the
//! post-update read depends on the mutation made by the step before it.
//! The first error aborts the rest of the sequence.

use crate::error::{InvokeError, InvokeResult, ObserveResult};
use crate::loader::{LoadedUnit, Registry};
use crate::value::{ObjectRef, Value};

/// One printed observation: a label and the rendered value
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub label: String,
    pub value: String,
}

impl Record {
    fn new(label: String, value: impl ToString) -> Self {
        Self {
            label,
            value: value.to_string(),
        }
    }
}

/// Observes one live-binding unit and one snapshot unit
pub struct Observer {
    live_specifier: String,
    snapshot_specifier: String,
}

impl Default for Observer {
    fn default() -> Self {
        Self::new("./plugin-esm.mjs", "./plugin-cjs.js")
    }
}

impl Observer {
    pub fn new(live_specifier: impl Into<String>, snapshot_specifier: impl Into<String>) -> Self {
        Self {
            live_specifier: live_specifier.into(),
            snapshot_specifier: snapshot_specifier.into(),
        }
    }

    /// Run the full observation sequence against `registry`
    pub fn observe(&self, registry: &Registry) -> ObserveResult<Vec<Record>> {
        let mut records = Vec::with_capacity(8);

        let live = registry.load(&self.live_specifier)?;
        records.push(Record::new(
            format!("{} namespace", live.name()),
            live.namespace(),
        ));
        records.push(Record::new(
            format!("{} default", live.name()),
            live.default_export()?.read(),
        ));

        let snapshot = registry.load(&self.snapshot_specifier)?;
        records.push(Record::new(
            format!("{} namespace", snapshot.name()),
            snapshot.namespace(),
        ));
        records.push(Record::new(
            format!("{} default", snapshot.name()),
            snapshot.default_export()?.read(),
        ));

        // live unit: read through the namespace binding
        records.push(Record::new(
            format!("foo before {} update", live.name()),
            live.namespace().read("foo")?,
        ));
        live.namespace().invoke("update")?;
        records.push(Record::new(
            format!("foo after {} update", live.name()),
            live.namespace().read("foo")?,
        ));

        // snapshot unit: read through the default-export object
        let exports = default_object(&snapshot)?;
        records.push(Record::new(
            format!("foo before {} update", snapshot.name()),
            field(snapshot.name(), &exports, "foo")?,
        ));
        invoke_field(snapshot.name(), &exports, "update")?;
        records.push(Record::new(
            format!("foo after {} update", snapshot.name()),
            field(snapshot.name(), &exports, "foo")?,
        ));

        Ok(records)
    }
}

fn default_object(unit: &LoadedUnit) -> InvokeResult<ObjectRef> {
    match unit.default_export()?.read() {
        Value::Object(obj) => Ok(obj),
        _ => Err(InvokeError::MissingExport {
            unit: unit.name().to_string(),
            name: "default object".to_string(),
        }),
    }
}

fn field(unit: &str, exports: &ObjectRef, name: &str) -> InvokeResult<Value> {
    exports.get(name).ok_or_else(|| InvokeError::MissingExport {
        unit: unit.to_string(),
        name: format!("default.{}", name),
    })
}

fn invoke_field(unit: &str, exports: &ObjectRef, name: &str) -> InvokeResult<Value> {
    let value = field(unit, exports, name)?;
    let function = value.as_function().ok_or_else(|| InvokeError::NotCallable {
        unit: unit.to_string(),
        name: format!("default.{}", name),
    })?;
    function.call().map_err(|message| InvokeError::Threw {
        unit: unit.to_string(),
        name: format!("default.{}", name),
        message,
    })
}
