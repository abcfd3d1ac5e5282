//! Wires unit definitions into a resolver/loader pair

use crate::loader::{Loader, Registry, Resolver};
use crate::plugins::{CjsPluginUnit, EsmPluginUnit};
use crate::unit::{UnitDef, UnitInfo};

pub struct UnitBuilder {
    resolver: Resolver,
    loader: Loader,
}

impl Default for UnitBuilder {
    fn default() -> Self {
        Self::new()
            .with_unit(EsmPluginUnit)
            .with_unit(CjsPluginUnit)
    }
}

impl UnitBuilder {
    pub fn new() -> Self {
        Self {
            resolver: Resolver::default(),
            loader: Loader::default(),
        }
    }

    pub fn with_unit<U, I>(mut self, unit: I) -> Self
    where
        U: UnitDef + 'static,
        I: Into<UnitInfo<U>>,
    {
        let info: UnitInfo<U> = unit.into();
        self.resolver = self.resolver.add_name(info.name);
        self.loader = self.loader.with_unit::<U>(info.name);
        self
    }

    pub fn build(self) -> Registry {
        Registry::new(self.resolver, self.loader)
    }
}
