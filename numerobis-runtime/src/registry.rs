//! Process-wide, read-after-init state (spec §3, §5): the extern-function
//! registry and the module registry for diagnostic source printing. Both
//! are populated once, then never mutated — modeled with `OnceCell`-backed
//! maps the way `mozak-sdk` pulls in `once_cell` with the `race` feature
//! for exactly this "write once, read everywhere" shape.

use std::collections::HashMap;

use once_cell::sync::OnceCell;

use crate::value::Value;

pub type ExternFn = fn(&[Value]) -> Value;

/// Registered extern functions, keyed by name. Populated once at process
/// start; `register` panics (category (b), precondition violation) on a
/// duplicate name rather than silently overwriting it.
#[derive(Default)]
pub struct ExternRegistry {
    functions: HashMap<String, ExternFn>,
}

impl ExternRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, name: impl Into<String>, f: ExternFn) {
        let name = name.into();
        let previous = self.functions.insert(name.clone(), f);
        assert!(previous.is_none(), "duplicate extern registration: {name}");
    }

    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<ExternFn> {
        self.functions.get(name).copied()
    }
}

/// A source module registered for diagnostic printing: its name and full
/// text, so a `Diagnostic` can render the offending line.
#[derive(Debug, Clone)]
pub struct ModuleSource {
    pub name: String,
    pub text: String,
}

#[derive(Default)]
pub struct ModuleRegistry {
    modules: HashMap<String, ModuleSource>,
}

impl ModuleRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, module: ModuleSource) {
        let name = module.name.clone();
        let previous = self.modules.insert(name.clone(), module);
        assert!(previous.is_none(), "duplicate module registration: {name}");
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ModuleSource> {
        self.modules.get(name)
    }
}

/// Global, process-wide extern registry, built once at process init and
/// read-only thereafter.
pub static EXTERNS: OnceCell<ExternRegistry> = OnceCell::new();

/// Global, process-wide module registry, built once at process init and
/// read-only thereafter.
pub static MODULES: OnceCell<ModuleRegistry> = OnceCell::new();
