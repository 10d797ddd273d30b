//! Boxed value system and diagnostics for the Numerobis runtime.
//!
//! Builds on `numerobis_units` (C1-C4) with the boxed numeric value (C5),
//! the value-dispatch shim (C6), the process-wide registries, and the
//! diagnostic-throw interface. The compiler front end, the ahead-of-time
//! `unit_id_eval`/`base_unit`/`is_logarithmic` tables, and the CLI are out
//! of scope — only the `UnitTables` seam they plug into lives here.

pub mod error;
pub mod number;
pub mod registry;
pub mod value;

pub use error::{Diagnostic, Loc, RuntimeError};
pub use number::Number;
pub use registry::{ExternFn, ExternRegistry, ModuleRegistry, ModuleSource, EXTERNS, MODULES};
pub use value::{normalize_index, normalize_slice, slice_list, slice_str, ClosureValue, ResolvedSlice, Value};
