//! PL/CSQL type system
//!
//! The closed set of value types, the implicit coercions between them,
//! and the per-operator-family schemes that pick the parameter types an
//! overloaded operator is applied at.

mod ty;
mod coercion;
mod scheme;

pub use ty::*;
pub use coercion::*;
pub use scheme::*;
