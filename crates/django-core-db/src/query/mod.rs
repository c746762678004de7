//! Query filters evaluated against model instances.

pub mod lookups;

pub use lookups::{Lookup, Q};
