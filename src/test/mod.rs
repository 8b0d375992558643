//! Testing utilities.

pub mod adt;

pub use rand_gen::RandGen;
