//! Testing utilities for abstract data types.
