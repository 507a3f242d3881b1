//! Crate-level test suites and shared doubles.

pub(crate) mod support;
