//! Concrete persistence backends.

pub(crate) mod sqlite;
