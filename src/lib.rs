//! tablefetch - read-only ad-hoc table queries over a schema catalog
//!
//! Callers name an entity and pass loosely-typed fields, filters, ordering
//! and pagination; the service answers with rows from exactly one
//! parameterized single-table `SELECT`.

pub mod catalog;
pub mod cli;
pub mod http_server;
pub mod observability;
pub mod query;
