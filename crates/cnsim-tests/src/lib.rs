//! cnsim integration tests.
//!
//! Exercises the volume-manager facade end-to-end: create/delete/extend,
//! attach/detach, the query and filter surface, and the snapshot
//! operations, including the asymmetries of the fault model that clients
//! depend on.

pub mod harness;

#[cfg(test)]
mod query_tests;
#[cfg(test)]
mod volume_tests;
