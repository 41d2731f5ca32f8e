//! fondo-core
//!
//! Core primitives shared across the fondo ecosystem.
//!
//! - `table`: the normalized [`Table`] output type and the single builder
//!   dispatch over the shapes upstream payloads arrive in.
//! - `reshape`: flat token streams partitioned into fixed-width grids.
//! - `extract`: field-extraction helpers for loosely-structured JSON trees.
//! - `error`: the unified [`FondoError`] taxonomy.
//!
//! Nothing in this crate performs I/O; acquisition layers (such as
//! `fondo-yfinance`) feed raw payloads in and take [`Table`]s out.
#![warn(missing_docs)]

/// Unified error taxonomy for the fondo workspace.
pub mod error;
/// Field-extraction helpers for JSON value trees.
pub mod extract;
/// Token-stream-to-grid partitioning.
pub mod reshape;
/// The normalized table type and its builder.
pub mod table;

pub use error::FondoError;
pub use table::{Cell, Column, ColumnFormat, GridHeader, Table, TableSource};
