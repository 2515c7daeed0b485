//! Core types and trait definitions for the Docket records portal.
//!
//! Holds the case lifecycle, the access gate and the record types. Nothing
//! here speaks HTTP or SQL; storage backends plug in through
//! [`store::RecordStore`].

// Store impls use `async fn`; the trait declares the `Send` futures itself.
#![allow(async_fn_in_trait)]

pub mod case;
pub mod citizen;
pub mod error;
pub mod gate;
pub mod identity;
pub mod lifecycle;
pub mod records;
pub mod store;

pub use error::{Error, Result};

#[cfg(test)]
mod testing;
