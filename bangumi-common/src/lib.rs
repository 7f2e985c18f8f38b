//! # Bangumi Common Library
//!
//! Shared code for the Bangumi graph tools including:
//! - Error type
//! - Bootstrap configuration loading and folder resolution
//! - Closed code domains (category, person type, career, roles) and labels
//! - Taxonomy tables from `bangumi/common`
//! - Typed dump records and the line decoder

pub mod codes;
pub mod config;
pub mod error;
pub mod records;
pub mod taxonomy;

pub use codes::Category;
pub use error::{Error, LookupError, Result};
