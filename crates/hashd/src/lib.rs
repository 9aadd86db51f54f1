#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod config;
mod digest;
mod error;
mod id;
mod runner;
mod service;
mod shutdown;
mod store;

pub use crate::config::*;
pub use crate::digest::*;
pub use crate::error::*;
pub use crate::id::*;
pub use crate::runner::*;
pub use crate::service::*;
pub use crate::shutdown::*;
pub use crate::store::*;
