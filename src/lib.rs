//! Columnar component storage for a dynamic population of models.
//!
//! A [Pool] hands out [Model] ids and [View]s over them. Components of any
//! `'static` type are attached through views and stored one [Column] per type
//! inside a [Table]; each column tracks its occupants in a bitset so
//! [Filter] queries reduce to bitset intersections.

pub mod component;
pub mod error;
pub mod filter;
pub mod model;
pub mod pool;
pub mod registry;
pub mod storage;
pub mod view;

mod utils;


pub use component::{Component, ComponentId, ComponentSet, LoadSet, Name, TypeKey};
pub use error::{EcsError, EcsResult};
pub use filter::{Filter, Term};
pub use model::Model;
pub use pool::{Pool, PoolConfig};
pub use registry::TypeRegistry;
pub use storage::{AnyColumn, Column, Table};
pub use utils::TypeMap;
pub use view::View;
