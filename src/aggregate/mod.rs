//! Response aggregation and normalization.
//!
//! # Data Flow
//! ```text
//! upstream JSON (array | {data|users|items|results: [...]} | profile record)
//!     → shape.rs (one decoder per known shape)
//!     → extract.rs (records → CanonicalPerson, de-duplicated by id)
//!     → search.rs (primary listing, or concurrent role listings on 403/404)
//!     → SearchFilter (role + name/email view, never mutates)
//! ```

pub mod extract;
pub mod search;
pub mod shape;

pub use extract::{collect_people, people_from_list, CanonicalPerson, PersonSet};
pub use search::{fetch_clients, fetch_professionals, RoleFilter, SearchFilter};
pub use shape::ListShape;
