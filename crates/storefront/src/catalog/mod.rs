//! Product listing engine.
//!
//! [`FiltersState`] is an owned value driven by [`FilterAction`]s through
//! [`FiltersState::reduce`]. The derived listing (filtered, sorted, paginated
//! products) is recomputed by the [`pipeline`] whenever filters are applied or
//! the catalog changes. [`facets`] computes the slider bounds and the category
//! and company choices.
//!
//! [`watcher::SharedFilters`] holds the server-wide copy of the state and keeps
//! it in step with the store, either eagerly from [`CatalogEvent`]s or lazily
//! when a request sees a newer catalog version.

pub mod facets;
pub mod pipeline;
pub mod state;
pub mod watcher;

pub use state::{
    CategoryCheck, CompanyFilter, FilterAction, FilterUpdate, Filters, FiltersState, Thumb,
};
pub use watcher::{CatalogEvent, SharedFilters};

/// Products shown per listing page unless configured otherwise.
pub const DEFAULT_PAGE_SIZE: usize = 9;
