//! Entry routes - dashboard, create, delete, filter
//!
//! Structure:
//! - api.rs: JSON API endpoints and request parameter parsing
//! - page.rs: Dashboard page and HTMX fragments

pub mod api;
pub mod page;

pub use api::{
    api_entries,
    api_entry_create,
    api_entry_delete,
    api_entry_detail,
    api_summary,
};

pub use page::{
    htmx_dashboard_view,
    htmx_entry_delete,
    htmx_entry_store,
    page_dashboard,
};
