//! Route modules for the API server
//!
//! - cars: legacy GET routes, JSON API and the index page
//! - settings: configuration display
//!
//! Each module follows a consistent structure:
//! - mod.rs: Module declaration and exports
//! - api.rs: JSON API endpoints
//! - page.rs: HTMX page rendering, where the module has a page

pub mod cars;
pub mod settings;
