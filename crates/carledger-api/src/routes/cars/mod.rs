//! Car routes
//!
//! Structure:
//! - legacy.rs: the four GET routes with path-encoded payloads and sentinel bodies
//! - api.rs: JSON API endpoints
//! - page.rs: HTMX page rendering

pub mod api;
pub mod legacy;
pub mod page;

pub use api::{api_car_change_holder, api_car_create, api_car_detail, api_car_history, api_cars};
pub use legacy::{add_car, change_holder, get_all_cars, get_car};
pub use page::{htmx_cars_list, page_index};
