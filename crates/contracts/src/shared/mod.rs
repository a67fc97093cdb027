pub mod api;
pub mod period;
pub mod schema;
