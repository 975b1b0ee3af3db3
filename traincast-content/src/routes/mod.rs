pub mod admin_routes;
pub mod health;
pub mod staff_routes;
