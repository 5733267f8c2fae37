pub mod ai_routes;
pub mod extract;
