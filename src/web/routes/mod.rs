pub mod color_routes;
pub mod diary_routes;
