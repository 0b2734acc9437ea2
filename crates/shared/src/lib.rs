pub mod error;
pub mod geo;
pub mod icon;
pub mod interaction;
pub mod models;
pub mod scene;
pub mod viewport;
