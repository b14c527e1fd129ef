pub mod listing;
pub mod text;
