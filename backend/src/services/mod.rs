pub mod blocks;
pub mod documents;
pub mod images;
pub mod mappings;
pub mod slides;
pub mod upload;
