pub mod scrape;
pub mod search;
pub mod generate;
pub mod image;
