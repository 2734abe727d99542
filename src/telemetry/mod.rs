pub mod config;
pub mod ctx;
pub mod emit;
pub mod ops;

use ctx::LogCtx;

pub fn scrape() -> LogCtx<ops::scrape::Scrape> { LogCtx::new(config::logs_are_json()) }
pub fn search() -> LogCtx<ops::search::Search> { LogCtx::new(config::logs_are_json()) }
pub fn generate() -> LogCtx<ops::generate::Generate> { LogCtx::new(config::logs_are_json()) }
pub fn image() -> LogCtx<ops::image::Image> { LogCtx::new(config::logs_are_json()) }
