pub mod db;
pub mod extractor;
pub mod memory;
pub mod news;

pub use db::PgStore;
pub use extractor::LocalExtractor;
pub use memory::MemoryStore;
pub use news::StaticCatalogue;
