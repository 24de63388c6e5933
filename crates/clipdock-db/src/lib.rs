pub mod memory;
pub mod postgres;
pub mod videos;

pub use memory::MemoryVideoStore;
pub use postgres::PgVideoStore;
pub use videos::VideoStore;
