// Service exports
pub mod engine;
pub mod memory;
pub mod postgres;
pub mod repository;

pub use engine::{MatchingEngine, DEFAULT_LIMIT};
pub use memory::InMemoryRepository;
pub use postgres::{PgUrgency, PostgresRepository};
pub use repository::{MatchRepository, RepositoryError};
