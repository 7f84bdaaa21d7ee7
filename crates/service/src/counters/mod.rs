//! Named counters: persistence per backend family plus the policy service.

pub mod repository;
pub mod seaorm;
pub mod service;

pub use repository::{CounterRepository, KvCounterRepository};
pub use seaorm::SeaOrmCounterRepository;
pub use service::CounterService;
