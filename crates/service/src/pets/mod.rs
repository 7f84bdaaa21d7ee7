//! Pet persistence (one repository per backend family) and the policy
//! service handlers call.

pub mod repository;
pub mod seaorm;
pub mod service;

pub use repository::{KvPetRepository, PetRepository};
pub use seaorm::SeaOrmPetRepository;
pub use service::PetService;
