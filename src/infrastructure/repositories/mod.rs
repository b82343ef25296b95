//! Repository Implementations
//!
//! PostgreSQL data access for the persistence adapter. Every method returns
//! `Result<_, AppError>`; converting failures into soft results is the
//! adapter's job.
//!
//! ## Available Repositories
//!
//! - **PgEnvironmentRepository** - `conexiones` and `time_starts`
//! - **PgParameterRepository** - `parametros`
//! - **PgDrawRunRepository** - `bingos`

pub mod draw_run_repository;
pub mod environment_repository;
pub mod parameter_repository;

pub use draw_run_repository::PgDrawRunRepository;
pub use environment_repository::PgEnvironmentRepository;
pub use parameter_repository::PgParameterRepository;
