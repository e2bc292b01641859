pub mod cache;
pub mod dto;
pub mod error;
pub mod usecase;

pub use cache::IdCache;
pub use dto::*;
pub use error::ApplicationError;
pub use usecase::{
    ArchiveUseCase, ArchiveUseCaseImpl, CatalogUseCase, CatalogUseCaseImpl, TriageUseCase,
    TriageUseCaseImpl,
};
