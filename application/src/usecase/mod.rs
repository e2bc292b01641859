mod archive;
mod catalog;
mod triage;

pub use archive::{ArchiveUseCase, ArchiveUseCaseImpl};
pub use catalog::{CatalogUseCase, CatalogUseCaseImpl};
pub use triage::{TriageUseCase, TriageUseCaseImpl};
