pub mod catalog;
pub mod router;

pub use catalog::ModelCatalog;
pub use router::ProviderRouter;
