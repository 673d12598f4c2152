//! Application services for the project and collaborator registry.

mod registry;

pub use registry::{
    ProjectListing, ProjectRegistryService, RegistryServiceError, RegistryServiceResult,
};
