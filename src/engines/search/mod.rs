pub mod archive;
pub mod individual;

pub use archive::{ArchivedIndividual, CoverageArchive, COVERED};
pub use individual::{ActionRef, GeneAddress, Individual};
