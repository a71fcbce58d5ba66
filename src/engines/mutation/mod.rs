pub mod apc;
pub mod archive;
pub mod context;
pub mod mutator;
pub mod randomness;
pub mod taint;

pub use apc::AdaptiveParameterControl;
pub use archive::{ArchiveGeneMutator, StringArchiveInfo, StringArchiveRecord};
pub use context::{AdaptiveSelection, MutationContext, PendingBinding};
pub use mutator::GeneMutator;
pub use randomness::Randomness;
pub use taint::{is_taint_input, TaintNames};
