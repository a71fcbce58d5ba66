pub mod param_util;
pub mod params;

pub use param_util::{bind_param, copy_gene, copy_with_type_adapter, score_of_match};
pub use params::{Action, DbAction, Param, RestPath};
