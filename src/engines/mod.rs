pub mod binding;
pub mod mutation;
pub mod search;
