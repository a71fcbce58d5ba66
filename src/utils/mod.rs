pub mod text;

pub use text::{bounded_levenshtein, levenshtein, similarity};
