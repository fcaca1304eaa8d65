pub mod numeric;

pub use numeric::{extract_quantities, find_phrase_with_value, format_value};
