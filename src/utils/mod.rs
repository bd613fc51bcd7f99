pub mod debounce;
pub mod validation;

pub use debounce::Debouncer;
pub use validation::{MAX_FIELD_LENGTH, non_blank, require, validate_optional, validate_text};
