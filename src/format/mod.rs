/// Date patterns applied to date fields
pub mod date_format;

/// Numeric patterns applied to integer and float fields
pub mod number_format;

mod decimal;
