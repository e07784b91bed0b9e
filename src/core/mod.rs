/// Record shape and values, the `Record` trait and the `impl_record!` macro
pub mod record;

/// Field enumeration for single records and record collections
pub mod fields;

/// Field enumeration through serde for any serializable value
pub mod serialized;
