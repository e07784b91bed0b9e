use std::fmt;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Offset, TimeZone};

/// Declared type of a record field.
///
/// The kind is a property of the record *type*, not of a particular value:
/// an `Option<NaiveDate>` field is a `Date` field even when it holds `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Integer,
    Float,
    Boolean,
    Date,
    /// Shape discovered from a value that carried no type (a serialized `null`).
    Unknown,
}

impl FieldKind {
    pub fn is_numeric(&self) -> bool {
        matches!(self, FieldKind::Integer | FieldKind::Float)
    }
}

/// Name and declared kind of one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    name: String,
    kind: FieldKind,
}

impl FieldDescriptor {
    pub fn new(name: &str, kind: FieldKind) -> Self {
        FieldDescriptor {
            name: name.to_string(),
            kind,
        }
    }

    /// Creates a descriptor from a Rust identifier. A raw identifier prefix
    /// (`r#`) is dropped so that `r#type` is exposed as `type`.
    pub fn from_ident(ident: &str, kind: FieldKind) -> Self {
        Self::new(ident.strip_prefix("r#").unwrap_or(ident), kind)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> FieldKind {
        self.kind
    }
}

/// Value of one field of one record.
///
/// The `Display` implementation is the default text of the value; `Null`
/// displays as an empty string.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Null,
    Text(String),
    Integer(i64),
    Unsigned(u64),
    Float(f64),
    Boolean(bool),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    Timestamp(DateTime<FixedOffset>),
}

impl FieldValue {
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    pub fn is_temporal(&self) -> bool {
        matches!(
            self,
            FieldValue::Date(_) | FieldValue::DateTime(_) | FieldValue::Timestamp(_)
        )
    }

    /// Returns `false` for a temporal value equal to its type's default (the
    /// Unix epoch) or minimum, `true` for any other temporal value.
    ///
    /// Non temporal values are never valid dates.
    pub fn is_valid_date(&self) -> bool {
        match self {
            FieldValue::Date(date) => *date != NaiveDate::default() && *date != NaiveDate::MIN,
            FieldValue::DateTime(date_time) => is_valid_naive(date_time),
            FieldValue::Timestamp(timestamp) => is_valid_naive(&timestamp.naive_utc()),
            _ => false,
        }
    }
}

fn is_valid_naive(date_time: &NaiveDateTime) -> bool {
    *date_time != NaiveDateTime::default() && *date_time != NaiveDateTime::MIN
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Null => Ok(()),
            FieldValue::Text(text) => f.write_str(text),
            FieldValue::Integer(value) => write!(f, "{}", value),
            FieldValue::Unsigned(value) => write!(f, "{}", value),
            FieldValue::Float(value) => write!(f, "{}", value),
            FieldValue::Boolean(value) => write!(f, "{}", value),
            FieldValue::Date(value) => write!(f, "{}", value),
            FieldValue::DateTime(value) => write!(f, "{}", value),
            FieldValue::Timestamp(value) => write!(f, "{}", value),
        }
    }
}

/// A type that can be stored in a record field.
///
/// `KIND` is the declared kind used for the header shape, `to_field_value`
/// reads the current value.
pub trait Field {
    const KIND: FieldKind;

    fn to_field_value(&self) -> FieldValue;
}

macro_rules! signed_field {
    ($($ty:ty),*) => {
        $(impl Field for $ty {
            const KIND: FieldKind = FieldKind::Integer;

            fn to_field_value(&self) -> FieldValue {
                FieldValue::Integer(i64::from(*self))
            }
        })*
    };
}

macro_rules! unsigned_field {
    ($($ty:ty),*) => {
        $(impl Field for $ty {
            const KIND: FieldKind = FieldKind::Integer;

            fn to_field_value(&self) -> FieldValue {
                FieldValue::Unsigned(u64::from(*self))
            }
        })*
    };
}

signed_field!(i8, i16, i32, i64);
unsigned_field!(u8, u16, u32, u64);

impl Field for isize {
    const KIND: FieldKind = FieldKind::Integer;

    fn to_field_value(&self) -> FieldValue {
        FieldValue::Integer(*self as i64)
    }
}

impl Field for usize {
    const KIND: FieldKind = FieldKind::Integer;

    fn to_field_value(&self) -> FieldValue {
        FieldValue::Unsigned(*self as u64)
    }
}

impl Field for f32 {
    const KIND: FieldKind = FieldKind::Float;

    fn to_field_value(&self) -> FieldValue {
        FieldValue::Float(f64::from(*self))
    }
}

impl Field for f64 {
    const KIND: FieldKind = FieldKind::Float;

    fn to_field_value(&self) -> FieldValue {
        FieldValue::Float(*self)
    }
}

impl Field for bool {
    const KIND: FieldKind = FieldKind::Boolean;

    fn to_field_value(&self) -> FieldValue {
        FieldValue::Boolean(*self)
    }
}

impl Field for char {
    const KIND: FieldKind = FieldKind::Text;

    fn to_field_value(&self) -> FieldValue {
        FieldValue::Text(self.to_string())
    }
}

impl Field for String {
    const KIND: FieldKind = FieldKind::Text;

    fn to_field_value(&self) -> FieldValue {
        FieldValue::Text(self.clone())
    }
}

impl Field for &str {
    const KIND: FieldKind = FieldKind::Text;

    fn to_field_value(&self) -> FieldValue {
        FieldValue::Text(self.to_string())
    }
}

impl Field for NaiveDate {
    const KIND: FieldKind = FieldKind::Date;

    fn to_field_value(&self) -> FieldValue {
        FieldValue::Date(*self)
    }
}

impl Field for NaiveDateTime {
    const KIND: FieldKind = FieldKind::Date;

    fn to_field_value(&self) -> FieldValue {
        FieldValue::DateTime(*self)
    }
}

impl<Tz: TimeZone> Field for DateTime<Tz> {
    const KIND: FieldKind = FieldKind::Date;

    fn to_field_value(&self) -> FieldValue {
        FieldValue::Timestamp(self.with_timezone(&self.offset().fix()))
    }
}

impl<T: Field> Field for Option<T> {
    const KIND: FieldKind = T::KIND;

    fn to_field_value(&self) -> FieldValue {
        match self {
            Some(value) => value.to_field_value(),
            None => FieldValue::Null,
        }
    }
}

/// A structured value with a fixed, ordered set of named fields.
///
/// `fields` describes the type and is used for every record of a collection,
/// so the header never depends on a particular item. `values` must return one
/// value per descriptor, in the same order.
///
/// Implement it by hand, or let [`impl_record!`](crate::impl_record) generate
/// it from the struct's field list:
///
/// ```
/// use chrono::NaiveDate;
/// use record_csv::core::record::{FieldKind, Record};
///
/// struct Member {
///     id: u32,
///     name: String,
///     joined: NaiveDate,
/// }
///
/// record_csv::impl_record!(Member {
///     id as "Id": u32,
///     name as "Name": String,
///     joined as "Joined": NaiveDate,
/// });
///
/// let fields = Member::fields();
/// assert_eq!(fields[0].name(), "Id");
/// assert_eq!(fields[2].kind(), FieldKind::Date);
/// ```
pub trait Record {
    fn fields() -> Vec<FieldDescriptor>
    where
        Self: Sized;

    fn values(&self) -> Vec<FieldValue>;
}

impl<R: Record> Record for &R {
    fn fields() -> Vec<FieldDescriptor> {
        R::fields()
    }

    fn values(&self) -> Vec<FieldValue> {
        R::values(*self)
    }
}

/// Implements [`Record`](crate::core::record::Record) for a struct from the
/// list of its fields and their types.
///
/// Each entry is `field: Type` or `field as "Header": Type`. Fields appear in
/// the CSV in the order they are listed.
#[macro_export]
macro_rules! impl_record {
    (@descriptor $field:ident, $kind:expr) => {
        $crate::core::record::FieldDescriptor::from_ident(::std::stringify!($field), $kind)
    };
    (@descriptor $field:ident $name:literal, $kind:expr) => {
        $crate::core::record::FieldDescriptor::new($name, $kind)
    };
    ($ty:ty { $($field:ident $(as $name:literal)? : $fty:ty),+ $(,)? }) => {
        impl $crate::core::record::Record for $ty {
            fn fields() -> ::std::vec::Vec<$crate::core::record::FieldDescriptor> {
                ::std::vec![$(
                    $crate::impl_record!(
                        @descriptor $field $($name)?,
                        <$fty as $crate::core::record::Field>::KIND
                    )
                ),+]
            }

            fn values(&self) -> ::std::vec::Vec<$crate::core::record::FieldValue> {
                ::std::vec![$(
                    <$fty as $crate::core::record::Field>::to_field_value(&self.$field)
                ),+]
            }
        }
    };
}
