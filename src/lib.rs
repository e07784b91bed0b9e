#![cfg_attr(docsrs, feature(doc_cfg))]
//#![warn(missing_docs)]

/*!
 # Record CSV

 Turns a record, or a collection of records, into CSV text. Every field of
 the record type becomes a column, in declaration order, and every record
 becomes a line.

 ## Core Concepts

- **Record:** A type whose fields can be enumerated. Implement it with the `impl_record!` macro or go through serde with `to_csv_serialized`.
- **Field kind:** The declared type of a field (text, integer, float, boolean, date). The kind decides which pattern applies to the field.
- **CsvOptions:** What to render and how: separator, header, ignored and quoted fields, date and numeric patterns, header translations.
- **CsvRenderer:** Applies a set of options to records. Build one with `CsvRendererBuilder`.

 ## Options

| **Option**          | **Description**                                                  |
|---------------------|------------------------------------------------------------------|
| separator           | Field delimiter, `,` by default                                  |
| suppress_header     | Omit the header line                                             |
| column_translations | Ordered substring replacements applied to the header             |
| ignored_fields      | Fields left out of header and values                             |
| date_format         | Pattern for every date field                                     |
| field_formats       | Date or numeric pattern for a named field, wins over date_format |
| quote_all           | Wrap every value in double quotes                                |
| quoted_fields       | Wrap the values of the named fields in double quotes             |
| line_terminator     | `native`, `lf` or `crlf`                                         |

 Dates holding their type's default (the Unix epoch) or minimum are treated
 as unset and render as an empty value when a pattern applies to them.

 ## Getting Started

```rust
# use chrono::NaiveDate;
# use record_csv::{CsvError, CsvRendererBuilder, LineTerminator};
struct Invoice {
    number: u32,
    customer: String,
    total: f64,
    issued: NaiveDate,
    paid: Option<NaiveDate>,
}

record_csv::impl_record!(Invoice {
    number as "Number": u32,
    customer as "Customer": String,
    total as "Total": f64,
    issued as "Issued": NaiveDate,
    paid as "Paid": Option<NaiveDate>,
});

fn main() -> Result<(), CsvError> {
    let invoices = vec![
        Invoice {
            number: 1,
            customer: "Ann".to_string(),
            total: 1234.5,
            issued: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            paid: NaiveDate::from_ymd_opt(2024, 3, 15),
        },
        Invoice {
            number: 2,
            customer: "Bob".to_string(),
            total: 80.0,
            issued: NaiveDate::from_ymd_opt(2024, 3, 2).unwrap(),
            paid: None,
        },
    ];

    let renderer = CsvRendererBuilder::new()
        .separator(";")
        .date_format("dd/MM/yyyy")
        .field_format("total", "#,##0.00")
        .quote_field("customer")
        .line_terminator(LineTerminator::Lf)
        .build();

    let csv = renderer.render(&invoices)?;

    assert_eq!(
        csv,
        "Number;Customer;Total;Issued;Paid\n\
         1;\"Ann\";1,234.50;01/03/2024;15/03/2024\n\
         2;\"Bob\";80.00;02/03/2024;\n"
    );

    Ok(())
}
```

 ## License
 Licensed under either of

 -   Apache License, Version 2.0
     ([LICENSE-APACHE](LICENSE-APACHE) or <http://www.apache.org/licenses/LICENSE-2.0>)
 -   MIT license
     ([LICENSE-MIT](LICENSE-MIT) or <http://opensource.org/licenses/MIT>)

 at your option.

 */

use serde::Serialize;

/// Records, their fields and field enumeration
pub mod core;

/// Error types for rendering
pub mod error;

/// Date and numeric patterns
pub mod format;

/// CSV options and renderer
pub mod render;

#[doc(inline)]
pub use error::*;

#[doc(inline)]
pub use crate::core::{
    fields::{IntoRecords, RecordTable, Records},
    record::{Field, FieldDescriptor, FieldKind, FieldValue, Record},
};

#[doc(inline)]
pub use render::{
    csv_options::{CsvOptions, HeaderTranslation, LineTerminator},
    csv_renderer::{CsvRenderer, CsvRendererBuilder},
};

/// Renders a record or a collection of records as CSV text.
///
/// ```
/// use record_csv::{CsvOptions, LineTerminator};
///
/// struct Point {
///     x: i32,
///     y: i32,
/// }
///
/// record_csv::impl_record!(Point { x: i32, y: i32 });
///
/// let options = CsvOptions {
///     line_terminator: LineTerminator::Lf,
///     ..CsvOptions::default()
/// };
/// let points = [Point { x: 1, y: 2 }, Point { x: -3, y: 4 }];
///
/// assert_eq!(
///     record_csv::to_csv(&points, &options).unwrap(),
///     "x,y\n1,2\n-3,4\n"
/// );
/// ```
///
/// # Errors
///
/// [`CsvError::Format`] for a malformed pattern, [`CsvError::InvalidInput`]
/// for a record whose values do not match its fields or an empty
/// translation key.
pub fn to_csv<'a, T: IntoRecords<'a>>(target: T, options: &CsvOptions) -> Result<String, CsvError> {
    render::csv_renderer::render_records(target, options)
}

/// Renders a serializable value as CSV text.
///
/// A struct or map is one record; a sequence of them is a collection whose
/// shape is taken from its first element.
///
/// ```
/// use record_csv::{CsvOptions, LineTerminator};
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Car {
///     make: String,
///     year: u16,
/// }
///
/// let options = CsvOptions {
///     line_terminator: LineTerminator::Lf,
///     ..CsvOptions::default()
/// };
/// let cars = vec![
///     Car { make: "Porsche".to_string(), year: 1948 },
///     Car { make: "Mazda".to_string(), year: 2021 },
/// ];
///
/// assert_eq!(
///     record_csv::to_csv_serialized(&cars, &options).unwrap(),
///     "make,year\nPorsche,1948\nMazda,2021\n"
/// );
/// ```
///
/// # Errors
///
/// Besides the errors of [`to_csv`], [`CsvError::InvalidInput`] when the
/// value is not a struct, a map or a non-empty sequence of them, or has a
/// nested field.
pub fn to_csv_serialized<T: Serialize + ?Sized>(
    target: &T,
    options: &CsvOptions,
) -> Result<String, CsvError> {
    render::csv_renderer::render_serialized(target, options)
}
