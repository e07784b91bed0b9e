use std::io::Write;

use log::{debug, trace};
use serde::Serialize;

use crate::{
    core::{
        fields::{IntoRecords, RecordTable},
        record::{FieldDescriptor, FieldKind, FieldValue},
        serialized::table_from_serialized,
    },
    error::CsvError,
    format::{
        date_format::DatePattern,
        number_format::{Number, NumberPattern},
    },
    render::csv_options::{CsvOptions, HeaderTranslation, LineTerminator},
};

/// Renders records as CSV text with a fixed set of options.
///
/// The renderer holds no state besides its options and can be shared freely.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use record_csv::render::{csv_options::LineTerminator, csv_renderer::CsvRendererBuilder};
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
/// let renderer = CsvRendererBuilder::new()
///     .date_format("yyyy-MM-dd")
///     .line_terminator(LineTerminator::Lf)
///     .build();
///
/// let member = Member {
///     id: 1,
///     name: "Ann".to_string(),
///     joined: NaiveDate::from_ymd_opt(2020, 1, 5).unwrap(),
/// };
///
/// assert_eq!(
///     renderer.render(&member).unwrap(),
///     "Id,Name,Joined\n1,Ann,2020-01-05\n"
/// );
/// ```
#[derive(Debug, Clone, Default)]
pub struct CsvRenderer {
    options: CsvOptions,
}

impl CsvRenderer {
    pub fn new(options: CsvOptions) -> Self {
        CsvRenderer { options }
    }

    pub fn options(&self) -> &CsvOptions {
        &self.options
    }

    /// Renders a record or a collection of records.
    pub fn render<'a, T: IntoRecords<'a>>(&self, target: T) -> Result<String, CsvError> {
        render_records(target, &self.options)
    }

    /// Renders any serializable value whose serialized form is a record or a
    /// sequence of records.
    pub fn render_serialized<T: Serialize + ?Sized>(&self, target: &T) -> Result<String, CsvError> {
        render_serialized(target, &self.options)
    }

    /// Renders into `writer`. Nothing is written when rendering fails.
    pub fn render_to_writer<'a, T: IntoRecords<'a>, W: Write>(
        &self,
        target: T,
        mut writer: W,
    ) -> Result<(), CsvError> {
        let text = self.render(target)?;
        writer.write_all(text.as_bytes())?;
        writer.flush()?;
        Ok(())
    }
}

/// Fluent construction of a [`CsvRenderer`].
#[derive(Default)]
pub struct CsvRendererBuilder {
    options: CsvOptions,
}

impl CsvRendererBuilder {
    pub fn new() -> CsvRendererBuilder {
        CsvRendererBuilder {
            options: CsvOptions::default(),
        }
    }

    /// Starts from an existing options bundle, for instance one loaded from
    /// a configuration file.
    pub fn from_options(options: CsvOptions) -> CsvRendererBuilder {
        CsvRendererBuilder { options }
    }

    pub fn separator(mut self, separator: &str) -> CsvRendererBuilder {
        self.options.separator = separator.to_string();
        self
    }

    pub fn suppress_header(mut self, yes: bool) -> CsvRendererBuilder {
        self.options.suppress_header = yes;
        self
    }

    pub fn translate_column(mut self, from: &str, to: &str) -> CsvRendererBuilder {
        self.options
            .column_translations
            .push((from.to_string(), to.to_string()));
        self
    }

    pub fn header_translation(mut self, mode: HeaderTranslation) -> CsvRendererBuilder {
        self.options.header_translation = mode;
        self
    }

    pub fn ignore_field(mut self, field: &str) -> CsvRendererBuilder {
        self.options.ignored_fields.push(field.to_string());
        self
    }

    pub fn date_format(mut self, pattern: &str) -> CsvRendererBuilder {
        self.options.date_format = Some(pattern.to_string());
        self
    }

    pub fn field_format(mut self, field: &str, pattern: &str) -> CsvRendererBuilder {
        self.options
            .field_formats
            .push((field.to_string(), pattern.to_string()));
        self
    }

    pub fn quote_all(mut self, yes: bool) -> CsvRendererBuilder {
        self.options.quote_all = yes;
        self
    }

    pub fn quote_field(mut self, field: &str) -> CsvRendererBuilder {
        self.options.quoted_fields.push(field.to_string());
        self
    }

    pub fn line_terminator(mut self, terminator: LineTerminator) -> CsvRendererBuilder {
        self.options.line_terminator = terminator;
        self
    }

    pub fn build(self) -> CsvRenderer {
        CsvRenderer::new(self.options)
    }
}

/// Renders a record or a collection of records with `options`.
pub fn render_records<'a, T: IntoRecords<'a>>(
    target: T,
    options: &CsvOptions,
) -> Result<String, CsvError> {
    let table = target.into_records().to_table()?;
    render_table(&table, options)
}

/// Renders a serializable record or sequence of records with `options`.
pub fn render_serialized<T: Serialize + ?Sized>(
    target: &T,
    options: &CsvOptions,
) -> Result<String, CsvError> {
    let table = table_from_serialized(target)?;
    render_table(&table, options)
}

/// Renders an already enumerated table.
///
/// Every pattern is compiled before the first line is produced, so an
/// invalid pattern fails the whole render.
pub fn render_table(table: &RecordTable, options: &CsvOptions) -> Result<String, CsvError> {
    debug!(
        "Start rendering {} record(s) of {} field(s)",
        table.rows.len(),
        table.fields.len()
    );

    let columns = plan_columns(&table.fields, options)?;
    let terminator = options.line_terminator.as_str();
    let mut output = String::new();

    if !options.suppress_header {
        output.push_str(&header(&columns, options)?);
        output.push_str(terminator);
    }

    let null = FieldValue::Null;
    let mut values = Vec::with_capacity(columns.len());
    for row in &table.rows {
        values.clear();
        for column in &columns {
            let value = row.get(column.index).unwrap_or(&null);
            values.push(column.render(value)?);
        }
        output.push_str(&values.join(&options.separator));
        output.push_str(terminator);
    }

    debug!("End rendering, {} byte(s)", output.len());
    Ok(output)
}

#[derive(Debug)]
enum ValueRule<'a> {
    Default,
    /// `fallback` is set for a `field_formats` pattern: an empty result
    /// falls back to the default text. A `date_format` result stays empty.
    Date {
        pattern: DatePattern,
        fallback: bool,
    },
    Number {
        pattern: NumberPattern,
        source: &'a str,
    },
}

#[derive(Debug)]
struct Column<'a> {
    index: usize,
    name: &'a str,
    rule: ValueRule<'a>,
    quoted: bool,
}

impl Column<'_> {
    fn render(&self, value: &FieldValue) -> Result<String, CsvError> {
        let text = match &self.rule {
            ValueRule::Date { pattern, fallback } => {
                let formatted = if value.is_valid_date() {
                    pattern.format(value).unwrap_or_default()
                } else {
                    String::new()
                };
                if formatted.is_empty() && *fallback {
                    value.to_string()
                } else {
                    formatted
                }
            }
            ValueRule::Number { pattern, source } => {
                let formatted = match Number::from_value(value) {
                    Some(number) => pattern
                        .format(number)
                        .map_err(|error| error.into_csv_error(self.name, source))?,
                    None => String::new(),
                };
                if formatted.is_empty() {
                    value.to_string()
                } else {
                    formatted
                }
            }
            ValueRule::Default => value.to_string(),
        };

        if self.quoted {
            Ok(format!("\"{}\"", text))
        } else {
            Ok(text)
        }
    }
}

fn plan_columns<'a>(
    fields: &'a [FieldDescriptor],
    options: &'a CsvOptions,
) -> Result<Vec<Column<'a>>, CsvError> {
    let mut columns = Vec::with_capacity(fields.len());

    for (index, field) in fields.iter().enumerate() {
        if options.is_ignored(field.name()) {
            trace!("Field `{}` is ignored", field.name());
            continue;
        }

        let rule = value_rule(field, options)?;
        trace!("Field `{}` renders with {:?}", field.name(), rule);

        columns.push(Column {
            index,
            name: field.name(),
            rule,
            quoted: options.is_quoted(field.name()),
        });
    }

    Ok(columns)
}

fn value_rule<'a>(
    field: &FieldDescriptor,
    options: &'a CsvOptions,
) -> Result<ValueRule<'a>, CsvError> {
    let specific = options.field_format(field.name());

    if field.kind() == FieldKind::Date {
        let (source, fallback) = match specific {
            None => (options.global_date_format(), false),
            Some(pattern) if !pattern.is_empty() => (Some(pattern), true),
            Some(_) => (None, false),
        };
        return match source {
            Some(source) => {
                let pattern = DatePattern::parse(source)
                    .map_err(|error| error.into_csv_error(field.name(), source))?;
                Ok(ValueRule::Date { pattern, fallback })
            }
            None => Ok(ValueRule::Default),
        };
    }

    match specific {
        Some(source)
            if !source.is_empty()
                && (field.kind().is_numeric() || field.kind() == FieldKind::Unknown) =>
        {
            let pattern = NumberPattern::parse(source)
                .map_err(|error| error.into_csv_error(field.name(), source))?;
            Ok(ValueRule::Number { pattern, source })
        }
        _ => Ok(ValueRule::Default),
    }
}

fn header(columns: &[Column<'_>], options: &CsvOptions) -> Result<String, CsvError> {
    let translations = &options.column_translations;
    if translations.iter().any(|(from, _)| from.is_empty()) {
        return Err(CsvError::InvalidInput(
            "column translation with an empty key".to_string(),
        ));
    }

    let header = match options.header_translation {
        HeaderTranslation::Substring => {
            let names: Vec<&str> = columns.iter().map(|column| column.name).collect();
            translate(names.join(&options.separator), translations)
        }
        HeaderTranslation::PerColumn => columns
            .iter()
            .map(|column| translate(column.name.to_string(), translations))
            .collect::<Vec<String>>()
            .join(&options.separator),
    };

    Ok(header)
}

fn translate(text: String, translations: &[(String, String)]) -> String {
    translations
        .iter()
        .fold(text, |text, (from, to)| text.replace(from.as_str(), to))
}
