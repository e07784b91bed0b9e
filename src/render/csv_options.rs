use serde::{Deserialize, Serialize};

/// Line ending written after the header and after every record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineTerminator {
    /// `\r\n` on Windows, `\n` elsewhere.
    #[default]
    Native,
    Lf,
    CrLf,
}

impl LineTerminator {
    pub fn as_str(&self) -> &'static str {
        match self {
            LineTerminator::Native if cfg!(windows) => "\r\n",
            LineTerminator::Native | LineTerminator::Lf => "\n",
            LineTerminator::CrLf => "\r\n",
        }
    }
}

/// How `column_translations` rewrite the header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum HeaderTranslation {
    /// Replace substrings of the whole joined header line. A key that spans
    /// the separator between two columns is replaced too.
    #[default]
    Substring,
    /// Replace substrings of each column name before joining.
    PerColumn,
}

/// Rendering options. Every field has a default, so a partial JSON object
/// is a valid configuration:
///
/// ```
/// use record_csv::render::csv_options::{CsvOptions, LineTerminator};
///
/// let options: CsvOptions = serde_json::from_str(
///     r#"{ "separator": ";", "dateFormat": "yyyy-MM-dd", "lineTerminator": "lf" }"#,
/// )
/// .unwrap();
///
/// assert_eq!(options.separator, ";");
/// assert_eq!(options.date_format.as_deref(), Some("yyyy-MM-dd"));
/// assert_eq!(options.line_terminator, LineTerminator::Lf);
/// assert!(!options.suppress_header);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CsvOptions {
    /// Field delimiter.
    pub separator: String,
    /// Omit the header line.
    pub suppress_header: bool,
    /// Ordered `(from, to)` replacements applied to the header.
    pub column_translations: Vec<(String, String)>,
    pub header_translation: HeaderTranslation,
    /// Fields left out of header and values, matched case-insensitively.
    pub ignored_fields: Vec<String>,
    /// Pattern for every date field without its own entry in `field_formats`.
    pub date_format: Option<String>,
    /// Ordered `(field, pattern)` overrides, matched case-insensitively.
    pub field_formats: Vec<(String, String)>,
    /// Wrap every value in double quotes.
    pub quote_all: bool,
    /// Fields whose values are wrapped in double quotes, matched
    /// case-insensitively.
    pub quoted_fields: Vec<String>,
    pub line_terminator: LineTerminator,
}

impl Default for CsvOptions {
    fn default() -> Self {
        CsvOptions {
            separator: ",".to_string(),
            suppress_header: false,
            column_translations: Vec::new(),
            header_translation: HeaderTranslation::default(),
            ignored_fields: Vec::new(),
            date_format: None,
            field_formats: Vec::new(),
            quote_all: false,
            quoted_fields: Vec::new(),
            line_terminator: LineTerminator::default(),
        }
    }
}

impl CsvOptions {
    pub fn is_ignored(&self, field: &str) -> bool {
        contains_ignore_case(&self.ignored_fields, field)
    }

    pub fn is_quoted(&self, field: &str) -> bool {
        self.quote_all || contains_ignore_case(&self.quoted_fields, field)
    }

    /// First `field_formats` entry naming `field`, empty patterns included.
    pub fn field_format(&self, field: &str) -> Option<&str> {
        let field = field.to_lowercase();
        self.field_formats
            .iter()
            .find(|(name, _)| name.to_lowercase() == field)
            .map(|(_, pattern)| pattern.as_str())
    }

    /// The global date pattern, if one is set and not empty.
    pub fn global_date_format(&self) -> Option<&str> {
        self.date_format.as_deref().filter(|pattern| !pattern.is_empty())
    }
}

fn contains_ignore_case(names: &[String], field: &str) -> bool {
    let field = field.to_lowercase();
    names.iter().any(|name| name.to_lowercase() == field)
}
