//! Date patterns.
//!
//! A one character pattern is a standard pattern (`d`, `s`, `o`, ...); any
//! longer pattern is a custom pattern such as `yyyy-MM-dd HH:mm`. Names and
//! separators come from the invariant culture.
//!
//! ```
//! use chrono::NaiveDate;
//! use record_csv::{core::record::FieldValue, format::date_format::DatePattern};
//!
//! let date = FieldValue::Date(NaiveDate::from_ymd_opt(2020, 1, 5).unwrap());
//!
//! let pattern = DatePattern::parse("yyyy-MM-dd").unwrap();
//! assert_eq!(pattern.format(&date).unwrap(), "2020-01-05");
//!
//! let pattern = DatePattern::parse("D").unwrap();
//! assert_eq!(pattern.format(&date).unwrap(), "Sunday, 05 January 2020");
//! ```

use chrono::{Datelike, FixedOffset, NaiveDateTime, NaiveTime, Offset, Timelike, Utc};

use crate::{core::record::FieldValue, error::PatternError};

const MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

const WEEKDAYS: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

const MAX_FRACTION_DIGITS: usize = 7;

#[derive(Debug, Clone, PartialEq, Eq)]
enum DateToken {
    Literal(String),
    Day(usize),
    Month(usize),
    Year(usize),
    Hour12(usize),
    Hour24(usize),
    Minute(usize),
    Second(usize),
    Fraction { digits: usize, trim: bool },
    Meridiem(usize),
    Era,
    Offset(usize),
    OffsetOrNothing,
}

/// A compiled date pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatePattern {
    tokens: Vec<DateToken>,
    /// Timestamps are converted to UTC before rendering.
    universal: bool,
}

fn expand_standard(specifier: char) -> Option<(&'static str, bool)> {
    let expanded = match specifier {
        'd' => ("MM/dd/yyyy", false),
        'D' => ("dddd, dd MMMM yyyy", false),
        'f' => ("dddd, dd MMMM yyyy HH:mm", false),
        'F' => ("dddd, dd MMMM yyyy HH:mm:ss", false),
        'g' => ("MM/dd/yyyy HH:mm", false),
        'G' => ("MM/dd/yyyy HH:mm:ss", false),
        'M' | 'm' => ("MMMM dd", false),
        'O' | 'o' => ("yyyy'-'MM'-'dd'T'HH':'mm':'ss'.'fffffffK", false),
        'R' | 'r' => ("ddd, dd MMM yyyy HH':'mm':'ss 'GMT'", true),
        's' => ("yyyy'-'MM'-'dd'T'HH':'mm':'ss", false),
        't' => ("HH:mm", false),
        'T' => ("HH:mm:ss", false),
        'u' => ("yyyy'-'MM'-'dd HH':'mm':'ss'Z'", true),
        'U' => ("dddd, dd MMMM yyyy HH:mm:ss", true),
        'Y' | 'y' => ("yyyy MMMM", false),
        _ => return None,
    };
    Some(expanded)
}

impl DatePattern {
    /// Compiles a pattern.
    ///
    /// # Errors
    ///
    /// A single character that is not a standard pattern, unterminated
    /// quotes, a trailing `\` or `%`, and more than seven fraction digits.
    pub fn parse(pattern: &str) -> Result<Self, PatternError> {
        let mut chars = pattern.chars();
        if let (Some(specifier), None) = (chars.next(), chars.next()) {
            let (custom, universal) = expand_standard(specifier).ok_or_else(|| {
                PatternError(format!("`{}` is not a standard date format", specifier))
            })?;
            return Ok(DatePattern {
                tokens: tokenize(custom)?,
                universal,
            });
        }

        Ok(DatePattern {
            tokens: tokenize(pattern)?,
            universal: false,
        })
    }

    /// Formats a temporal value; `None` for any other value.
    pub fn format(&self, value: &FieldValue) -> Option<String> {
        let (local, offset) = match value {
            FieldValue::Date(date) => (date.and_time(NaiveTime::MIN), None),
            FieldValue::DateTime(date_time) => (*date_time, None),
            FieldValue::Timestamp(timestamp) if self.universal => {
                (timestamp.naive_utc(), Some(Utc.fix()))
            }
            FieldValue::Timestamp(timestamp) => (timestamp.naive_local(), Some(*timestamp.offset())),
            _ => return None,
        };
        Some(self.render(&local, offset))
    }

    fn render(&self, local: &NaiveDateTime, offset: Option<FixedOffset>) -> String {
        let mut output = String::new();

        for token in &self.tokens {
            match token {
                DateToken::Literal(text) => output.push_str(text),
                DateToken::Day(1) => output.push_str(&local.day().to_string()),
                DateToken::Day(2) => output.push_str(&format!("{:02}", local.day())),
                DateToken::Day(count) => {
                    let name = WEEKDAYS[local.weekday().num_days_from_monday() as usize];
                    output.push_str(if *count == 3 { &name[..3] } else { name });
                }
                DateToken::Month(1) => output.push_str(&local.month().to_string()),
                DateToken::Month(2) => output.push_str(&format!("{:02}", local.month())),
                DateToken::Month(count) => {
                    let name = MONTHS[local.month0() as usize];
                    output.push_str(if *count == 3 { &name[..3] } else { name });
                }
                DateToken::Year(1) => {
                    output.push_str(&local.year().rem_euclid(100).to_string());
                }
                DateToken::Year(2) => {
                    output.push_str(&format!("{:02}", local.year().rem_euclid(100)));
                }
                DateToken::Year(count) => {
                    output.push_str(&format!("{:0width$}", local.year(), width = *count));
                }
                DateToken::Hour12(count) => {
                    let hour = match local.hour() % 12 {
                        0 => 12,
                        hour => hour,
                    };
                    output.push_str(&pad(hour, *count));
                }
                DateToken::Hour24(count) => output.push_str(&pad(local.hour(), *count)),
                DateToken::Minute(count) => output.push_str(&pad(local.minute(), *count)),
                DateToken::Second(count) => output.push_str(&pad(local.second(), *count)),
                DateToken::Fraction { digits, trim } => {
                    let nanos = format!("{:09}", local.nanosecond() % 1_000_000_000);
                    let mut fraction = &nanos[..*digits];
                    if *trim {
                        fraction = fraction.trim_end_matches('0');
                        if fraction.is_empty() && output.ends_with('.') {
                            output.pop();
                        }
                    }
                    output.push_str(fraction);
                }
                DateToken::Meridiem(count) => {
                    let text = if local.hour() < 12 { "AM" } else { "PM" };
                    output.push_str(if *count == 1 { &text[..1] } else { text });
                }
                DateToken::Era => output.push_str("A.D."),
                DateToken::Offset(count) => {
                    let seconds = offset.map_or(0, |offset| offset.local_minus_utc());
                    output.push_str(&offset_text(seconds, *count));
                }
                DateToken::OffsetOrNothing => {
                    if let Some(offset) = offset {
                        output.push_str(&offset_text(offset.local_minus_utc(), 3));
                    }
                }
            }
        }

        output
    }
}

fn pad(value: u32, count: usize) -> String {
    if count == 1 {
        value.to_string()
    } else {
        format!("{:02}", value)
    }
}

fn offset_text(seconds: i32, count: usize) -> String {
    let sign = if seconds < 0 { '-' } else { '+' };
    let seconds = seconds.unsigned_abs();
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    match count {
        1 => format!("{}{}", sign, hours),
        2 => format!("{}{:02}", sign, hours),
        _ => format!("{}{:02}:{:02}", sign, hours, minutes),
    }
}

fn is_specifier(c: char) -> bool {
    matches!(
        c,
        'd' | 'f' | 'F' | 'g' | 'h' | 'H' | 'K' | 'm' | 'M' | 's' | 't' | 'y' | 'z'
    )
}

fn push_literal(tokens: &mut Vec<DateToken>, text: &str) {
    if let Some(DateToken::Literal(previous)) = tokens.last_mut() {
        previous.push_str(text);
    } else {
        tokens.push(DateToken::Literal(text.to_string()));
    }
}

fn push_specifier(
    tokens: &mut Vec<DateToken>,
    specifier: char,
    count: usize,
) -> Result<(), PatternError> {
    let token = match specifier {
        'd' => DateToken::Day(count.min(4)),
        'f' | 'F' => {
            if count > MAX_FRACTION_DIGITS {
                return Err(PatternError(format!(
                    "at most {} fraction digits are supported",
                    MAX_FRACTION_DIGITS
                )));
            }
            DateToken::Fraction {
                digits: count,
                trim: specifier == 'F',
            }
        }
        'g' => DateToken::Era,
        'h' => DateToken::Hour12(count.min(2)),
        'H' => DateToken::Hour24(count.min(2)),
        'K' => {
            for _ in 0..count {
                tokens.push(DateToken::OffsetOrNothing);
            }
            return Ok(());
        }
        'm' => DateToken::Minute(count.min(2)),
        'M' => DateToken::Month(count.min(4)),
        's' => DateToken::Second(count.min(2)),
        't' => DateToken::Meridiem(count.min(2)),
        'y' => DateToken::Year(count),
        'z' => DateToken::Offset(count.min(3)),
        other => {
            push_literal(tokens, &other.to_string());
            return Ok(());
        }
    };
    tokens.push(token);
    Ok(())
}

fn tokenize(pattern: &str) -> Result<Vec<DateToken>, PatternError> {
    let chars: Vec<char> = pattern.chars().collect();
    let mut tokens = Vec::new();
    let mut index = 0;

    while index < chars.len() {
        match chars[index] {
            '%' => match chars.get(index + 1) {
                Some('%') | None => {
                    return Err(PatternError(
                        "`%` must be followed by a format specifier".to_string(),
                    ));
                }
                Some(next) => {
                    push_specifier(&mut tokens, *next, 1)?;
                    index += 2;
                }
            },
            '\\' => {
                let escaped = chars
                    .get(index + 1)
                    .ok_or_else(|| PatternError("pattern ends with `\\`".to_string()))?;
                push_literal(&mut tokens, &escaped.to_string());
                index += 2;
            }
            quote @ ('\'' | '"') => {
                let mut text = String::new();
                let mut cursor = index + 1;
                loop {
                    match chars.get(cursor) {
                        None => {
                            return Err(PatternError(format!("unterminated {} literal", quote)));
                        }
                        Some(c) if *c == quote => break,
                        Some('\\') => {
                            let escaped = chars.get(cursor + 1).ok_or_else(|| {
                                PatternError("pattern ends with `\\`".to_string())
                            })?;
                            text.push(*escaped);
                            cursor += 2;
                        }
                        Some(c) => {
                            text.push(*c);
                            cursor += 1;
                        }
                    }
                }
                push_literal(&mut tokens, &text);
                index = cursor + 1;
            }
            c if is_specifier(c) => {
                let count = chars[index..].iter().take_while(|next| **next == c).count();
                push_specifier(&mut tokens, c, count)?;
                index += count;
            }
            other => {
                push_literal(&mut tokens, &other.to_string());
                index += 1;
            }
        }
    }

    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use chrono::{FixedOffset, NaiveDate, TimeZone};

    use crate::core::record::FieldValue;

    use super::DatePattern;

    fn date_time(hour: u32, minute: u32, second: u32, milli: u32) -> FieldValue {
        FieldValue::DateTime(
            NaiveDate::from_ymd_opt(2021, 7, 4)
                .unwrap()
                .and_hms_milli_opt(hour, minute, second, milli)
                .unwrap(),
        )
    }

    fn format(pattern: &str, value: &FieldValue) -> String {
        DatePattern::parse(pattern).unwrap().format(value).unwrap()
    }

    #[test]
    fn custom_numeric_tokens() {
        let value = date_time(9, 5, 3, 120);

        assert_eq!(format("yyyy-MM-dd", &value), "2021-07-04");
        assert_eq!(format("d/M/yy", &value), "4/7/21");
        assert_eq!(format("HH:mm:ss.fff", &value), "09:05:03.120");
        assert_eq!(format("H:m:s", &value), "9:5:3");
        assert_eq!(format("yyyyMMddHHmmss", &value), "20210704090503");
    }

    #[test]
    fn names_and_meridiem() {
        let value = date_time(21, 0, 0, 0);

        assert_eq!(format("ddd dd MMM", &value), "Sun 04 Jul");
        assert_eq!(format("dddd, MMMM d", &value), "Sunday, July 4");
        assert_eq!(format("hh:mm tt", &value), "09:00 PM");
        assert_eq!(format("h t", &value), "9 P");
    }

    #[test]
    fn midnight_is_twelve_on_the_clock() {
        assert_eq!(format("hh tt", &date_time(0, 0, 0, 0)), "12 AM");
    }

    #[test]
    fn trimmed_fraction_drops_its_point() {
        assert_eq!(format("HH:mm:ss.FFF", &date_time(9, 5, 3, 0)), "09:05:03");
        assert_eq!(format("HH:mm:ss.FFF", &date_time(9, 5, 3, 500)), "09:05:03.5");
    }

    #[test]
    fn quoted_and_escaped_literals() {
        let value = date_time(9, 5, 3, 0);

        assert_eq!(format("'Day' d", &value), "Day 4");
        assert_eq!(format("\"at\" HH\\h", &value), "at 09h");
        assert_eq!(format("%d", &value), "4");
    }

    #[test]
    fn standard_patterns() {
        let value = date_time(14, 30, 15, 0);

        assert_eq!(format("d", &value), "07/04/2021");
        assert_eq!(format("s", &value), "2021-07-04T14:30:15");
        assert_eq!(format("t", &value), "14:30");
        assert_eq!(format("G", &value), "07/04/2021 14:30:15");
        assert_eq!(format("o", &value), "2021-07-04T14:30:15.0000000");
        assert_eq!(format("Y", &value), "2021 July");
    }

    #[test]
    fn timestamps_render_their_offset() {
        let offset = FixedOffset::east_opt(2 * 3600).unwrap();
        let value = FieldValue::Timestamp(offset.with_ymd_and_hms(2021, 7, 4, 14, 30, 0).unwrap());

        assert_eq!(format("HH:mm zzz", &value), "14:30 +02:00");
        assert_eq!(format("o", &value), "2021-07-04T14:30:00.0000000+02:00");
        assert_eq!(format("u", &value), "2021-07-04 12:30:00Z");
        assert_eq!(format("%z", &value), "+2");
    }

    #[test]
    fn dates_render_at_midnight() {
        let value = FieldValue::Date(NaiveDate::from_ymd_opt(2020, 1, 5).unwrap());

        assert_eq!(format("yyyy-MM-dd HH:mm", &value), "2020-01-05 00:00");
    }

    #[test]
    fn non_temporal_values_are_not_formatted() {
        let pattern = DatePattern::parse("yyyy").unwrap();

        assert_eq!(pattern.format(&FieldValue::Integer(2020)), None);
    }

    #[test]
    fn invalid_patterns() {
        assert!(DatePattern::parse("Q").is_err());
        assert!(DatePattern::parse("yyyy 'open").is_err());
        assert!(DatePattern::parse("HH\\").is_err());
        assert!(DatePattern::parse("yyyy%").is_err());
        assert!(DatePattern::parse("ss.ffffffff").is_err());
    }
}
