//! Numeric patterns.
//!
//! A pattern made of one letter and an optional precision (`N2`, `F0`, `X8`)
//! is a standard pattern; anything else is a custom pattern built from `0`
//! and `#` placeholders. Output uses the invariant culture: `.` decimal
//! point, `,` group separator, `¤` currency symbol.
//!
//! ```
//! use record_csv::format::number_format::{Number, NumberPattern};
//!
//! let pattern = NumberPattern::parse("#,##0.00").unwrap();
//! assert_eq!(pattern.format(Number::Float(1234.5)).unwrap(), "1,234.50");
//!
//! let pattern = NumberPattern::parse("P1").unwrap();
//! assert_eq!(pattern.format(Number::Float(0.256)).unwrap(), "25.6 %");
//! ```

use crate::{core::record::FieldValue, error::PatternError, format::decimal::Decimal};

const MAX_PRECISION: usize = 999_999_999;

/// A numeric field value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Integer(i64),
    Unsigned(u64),
    Float(f64),
}

impl Number {
    /// The number held by a field value, if any.
    pub fn from_value(value: &FieldValue) -> Option<Number> {
        match value {
            FieldValue::Integer(value) => Some(Number::Integer(*value)),
            FieldValue::Unsigned(value) => Some(Number::Unsigned(*value)),
            FieldValue::Float(value) => Some(Number::Float(*value)),
            _ => None,
        }
    }

    fn is_integral(&self) -> bool {
        !matches!(self, Number::Float(_))
    }

    fn is_negative(&self) -> bool {
        match self {
            Number::Integer(value) => *value < 0,
            Number::Unsigned(_) => false,
            Number::Float(value) => *value < 0.0,
        }
    }

    fn is_zero(&self) -> bool {
        match self {
            Number::Integer(value) => *value == 0,
            Number::Unsigned(value) => *value == 0,
            Number::Float(value) => *value == 0.0,
        }
    }

    fn to_decimal(self) -> Decimal {
        match self {
            Number::Integer(value) => Decimal::from_i64(value),
            Number::Unsigned(value) => Decimal::from_u64(value),
            Number::Float(value) => Decimal::from_f64(value),
        }
    }

    fn plain(&self) -> String {
        match self {
            Number::Integer(value) => value.to_string(),
            Number::Unsigned(value) => value.to_string(),
            Number::Float(value) => value.to_string(),
        }
    }
}

/// A compiled numeric pattern.
#[derive(Debug, Clone, PartialEq)]
pub enum NumberPattern {
    Standard {
        specifier: char,
        precision: Option<usize>,
    },
    Custom(Vec<Section>),
}

impl NumberPattern {
    /// Compiles a pattern.
    ///
    /// # Errors
    ///
    /// Unknown standard specifiers, precisions above 999999999, unterminated
    /// quotes and a trailing `\`.
    pub fn parse(pattern: &str) -> Result<Self, PatternError> {
        let mut chars = pattern.chars();
        if let Some(first) = chars.next() {
            let precision = chars.as_str();
            if first.is_ascii_alphabetic() && precision.chars().all(|c| c.is_ascii_digit()) {
                if !"CDEFGNPRX".contains(first.to_ascii_uppercase()) {
                    return Err(PatternError(format!(
                        "`{}` is not a standard numeric format",
                        first
                    )));
                }
                let precision = if precision.is_empty() {
                    None
                } else {
                    let value: usize = precision
                        .parse()
                        .ok()
                        .filter(|value| *value <= MAX_PRECISION)
                        .ok_or_else(|| {
                            PatternError(format!("precision `{}` is out of range", precision))
                        })?;
                    Some(value)
                };
                return Ok(NumberPattern::Standard {
                    specifier: first,
                    precision,
                });
            }
        }

        let sections = tokenize(pattern)?
            .into_iter()
            .take(3)
            .map(Section::new)
            .collect();
        Ok(NumberPattern::Custom(sections))
    }

    /// Formats a number.
    ///
    /// # Errors
    ///
    /// `D` and `X` applied to a floating point value.
    pub fn format(&self, number: Number) -> Result<String, PatternError> {
        if let Number::Float(value) = number {
            if value.is_nan() {
                return Ok("NaN".to_string());
            }
            if value.is_infinite() {
                let text = if value > 0.0 { "Infinity" } else { "-Infinity" };
                return Ok(text.to_string());
            }
        }

        match self {
            NumberPattern::Standard {
                specifier,
                precision,
            } => format_standard(*specifier, *precision, number),
            NumberPattern::Custom(sections) => Ok(format_custom(sections, number)),
        }
    }
}

fn format_standard(
    specifier: char,
    precision: Option<usize>,
    number: Number,
) -> Result<String, PatternError> {
    let upper = specifier.is_ascii_uppercase();

    let text = match specifier.to_ascii_uppercase() {
        'C' => {
            let places = precision.unwrap_or(2);
            let mut decimal = number.to_decimal();
            decimal.round_fraction(places);
            signed(&decimal, format!("¤{}", fixed(&decimal, places, true)))
        }
        'D' => {
            if !number.is_integral() {
                return Err(PatternError(
                    "`D` only applies to integer values".to_string(),
                ));
            }
            let decimal = number.to_decimal();
            let digits = zero_if_empty(decimal.integer_digits());
            let width = precision.unwrap_or(0);
            signed(&decimal, format!("{:0>width$}", digits, width = width))
        }
        'E' => {
            let mut decimal = number.to_decimal();
            let exponent_char = if upper { 'E' } else { 'e' };
            let text = scientific(&mut decimal, precision.unwrap_or(6), exponent_char, 3);
            signed(&decimal, text)
        }
        'F' | 'N' => {
            let places = precision.unwrap_or(2);
            let mut decimal = number.to_decimal();
            decimal.round_fraction(places);
            let grouping = specifier.to_ascii_uppercase() == 'N';
            signed(&decimal, fixed(&decimal, places, grouping))
        }
        'G' => general(number, precision.filter(|precision| *precision > 0), upper),
        'P' => {
            let places = precision.unwrap_or(2);
            let mut decimal = number.to_decimal();
            decimal.shift(2);
            decimal.round_fraction(places);
            signed(&decimal, format!("{} %", fixed(&decimal, places, true)))
        }
        'R' => general(number, None, upper),
        'X' => {
            let hex = match number {
                Number::Integer(value) if upper => format!("{:X}", value),
                Number::Integer(value) => format!("{:x}", value),
                Number::Unsigned(value) if upper => format!("{:X}", value),
                Number::Unsigned(value) => format!("{:x}", value),
                Number::Float(_) => {
                    return Err(PatternError(
                        "`X` only applies to integer values".to_string(),
                    ));
                }
            };
            format!("{:0>width$}", hex, width = precision.unwrap_or(0))
        }
        other => {
            return Err(PatternError(format!(
                "`{}` is not a standard numeric format",
                other
            )));
        }
    };

    Ok(text)
}

fn signed(decimal: &Decimal, text: String) -> String {
    if decimal.negative && !decimal.is_zero() {
        format!("-{}", text)
    } else {
        text
    }
}

fn zero_if_empty(digits: String) -> String {
    if digits.is_empty() {
        "0".to_string()
    } else {
        digits
    }
}

fn group(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    grouped
}

fn fixed(decimal: &Decimal, places: usize, grouping: bool) -> String {
    let integer = zero_if_empty(decimal.integer_digits());
    let integer = if grouping { group(&integer) } else { integer };
    if places == 0 {
        return integer;
    }
    format!(
        "{}.{:0<places$}",
        integer,
        decimal.fraction_digits(),
        places = places
    )
}

fn exponent_text(exponent: i32, always_sign: bool, min_digits: usize) -> String {
    let sign = if exponent < 0 {
        "-"
    } else if always_sign {
        "+"
    } else {
        ""
    };
    format!(
        "{}{:0>width$}",
        sign,
        exponent.unsigned_abs(),
        width = min_digits
    )
}

fn scientific(
    decimal: &mut Decimal,
    precision: usize,
    exponent_char: char,
    min_exponent_digits: usize,
) -> String {
    let (digits, exponent) = if decimal.is_zero() {
        (String::new(), 0)
    } else {
        decimal.round_significant(precision + 1);
        (decimal.significant_digits(), decimal.exponent() - 1)
    };
    let digits = format!("{:0<width$}", digits, width = precision + 1);

    let mut text = digits[..1].to_string();
    if precision > 0 {
        text.push('.');
        text.push_str(&digits[1..]);
    }
    text.push(exponent_char);
    text.push_str(&exponent_text(exponent, true, min_exponent_digits));
    text
}

fn general(number: Number, precision: Option<usize>, upper: bool) -> String {
    let (decimal, precision) = match (precision, number) {
        (Some(precision), _) => {
            let mut decimal = number.to_decimal();
            decimal.round_significant(precision);
            (decimal, precision)
        }
        (None, Number::Float(value)) => (Decimal::from_f64_shortest(value), 15),
        (None, _) => return number.plain(),
    };

    if decimal.is_zero() {
        return "0".to_string();
    }

    let exponent = decimal.exponent() - 1;
    let text = if exponent > -5 && exponent < precision as i32 {
        let integer = zero_if_empty(decimal.integer_digits());
        let fraction = decimal.fraction_digits();
        if fraction.is_empty() {
            integer
        } else {
            format!("{}.{}", integer, fraction)
        }
    } else {
        let digits = decimal.significant_digits();
        let mut text = digits[..1].to_string();
        if digits.len() > 1 {
            text.push('.');
            text.push_str(&digits[1..]);
        }
        text.push(if upper { 'E' } else { 'e' });
        text.push_str(&exponent_text(exponent, true, 2));
        text
    };

    signed(&decimal, text)
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Digit { zero: bool },
    Point,
    Group,
    Percent,
    PerMille,
    Exponent {
        upper: bool,
        always_sign: bool,
        min_digits: usize,
    },
    Literal(String),
}

fn push_literal(tokens: &mut Vec<Token>, text: &str) {
    if let Some(Token::Literal(previous)) = tokens.last_mut() {
        previous.push_str(text);
    } else {
        tokens.push(Token::Literal(text.to_string()));
    }
}

fn tokenize(pattern: &str) -> Result<Vec<Vec<Token>>, PatternError> {
    let chars: Vec<char> = pattern.chars().collect();
    let mut sections: Vec<Vec<Token>> = vec![Vec::new()];
    let mut index = 0;

    while index < chars.len() {
        let current = sections.len() - 1;
        let tokens = &mut sections[current];

        match chars[index] {
            '0' => tokens.push(Token::Digit { zero: true }),
            '#' => tokens.push(Token::Digit { zero: false }),
            '.' => tokens.push(Token::Point),
            ',' => tokens.push(Token::Group),
            '%' => tokens.push(Token::Percent),
            '‰' => tokens.push(Token::PerMille),
            ';' => sections.push(Vec::new()),
            '\\' => {
                index += 1;
                let escaped = chars
                    .get(index)
                    .ok_or_else(|| PatternError("pattern ends with `\\`".to_string()))?;
                push_literal(tokens, &escaped.to_string());
            }
            quote @ ('\'' | '"') => {
                let end = chars[index + 1..]
                    .iter()
                    .position(|c| *c == quote)
                    .ok_or_else(|| PatternError(format!("unterminated {} literal", quote)))?;
                let text: String = chars[index + 1..index + 1 + end].iter().collect();
                push_literal(tokens, &text);
                index += end + 1;
            }
            exponent @ ('E' | 'e') => {
                let mut cursor = index + 1;
                let always_sign = chars.get(cursor) == Some(&'+');
                if matches!(chars.get(cursor), Some('+') | Some('-')) {
                    cursor += 1;
                }
                let min_digits = chars[cursor.min(chars.len())..]
                    .iter()
                    .take_while(|c| **c == '0')
                    .count();
                if min_digits > 0 {
                    tokens.push(Token::Exponent {
                        upper: exponent == 'E',
                        always_sign,
                        min_digits,
                    });
                    index = cursor + min_digits - 1;
                } else {
                    push_literal(tokens, &exponent.to_string());
                }
            }
            other => push_literal(tokens, &other.to_string()),
        }
        index += 1;
    }

    Ok(sections)
}

/// One `;`-separated part of a custom pattern.
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    tokens: Vec<Token>,
    point: Option<usize>,
    integer_end: usize,
    fraction_end: usize,
    integer_placeholders: usize,
    min_integer_digits: usize,
    max_fraction_digits: usize,
    min_fraction_digits: usize,
    grouping: bool,
    shift: i32,
    scientific: bool,
}

impl Section {
    fn new(tokens: Vec<Token>) -> Self {
        let is_digit = |token: &Token| matches!(token, Token::Digit { .. });
        let point = tokens.iter().position(|token| *token == Token::Point);
        let exponent = tokens
            .iter()
            .position(|token| matches!(token, Token::Exponent { .. }));
        let integer_end = match (point, exponent) {
            (Some(point), Some(exponent)) => point.min(exponent),
            (Some(point), None) => point,
            (None, Some(exponent)) => exponent,
            (None, None) => tokens.len(),
        };
        let fraction_end = match (point, exponent) {
            (Some(point), Some(exponent)) if exponent > point => exponent,
            (Some(_), _) => tokens.len(),
            (None, _) => integer_end,
        };

        let integer_zeros: Vec<bool> = tokens[..integer_end]
            .iter()
            .filter_map(|token| match token {
                Token::Digit { zero } => Some(*zero),
                _ => None,
            })
            .collect();
        let integer_placeholders = integer_zeros.len();
        let min_integer_digits = integer_zeros
            .iter()
            .position(|zero| *zero)
            .map_or(0, |first| integer_placeholders - first);

        let first_digit = tokens[..integer_end].iter().position(is_digit);
        let last_digit = tokens[..integer_end].iter().rposition(is_digit);
        let (grouping, scale_groups) = match (first_digit, last_digit) {
            (Some(first), Some(last)) => (
                tokens[first..last].contains(&Token::Group),
                tokens[last + 1..integer_end]
                    .iter()
                    .take_while(|token| **token == Token::Group)
                    .count(),
            ),
            _ => (false, 0),
        };

        let fraction_zeros: Vec<bool> = match point {
            Some(point) if point < fraction_end => tokens[point + 1..fraction_end]
                .iter()
                .filter_map(|token| match token {
                    Token::Digit { zero } => Some(*zero),
                    _ => None,
                })
                .collect(),
            _ => Vec::new(),
        };
        let max_fraction_digits = fraction_zeros.len();
        let min_fraction_digits = fraction_zeros
            .iter()
            .rposition(|zero| *zero)
            .map_or(0, |last| last + 1);

        let percents = tokens.iter().filter(|token| **token == Token::Percent).count();
        let per_milles = tokens.iter().filter(|token| **token == Token::PerMille).count();
        let shift = 2 * percents as i32 + 3 * per_milles as i32 - 3 * scale_groups as i32;

        Section {
            scientific: exponent.is_some(),
            tokens,
            point,
            integer_end,
            fraction_end,
            integer_placeholders,
            min_integer_digits,
            max_fraction_digits,
            min_fraction_digits,
            grouping,
            shift,
        }
    }

    fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    fn is_fraction(&self, index: usize) -> bool {
        self.point.is_some_and(|point| index > point) && index < self.fraction_end
    }

    fn render(&self, mut decimal: Decimal) -> String {
        let mut exponent = 0;
        if self.scientific {
            let integer_count = self.integer_placeholders.max(1);
            if !decimal.is_zero() {
                decimal.round_significant(integer_count + self.max_fraction_digits);
                exponent = decimal.exponent() - integer_count as i32;
                decimal.shift(-exponent);
            }
        } else {
            decimal.round_fraction(self.max_fraction_digits);
        }

        let integer = format!(
            "{:0>width$}",
            decimal.integer_digits(),
            width = self.min_integer_digits
        );
        let integer: Vec<char> = integer.chars().collect();
        let fraction = format!(
            "{:0<width$}",
            decimal.fraction_digits(),
            width = self.min_fraction_digits
        );
        let fraction: Vec<char> = fraction.chars().collect();

        let mut output = String::new();
        let mut placeholder = 0;
        let mut fraction_index = 0;

        let push_integer_digit = |output: &mut String, position: usize| {
            output.push(integer[position]);
            let remaining = integer.len() - position - 1;
            if self.grouping && remaining > 0 && remaining % 3 == 0 {
                output.push(',');
            }
        };

        for (index, token) in self.tokens.iter().enumerate() {
            match token {
                Token::Digit { .. } if index < self.integer_end => {
                    let count = self.integer_placeholders;
                    if placeholder == 0 && integer.len() > count {
                        for position in 0..integer.len() - count {
                            push_integer_digit(&mut output, position);
                        }
                    }
                    let position = integer.len() as isize - count as isize + placeholder as isize;
                    if position >= 0 {
                        push_integer_digit(&mut output, position as usize);
                    }
                    placeholder += 1;
                }
                Token::Digit { .. } if self.is_fraction(index) => {
                    if let Some(digit) = fraction.get(fraction_index) {
                        output.push(*digit);
                    }
                    fraction_index += 1;
                }
                Token::Digit { .. } => {}
                Token::Point if self.point == Some(index) => {
                    if self.integer_placeholders == 0 {
                        for position in 0..integer.len() {
                            push_integer_digit(&mut output, position);
                        }
                    }
                    if !fraction.is_empty() {
                        output.push('.');
                    }
                }
                Token::Point | Token::Group => {}
                Token::Percent => output.push('%'),
                Token::PerMille => output.push('‰'),
                Token::Exponent {
                    upper,
                    always_sign,
                    min_digits,
                } => {
                    output.push(if *upper { 'E' } else { 'e' });
                    output.push_str(&exponent_text(exponent, *always_sign, *min_digits));
                }
                Token::Literal(text) => output.push_str(text),
            }
        }

        output
    }
}

fn format_custom(sections: &[Section], number: Number) -> String {
    let negative = number.is_negative();
    let zero = number.is_zero();

    let pick_negative = |sections: &[Section]| match sections.get(1) {
        Some(section) if !section.is_empty() => (1, false),
        _ => (0, true),
    };
    let (index, add_sign) = match sections.len() {
        0 | 1 => (0, negative),
        2 if negative => pick_negative(sections),
        2 => (0, false),
        _ if zero && !sections[2].is_empty() => (2, false),
        _ if negative => pick_negative(sections),
        _ => (0, false),
    };

    let Some(section) = sections.get(index) else {
        return number.plain();
    };

    let mut decimal = number.to_decimal();
    decimal.negative = false;
    decimal.shift(section.shift);

    let text = section.render(decimal.clone());
    let mut rounded = decimal;
    if !section.scientific {
        rounded.round_fraction(section.max_fraction_digits);
    }

    if add_sign && !rounded.is_zero() {
        format!("-{}", text)
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::{Number, NumberPattern};

    fn format(pattern: &str, number: Number) -> String {
        NumberPattern::parse(pattern)
            .unwrap()
            .format(number)
            .unwrap()
    }

    #[test]
    fn fixed_and_number_patterns() {
        assert_eq!(format("F2", Number::Float(1234.5)), "1234.50");
        assert_eq!(format("F", Number::Integer(7)), "7.00");
        assert_eq!(format("F0", Number::Float(2.5)), "3");
        assert_eq!(format("N2", Number::Float(1234.5)), "1,234.50");
        assert_eq!(format("N0", Number::Integer(-1234567)), "-1,234,567");
        assert_eq!(format("n1", Number::Float(-0.04)), "0.0");
    }

    #[test]
    fn decimal_pattern_pads_integers() {
        assert_eq!(format("D5", Number::Integer(42)), "00042");
        assert_eq!(format("D", Number::Integer(-42)), "-42");
        assert_eq!(format("D3", Number::Unsigned(0)), "000");
    }

    #[test]
    fn decimal_and_hex_reject_floats() {
        let pattern = NumberPattern::parse("D2").unwrap();
        assert!(pattern.format(Number::Float(1.5)).is_err());

        let pattern = NumberPattern::parse("X").unwrap();
        assert!(pattern.format(Number::Float(1.5)).is_err());
    }

    #[test]
    fn hex_pattern() {
        assert_eq!(format("X", Number::Integer(255)), "FF");
        assert_eq!(format("x4", Number::Unsigned(255)), "00ff");
        assert_eq!(format("X", Number::Integer(-1)), "FFFFFFFFFFFFFFFF");
    }

    #[test]
    fn exponent_pattern() {
        assert_eq!(format("E", Number::Float(1234.5678)), "1.234568E+003");
        assert_eq!(format("e2", Number::Integer(-15)), "-1.50e+001");
        assert_eq!(format("E1", Number::Float(0.0)), "0.0E+000");
    }

    #[test]
    fn percent_and_currency_patterns() {
        assert_eq!(format("P", Number::Float(0.1234)), "12.34 %");
        assert_eq!(format("P0", Number::Integer(1)), "100 %");
        assert_eq!(format("C", Number::Float(1234.567)), "¤1,234.57");
        assert_eq!(format("C0", Number::Integer(-5)), "-¤5");
    }

    #[test]
    fn general_pattern() {
        assert_eq!(format("G", Number::Float(1.5)), "1.5");
        assert_eq!(format("G", Number::Integer(123456789)), "123456789");
        assert_eq!(format("G", Number::Float(1e15)), "1E+15");
        assert_eq!(format("G", Number::Float(0.00001)), "1E-05");
        assert_eq!(format("G3", Number::Float(1234.5)), "1.23E+03");
        assert_eq!(format("G5", Number::Float(1234.5)), "1234.5");
        assert_eq!(format("R", Number::Float(0.1)), "0.1");
    }

    #[test]
    fn unknown_standard_specifier_is_an_error() {
        assert!(NumberPattern::parse("Q2").is_err());
        assert!(NumberPattern::parse("K").is_err());
    }

    #[test]
    fn custom_placeholders() {
        assert_eq!(format("0.00", Number::Float(2.5)), "2.50");
        assert_eq!(format("0.00", Number::Integer(5)), "5.00");
        assert_eq!(format("000", Number::Integer(7)), "007");
        assert_eq!(format("#.##", Number::Float(0.5)), ".5");
        assert_eq!(format("#", Number::Integer(0)), "");
        assert_eq!(format("0.0#", Number::Integer(5)), "5.0");
        assert_eq!(format("#,##0.00", Number::Float(-1234567.891)), "-1,234,567.89");
    }

    #[test]
    fn custom_literals_interleave_with_digits() {
        assert_eq!(
            format("(###) ###-####", Number::Unsigned(5551234567)),
            "(555) 123-4567"
        );
        assert_eq!(format("0 'kg'", Number::Integer(12)), "12 kg");
        assert_eq!(format("\\#0", Number::Integer(3)), "#3");
    }

    #[test]
    fn custom_scaling_and_percent() {
        assert_eq!(format("0,", Number::Integer(12_345)), "12");
        assert_eq!(format("0,,.0", Number::Integer(2_500_000)), "2.5");
        assert_eq!(format("0%", Number::Float(0.25)), "25%");
    }

    #[test]
    fn custom_sections() {
        assert_eq!(format("0.0;(0.0)", Number::Float(-1.25)), "(1.3)");
        assert_eq!(format("0.0;(0.0);zero", Number::Integer(0)), "zero");
        assert_eq!(format("0;", Number::Integer(-3)), "-3");
    }

    #[test]
    fn custom_exponent() {
        assert_eq!(format("0.00E+00", Number::Float(12345.0)), "1.23E+04");
        assert_eq!(format("0.0e0", Number::Float(0.00123)), "1.2e-3");
    }

    #[test]
    fn unterminated_quote_is_an_error() {
        assert!(NumberPattern::parse("0 'kg").is_err());
        assert!(NumberPattern::parse("0\\").is_err());
    }

    #[test]
    fn non_finite_values() {
        assert_eq!(format("N2", Number::Float(f64::NAN)), "NaN");
        assert_eq!(format("0.0", Number::Float(f64::NEG_INFINITY)), "-Infinity");
    }
}
