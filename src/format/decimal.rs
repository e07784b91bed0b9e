/// Decimal expansion of a number: `0.d1 d2 d3 ... x 10^exponent`.
///
/// Digits carry no leading or trailing zeros; zero has no digits. Rounding is
/// half away from zero on the expansion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Decimal {
    pub(crate) negative: bool,
    digits: Vec<u8>,
    exponent: i32,
}

/// Significant digits kept when expanding a float. Far beyond the 17 digits
/// that identify an `f64`, so ties are only seen on exact halves.
const FLOAT_DIGITS: usize = 40;

impl Decimal {
    pub(crate) fn from_i64(value: i64) -> Self {
        Self::from_integer_text(value < 0, &value.unsigned_abs().to_string())
    }

    pub(crate) fn from_u64(value: u64) -> Self {
        Self::from_integer_text(false, &value.to_string())
    }

    /// Expansion of the exact binary value, to be rounded by the caller.
    pub(crate) fn from_f64(value: f64) -> Self {
        let text = format!("{:.*e}", FLOAT_DIGITS, value.abs());
        Self::from_scientific_text(value.is_sign_negative() && value != 0.0, &text)
    }

    /// Shortest expansion that reads back as the same `f64`.
    pub(crate) fn from_f64_shortest(value: f64) -> Self {
        let text = format!("{:e}", value.abs());
        Self::from_scientific_text(value.is_sign_negative() && value != 0.0, &text)
    }

    fn from_integer_text(negative: bool, text: &str) -> Self {
        let digits: Vec<u8> = text.bytes().map(|byte| byte - b'0').collect();
        let mut decimal = Decimal {
            negative,
            exponent: digits.len() as i32,
            digits,
        };
        decimal.normalize();
        decimal
    }

    fn from_scientific_text(negative: bool, text: &str) -> Self {
        let (mantissa, exponent) = text.split_once('e').unwrap_or((text, "0"));
        let exponent: i32 = exponent.parse().unwrap_or(0);
        let digits: Vec<u8> = mantissa
            .bytes()
            .filter(u8::is_ascii_digit)
            .map(|byte| byte - b'0')
            .collect();

        let mut decimal = Decimal {
            negative,
            digits,
            exponent: exponent + 1,
        };
        decimal.normalize();
        decimal
    }

    fn normalize(&mut self) {
        let leading = self.digits.iter().take_while(|digit| **digit == 0).count();
        if leading > 0 {
            self.digits.drain(..leading);
            self.exponent -= leading as i32;
        }
        while self.digits.last() == Some(&0) {
            self.digits.pop();
        }
        if self.digits.is_empty() {
            self.exponent = 0;
        }
    }

    pub(crate) fn is_zero(&self) -> bool {
        self.digits.is_empty()
    }

    /// Position of the decimal point relative to the first digit.
    pub(crate) fn exponent(&self) -> i32 {
        self.exponent
    }

    /// Multiplies by `10^places`.
    pub(crate) fn shift(&mut self, places: i32) {
        if !self.is_zero() {
            self.exponent += places;
        }
    }

    /// Rounds to `places` digits after the decimal point.
    pub(crate) fn round_fraction(&mut self, places: usize) {
        self.round_at(self.exponent + places as i32);
    }

    /// Rounds to `count` significant digits.
    pub(crate) fn round_significant(&mut self, count: usize) {
        self.round_at(count as i32);
    }

    fn round_at(&mut self, cut: i32) {
        if self.is_zero() || cut >= self.digits.len() as i32 {
            return;
        }
        if cut < 0 {
            self.digits.clear();
            self.exponent = 0;
            return;
        }

        let cut = cut as usize;
        let round_up = self.digits[cut] >= 5;
        self.digits.truncate(cut);

        if round_up {
            let mut carry = true;
            for digit in self.digits.iter_mut().rev() {
                if *digit == 9 {
                    *digit = 0;
                } else {
                    *digit += 1;
                    carry = false;
                    break;
                }
            }
            if carry {
                self.digits.insert(0, 1);
                self.exponent += 1;
            }
        }

        self.normalize();
    }

    /// Digits left of the decimal point, empty when the value is below one.
    pub(crate) fn integer_digits(&self) -> String {
        if self.exponent <= 0 {
            return String::new();
        }
        let point = self.exponent as usize;
        let mut text: String = self
            .digits
            .iter()
            .take(point)
            .map(|digit| char::from(b'0' + digit))
            .collect();
        for _ in self.digits.len()..point {
            text.push('0');
        }
        text
    }

    /// Digits right of the decimal point, without trailing zeros.
    pub(crate) fn fraction_digits(&self) -> String {
        let mut text = String::new();
        if self.exponent < 0 {
            for _ in 0..-self.exponent {
                text.push('0');
            }
        }
        let skip = self.exponent.max(0) as usize;
        text.extend(
            self.digits
                .iter()
                .skip(skip)
                .map(|digit| char::from(b'0' + digit)),
        );
        text
    }

    pub(crate) fn significant_digits(&self) -> String {
        self.digits
            .iter()
            .map(|digit| char::from(b'0' + digit))
            .collect()
    }
}
