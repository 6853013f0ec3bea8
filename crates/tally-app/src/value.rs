// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use thiserror::Error;

const MAX_ABS_CENTS: f64 = 1.0e15;

/// Money, held as whole cents so sums are exact and `== 0` is meaningful.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Cents(i64);

impl Cents {
    pub const ZERO: Self = Self(0);

    pub const fn new(cents: i64) -> Self {
        Self(cents)
    }

    pub const fn get(self) -> i64 {
        self.0
    }

    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Rounds a dollar amount to the nearest cent.
    pub fn from_dollars(dollars: f64) -> Self {
        Self((dollars * 100.0).round() as i64)
    }

    pub fn to_dollars(self) -> f64 {
        self.0 as f64 / 100.0
    }

    pub fn saturating_add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }

    pub fn saturating_sub(self, other: Self) -> Self {
        Self(self.0.saturating_sub(other.0))
    }
}

/// Derived money at 1/10,000 of a cent. Whole cents scaled by at most two
/// whole percents land exactly on this grid, so to-pay and due are never
/// rounded before they are shown or summed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct ExactMoney(i128);

impl ExactMoney {
    pub const ZERO: Self = Self(0);
    const PER_CENT: i128 = 10_000;

    pub fn from_cents(cents: Cents) -> Self {
        Self(i128::from(cents.get()) * Self::PER_CENT)
    }

    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// `self x percent / 100`.
    pub fn percent_of(self, percent: Percent) -> Self {
        Self(self.0.saturating_mul(i128::from(percent.get())) / 100)
    }

    pub fn saturating_add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }

    /// Nearest cent, half away from zero, saturating at the `i64` range.
    pub fn round_to_cents(self) -> Cents {
        let half = if self.0 < 0 {
            -Self::PER_CENT / 2
        } else {
            Self::PER_CENT / 2
        };
        let cents = self.0.saturating_add(half) / Self::PER_CENT;
        Cents(i64::try_from(cents).unwrap_or(if cents < 0 { i64::MIN } else { i64::MAX }))
    }
}

/// A fraction kept at whole-percent granularity: `Percent::new(50)` is 0.5.
/// Parsed and loaded values stay within `0..=100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Percent(i64);

impl Percent {
    pub const ZERO: Self = Self(0);
    pub const WHOLE: Self = Self(100);

    pub const fn new(percent: i64) -> Self {
        Self(percent)
    }

    pub const fn get(self) -> i64 {
        self.0
    }

    /// Rounds to a whole percent and clamps into `0..=100`.
    pub fn from_fraction(fraction: f64) -> Self {
        Self(((fraction * 100.0).round() as i64).clamp(Self::ZERO.0, Self::WHOLE.0))
    }

    pub const fn complement(self) -> Self {
        Self(Self::WHOLE.0 - self.0)
    }

    pub fn fraction(self) -> f64 {
        self.0 as f64 / 100.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CellValue {
    Money(Cents),
    ExactMoney(ExactMoney),
    Percent(Percent),
    Text(String),
}

impl CellValue {
    pub fn as_money(&self) -> Cents {
        match self {
            Self::Money(cents) => *cents,
            Self::ExactMoney(exact) => exact.round_to_cents(),
            _ => Cents::ZERO,
        }
    }

    pub fn as_exact(&self) -> ExactMoney {
        match self {
            Self::Money(cents) => ExactMoney::from_cents(*cents),
            Self::ExactMoney(exact) => *exact,
            _ => ExactMoney::ZERO,
        }
    }

    pub fn as_percent(&self) -> Percent {
        match self {
            Self::Percent(percent) => *percent,
            _ => Percent::ZERO,
        }
    }

    pub fn as_text(&self) -> &str {
        match self {
            Self::Text(text) => text,
            _ => "",
        }
    }

    pub fn display(&self) -> String {
        match self {
            Self::Money(cents) => format_money(*cents),
            Self::ExactMoney(exact) => format_money(exact.round_to_cents()),
            Self::Percent(percent) => format_percent(*percent),
            Self::Text(text) => text.clone(),
        }
    }

    pub const fn format(&self) -> ValueFormat {
        match self {
            Self::Money(_) | Self::ExactMoney(_) => ValueFormat::Money,
            Self::Percent(_) => ValueFormat::Percent,
            Self::Text(_) => ValueFormat::Text,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("{input:?} is not a number")]
    NotANumber { input: String },
    #[error("{input:?} is out of range")]
    OutOfRange { input: String },
}

/// The formatter/parser pair of an input cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueFormat {
    Text,
    Money,
    Percent,
}

impl ValueFormat {
    pub fn parse(self, raw: &str) -> Result<CellValue, ParseError> {
        match self {
            Self::Text => Ok(CellValue::Text(raw.to_owned())),
            Self::Money => parse_money(raw).map(CellValue::Money),
            Self::Percent => parse_percent(raw).map(CellValue::Percent),
        }
    }

    pub const fn accepts(self, value: &CellValue) -> bool {
        matches!(
            (self, value),
            (Self::Text, CellValue::Text(_)) | (Self::Money, CellValue::Money(_))
        ) || matches!(
            (self, value),
            (Self::Percent, CellValue::Percent(percent))
                if percent.get() >= Percent::ZERO.get() && percent.get() <= Percent::WHOLE.get()
        )
    }
}

/// en-US currency: `$1,234.50`, `-$5.00`.
pub fn format_money(cents: Cents) -> String {
    let raw = cents.get();
    let sign = if raw < 0 { "-" } else { "" };
    let absolute = raw.unsigned_abs();
    let dollars = group_thousands(absolute / 100);
    let cents_component = absolute % 100;
    format!("{sign}${dollars}.{cents_component:02}")
}

pub fn format_percent(percent: Percent) -> String {
    format!("{}%", percent.get())
}

pub fn parse_money(raw: &str) -> Result<Cents, ParseError> {
    let cleaned: String = raw
        .chars()
        .filter(|ch| !matches!(ch, '$' | ',') && !ch.is_whitespace())
        .collect();
    let dollars = parse_number(&cleaned, raw)?;
    if (dollars * 100.0).abs() >= MAX_ABS_CENTS {
        return Err(ParseError::OutOfRange {
            input: raw.to_owned(),
        });
    }
    Ok(Cents::from_dollars(dollars))
}

pub fn parse_percent(raw: &str) -> Result<Percent, ParseError> {
    let cleaned: String = raw
        .chars()
        .filter(|ch| *ch != '%' && !ch.is_whitespace())
        .collect();
    let whole = parse_number(&cleaned, raw)?.round();
    if !(0.0..=100.0).contains(&whole) {
        return Err(ParseError::OutOfRange {
            input: raw.to_owned(),
        });
    }
    Ok(Percent::new(whole as i64))
}

fn parse_number(cleaned: &str, raw: &str) -> Result<f64, ParseError> {
    match cleaned.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(ParseError::NotANumber {
            input: raw.to_owned(),
        }),
    }
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::{
        CellValue, Cents, ExactMoney, ParseError, Percent, ValueFormat, format_money,
        format_percent, parse_money, parse_percent,
    };

    #[test]
    fn money_formats_like_en_us_currency() {
        assert_eq!(format_money(Cents::new(0)), "$0.00");
        assert_eq!(format_money(Cents::new(5)), "$0.05");
        assert_eq!(format_money(Cents::new(123_450)), "$1,234.50");
        assert_eq!(format_money(Cents::new(-500)), "-$5.00");
        assert_eq!(format_money(Cents::new(100_000_000)), "$1,000,000.00");
    }

    #[test]
    fn money_parse_strips_symbols_and_rounds_to_cents() {
        assert_eq!(parse_money("$1,234.567"), Ok(Cents::new(123_457)));
        assert_eq!(parse_money(" 42 "), Ok(Cents::new(4_200)));
        assert_eq!(parse_money("-$3.10"), Ok(Cents::new(-310)));
    }

    #[test]
    fn money_parse_rejects_garbage() {
        assert_eq!(
            parse_money("lots"),
            Err(ParseError::NotANumber {
                input: "lots".to_owned()
            })
        );
        assert!(parse_money("").is_err());
        assert!(parse_money("inf").is_err());
        assert!(matches!(
            parse_money("1e20"),
            Err(ParseError::OutOfRange { .. })
        ));
    }

    #[test]
    fn percent_round_trips_through_whole_percent() {
        assert_eq!(parse_percent("50%"), Ok(Percent::new(50)));
        assert_eq!(parse_percent("33.4"), Ok(Percent::new(33)));
        assert_eq!(parse_percent("12.5 %"), Ok(Percent::new(13)));
        assert_eq!(format_percent(Percent::new(20)), "20%");
        assert!((Percent::new(20).fraction() - 0.2).abs() < f64::EPSILON);
        assert_eq!(Percent::from_fraction(0.333), Percent::new(33));
    }

    #[test]
    fn percent_bounds_reject_parse_and_clamp_load() {
        assert_eq!(parse_percent("100%"), Ok(Percent::WHOLE));
        assert_eq!(parse_percent("0"), Ok(Percent::ZERO));
        assert!(matches!(
            parse_percent("100000000000000%"),
            Err(ParseError::OutOfRange { .. })
        ));
        assert!(matches!(
            parse_percent("-5"),
            Err(ParseError::OutOfRange { .. })
        ));
        assert_eq!(Percent::from_fraction(1e12), Percent::WHOLE);
        assert_eq!(Percent::from_fraction(-0.5), Percent::ZERO);
    }

    #[test]
    fn exact_money_rounds_once_half_away_from_zero() {
        let half_paid = |cents: i64| {
            ExactMoney::from_cents(Cents::new(cents)).percent_of(Percent::new(50))
        };
        assert_eq!(half_paid(10_000).round_to_cents(), Cents::new(5_000));
        assert_eq!(half_paid(3_333).round_to_cents(), Cents::new(1_667));
        assert_eq!(half_paid(-3_333).round_to_cents(), Cents::new(-1_667));

        let penny_at_49 = ExactMoney::from_cents(Cents::new(1)).percent_of(Percent::new(49));
        assert!(!penny_at_49.is_zero());
        assert_eq!(penny_at_49.round_to_cents(), Cents::ZERO);

        let three_cents = ExactMoney::from_cents(Cents::new(3));
        assert_eq!(
            three_cents.percent_of(Percent::new(50).complement()).round_to_cents(),
            Cents::new(2)
        );
    }

    #[test]
    fn exact_money_saturates_instead_of_wrapping() {
        let huge = ExactMoney::from_cents(Cents::new(i64::MAX));
        assert_eq!(huge.saturating_add(huge).round_to_cents(), Cents::new(i64::MAX));
        let negative = ExactMoney::from_cents(Cents::new(i64::MIN));
        assert_eq!(
            negative.saturating_add(negative).round_to_cents(),
            Cents::new(i64::MIN)
        );
        assert_eq!(
            CellValue::ExactMoney(huge).display(),
            CellValue::Money(Cents::new(i64::MAX)).display()
        );
    }

    #[test]
    fn text_format_is_identity_and_formats_gate_value_kinds() {
        assert_eq!(
            ValueFormat::Text.parse("1st of month"),
            Ok(CellValue::Text("1st of month".to_owned()))
        );
        assert!(ValueFormat::Money.accepts(&CellValue::Money(Cents::ZERO)));
        assert!(!ValueFormat::Money.accepts(&CellValue::Text(String::new())));
        assert!(!ValueFormat::Percent.accepts(&CellValue::Percent(Percent::new(101))));
        assert_eq!(CellValue::Percent(Percent::new(7)).display(), "7%");
    }
}
