//! Date expression grammar and date-range normalization.
//!
//! Search windows are entered as short expressions rather than calendar pickers. An
//! expression is one of, in priority order:
//!
//! 1. the empty string, an open end of the range;
//! 2. `today` or `yesterday`;
//! 3. a shorthand `-N` followed by `d`, `m` or `y`;
//! 4. a structured relative token, `1 year 2 months 3 days ago` or `1年2月3日前`, where any
//!    component may be omitted;
//! 5. an absolute date written `YYYY-MM-DD`, `YYYY/MM/DD` or `YYYY.MM.DD`.
//!
//! Every bounded form normalizes into a [`RelativeDate`], which resolves against `today` with
//! a simplified calendar: a year is 365 days and a month is 30 days. The approximation is
//! deliberate and must stay exact, because saved expressions are resolved again on every
//! search.
//!
//! # Examples
//!
//! ```
//! use arxnote::date::{DateExpression, DateRange, RelativeDate};
//! use chrono::NaiveDate;
//!
//! let today = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
//!
//! let expr: DateExpression = "0年1月0日前".parse().unwrap();
//! assert_eq!(expr, DateExpression::Relative(RelativeDate::new(0, 1, 0)));
//!
//! // End before start is swapped into order.
//! let range = DateRange::resolve_at("today", "-1y", today).unwrap();
//! assert!(range.start < range.end);
//! ```

use std::num::IntErrorKind;

use chrono::Days;

use super::*;

/// Days in a simplified-calendar year.
pub const DAYS_PER_YEAR: u64 = 365;

/// Days in a simplified-calendar month.
pub const DAYS_PER_MONTH: u64 = 30;

lazy_static! {
  static ref SHORTHAND: Regex = Regex::new(r"(?i)^-(\d+)\s*([dmy])$").unwrap();
  static ref STRUCTURED_EN: Regex = Regex::new(
    r"(?i)^(?:(\d+)\s*years?)?\s*,?\s*(?:(\d+)\s*months?)?\s*,?\s*(?:(\d+)\s*days?)?\s*ago$"
  )
  .unwrap();
  static ref STRUCTURED_JA: Regex =
    Regex::new(r"^(?:(\d+)\s*年)?\s*(?:(\d+)\s*(?:ヶ月|ヵ月|か月|カ月|月))?\s*(?:(\d+)\s*日)?\s*前$")
      .unwrap();
}

/// Separator styles accepted for absolute dates.
const ABSOLUTE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%Y.%m.%d"];

/// Today's date in the local time zone.
pub fn today() -> NaiveDate { Local::now().date_naive() }

/// A "Y years, M months, D days ago" offset from today.
///
/// This is the canonical form every bounded [`DateExpression`] normalizes into. Its
/// [`Display`] output is the structured token `Y年M月D日前`, which parses back into the same
/// value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RelativeDate {
  /// Whole years, 365 days each
  pub years:  u32,
  /// Whole months, 30 days each
  pub months: u32,
  /// Remaining days
  pub days:   u32,
}

impl RelativeDate {
  /// Creates an offset from its components.
  pub const fn new(years: u32, months: u32, days: u32) -> Self { Self { years, months, days } }

  /// Total offset in days under the simplified calendar.
  pub fn total_days(&self) -> u64 {
    u64::from(self.years) * DAYS_PER_YEAR
      + u64::from(self.months) * DAYS_PER_MONTH
      + u64::from(self.days)
  }

  /// Resolves the offset against `today`.
  ///
  /// Offsets reaching past the earliest representable date saturate to [`NaiveDate::MIN`].
  pub fn resolve_at(&self, today: NaiveDate) -> NaiveDate {
    today.checked_sub_days(Days::new(self.total_days())).unwrap_or(NaiveDate::MIN)
  }

  /// Expresses `target` as an offset from `today`.
  ///
  /// Dates in the future clamp to a zero offset. Years and months are carved out of the day
  /// difference with the same 365/30 day units used by [`RelativeDate::resolve_at`], so for
  /// any past date `RelativeDate::between(d, today).resolve_at(today) == d`.
  pub fn between(target: NaiveDate, today: NaiveDate) -> Self {
    let delta = u64::try_from((today - target).num_days().max(0)).unwrap_or_default();
    let rem = delta % DAYS_PER_YEAR;
    Self {
      years:  u32::try_from(delta / DAYS_PER_YEAR).unwrap_or(u32::MAX),
      months: (rem / DAYS_PER_MONTH) as u32,
      days:   (rem % DAYS_PER_MONTH) as u32,
    }
  }
}

impl Display for RelativeDate {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}年{}月{}日前", self.years, self.months, self.days)
  }
}

/// Which end of a range an expression describes.
///
/// Only matters for [`DateExpression::Unbounded`], which resolves to the earliest date for a
/// start and the latest date for an end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
  /// Lower end of the range
  Start,
  /// Upper end of the range
  End,
}

/// A parsed date expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateExpression {
  /// The empty expression: no limit on this end of the range
  Unbounded,
  /// A bounded expression, normalized into an offset from today
  Relative(RelativeDate),
}

impl DateExpression {
  /// Parses `input` with absolute dates measured against `today`.
  ///
  /// [`FromStr`] uses the local date; this variant exists so absolute dates can be tested
  /// against a fixed day.
  ///
  /// # Errors
  ///
  /// Returns [`ArxnoteError::UnparseableDateExpression`] carrying the original input when no
  /// rule of the grammar matches.
  pub fn parse_at(input: &str, today: NaiveDate) -> Result<Self> {
    let expr = input.trim();
    if expr.is_empty() {
      return Ok(Self::Unbounded);
    }

    match expr.to_lowercase().as_str() {
      "today" => return Ok(Self::Relative(RelativeDate::default())),
      "yesterday" => return Ok(Self::Relative(RelativeDate::new(0, 0, 1))),
      _ => {},
    }

    if let Some(caps) = SHORTHAND.captures(expr) {
      let n = parse_component(&caps[1], input)?;
      let relative = match caps[2].to_ascii_lowercase().as_str() {
        "d" => RelativeDate::new(0, 0, n),
        "m" => RelativeDate::new(0, n, 0),
        _ => RelativeDate::new(n, 0, 0),
      };
      return Ok(Self::Relative(relative));
    }

    for pattern in [&*STRUCTURED_EN, &*STRUCTURED_JA] {
      if let Some(caps) = pattern.captures(expr) {
        if caps.get(1).is_none() && caps.get(2).is_none() && caps.get(3).is_none() {
          break;
        }
        let component = |i: usize| {
          caps.get(i).map_or(Ok(0), |m| parse_component(m.as_str(), input))
        };
        return Ok(Self::Relative(RelativeDate::new(component(1)?, component(2)?, component(3)?)));
      }
    }

    ABSOLUTE_FORMATS
      .iter()
      .find_map(|format| NaiveDate::parse_from_str(expr, format).ok())
      .map(|date| Self::Relative(RelativeDate::between(date, today)))
      .ok_or_else(|| ArxnoteError::UnparseableDateExpression(input.to_string()))
  }

  /// Whether this is the open-ended expression.
  pub fn is_unbounded(&self) -> bool { matches!(self, Self::Unbounded) }

  /// Resolves the expression into a calendar date for the given end of a range.
  pub fn resolve_at(&self, bound: Bound, today: NaiveDate) -> NaiveDate {
    match (self, bound) {
      (Self::Unbounded, Bound::Start) => NaiveDate::MIN,
      (Self::Unbounded, Bound::End) => NaiveDate::MAX,
      (Self::Relative(relative), _) => relative.resolve_at(today),
    }
  }

  /// Resolves a bounded expression, or `None` when unbounded.
  pub fn date_at(&self, today: NaiveDate) -> Option<NaiveDate> {
    match self {
      Self::Unbounded => None,
      Self::Relative(relative) => Some(relative.resolve_at(today)),
    }
  }
}

impl FromStr for DateExpression {
  type Err = ArxnoteError;

  fn from_str(s: &str) -> Result<Self> { Self::parse_at(s, today()) }
}

/// Resolves a single expression against the local date; `None` means unbounded.
///
/// # Examples
///
/// ```
/// use arxnote::date::{resolve, today};
///
/// assert_eq!(resolve("today").unwrap(), Some(today()));
/// assert_eq!(resolve("").unwrap(), None);
/// ```
pub fn resolve(input: &str) -> Result<Option<NaiveDate>> {
  let today = today();
  Ok(DateExpression::parse_at(input, today)?.date_at(today))
}

/// An inclusive calendar range with open ends represented by [`NaiveDate::MIN`] and
/// [`NaiveDate::MAX`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
  /// First day included in the range
  pub start: NaiveDate,
  /// Last day included in the range
  pub end:   NaiveDate,
}

impl Default for DateRange {
  fn default() -> Self { Self::UNBOUNDED }
}

impl DateRange {
  /// The range that admits every date.
  pub const UNBOUNDED: Self = Self { start: NaiveDate::MIN, end: NaiveDate::MAX };

  /// Resolves a `(start, end)` pair of expressions against the local date.
  pub fn resolve(start: &str, end: &str) -> Result<Self> { Self::resolve_at(start, end, today()) }

  /// Resolves a `(start, end)` pair of expressions against `today`.
  ///
  /// Each end is resolved independently. When both ends are bounded and the end falls
  /// before the start, they are swapped. An open end never takes part in a swap.
  ///
  /// # Errors
  ///
  /// Returns [`ArxnoteError::UnparseableDateExpression`] if either expression is invalid.
  pub fn resolve_at(start: &str, end: &str, today: NaiveDate) -> Result<Self> {
    let start_expr = DateExpression::parse_at(start, today)?;
    let end_expr = DateExpression::parse_at(end, today)?;

    let mut range = Self {
      start: start_expr.resolve_at(Bound::Start, today),
      end:   end_expr.resolve_at(Bound::End, today),
    };

    if !start_expr.is_unbounded() && !end_expr.is_unbounded() && range.end < range.start {
      std::mem::swap(&mut range.start, &mut range.end);
    }

    trace!("Resolved date range {start:?}..{end:?} to {}..{}", range.start, range.end);
    Ok(range)
  }

  /// Whether `date` falls inside the range, both ends included.
  pub fn contains(&self, date: NaiveDate) -> bool { self.start <= date && date <= self.end }
}

/// Parses one numeric component of an expression. Components too large for `u32` saturate,
/// which resolves to [`NaiveDate::MIN`] anyway.
fn parse_component(digits: &str, input: &str) -> Result<u32> {
  match digits.parse::<u32>() {
    Ok(n) => Ok(n),
    Err(e) if *e.kind() == IntErrorKind::PosOverflow => Ok(u32::MAX),
    Err(_) => Err(ArxnoteError::UnparseableDateExpression(input.to_string())),
  }
}
