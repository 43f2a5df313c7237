use chrono::{
  Datelike,
  Duration,
  NaiveDate
};

pub const ISO_DATE_FORMAT: &str =
  "%Y-%m-%d";

const GRID_SHORT_LEN: usize = 35;
const GRID_LONG_LEN: usize = 42;

/// An inclusive span of calendar days.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
)]
pub struct DateRange {
  pub start: NaiveDate,
  pub end:   NaiveDate
}

impl DateRange {
  #[must_use]
  pub fn new(
    start: NaiveDate,
    end: NaiveDate
  ) -> Self {
    Self {
      start,
      end
    }
  }

  #[must_use]
  pub fn single(day: NaiveDate) -> Self {
    Self::new(day, day)
  }

  /// Orders the bounds regardless of
  /// which one was given first.
  #[must_use]
  pub fn normalized(
    a: NaiveDate,
    b: NaiveDate
  ) -> Self {
    Self::new(a.min(b), a.max(b))
  }

  pub fn contains(
    &self,
    day: NaiveDate
  ) -> bool {
    self.start <= day && day <= self.end
  }

  pub fn overlaps(
    &self,
    other: &DateRange
  ) -> bool {
    self.end >= other.start
      && self.start <= other.end
  }

  /// Number of days from start to end;
  /// zero for a one-day range.
  pub fn span_days(&self) -> i64 {
    difference_in_calendar_days(
      self.end, self.start
    )
  }

  pub fn shifted(
    &self,
    days: i64
  ) -> Self {
    Self::new(
      add_days(self.start, days),
      add_days(self.end, days)
    )
  }
}

#[must_use]
pub fn to_iso_date(
  date: NaiveDate
) -> String {
  date.format(ISO_DATE_FORMAT).to_string()
}

/// Parses `YYYY-MM-DD`. A missing, zero
/// or non-numeric month/day becomes 1 and
/// segments past the day are ignored.
pub fn parse_iso_date(
  raw: &str
) -> Option<NaiveDate> {
  let trimmed = raw.trim();
  if trimmed.is_empty() {
    return None;
  }

  let mut parts = trimmed.split('-');
  let year = parts
    .next()?
    .trim()
    .parse::<i32>()
    .ok()?;
  let month =
    parse_lenient_component(parts.next());
  let day =
    parse_lenient_component(parts.next());

  let parsed =
    NaiveDate::from_ymd_opt(year, month, day);
  if parsed.is_none() {
    tracing::trace!(
      raw = %trimmed,
      "date components out of range"
    );
  }
  parsed
}

fn parse_lenient_component(
  raw: Option<&str>
) -> u32 {
  match raw
    .and_then(|raw| {
      raw.trim().parse::<u32>().ok()
    }) {
    | None | Some(0) => 1,
    | Some(value) => value
  }
}

#[must_use]
pub fn add_days(
  date: NaiveDate,
  days: i64
) -> NaiveDate {
  date
    .checked_add_signed(Duration::days(
      days
    ))
    .unwrap_or(date)
}

/// Whole calendar days from `b` to `a`.
#[must_use]
pub fn difference_in_calendar_days(
  a: NaiveDate,
  b: NaiveDate
) -> i64 {
  a.signed_duration_since(b).num_days()
}

#[must_use]
pub fn start_of_month(
  date: NaiveDate
) -> NaiveDate {
  date.with_day(1).unwrap_or(date)
}

#[must_use]
pub fn end_of_month(
  date: NaiveDate
) -> NaiveDate {
  let first = start_of_month(date);
  let (year, month) =
    if first.month() >= 12 {
      (first.year().saturating_add(1), 1)
    } else {
      (first.year(), first.month() + 1)
    };
  NaiveDate::from_ymd_opt(year, month, 1)
    .map(|next| add_days(next, -1))
    .unwrap_or(date)
}

#[must_use]
pub fn days_in_month(
  date: NaiveDate
) -> u32 {
  end_of_month(date).day()
}

/// Moves by whole months, clamping the
/// day to the target month's length.
#[must_use]
pub fn shift_months(
  date: NaiveDate,
  months: i32
) -> NaiveDate {
  let total = date.year() * 12
    + date.month0() as i32
    + months;
  let year = total.div_euclid(12);
  let month = total.rem_euclid(12) as u32 + 1;

  let Some(first) =
    NaiveDate::from_ymd_opt(year, month, 1)
  else {
    return date;
  };
  let day =
    date.day().min(days_in_month(first));
  first.with_day(day).unwrap_or(first)
}

/// ISO weekday, Monday = 1 through
/// Sunday = 7.
#[must_use]
pub fn iso_weekday(
  date: NaiveDate
) -> u32 {
  date.weekday().number_from_monday()
}

pub fn days_in_range(
  start: NaiveDate,
  end: NaiveDate
) -> impl Iterator<Item = NaiveDate> {
  start
    .iter_days()
    .take_while(move |day| *day <= end)
}

/// The whole weeks displayed for one
/// month, Monday first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthGrid {
  month: NaiveDate,
  days:  Vec<NaiveDate>
}

impl MonthGrid {
  /// First day of the displayed month.
  pub fn month(&self) -> NaiveDate {
    self.month
  }

  pub fn start(&self) -> NaiveDate {
    self.days[0]
  }

  pub fn end(&self) -> NaiveDate {
    self.days[self.days.len() - 1]
  }

  pub fn days(&self) -> &[NaiveDate] {
    &self.days
  }

  pub fn len(&self) -> usize {
    self.days.len()
  }

  pub fn is_empty(&self) -> bool {
    self.days.is_empty()
  }

  pub fn weeks(
    &self
  ) -> impl Iterator<Item = &[NaiveDate]> {
    self.days.chunks(7)
  }

  pub fn is_in_month(
    &self,
    day: NaiveDate
  ) -> bool {
    day.year() == self.month.year()
      && day.month() == self.month.month()
  }

  /// The first `weeks` rows of the
  /// grid as an inclusive range.
  pub fn window(
    &self,
    weeks: u8
  ) -> DateRange {
    let start = self.start();
    DateRange::new(
      start,
      add_days(
        start,
        i64::from(weeks) * 7 - 1
      )
    )
  }
}

#[tracing::instrument]
pub fn month_grid(
  anchor: NaiveDate
) -> MonthGrid {
  let first = start_of_month(anchor);
  let last = end_of_month(anchor);
  let offset =
    i64::from(iso_weekday(first)) - 1;
  let grid_start = add_days(first, -offset);

  let covered = difference_in_calendar_days(
    last, grid_start
  ) + 1;
  let len = if covered <= GRID_SHORT_LEN as i64 {
    GRID_SHORT_LEN
  } else {
    GRID_LONG_LEN
  };

  let days = days_in_range(
    grid_start,
    add_days(grid_start, len as i64 - 1)
  )
  .collect::<Vec<_>>();
  tracing::debug!(
    month = %to_iso_date(first),
    grid_start = %to_iso_date(grid_start),
    cells = days.len(),
    "computed month grid"
  );

  MonthGrid {
    month: first,
    days
  }
}

pub mod iso_date_serde {
  use chrono::NaiveDate;
  use serde::{
    Deserialize,
    Deserializer,
    Serializer
  };

  pub fn serialize<S>(
    date: &NaiveDate,
    serializer: S
  ) -> Result<S::Ok, S::Error>
  where
    S: Serializer
  {
    serializer.serialize_str(
      &super::to_iso_date(*date)
    )
  }

  pub fn deserialize<'de, D>(
    deserializer: D
  ) -> Result<NaiveDate, D::Error>
  where
    D: Deserializer<'de>
  {
    let raw =
      String::deserialize(deserializer)?;
    super::parse_iso_date(&raw).ok_or_else(
      || {
        serde::de::Error::custom(format!(
          "invalid date: {raw:?}"
        ))
      }
    )
  }
}

#[cfg(test)]
mod tests {
  use chrono::{
    Datelike,
    NaiveDate
  };

  use super::*;

  fn date(
    y: i32,
    m: u32,
    d: u32
  ) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d)
      .expect("valid date")
  }

  #[test]
  fn iso_dates_round_trip() {
    for day in days_in_range(
      date(2023, 12, 25),
      date(2025, 3, 5)
    ) {
      assert_eq!(
        parse_iso_date(&to_iso_date(day)),
        Some(day)
      );
    }
  }

  #[test]
  fn parsing_defaults_missing_parts() {
    assert_eq!(
      parse_iso_date("2024"),
      Some(date(2024, 1, 1))
    );
    assert_eq!(
      parse_iso_date("2024-07"),
      Some(date(2024, 7, 1))
    );
    assert_eq!(
      parse_iso_date(" 2024-07-00 "),
      Some(date(2024, 7, 1))
    );
    assert_eq!(
      parse_iso_date("2024-07-xx"),
      Some(date(2024, 7, 1))
    );
    assert_eq!(
      parse_iso_date("2024-07-05-extra"),
      Some(date(2024, 7, 5))
    );
    assert_eq!(parse_iso_date("tomorrow"), None);
    assert_eq!(parse_iso_date("2024-02-30"), None);
    assert_eq!(parse_iso_date(""), None);
  }

  #[test]
  fn calendar_day_difference() {
    assert_eq!(
      difference_in_calendar_days(
        date(2024, 3, 31),
        date(2024, 3, 30)
      ),
      1
    );
    assert_eq!(
      difference_in_calendar_days(
        date(2024, 1, 10),
        date(2024, 1, 13)
      ),
      -3
    );
    assert_eq!(
      add_days(date(2024, 2, 28), 2),
      date(2024, 3, 1)
    );
  }

  #[test]
  fn month_bounds_and_shifts() {
    assert_eq!(
      end_of_month(date(2024, 2, 10)),
      date(2024, 2, 29)
    );
    assert_eq!(
      end_of_month(date(2023, 12, 3)),
      date(2023, 12, 31)
    );
    assert_eq!(
      shift_months(date(2024, 1, 31), 1),
      date(2024, 2, 29)
    );
    assert_eq!(
      shift_months(date(2024, 1, 15), -1),
      date(2023, 12, 15)
    );
    assert_eq!(
      shift_months(date(2024, 11, 1), 14),
      date(2026, 1, 1)
    );
  }

  #[test]
  fn iso_weekday_is_monday_based() {
    assert_eq!(iso_weekday(date(2024, 1, 1)), 1);
    assert_eq!(iso_weekday(date(2024, 1, 7)), 7);
  }

  #[test]
  fn every_month_grid_is_whole_weeks() {
    let mut month = date(2020, 1, 1);
    while month < date(2030, 1, 1) {
      let grid = month_grid(month);
      assert!(
        grid.len() == 35 || grid.len() == 42
      );
      assert_eq!(iso_weekday(grid.start()), 1);
      for (idx, day) in
        grid.days().iter().enumerate()
      {
        assert_eq!(
          *day,
          add_days(grid.start(), idx as i64)
        );
      }
      assert!(grid.days().contains(&month));
      assert!(
        grid.days().contains(&end_of_month(month))
      );
      month = shift_months(month, 1);
    }
  }

  #[test]
  fn sunday_first_month_starts_six_days_early() {
    // September 2024 starts on a Sunday and needs six rows.
    let grid = month_grid(date(2024, 9, 18));
    assert_eq!(grid.start(), date(2024, 8, 26));
    assert_eq!(grid.len(), 42);
    assert_eq!(grid.month().day(), 1);

    // June 2025 also starts on a Sunday but ends on a Monday of row six.
    let grid = month_grid(date(2025, 6, 1));
    assert_eq!(grid.start(), date(2025, 5, 26));
    assert_eq!(grid.len(), 42);

    // February 2026 starts on a Sunday and fits in five rows.
    let grid = month_grid(date(2026, 2, 1));
    assert_eq!(grid.start(), date(2026, 1, 26));
    assert_eq!(grid.len(), 35);
  }

  #[test]
  fn grid_window_covers_leading_weeks() {
    let grid = month_grid(date(2024, 1, 1));
    let window = grid.window(2);
    assert_eq!(window.start, date(2024, 1, 1));
    assert_eq!(window.end, date(2024, 1, 14));
  }

  #[test]
  fn normalized_range_orders_bounds() {
    let range = DateRange::normalized(
      date(2024, 5, 9),
      date(2024, 5, 3)
    );
    assert_eq!(range.start, date(2024, 5, 3));
    assert_eq!(range.end, date(2024, 5, 9));
    assert_eq!(range.span_days(), 6);
    assert!(range.contains(date(2024, 5, 9)));
  }
}
