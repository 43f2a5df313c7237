use chrono::NaiveDate;

use crate::datetime::{
  DateRange,
  MonthGrid
};
use crate::task::{
  Category,
  Task,
  TaskId
};

pub const WEEKDAY_LABELS: [&str; 7] = [
  "Mon", "Tue", "Wed", "Thu", "Fri",
  "Sat", "Sun"
];

/// One task's bar on one day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChipSegment {
  pub task_id:   TaskId,
  pub name:      String,
  pub category:  Category,
  pub color:     &'static str,
  /// Leading corner is rounded and the
  /// start handle is drawn here.
  pub is_start:  bool,
  /// Trailing corner is rounded and the
  /// end handle is drawn here.
  pub is_end:    bool,
  pub video_url: Option<String>,
  pub tooltip:   String
}

impl ChipSegment {
  fn for_day(
    task: &Task,
    day: NaiveDate
  ) -> Self {
    Self {
      task_id:   task.id.clone(),
      name:      task.name.clone(),
      category:  task.category,
      color:     task.category.color(),
      is_start:  task.start == day,
      is_end:    task.end == day,
      video_url: task.video_url.clone(),
      tooltip:   format!(
        "{} ({} \u{2192} {})",
        task.name,
        task.start.format("%Y-%m-%d"),
        task.end.format("%Y-%m-%d")
      )
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayCell {
  pub date:     NaiveDate,
  pub in_month: bool,
  pub is_today: bool,
  pub selected: bool,
  pub chips:    Vec<ChipSegment>
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthLayout {
  pub title: String,
  pub cells: Vec<DayCell>
}

impl MonthLayout {
  pub fn weeks(
    &self
  ) -> impl Iterator<Item = &[DayCell]> {
    self.cells.chunks(7)
  }

  pub fn cell(
    &self,
    date: NaiveDate
  ) -> Option<&DayCell> {
    self
      .cells
      .iter()
      .find(|cell| cell.date == date)
  }
}

#[must_use]
pub fn month_title(
  grid: &MonthGrid
) -> String {
  grid.month().format("%B %Y").to_string()
}

/// Places every task on each grid day
/// its inclusive range covers. `tasks`
/// should already carry any preview.
#[tracing::instrument(skip(
  grid, tasks, selection
))]
pub fn layout_month(
  grid: &MonthGrid,
  tasks: &[Task],
  selection: Option<DateRange>,
  today: NaiveDate
) -> MonthLayout {
  let cells = grid
    .days()
    .iter()
    .map(|&date| DayCell {
      date,
      in_month: grid.is_in_month(date),
      is_today: date == today,
      selected: selection
        .is_some_and(|range| {
          range.contains(date)
        }),
      chips: tasks
        .iter()
        .filter(|task| task.covers(date))
        .map(|task| {
          ChipSegment::for_day(task, date)
        })
        .collect()
    })
    .collect::<Vec<_>>();

  tracing::trace!(
    cells = cells.len(),
    chips = cells
      .iter()
      .map(|cell| cell.chips.len())
      .sum::<usize>(),
    "laid out month"
  );

  MonthLayout {
    title: month_title(grid),
    cells
  }
}
