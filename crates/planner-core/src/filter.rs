use std::collections::BTreeSet;

use serde::{
  Deserialize,
  Serialize
};
use tracing::trace;

use crate::datetime::{
  DateRange,
  MonthGrid
};
use crate::task::{
  Category,
  Task
};

pub const MAX_WINDOW_WEEKS: u8 = 3;

#[derive(
  Debug,
  Clone,
  Copy,
  Default,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
)]
#[serde(try_from = "u8", into = "u8")]
pub enum TimeWindow {
  #[default]
  All,
  Weeks(u8)
}

impl TimeWindow {
  pub const CHOICES: [TimeWindow; 4] = [
    TimeWindow::All,
    TimeWindow::Weeks(1),
    TimeWindow::Weeks(2),
    TimeWindow::Weeks(3)
  ];

  pub fn from_weeks(
    weeks: u8
  ) -> Option<Self> {
    match weeks {
      | 0 => Some(TimeWindow::All),
      | 1..=MAX_WINDOW_WEEKS => {
        Some(TimeWindow::Weeks(weeks))
      }
      | _ => None
    }
  }

  pub fn weeks(self) -> u8 {
    match self {
      | TimeWindow::All => 0,
      | TimeWindow::Weeks(weeks) => weeks
    }
  }

  pub fn label(self) -> String {
    match self {
      | TimeWindow::All => {
        "All".to_string()
      }
      | TimeWindow::Weeks(weeks) => {
        format!("{weeks}w")
      }
    }
  }
}

impl TryFrom<u8> for TimeWindow {
  type Error = String;

  fn try_from(
    value: u8
  ) -> Result<Self, Self::Error> {
    TimeWindow::from_weeks(value)
      .ok_or_else(|| {
        format!(
          "time window must be 0..={MAX_WINDOW_WEEKS} weeks, got {value}"
        )
      })
  }
}

impl From<TimeWindow> for u8 {
  fn from(window: TimeWindow) -> Self {
    window.weeks()
  }
}

#[derive(
  Debug,
  Clone,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
)]
pub struct FilterState {
  pub categories:  BTreeSet<Category>,
  #[serde(rename = "timeWindowWeeks")]
  pub time_window: TimeWindow,
  pub search:      String
}

impl Default for FilterState {
  fn default() -> Self {
    Self {
      categories:  Category::ALL
        .into_iter()
        .collect(),
      time_window: TimeWindow::All,
      search:      String::new()
    }
  }
}

impl FilterState {
  pub fn toggle_category(
    &mut self,
    category: Category
  ) {
    if !self.categories.remove(&category)
    {
      self.categories.insert(category);
    }
  }

  pub fn set_time_window(
    &mut self,
    window: TimeWindow
  ) {
    self.time_window = window;
  }

  pub fn set_search(
    &mut self,
    search: impl Into<String>
  ) {
    self.search = search.into();
  }

  pub fn clear_search(&mut self) {
    self.search.clear();
  }

  /// The grid rows a task must overlap,
  /// or `None` when unrestricted.
  pub fn window_range(
    &self,
    grid: &MonthGrid
  ) -> Option<DateRange> {
    match self.time_window {
      | TimeWindow::All => None,
      | TimeWindow::Weeks(weeks) => {
        Some(grid.window(weeks))
      }
    }
  }

  pub fn matches(
    &self,
    task: &Task,
    grid: &MonthGrid
  ) -> bool {
    let needle =
      self.search.to_lowercase();
    self.matches_prepared(
      task,
      &needle,
      self.window_range(grid).as_ref()
    )
  }

  fn matches_prepared(
    &self,
    task: &Task,
    needle: &str,
    window: Option<&DateRange>
  ) -> bool {
    if !self.categories.contains(&task.category)
    {
      return false;
    }

    if !needle.is_empty()
      && !task
        .name
        .to_lowercase()
        .contains(needle)
    {
      return false;
    }

    window.is_none_or(|window| {
      task.overlaps(window)
    })
  }
}

/// Tasks passing every active filter,
/// in store order.
#[tracing::instrument(skip(
  tasks, filters, grid
))]
pub fn visible_tasks(
  tasks: &[Task],
  filters: &FilterState,
  grid: &MonthGrid
) -> Vec<Task> {
  let needle =
    filters.search.to_lowercase();
  let window = filters.window_range(grid);

  let visible = tasks
    .iter()
    .filter(|task| {
      filters.matches_prepared(
        task,
        &needle,
        window.as_ref()
      )
    })
    .cloned()
    .collect::<Vec<_>>();

  trace!(
    total = tasks.len(),
    visible = visible.len(),
    "applied filters"
  );
  visible
}

#[cfg(test)]
mod tests {
  use chrono::NaiveDate;

  use super::*;
  use crate::datetime::month_grid;
  use crate::task::TaskId;

  fn date(
    y: i32,
    m: u32,
    d: u32
  ) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d)
      .expect("valid date")
  }

  fn task(
    id: &str,
    name: &str,
    category: Category,
    start: NaiveDate,
    end: NaiveDate
  ) -> Task {
    Task {
      id: TaskId::from(id),
      name: name.to_string(),
      category,
      start,
      end,
      video_url: None
    }
  }

  fn sample() -> Vec<Task> {
    vec![
      task(
        "a",
        "Write Report",
        Category::Todo,
        date(2024, 1, 2),
        date(2024, 1, 3)
      ),
      task(
        "b",
        "review report",
        Category::Review,
        date(2024, 1, 15),
        date(2024, 1, 20)
      ),
      task(
        "c",
        "Ship release",
        Category::Completed,
        date(2023, 12, 20),
        date(2024, 1, 1)
      ),
      task(
        "d",
        "Record demo",
        Category::InProgress,
        date(2024, 1, 14),
        date(2024, 1, 16)
      ),
    ]
  }

  fn ids(tasks: &[Task]) -> Vec<&str> {
    tasks
      .iter()
      .map(|task| task.id.as_str())
      .collect()
  }

  #[test]
  fn default_filters_keep_everything() {
    let grid = month_grid(date(2024, 1, 1));
    let tasks = sample();
    assert_eq!(
      visible_tasks(
        &tasks,
        &FilterState::default(),
        &grid
      ),
      tasks
    );
  }

  #[test]
  fn category_and_search_intersect() {
    let grid = month_grid(date(2024, 1, 1));
    let mut filters = FilterState::default();
    filters.set_search("REPORT");
    assert_eq!(
      ids(&visible_tasks(
        &sample(),
        &filters,
        &grid
      )),
      vec!["a", "b"]
    );

    filters
      .toggle_category(Category::Review);
    assert_eq!(
      ids(&visible_tasks(
        &sample(),
        &filters,
        &grid
      )),
      vec!["a"]
    );

    filters
      .toggle_category(Category::Review);
    filters.clear_search();
    assert_eq!(
      visible_tasks(&sample(), &filters, &grid)
        .len(),
      4
    );
  }

  #[test]
  fn time_window_uses_leading_grid_weeks() {
    // January 2024 grid starts Monday 2024-01-01.
    let grid = month_grid(date(2024, 1, 1));
    let mut filters = FilterState::default();

    filters.set_time_window(
      TimeWindow::Weeks(1)
    );
    assert_eq!(
      ids(&visible_tasks(
        &sample(),
        &filters,
        &grid
      )),
      vec!["a", "c"]
    );

    filters.set_time_window(
      TimeWindow::Weeks(2)
    );
    assert_eq!(
      ids(&visible_tasks(
        &sample(),
        &filters,
        &grid
      )),
      vec!["a", "c", "d"]
    );
  }

  #[test]
  fn filtering_is_repeatable() {
    let grid = month_grid(date(2024, 1, 1));
    let mut filters = FilterState::default();
    filters.set_search("re");
    filters.set_time_window(
      TimeWindow::Weeks(3)
    );
    let tasks = sample();

    let first =
      visible_tasks(&tasks, &filters, &grid);
    let second =
      visible_tasks(&tasks, &filters, &grid);
    assert_eq!(first, second);
    assert!(first.iter().all(|task| {
      filters.matches(task, &grid)
    }));
  }

  #[test]
  fn time_window_serializes_as_weeks() {
    let filters = FilterState {
      time_window: TimeWindow::Weeks(2),
      ..FilterState::default()
    };
    let json = serde_json::to_value(&filters)
      .expect("serialize filters");
    assert_eq!(json["timeWindowWeeks"], 2);

    let restored: FilterState =
      serde_json::from_value(json)
        .expect("deserialize filters");
    assert_eq!(restored, filters);

    assert!(
      serde_json::from_str::<TimeWindow>("4")
        .is_err()
    );
  }
}
