//! Pointer gestures over the month grid.
//!
//! A gesture starts with a pointer-down on a cell or on a task chip,
//! follows the pointer from cell to cell, and ends on release. While it
//! runs, the affected task's range is only previewed; the store is
//! patched once, when the gesture ends.

use chrono::NaiveDate;
use tracing::{
  debug,
  trace
};

use crate::datetime::{
  DateRange,
  difference_in_calendar_days
};
use crate::task::{
  Task,
  TaskId
};

/// Which part of a chip the pointer
/// went down on.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq,
)]
pub enum Grip {
  Body,
  StartHandle,
  EndHandle
}

/// A new-range selection for task
/// creation.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq,
)]
pub struct RangeSelection {
  pub anchor:  NaiveDate,
  pub current: NaiveDate
}

impl RangeSelection {
  pub fn range(&self) -> DateRange {
    DateRange::normalized(
      self.anchor,
      self.current
    )
  }
}

/// A move or resize of an existing
/// task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskGesture {
  pub task_id:    TaskId,
  pub anchor:     NaiveDate,
  pub current:    NaiveDate,
  pub orig_start: NaiveDate,
  pub orig_end:   NaiveDate
}

impl TaskGesture {
  fn capture(
    task: &Task,
    day: NaiveDate
  ) -> Self {
    Self {
      task_id:    task.id.clone(),
      anchor:     day,
      current:    day,
      orig_start: task.start,
      orig_end:   task.end
    }
  }

  /// Both bounds shift by the distance
  /// travelled; the length is kept.
  pub fn moved(&self) -> DateRange {
    let delta = difference_in_calendar_days(
      self.current,
      self.anchor
    );
    DateRange::new(
      self.orig_start,
      self.orig_end
    )
    .shifted(delta)
  }

  /// The start follows the pointer but
  /// never passes the original end.
  pub fn resized_start(&self) -> DateRange {
    DateRange::new(
      self.current.min(self.orig_end),
      self.orig_end
    )
  }

  /// The end follows the pointer but
  /// never precedes the original start.
  pub fn resized_end(&self) -> DateRange {
    DateRange::new(
      self.orig_start,
      self.current.max(self.orig_start)
    )
  }
}

#[derive(
  Debug, Clone, Default, PartialEq, Eq,
)]
pub enum Interaction {
  #[default]
  Idle,
  Selecting(RangeSelection),
  Moving(TaskGesture),
  ResizingStart(TaskGesture),
  ResizingEnd(TaskGesture)
}

/// What the caller must do once a
/// gesture is released.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GestureEnd {
  None,
  /// Open the editor pre-filled with
  /// this range.
  Create(DateRange),
  /// Patch the task's start and end.
  Commit {
    task_id: TaskId,
    range:   DateRange
  }
}

impl Interaction {
  pub fn is_active(&self) -> bool {
    !matches!(self, Interaction::Idle)
  }

  pub fn name(&self) -> &'static str {
    match self {
      | Interaction::Idle => "idle",
      | Interaction::Selecting(_) => {
        "selecting"
      }
      | Interaction::Moving(_) => "moving",
      | Interaction::ResizingStart(_) => {
        "resizing-start"
      }
      | Interaction::ResizingEnd(_) => {
        "resizing-end"
      }
    }
  }

  /// Pointer-down on an empty cell.
  /// Ignored while another gesture runs.
  pub fn begin_selection(
    &mut self,
    day: NaiveDate
  ) -> bool {
    if self.is_active() {
      debug!(
        state = self.name(),
        "selection ignored; gesture in progress"
      );
      return false;
    }

    *self = Interaction::Selecting(
      RangeSelection {
        anchor:  day,
        current: day
      }
    );
    trace!(%day, "selection started");
    true
  }

  /// Pointer-down on a chip body or one
  /// of its resize handles.
  pub fn begin_task_gesture(
    &mut self,
    task: &Task,
    grip: Grip,
    day: NaiveDate
  ) -> bool {
    if self.is_active() {
      debug!(
        state = self.name(),
        task = %task.id,
        "task gesture ignored; gesture in progress"
      );
      return false;
    }

    let gesture =
      TaskGesture::capture(task, day);
    *self = match grip {
      | Grip::Body => {
        Interaction::Moving(gesture)
      }
      | Grip::StartHandle => {
        Interaction::ResizingStart(gesture)
      }
      | Grip::EndHandle => {
        Interaction::ResizingEnd(gesture)
      }
    };
    trace!(
      %day,
      task = %task.id,
      state = self.name(),
      "task gesture started"
    );
    true
  }

  /// Pointer entered the cell for `day`.
  pub fn pointer_enter(
    &mut self,
    day: NaiveDate
  ) {
    match self {
      | Interaction::Idle => {}
      | Interaction::Selecting(selection) => {
        selection.current = day;
      }
      | Interaction::Moving(gesture)
      | Interaction::ResizingStart(gesture)
      | Interaction::ResizingEnd(gesture) => {
        gesture.current = day;
      }
    }
  }

  /// Ends whatever gesture is running,
  /// using the last date the pointer
  /// was seen over.
  pub fn pointer_up(&mut self) -> GestureEnd {
    let finished = std::mem::take(self);
    let end = match &finished {
      | Interaction::Idle => GestureEnd::None,
      | Interaction::Selecting(selection) => {
        GestureEnd::Create(selection.range())
      }
      | _ => match finished.preview() {
        | Some((task_id, range)) => {
          GestureEnd::Commit {
            task_id: task_id.clone(),
            range
          }
        }
        | None => GestureEnd::None
      }
    };

    debug!(
      state = finished.name(),
      ?end,
      "gesture released"
    );
    end
  }

  /// The range currently being selected
  /// for a new task.
  pub fn selection(&self) -> Option<DateRange> {
    match self {
      | Interaction::Selecting(selection) => {
        Some(selection.range())
      }
      | _ => None
    }
  }

  pub fn preview_range(
    &self
  ) -> Option<DateRange> {
    match self {
      | Interaction::Moving(gesture) => {
        Some(gesture.moved())
      }
      | Interaction::ResizingStart(
        gesture
      ) => Some(gesture.resized_start()),
      | Interaction::ResizingEnd(gesture) => {
        Some(gesture.resized_end())
      }
      | Interaction::Idle
      | Interaction::Selecting(_) => None
    }
  }

  /// The task being dragged with its
  /// previewed range.
  pub fn preview(
    &self
  ) -> Option<(&TaskId, DateRange)> {
    let range = self.preview_range()?;
    match self {
      | Interaction::Moving(gesture)
      | Interaction::ResizingStart(gesture)
      | Interaction::ResizingEnd(gesture) => {
        Some((&gesture.task_id, range))
      }
      | _ => None
    }
  }

  /// Substitutes the previewed range for
  /// the captured task; other tasks pass
  /// through untouched.
  pub fn apply_preview(
    &self,
    mut tasks: Vec<Task>
  ) -> Vec<Task> {
    if let Some((task_id, range)) =
      self.preview()
      && let Some(task) = tasks
        .iter_mut()
        .find(|task| &task.id == task_id)
    {
      task.start = range.start;
      task.end = range.end;
    }
    tasks
  }
}
