use chrono::NaiveDate;
use tracing::{
  debug,
  warn
};

use crate::datastore::{
  SnapshotStorage,
  StorageError,
  TaskStore
};
use crate::datetime::{
  MonthGrid,
  month_grid,
  shift_months,
  start_of_month
};
use crate::editor::{
  EditorError,
  TaskEditor
};
use crate::filter::{
  FilterState,
  TimeWindow,
  visible_tasks
};
use crate::interaction::{
  GestureEnd,
  Grip,
  Interaction
};
use crate::layout::{
  MonthLayout,
  layout_month
};
use crate::task::{
  Category,
  Task,
  TaskId,
  TaskPatch
};

/// Everything the planner surfaces read
/// and mutate, passed explicitly to each
/// of them.
#[derive(Debug)]
pub struct PlannerState<S> {
  store:       TaskStore<S>,
  filters:     FilterState,
  grid:        MonthGrid,
  interaction: Interaction,
  editor:      Option<TaskEditor>,
  video:       Option<String>
}

impl<S: SnapshotStorage> PlannerState<S> {
  pub fn new(
    store: TaskStore<S>,
    filters: FilterState,
    month: NaiveDate
  ) -> Self {
    Self {
      store,
      filters,
      grid: month_grid(month),
      interaction: Interaction::Idle,
      editor: None,
      video: None
    }
  }

  pub fn store(&self) -> &TaskStore<S> {
    &self.store
  }

  pub fn filters(&self) -> &FilterState {
    &self.filters
  }

  pub fn grid(&self) -> &MonthGrid {
    &self.grid
  }

  pub fn month(&self) -> NaiveDate {
    self.grid.month()
  }

  pub fn interaction(&self) -> &Interaction {
    &self.interaction
  }

  pub fn editor(&self) -> Option<&TaskEditor> {
    self.editor.as_ref()
  }

  pub fn editor_mut(
    &mut self
  ) -> Option<&mut TaskEditor> {
    self.editor.as_mut()
  }

  pub fn video(&self) -> Option<&str> {
    self.video.as_deref()
  }

  pub fn go_to_month(
    &mut self,
    date: NaiveDate
  ) {
    let month = start_of_month(date);
    if month != self.grid.month() {
      self.grid = month_grid(month);
    }
  }

  pub fn prev_month(&mut self) {
    self.go_to_month(shift_months(
      self.grid.month(),
      -1
    ));
  }

  pub fn next_month(&mut self) {
    self.go_to_month(shift_months(
      self.grid.month(),
      1
    ));
  }

  pub fn toggle_category(
    &mut self,
    category: Category
  ) {
    self.filters.toggle_category(category);
  }

  pub fn set_time_window(
    &mut self,
    window: TimeWindow
  ) {
    self.filters.set_time_window(window);
  }

  pub fn set_search(
    &mut self,
    search: impl Into<String>
  ) {
    self.filters.set_search(search);
  }

  pub fn clear_search(&mut self) {
    self.filters.clear_search();
  }

  pub fn visible_tasks(&self) -> Vec<Task> {
    visible_tasks(
      self.store.tasks(),
      &self.filters,
      &self.grid
    )
  }

  /// Visible tasks with any in-flight
  /// gesture's preview applied.
  pub fn rendered_tasks(&self) -> Vec<Task> {
    self
      .interaction
      .apply_preview(self.visible_tasks())
  }

  pub fn layout(
    &self,
    today: NaiveDate
  ) -> MonthLayout {
    layout_month(
      &self.grid,
      &self.rendered_tasks(),
      self.interaction.selection(),
      today
    )
  }

  pub fn press_cell(
    &mut self,
    day: NaiveDate
  ) -> bool {
    self.interaction.begin_selection(day)
  }

  pub fn press_task(
    &mut self,
    id: &TaskId,
    grip: Grip,
    day: NaiveDate
  ) -> bool {
    let Some(task) = self.store.get(id)
    else {
      warn!(id = %id, "pressed a task that is not in the store");
      return false;
    };
    self
      .interaction
      .begin_task_gesture(task, grip, day)
  }

  pub fn hover_cell(
    &mut self,
    day: NaiveDate
  ) {
    self.interaction.pointer_enter(day);
  }

  /// Ends the gesture: a selection opens
  /// the editor, a task gesture patches
  /// the store.
  pub fn release(&mut self) -> GestureEnd {
    let end = self.interaction.pointer_up();
    match &end {
      | GestureEnd::None => {}
      | GestureEnd::Create(range) => {
        self.editor =
          Some(TaskEditor::create(*range));
      }
      | GestureEnd::Commit {
        task_id,
        range
      } => {
        self.store.update(
          task_id,
          TaskPatch::range(*range)
        );
      }
    }
    end
  }

  pub fn open_new_task(
    &mut self,
    today: NaiveDate
  ) {
    self.editor =
      Some(TaskEditor::create_default(today));
  }

  pub fn open_editor(
    &mut self,
    id: &TaskId
  ) -> bool {
    match self.store.get(id) {
      | Some(task) => {
        self.editor =
          Some(TaskEditor::edit(task));
        true
      }
      | None => false
    }
  }

  pub fn close_editor(&mut self) {
    self.editor = None;
  }

  /// Submits the open form. On success
  /// the editor closes; otherwise it
  /// stays open unchanged.
  pub fn submit_editor(
    &mut self
  ) -> Option<Result<TaskId, EditorError>> {
    let editor = self.editor.as_ref()?;
    let result = editor.submit(&mut self.store);
    if result.is_ok() {
      self.editor = None;
    } else {
      debug!("editor stays open");
    }
    Some(result)
  }

  pub fn delete_from_editor(
    &mut self
  ) -> Option<Result<TaskId, EditorError>> {
    let editor = self.editor.as_ref()?;
    let result = editor.delete(&mut self.store);
    if result.is_ok() {
      self.editor = None;
    }
    Some(result)
  }

  pub fn play_video(
    &mut self,
    url: impl Into<String>
  ) {
    self.video = Some(url.into());
  }

  pub fn close_video(&mut self) {
    self.video = None;
  }

  pub fn take_persist_error(
    &mut self
  ) -> Option<StorageError> {
    self.store.take_persist_error()
  }
}
