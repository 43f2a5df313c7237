use chrono::NaiveDate;
use thiserror::Error;
use tracing::{
  debug,
  info
};

use crate::datastore::{
  SnapshotStorage,
  TaskStore
};
use crate::datetime::{
  DateRange,
  add_days
};
use crate::task::{
  Category,
  Task,
  TaskDraft,
  TaskId,
  TaskPatch
};
use crate::video::embed_url;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorMode {
  Create,
  Edit(TaskId)
}

#[derive(
  Debug, Clone, PartialEq, Eq, Error,
)]
pub enum EditorError {
  #[error("task name cannot be empty")]
  EmptyName,

  #[error("only existing tasks can be deleted")]
  NotEditing
}

/// Form state behind the create/edit
/// modal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskEditor {
  mode:          EditorMode,
  pub name:      String,
  pub category:  Category,
  pub start:     NaiveDate,
  pub end:       NaiveDate,
  pub video_url: String
}

impl TaskEditor {
  pub fn create(range: DateRange) -> Self {
    Self {
      mode:      EditorMode::Create,
      name:      String::new(),
      category:  Category::Todo,
      start:     range.start,
      end:       range.end,
      video_url: String::new()
    }
  }

  /// A blank form spanning today and
  /// tomorrow.
  pub fn create_default(
    today: NaiveDate
  ) -> Self {
    Self::create(DateRange::new(
      today,
      add_days(today, 1)
    ))
  }

  pub fn edit(task: &Task) -> Self {
    Self {
      mode:      EditorMode::Edit(
        task.id.clone()
      ),
      name:      task.name.clone(),
      category:  task.category,
      start:     task.start,
      end:       task.end,
      video_url: task
        .video_url
        .clone()
        .unwrap_or_default()
    }
  }

  pub fn is_edit(&self) -> bool {
    matches!(self.mode, EditorMode::Edit(_))
  }

  pub fn title(&self) -> &'static str {
    match self.mode {
      | EditorMode::Create => "Create Task",
      | EditorMode::Edit(_) => "Edit Task"
    }
  }

  pub fn submit_label(&self) -> &'static str {
    match self.mode {
      | EditorMode::Create => "Create",
      | EditorMode::Edit(_) => "Save"
    }
  }

  pub fn validate(
    &self
  ) -> Result<(), EditorError> {
    if self.name.trim().is_empty() {
      return Err(EditorError::EmptyName);
    }
    Ok(())
  }

  /// The frame URL for the inline video
  /// preview.
  pub fn embed_preview(
    &self
  ) -> Option<String> {
    let raw = self.video_url.trim();
    (!raw.is_empty()).then(|| embed_url(raw))
  }

  fn video(&self) -> Option<String> {
    let raw = self.video_url.trim();
    (!raw.is_empty()).then(|| raw.to_string())
  }

  /// Adds or patches the task. The store
  /// is untouched when validation fails.
  #[tracing::instrument(skip(self, store), fields(mode = ?self.mode))]
  pub fn submit<S: SnapshotStorage>(
    &self,
    store: &mut TaskStore<S>
  ) -> Result<TaskId, EditorError> {
    if let Err(err) = self.validate() {
      debug!(error = %err, "submission blocked");
      return Err(err);
    }

    let range =
      DateRange::normalized(self.start, self.end);
    match &self.mode {
      | EditorMode::Create => {
        let id = store.add(TaskDraft {
          name:      self.name.clone(),
          category:  self.category,
          start:     range.start,
          end:       range.end,
          video_url: self.video()
        });
        info!(id = %id, "created task");
        Ok(id)
      }
      | EditorMode::Edit(id) => {
        store.update(id, TaskPatch {
          name:      Some(self.name.clone()),
          category:  Some(self.category),
          start:     Some(range.start),
          end:       Some(range.end),
          video_url: Some(self.video())
        });
        info!(id = %id, "saved task");
        Ok(id.clone())
      }
    }
  }

  #[tracing::instrument(skip(self, store), fields(mode = ?self.mode))]
  pub fn delete<S: SnapshotStorage>(
    &self,
    store: &mut TaskStore<S>
  ) -> Result<TaskId, EditorError> {
    match &self.mode {
      | EditorMode::Create => {
        Err(EditorError::NotEditing)
      }
      | EditorMode::Edit(id) => {
        store.remove(id);
        info!(id = %id, "deleted task");
        Ok(id.clone())
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::datastore::MemoryStorage;

  fn date(
    y: i32,
    m: u32,
    d: u32
  ) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d)
      .expect("valid date")
  }

  #[test]
  fn blank_name_blocks_submission() {
    let mut store =
      TaskStore::open(MemoryStorage::new());
    let mut editor = TaskEditor::create(
      DateRange::single(date(2024, 2, 1))
    );
    editor.name = "   ".to_string();

    assert_eq!(
      editor.submit(&mut store),
      Err(EditorError::EmptyName)
    );
    assert!(store.is_empty());
    assert_eq!(store.storage().blob(), None);
  }

  #[test]
  fn create_appends_task_with_trimmed_video() {
    let mut store =
      TaskStore::open(MemoryStorage::new());
    let mut editor = TaskEditor::create(
      DateRange::new(
        date(2024, 2, 1),
        date(2024, 2, 3)
      )
    );
    editor.name = "Record podcast".to_string();
    editor.category = Category::InProgress;
    editor.video_url =
      "  https://youtu.be/abc123 ".to_string();

    let id = editor
      .submit(&mut store)
      .expect("submit");
    let task = store.get(&id).expect("task");
    assert_eq!(task.name, "Record podcast");
    assert_eq!(task.category, Category::InProgress);
    assert_eq!(
      task.video_url.as_deref(),
      Some("https://youtu.be/abc123")
    );
    assert_eq!(
      editor.embed_preview().as_deref(),
      Some("https://www.youtube.com/embed/abc123")
    );
  }

  #[test]
  fn edit_patches_and_clears_video() {
    let mut store =
      TaskStore::open(MemoryStorage::new());
    let id = TaskEditor {
      name: "Draft".to_string(),
      video_url: "https://vimeo.com/1"
        .to_string(),
      ..TaskEditor::create_default(date(
        2024, 2, 28
      ))
    }
    .submit(&mut store)
    .expect("create");

    let task = store.get(&id).expect("task");
    assert_eq!(task.end, date(2024, 2, 29));

    let mut editor = TaskEditor::edit(task);
    assert!(editor.is_edit());
    assert_eq!(editor.submit_label(), "Save");
    editor.video_url.clear();
    editor.start = date(2024, 3, 4);
    editor.end = date(2024, 3, 2);

    editor.submit(&mut store).expect("save");
    let task = store.get(&id).expect("task");
    assert_eq!(task.video_url, None);
    assert_eq!(task.start, date(2024, 3, 2));
    assert_eq!(task.end, date(2024, 3, 4));
    assert_eq!(store.len(), 1);
  }

  #[test]
  fn loaded_empty_name_fails_resubmission() {
    let raw = r#"[{"id":"1","name":"","start":"2024-01-01","end":"2024-01-02"}]"#;
    let mut store = TaskStore::open(
      MemoryStorage::with_blob(raw)
    );
    let task =
      store.tasks().first().cloned().expect("loaded");

    let editor = TaskEditor::edit(&task);
    assert_eq!(
      editor.submit(&mut store),
      Err(EditorError::EmptyName)
    );
  }

  #[test]
  fn delete_only_in_edit_mode() {
    let mut store =
      TaskStore::open(MemoryStorage::new());
    let creating = TaskEditor::create_default(
      date(2024, 1, 1)
    );
    assert_eq!(
      creating.delete(&mut store),
      Err(EditorError::NotEditing)
    );

    let id = TaskEditor {
      name: "Gone soon".to_string(),
      ..creating
    }
    .submit(&mut store)
    .expect("create");
    let editor = TaskEditor::edit(
      store.get(&id).expect("task")
    );
    assert_eq!(editor.delete(&mut store), Ok(id));
    assert!(store.is_empty());
  }
}
