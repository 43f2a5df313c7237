use planner_core::datastore::{
  SNAPSHOT_KEY,
  SnapshotStorage,
  StorageError,
  StorageResult
};
use planner_core::filter::FilterState;

pub const FILTERS_STORAGE_KEY: &str =
  "month-planner-filters-v1";

fn browser_storage()
-> StorageResult<web_sys::Storage> {
  web_sys::window()
    .and_then(|window| {
      window
        .local_storage()
        .ok()
        .flatten()
    })
    .ok_or_else(|| {
      StorageError::Unavailable(
        "localStorage is not available"
          .to_string()
      )
    })
}

/// The task snapshot, kept in
/// `localStorage` under a single key.
#[derive(Debug, Clone)]
pub struct LocalStorage {
  key: &'static str
}

impl Default for LocalStorage {
  fn default() -> Self {
    Self {
      key: SNAPSHOT_KEY
    }
  }
}

impl SnapshotStorage for LocalStorage {
  fn read(
    &self
  ) -> StorageResult<Option<String>> {
    browser_storage()?
      .get_item(self.key)
      .map_err(|err| {
        StorageError::Unavailable(
          format!("{err:?}")
        )
      })
  }

  fn write(
    &mut self,
    blob: &str
  ) -> StorageResult<()> {
    browser_storage()?
      .set_item(self.key, blob)
      .map_err(|err| {
        StorageError::Write(format!(
          "{err:?}"
        ))
      })
  }
}

pub fn load_filters() -> FilterState {
  let stored = browser_storage()
    .ok()
    .and_then(|storage| {
      storage
        .get_item(FILTERS_STORAGE_KEY)
        .ok()
        .flatten()
    });

  stored
    .as_deref()
    .and_then(decode_filters)
    .unwrap_or_default()
}

pub fn save_filters(
  filters: &FilterState
) {
  let Ok(raw) =
    serde_json::to_string(filters)
  else {
    return;
  };
  match browser_storage() {
    | Ok(storage) => {
      if let Err(err) = storage
        .set_item(FILTERS_STORAGE_KEY, &raw)
      {
        tracing::warn!(error = ?err, "failed saving filters");
      }
    }
    | Err(err) => {
      tracing::warn!(error = %err, "filters not saved");
    }
  }
}

fn decode_filters(
  raw: &str
) -> Option<FilterState> {
  match serde_json::from_str::<FilterState>(
    raw
  ) {
    | Ok(filters) => Some(filters),
    | Err(error) => {
      tracing::error!(
        %error,
        "failed parsing saved filters \
         from local storage"
      );
      None
    }
  }
}

#[cfg(test)]
mod tests {
  use planner_core::filter::TimeWindow;
  use planner_core::task::Category;

  use super::*;

  #[test]
  fn saved_filters_decode() {
    let filters = decode_filters(
      r#"{"categories":["review"],"timeWindowWeeks":2,"search":"demo"}"#
    )
    .expect("filters");
    assert!(
      filters
        .categories
        .contains(&Category::Review)
    );
    assert_eq!(filters.categories.len(), 1);
    assert_eq!(
      filters.time_window,
      TimeWindow::Weeks(2)
    );
    assert_eq!(filters.search, "demo");
  }

  #[test]
  fn bad_saved_filters_are_ignored() {
    assert!(decode_filters("{").is_none());
    assert!(
      decode_filters(
        r#"{"categories":[],"timeWindowWeeks":7,"search":""}"#
      )
      .is_none()
    );
  }
}
