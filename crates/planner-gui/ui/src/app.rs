mod storage;

use std::cell::RefCell;
use std::rc::Rc;

use chrono::NaiveDate;
use gloo::events::EventListener;
use planner_core::app_state::PlannerState;
use planner_core::datastore::TaskStore;
use planner_core::editor::TaskEditor;
use planner_core::filter::TimeWindow;
use planner_core::interaction::Grip;
use planner_core::task::{
  Category,
  TaskId
};
use yew::{
  Callback,
  Html,
  UseForceUpdateHandle,
  function_component,
  html,
  use_effect_with,
  use_force_update,
  use_mut_ref
};

use self::storage::{
  LocalStorage,
  load_filters,
  save_filters
};
use crate::components::{
  FiltersPanel,
  MonthGrid,
  TaskModal,
  Toolbar,
  VideoOverlay
};

type Planner = PlannerState<LocalStorage>;

fn today() -> NaiveDate {
  chrono::Local::now().date_naive()
}

/// Shared planner state plus the
/// trigger that re-renders after a
/// mutation.
#[derive(Clone)]
struct PlannerHandle {
  state:  Rc<RefCell<Planner>>,
  redraw: UseForceUpdateHandle
}

impl PlannerHandle {
  fn update(
    &self,
    event: &str,
    apply: impl FnOnce(&mut Planner)
  ) {
    {
      let mut state =
        self.state.borrow_mut();
      let filters_before =
        state.filters().clone();
      apply(&mut state);

      if *state.filters() != filters_before
      {
        save_filters(state.filters());
      }
      if let Some(err) =
        state.take_persist_error()
      {
        tracing::warn!(%event, error = %err, "task snapshot not saved");
      }
      tracing::trace!(
        %event,
        interaction = state.interaction().name(),
        "planner updated"
      );
    }
    self.redraw.force_update();
  }

  fn callback<T: 'static>(
    &self,
    event: &'static str,
    apply: impl Fn(&mut Planner, T) + 'static
  ) -> Callback<T> {
    let handle = self.clone();
    Callback::from(move |value: T| {
      handle.update(event, |state| {
        apply(state, value)
      });
    })
  }
}

#[function_component(App)]
pub fn app() -> Html {
  let state = use_mut_ref(|| {
    PlannerState::new(
      TaskStore::open(
        LocalStorage::default()
      ),
      load_filters(),
      today()
    )
  });
  let handle = PlannerHandle {
    state,
    redraw: use_force_update()
  };

  {
    let handle = handle.clone();
    use_effect_with((), move |_| {
      let listener = web_sys::window()
        .map(|window| {
          EventListener::new(
            &window,
            "mouseup",
            move |_| {
              handle.update(
                "pointer-up",
                |state| {
                  state.release();
                }
              );
            }
          )
        });
      tracing::debug!(
        attached = listener.is_some(),
        "window mouseup listener"
      );
      move || drop(listener)
    });
  }

  let today = today();
  let state = handle.state.borrow();
  let layout = state.layout(today);
  let filters = state.filters().clone();
  let editor = state.editor().cloned();
  let video = state.video().map(str::to_string);
  drop(state);

  let on_prev = handle.callback(
    "prev-month",
    |state, _: ()| state.prev_month()
  );
  let on_next = handle.callback(
    "next-month",
    |state, _: ()| state.next_month()
  );
  let on_today = handle.callback(
    "today",
    move |state, _: ()| {
      state.go_to_month(today)
    }
  );
  let on_new = handle.callback(
    "new-task",
    move |state, _: ()| {
      state.open_new_task(today)
    }
  );

  let on_toggle_category = handle
    .callback(
      "toggle-category",
      |state, category: Category| {
        state.toggle_category(category)
      }
    );
  let on_time_window = handle.callback(
    "time-window",
    |state, window: TimeWindow| {
      state.set_time_window(window)
    }
  );
  let on_search = handle.callback(
    "search",
    |state, text: String| {
      state.set_search(text)
    }
  );
  let on_clear_search = handle.callback(
    "clear-search",
    |state, _: ()| state.clear_search()
  );

  let on_cell_down = handle.callback(
    "cell-down",
    |state, day: NaiveDate| {
      state.press_cell(day);
    }
  );
  let on_cell_enter = handle.callback(
    "cell-enter",
    |state, day: NaiveDate| {
      state.hover_cell(day)
    }
  );
  let on_chip_down = handle.callback(
    "chip-down",
    |state,
     (id, grip, day): (
      TaskId,
      Grip,
      NaiveDate
    )| {
      state.press_task(&id, grip, day);
    }
  );
  let on_open_task = handle.callback(
    "open-task",
    |state, id: TaskId| {
      state.open_editor(&id);
    }
  );
  let on_play = handle.callback(
    "play-video",
    |state, url: String| {
      state.play_video(url)
    }
  );

  let on_editor_change = handle.callback(
    "editor-change",
    |state, next: TaskEditor| {
      if let Some(editor) =
        state.editor_mut()
      {
        *editor = next;
      }
    }
  );
  let on_submit = handle.callback(
    "editor-submit",
    |state, _: ()| {
      if let Some(Err(err)) =
        state.submit_editor()
      {
        tracing::debug!(error = %err, "editor kept open");
      }
    }
  );
  let on_delete = handle.callback(
    "editor-delete",
    |state, _: ()| {
      state.delete_from_editor();
    }
  );
  let on_cancel = handle.callback(
    "editor-cancel",
    |state, _: ()| state.close_editor()
  );
  let on_close_video = handle.callback(
    "close-video",
    |state, _: ()| state.close_video()
  );

  html! {
      <div class="planner">
          <Toolbar
              title={layout.title.clone()}
              {on_prev}
              {on_next}
              {on_today}
              {on_new}
          />
          <div class="planner-body">
              <FiltersPanel
                  {filters}
                  on_toggle_category={on_toggle_category}
                  on_time_window={on_time_window}
                  on_search={on_search}
                  on_clear_search={on_clear_search}
              />
              <MonthGrid
                  {layout}
                  {on_cell_down}
                  {on_cell_enter}
                  {on_chip_down}
                  {on_open_task}
                  {on_play}
              />
          </div>
          {
              match editor {
                  | Some(editor) => html! {
                      <TaskModal
                          {editor}
                          on_change={on_editor_change}
                          {on_submit}
                          {on_delete}
                          {on_cancel}
                      />
                  },
                  | None => html! {}
              }
          }
          {
              match video {
                  | Some(url) => html! {
                      <VideoOverlay {url} on_close={on_close_video} />
                  },
                  | None => html! {}
              }
          }
      </div>
  }
}
