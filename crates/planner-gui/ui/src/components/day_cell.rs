use chrono::{
  Datelike,
  NaiveDate
};
use planner_core::interaction::Grip;
use planner_core::layout::DayCell;
use planner_core::task::TaskId;
use web_sys::MouseEvent;
use yew::{
  Callback,
  Html,
  Properties,
  classes,
  function_component,
  html
};

use super::TaskChip;

#[derive(Properties, PartialEq)]
pub struct DayCellProps {
  pub cell:         DayCell,
  pub on_down:      Callback<NaiveDate>,
  pub on_enter:     Callback<NaiveDate>,
  pub on_chip_down:
    Callback<(TaskId, Grip, NaiveDate)>,
  pub on_open_task: Callback<TaskId>,
  pub on_play:      Callback<String>
}

#[function_component(DayCellView)]
pub fn day_cell(
  props: &DayCellProps
) -> Html {
  let date = props.cell.date;

  let onmousedown = {
    let on_down = props.on_down.clone();
    Callback::from(
      move |event: MouseEvent| {
        if event.button() != 0 {
          return;
        }
        event.prevent_default();
        on_down.emit(date);
      }
    )
  };
  let onmouseenter = {
    let on_enter = props.on_enter.clone();
    Callback::from(move |_| {
      on_enter.emit(date)
    })
  };

  html! {
      <div
          class={classes!(
              "day-cell",
              (!props.cell.in_month).then_some("outside"),
              props.cell.is_today.then_some("today"),
              props.cell.selected.then_some("selected")
          )}
          {onmousedown}
          {onmouseenter}
      >
          <div class="day-number">{ date.day() }</div>
          <div class="chips">
              {
                  for props.cell.chips.iter().map(|chip| html! {
                      <TaskChip
                          key={chip.task_id.to_string()}
                          chip={chip.clone()}
                          {date}
                          on_down={props.on_chip_down.clone()}
                          on_open={props.on_open_task.clone()}
                          on_play={props.on_play.clone()}
                      />
                  })
              }
          </div>
      </div>
  }
}
