use chrono::NaiveDate;
use planner_core::interaction::Grip;
use planner_core::layout::{
  MonthLayout,
  WEEKDAY_LABELS
};
use planner_core::task::TaskId;
use yew::{
  Callback,
  Html,
  Properties,
  function_component,
  html
};

use super::DayCellView;

#[derive(Properties, PartialEq)]
pub struct MonthGridProps {
  pub layout:        MonthLayout,
  pub on_cell_down:  Callback<NaiveDate>,
  pub on_cell_enter: Callback<NaiveDate>,
  pub on_chip_down:
    Callback<(TaskId, Grip, NaiveDate)>,
  pub on_open_task:  Callback<TaskId>,
  pub on_play:       Callback<String>
}

#[function_component(MonthGrid)]
pub fn month_grid(
  props: &MonthGridProps
) -> Html {
  html! {
      <div class="month-grid">
          <div class="weekday-row">
              { for WEEKDAY_LABELS.iter().map(|label| html! {
                  <div class="weekday">{ *label }</div>
              }) }
          </div>
          {
              for props.layout.weeks().map(|week| html! {
                  <div class="week-row">
                      {
                          for week.iter().map(|cell| html! {
                              <DayCellView
                                  key={cell.date.to_string()}
                                  cell={cell.clone()}
                                  on_down={props.on_cell_down.clone()}
                                  on_enter={props.on_cell_enter.clone()}
                                  on_chip_down={props.on_chip_down.clone()}
                                  on_open_task={props.on_open_task.clone()}
                                  on_play={props.on_play.clone()}
                              />
                          })
                      }
                  </div>
              })
          }
      </div>
  }
}
