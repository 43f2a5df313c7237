use chrono::NaiveDate;
use planner_core::interaction::Grip;
use planner_core::layout::ChipSegment;
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

#[derive(Properties, PartialEq)]
pub struct TaskChipProps {
  pub chip:    ChipSegment,
  pub date:    NaiveDate,
  pub on_down:
    Callback<(TaskId, Grip, NaiveDate)>,
  pub on_open: Callback<TaskId>,
  pub on_play: Callback<String>
}

/// Inline style: category color, with
/// rounded corners only where the task
/// begins or ends.
fn chip_style(
  chip: &ChipSegment
) -> String {
  let left = if chip.is_start {
    "6px"
  } else {
    "0"
  };
  let right = if chip.is_end {
    "6px"
  } else {
    "0"
  };
  format!(
    "background:{};border-radius:{left} {right} {right} {left}",
    chip.color
  )
}

/// Every segment of a task with a video
/// carries its own play button.
fn play_target(
  chip: &ChipSegment
) -> Option<&str> {
  chip.video_url.as_deref()
}

#[function_component(TaskChip)]
pub fn task_chip(
  props: &TaskChipProps
) -> Html {
  let grip_down = |grip: Grip| {
    let on_down = props.on_down.clone();
    let id = props.chip.task_id.clone();
    let date = props.date;
    Callback::from(
      move |event: MouseEvent| {
        if event.button() != 0 {
          return;
        }
        event.stop_propagation();
        event.prevent_default();
        on_down.emit((
          id.clone(),
          grip,
          date
        ));
      }
    )
  };

  let on_name_click = {
    let on_open = props.on_open.clone();
    let id = props.chip.task_id.clone();
    Callback::from(
      move |event: MouseEvent| {
        event.stop_propagation();
        on_open.emit(id.clone());
      }
    )
  };

  let play_button = match play_target(
    &props.chip
  ) {
    | Some(url) => {
      let on_play = props.on_play.clone();
      let url = url.to_string();
      let onclick = Callback::from(
        move |event: MouseEvent| {
          event.stop_propagation();
          on_play.emit(url.clone());
        }
      );
      let onmousedown = Callback::from(
        |event: MouseEvent| {
          event.stop_propagation()
        }
      );
      html! {
          <button class="chip-play" title="Play video" {onclick} {onmousedown}>{ "\u{25b6}" }</button>
      }
    }
    | _ => html! {}
  };

  html! {
      <div
          class={classes!(
              "chip",
              props.chip.is_start.then_some("chip-start"),
              props.chip.is_end.then_some("chip-end")
          )}
          style={chip_style(&props.chip)}
          title={props.chip.tooltip.clone()}
          onmousedown={grip_down(Grip::Body)}
      >
          {
              if props.chip.is_start {
                  html! { <span class="handle handle-start" onmousedown={grip_down(Grip::StartHandle)}></span> }
              } else {
                  html! {}
              }
          }
          <span class="chip-name" onclick={on_name_click}>{ &props.chip.name }</span>
          { play_button }
          {
              if props.chip.is_end {
                  html! { <span class="handle handle-end" onmousedown={grip_down(Grip::EndHandle)}></span> }
              } else {
                  html! {}
              }
          }
      </div>
  }
}

#[cfg(test)]
mod tests {
  use planner_core::task::Category;

  use super::*;

  fn chip(
    is_start: bool,
    is_end: bool
  ) -> ChipSegment {
    video_chip(is_start, is_end, None)
  }

  fn video_chip(
    is_start: bool,
    is_end: bool,
    video_url: Option<&str>
  ) -> ChipSegment {
    ChipSegment {
      task_id: TaskId::from("t"),
      name: "Demo".to_string(),
      category: Category::Review,
      color: Category::Review.color(),
      is_start,
      is_end,
      video_url: video_url
        .map(str::to_string),
      tooltip: String::new()
    }
  }

  #[test]
  fn corners_round_only_at_task_edges() {
    assert_eq!(
      chip_style(&chip(true, false)),
      "background:#f472b6;border-radius:6px 0 0 6px"
    );
    assert_eq!(
      chip_style(&chip(false, true)),
      "background:#f472b6;border-radius:0 6px 6px 0"
    );
    assert_eq!(
      chip_style(&chip(false, false)),
      "background:#f472b6;border-radius:0 0 0 0"
    );
  }

  #[test]
  fn middle_segments_keep_the_play_button() {
    let url = "https://youtu.be/abc";
    for (is_start, is_end) in [
      (true, false),
      (false, false),
      (false, true)
    ] {
      let segment =
        video_chip(is_start, is_end, Some(url));
      assert_eq!(
        play_target(&segment),
        Some(url)
      );
    }
    assert_eq!(
      play_target(&chip(true, true)),
      None
    );
  }
}
