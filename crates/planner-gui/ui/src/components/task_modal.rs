use planner_core::datetime::{
  parse_iso_date,
  to_iso_date
};
use planner_core::editor::TaskEditor;
use planner_core::task::Category;
use web_sys::{
  Event,
  HtmlInputElement,
  HtmlSelectElement,
  InputEvent,
  MouseEvent,
  SubmitEvent
};
use yew::{
  Callback,
  Html,
  Properties,
  TargetCast,
  function_component,
  html
};

#[derive(Properties, PartialEq)]
pub struct TaskModalProps {
  pub editor:    TaskEditor,
  pub on_change: Callback<TaskEditor>,
  pub on_submit: Callback<()>,
  pub on_delete: Callback<()>,
  pub on_cancel: Callback<()>
}

#[derive(Clone, Copy)]
enum Field {
  Name,
  Start,
  End,
  Video
}

/// Applies one input's text to the
/// form. Unparseable dates leave the
/// previous value in place.
fn apply_field(
  editor: &mut TaskEditor,
  field: Field,
  value: String
) {
  match field {
    | Field::Name => editor.name = value,
    | Field::Video => {
      editor.video_url = value
    }
    | Field::Start => {
      if let Some(date) =
        parse_iso_date(&value)
      {
        editor.start = date;
      }
    }
    | Field::End => {
      if let Some(date) =
        parse_iso_date(&value)
      {
        editor.end = date;
      }
    }
  }
}

#[function_component(TaskModal)]
pub fn task_modal(
  props: &TaskModalProps
) -> Html {
  let editor = &props.editor;

  let edit_field = |field: Field| {
    let on_change =
      props.on_change.clone();
    let current = editor.clone();
    Callback::from(
      move |event: InputEvent| {
        let input: HtmlInputElement =
          event.target_unchecked_into();
        let mut next = current.clone();
        apply_field(
          &mut next,
          field,
          input.value()
        );
        on_change.emit(next);
      }
    )
  };

  let on_category = {
    let on_change =
      props.on_change.clone();
    let current = editor.clone();
    Callback::from(move |event: Event| {
      let select: HtmlSelectElement =
        event.target_unchecked_into();
      if let Ok(category) =
        select.value().parse::<Category>()
      {
        let mut next = current.clone();
        next.category = category;
        on_change.emit(next);
      }
    })
  };

  let onsubmit = {
    let on_submit =
      props.on_submit.clone();
    Callback::from(
      move |event: SubmitEvent| {
        event.prevent_default();
        on_submit.emit(());
      }
    )
  };
  let on_delete = {
    let on_delete =
      props.on_delete.clone();
    Callback::from(
      move |event: MouseEvent| {
        event.prevent_default();
        on_delete.emit(());
      }
    )
  };
  let on_cancel = {
    let on_cancel =
      props.on_cancel.clone();
    Callback::from(
      move |event: MouseEvent| {
        event.prevent_default();
        on_cancel.emit(());
      }
    )
  };

  let category_options = Category::ALL
    .into_iter()
    .map(|category| {
      html! {
          <option
              value={category.key()}
              selected={category == editor.category}
          >
              { category.label() }
          </option>
      }
    })
    .collect::<Html>();

  let preview = match editor
    .embed_preview()
  {
    | Some(src) => html! {
        <iframe
            class="video-preview"
            {src}
            allow="autoplay; encrypted-media; picture-in-picture"
            allowfullscreen=true
        />
    },
    | None => html! {}
  };

  html! {
      <div class="modal-backdrop">
          <form class="modal" {onsubmit}>
              <div class="header">{ editor.title() }</div>
              <label>
                  { "Name" }
                  <input
                      type="text"
                      value={editor.name.clone()}
                      oninput={edit_field(Field::Name)}
                  />
              </label>
              <label>
                  { "Category" }
                  <select onchange={on_category}>{ category_options }</select>
              </label>
              <div class="date-row">
                  <label>
                      { "Start" }
                      <input
                          type="date"
                          value={to_iso_date(editor.start)}
                          oninput={edit_field(Field::Start)}
                      />
                  </label>
                  <label>
                      { "End" }
                      <input
                          type="date"
                          value={to_iso_date(editor.end)}
                          oninput={edit_field(Field::End)}
                      />
                  </label>
              </div>
              <label>
                  { "Video URL" }
                  <input
                      type="url"
                      placeholder="YouTube, Vimeo or Google Drive link"
                      value={editor.video_url.clone()}
                      oninput={edit_field(Field::Video)}
                  />
              </label>
              { preview }
              <div class="modal-actions">
                  {
                      if editor.is_edit() {
                          html! { <button class="btn danger" onclick={on_delete}>{ "Delete" }</button> }
                      } else {
                          html! {}
                      }
                  }
                  <button class="btn" onclick={on_cancel}>{ "Cancel" }</button>
                  <button class="btn primary" type="submit">{ editor.submit_label() }</button>
              </div>
          </form>
      </div>
  }
}

#[cfg(test)]
mod tests {
  use chrono::NaiveDate;
  use planner_core::datetime::DateRange;

  use super::*;

  fn date(
    y: i32,
    m: u32,
    d: u32
  ) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d)
      .expect("valid date")
  }

  #[test]
  fn date_fields_ignore_partial_input() {
    let mut editor = TaskEditor::create(
      DateRange::new(
        date(2024, 5, 1),
        date(2024, 5, 2)
      )
    );

    apply_field(
      &mut editor,
      Field::End,
      "2024-05-09".to_string()
    );
    assert_eq!(editor.end, date(2024, 5, 9));

    apply_field(
      &mut editor,
      Field::Start,
      String::new()
    );
    assert_eq!(editor.start, date(2024, 5, 1));

    apply_field(
      &mut editor,
      Field::Name,
      "Shoot intro".to_string()
    );
    assert_eq!(editor.name, "Shoot intro");
  }
}
