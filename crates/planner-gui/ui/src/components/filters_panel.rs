use planner_core::filter::{
  FilterState,
  TimeWindow
};
use planner_core::task::Category;
use web_sys::{
  HtmlInputElement,
  InputEvent
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
pub struct FiltersPanelProps {
  pub filters:            FilterState,
  pub on_toggle_category: Callback<Category>,
  pub on_time_window:     Callback<TimeWindow>,
  pub on_search:          Callback<String>,
  pub on_clear_search:    Callback<()>
}

#[function_component(FiltersPanel)]
pub fn filters_panel(
  props: &FiltersPanelProps
) -> Html {
  let category_boxes = Category::ALL
    .into_iter()
    .map(|category| {
      let checked = props
        .filters
        .categories
        .contains(&category);
      let on_toggle =
        props.on_toggle_category.clone();
      html! {
          <label class="filter-option" key={category.key()}>
              <input
                  type="checkbox"
                  {checked}
                  onchange={move |_| on_toggle.emit(category)}
              />
              <span class="swatch" style={format!("background:{}", category.color())}></span>
              { category.label() }
          </label>
      }
    })
    .collect::<Html>();

  let window_radios = TimeWindow::CHOICES
    .into_iter()
    .map(|window| {
      let checked =
        props.filters.time_window == window;
      let on_window =
        props.on_time_window.clone();
      html! {
          <label class="filter-option" key={window.label()}>
              <input
                  type="radio"
                  name="time-window"
                  {checked}
                  onchange={move |_| on_window.emit(window)}
              />
              { window.label() }
          </label>
      }
    })
    .collect::<Html>();

  let oninput = {
    let on_search = props.on_search.clone();
    Callback::from(
      move |event: InputEvent| {
        let input: HtmlInputElement =
          event.target_unchecked_into();
        on_search.emit(input.value());
      }
    )
  };
  let on_clear = {
    let on_clear =
      props.on_clear_search.clone();
    Callback::from(move |_| {
      on_clear.emit(())
    })
  };

  html! {
      <aside class="panel filters">
          <div class="header">{ "Categories" }</div>
          { category_boxes }
          <div class="header">{ "Time window" }</div>
          { window_radios }
          <div class="header">{ "Search" }</div>
          <div class="search-row">
              <input
                  type="search"
                  placeholder="Task name"
                  value={props.filters.search.clone()}
                  {oninput}
              />
              <button class="btn" onclick={on_clear}>{ "Clear" }</button>
          </div>
      </aside>
  }
}
