use yew::{
  Callback,
  Html,
  Properties,
  function_component,
  html
};

#[derive(Properties, PartialEq)]
pub struct ToolbarProps {
  pub title:    String,
  pub on_prev:  Callback<()>,
  pub on_next:  Callback<()>,
  pub on_today: Callback<()>,
  pub on_new:   Callback<()>
}

#[function_component(Toolbar)]
pub fn toolbar(
  props: &ToolbarProps
) -> Html {
  let click = |cb: &Callback<()>| {
    let cb = cb.clone();
    Callback::from(move |_| cb.emit(()))
  };

  html! {
      <div class="toolbar">
          <button class="btn" onclick={click(&props.on_prev)}>{ "Prev" }</button>
          <h1 class="month-title">{ &props.title }</h1>
          <button class="btn" onclick={click(&props.on_next)}>{ "Next" }</button>
          <button class="btn" onclick={click(&props.on_today)}>{ "Today" }</button>
          <button class="btn primary" onclick={click(&props.on_new)}>{ "New task" }</button>
      </div>
  }
}
