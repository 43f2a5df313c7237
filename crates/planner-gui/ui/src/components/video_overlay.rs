use planner_core::video::embed_url;
use web_sys::MouseEvent;
use yew::{
  Callback,
  Html,
  Properties,
  function_component,
  html
};

#[derive(Properties, PartialEq)]
pub struct VideoOverlayProps {
  pub url:      String,
  pub on_close: Callback<()>
}

#[function_component(VideoOverlay)]
pub fn video_overlay(
  props: &VideoOverlayProps
) -> Html {
  let onclick = {
    let on_close = props.on_close.clone();
    Callback::from(move |_| {
      on_close.emit(())
    })
  };
  let keep_open =
    Callback::from(|event: MouseEvent| {
      event.stop_propagation()
    });

  html! {
      <div class="video-overlay" {onclick}>
          <div class="video-frame" onclick={keep_open}>
              <iframe
                  src={embed_url(&props.url)}
                  allow="autoplay; encrypted-media; picture-in-picture"
                  allowfullscreen=true
              />
          </div>
      </div>
  }
}
