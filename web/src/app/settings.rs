use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub(in crate::app) struct SettingsProps {
    #[prop_or_default]
    pub open: bool,
    pub muted: bool,
    pub on_toggle_mute: Callback<()>,
    pub on_close: Callback<()>,
}

#[function_component]
pub(in crate::app) fn SettingsView(props: &SettingsProps) -> Html {
    let on_toggle_mute = props.on_toggle_mute.clone();
    let on_close = props.on_close.clone();
    html! {
        <dialog id="settings" open={props.open}>
            <article>
                <h2>{"Opcions"}</h2>
                <label>
                    <input
                        type="checkbox"
                        checked={props.muted}
                        onchange={move |_| on_toggle_mute.emit(())}
                    />
                    {"Silencia els sons"}
                </label>
                <footer>
                    <button onclick={move |_| on_close.emit(())}>{"Tanca"}</button>
                </footer>
            </article>
        </dialog>
    }
}
