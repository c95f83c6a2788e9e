use leptos::prelude::*;
use tw_merge::*;

#[component]
pub fn Label(#[prop(optional, into)] class: String, children: Children) -> impl IntoView {
    let class = tw_merge!(
        "flex items-center gap-2 text-sm leading-none font-medium select-none peer-disabled:cursor-not-allowed peer-disabled:opacity-50",
        class
    );

    view! { <label class=class>{children()}</label> }
}
