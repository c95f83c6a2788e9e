use crate::components::ui::{Button, ButtonSize, ButtonVariant};
use crate::components::{AlertBanner, ChildlistField, ModalOutlet};
use crate::host::NotificationKind;
use crate::models::normalize_id;
use crate::repository::ContentRepository;
use crate::state::AppContext;
use crate::util::decode_part;
use leptos::ev;
use leptos::prelude::*;
use leptos_dom::helpers::window_event_listener;
use leptos_router::components::Redirect;
use leptos_router::hooks::{use_navigate, use_query_map};
use leptos_router::params::Params;

#[derive(Params, PartialEq, Clone, Debug)]
pub struct ItemRouteParams {
    pub item_id: Option<String>,
}

pub(crate) fn item_href(item_id: &str, language: &str) -> String {
    format!("/item/{}?la={}", urlencoding::encode(item_id), urlencoding::encode(language))
}

/// Route segments may arrive encoded and in any case; lookups use the canonical form.
fn canonical_id(raw: &str) -> String {
    let decoded = decode_part(raw);
    normalize_id(&decoded).unwrap_or(decoded)
}

fn is_truthy(v: &str) -> bool {
    matches!(v.trim(), "1" | "true" | "yes")
}

#[component]
pub fn RootPage() -> impl IntoView {
    let app_state = expect_context::<AppContext>().0;
    let (root, language) = app_state
        .config
        .with_value(|c| (c.root_item_id.clone(), c.default_language.clone()));

    view! { <Redirect path=item_href(&root, &language) /> }
}

/// One content item with its childlist field.
#[component]
pub fn ItemPage() -> impl IntoView {
    let app_state = expect_context::<AppContext>().0;
    let host = app_state.host;
    let params = leptos_router::hooks::use_params::<ItemRouteParams>();
    let query = use_query_map();
    let navigate = use_navigate();

    let item_id = Signal::derive(move || {
        params
            .get()
            .ok()
            .and_then(|p| p.item_id)
            .map(|raw| canonical_id(&raw))
            .unwrap_or_default()
    });
    let language = Signal::derive(move || {
        let explicit = query.get().get("la");
        app_state
            .config
            .with_value(|c| c.resolve_language(explicit.as_deref()))
    });
    let read_only = query.get_untracked().get("ro").is_some_and(|v| is_truthy(&v));
    // Opened inside the content editor frame.
    let embedded = query.get_untracked().get("mo").as_deref() == Some("preview");

    let item = Memo::new(move |_| {
        host.refresh.track();
        let id = item_id.get();
        let la = language.get();
        app_state
            .repository
            .with_value(|repo| repo.get_item(&id, &la).ok().flatten())
    });

    // Drain notifications: a reload of another item navigates there, a refresh re-reads the list.
    Effect::new(move |_| {
        let pending = host.notifications.get();
        if pending.is_empty() {
            return;
        }
        host.notifications.set(vec![]);

        let current = item_id.get_untracked();
        let la = language.get_untracked();
        for n in pending {
            log::info!("notification {n}");
            match n.kind {
                NotificationKind::Reload if canonical_id(&n.item_id) != current => {
                    navigate(&item_href(&n.item_id, &la), Default::default());
                }
                NotificationKind::Reload | NotificationKind::RefreshChildren => {
                    host.refresh.update(|v| *v += 1);
                }
            }
        }
    });

    let _escape_handle = window_event_listener(ev::keydown, move |e: web_sys::KeyboardEvent| {
        if e.key() == "Escape" && host.modal.get_untracked().is_some() {
            app_state.close_modal(None);
        }
    });

    let parent_link = move || {
        let parent_id = item.get().and_then(|i| i.parent_id)?;
        let la = language.get();
        let parent_name = app_state
            .repository
            .with_value(|repo| repo.get_item(&parent_id, &la).ok().flatten())
            .map(|p| p.name)
            .unwrap_or_else(|| parent_id.clone());
        Some(view! {
            <a class="text-xs text-muted-foreground hover:underline" href=item_href(&parent_id, &la)>
                {format!("\u{2190} {parent_name}")}
            </a>
        })
    };

    view! {
        <div class="mx-auto max-w-2xl space-y-4 px-4 py-8">
            <Show
                when=move || item.get().is_some()
                fallback=move || view! {
                    <div class="text-sm text-muted-foreground">
                        {move || format!("Item with id: {} could not be found", item_id.get())}
                    </div>
                }
            >
                <div class="space-y-1">
                    <Show when=move || !embedded fallback=|| ().into_view()>
                        {parent_link}
                    </Show>
                    <h1 class="text-lg font-semibold">{move || item.get().map(|i| i.name).unwrap_or_default()}</h1>
                    <div class="font-mono text-xs text-muted-foreground">
                        {move || format!("{} \u{00b7} {}", item_id.get(), language.get())}
                    </div>
                </div>

                <ChildlistField item_id=item_id language=language read_only=read_only />
            </Show>

            <Show when=move || !embedded fallback=|| ().into_view()>
                <div class="border-t border-border pt-4">
                    <Button
                        variant=ButtonVariant::Outline
                        size=ButtonSize::Sm
                        on:click=move |_| app_state.reset_repository()
                    >
                        "Reset demo content"
                    </Button>
                </div>
            </Show>

            <AlertBanner />
            <ModalOutlet />
        </div>
    }
}
