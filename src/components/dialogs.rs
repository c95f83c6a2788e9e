use crate::components::ui::{
    Alert, AlertDescription, Button, ButtonSize, ButtonVariant, Input, Label,
};
use crate::host::{ModalKind, ModalRequest};
use crate::repository::ContentRepository;
use crate::state::{AppContext, AppState};
use crate::storage::save_repository;
use crate::workflow::add_child::{submit, template_candidates, AddChildParams, TemplateCandidate};
use icons::{Check, X};
use leptos::html;
use leptos::prelude::*;

/// Renders whichever modal the host currently has open.
#[component]
pub fn ModalOutlet() -> impl IntoView {
    let app_state = expect_context::<AppContext>().0;
    let modal = app_state.host.modal;

    move || {
        modal.get().map(|request| match request.kind {
            ModalKind::AddChild => view! { <AddChildDialog request=request /> }.into_any(),
            ModalKind::ContentEditor => view! { <ContentEditorDialog request=request /> }.into_any(),
        })
    }
}

/// Host alerts. One at a time, dismissed by the user.
#[component]
pub fn AlertBanner() -> impl IntoView {
    let alert = expect_context::<AppContext>().0.host.alert;

    view! {
        <Show when=move || alert.get().is_some() fallback=|| ().into_view()>
            <div class="fixed inset-x-0 top-4 z-[60] flex justify-center px-4">
                <Alert class="flex max-w-md items-start gap-3 border-destructive/30 bg-background shadow-lg">
                    <AlertDescription class="flex-1 text-destructive text-xs">
                        {move || alert.get().unwrap_or_default()}
                    </AlertDescription>
                    <button
                        class="text-muted-foreground hover:text-foreground"
                        aria-label="Dismiss"
                        on:click=move |_| alert.set(None)
                    >
                        <X class="size-4" />
                    </button>
                </Alert>
            </div>
        </Show>
    }
}

fn load_candidates(
    app_state: AppState,
    params: Option<&AddChildParams>,
) -> Result<Vec<TemplateCandidate>, String> {
    let Some(params) = params else {
        return Err("The dialog was opened without a parent item".to_string());
    };
    app_state.repository.with_value(|repo| {
        let parent = repo
            .get_item(&params.parent_id, &params.language)
            .map_err(|e| e.to_string())?
            .ok_or_else(|| format!("Item with id: {} could not be found", params.parent_id))?;
        template_candidates(repo, &parent).map_err(|e| e.to_string())
    })
}

/// Template and name picker. Closes with the new item's id, or with nothing on cancel.
#[component]
pub fn AddChildDialog(request: ModalRequest) -> impl IntoView {
    let app_state = expect_context::<AppContext>().0;
    let params = StoredValue::new(AddChildParams::from_url(&request.url));
    let candidates = params.with_value(|p| load_candidates(app_state, p.as_ref()));

    let chosen_template: RwSignal<Option<String>> = RwSignal::new(None);
    let name = RwSignal::new(String::new());
    let error: RwSignal<Option<String>> = RwSignal::new(candidates.as_ref().err().cloned());
    let name_ref = NodeRef::<html::Input>::new();

    let on_ok = move || {
        let Some(params) = params.get_value() else {
            return;
        };
        let template = chosen_template.get_untracked();
        let name = name.get_untracked();
        let created = app_state
            .repository
            .try_update_value(|repo| submit(repo, &params, template.as_deref(), &name));

        match created {
            Some(Ok(node)) => {
                app_state.repository.with_value(save_repository);
                app_state.close_modal(Some(node.id));
            }
            Some(Err(e)) => {
                error.set(Some(e.to_string()));
                if let Some(el) = name_ref.get() {
                    let _ = el.focus();
                }
            }
            None => log::warn!("content tree disposed while the add-child dialog was open"),
        }
    };

    let template_list = candidates.unwrap_or_default();

    view! {
        <div class="fixed inset-0 z-50 flex items-center justify-center bg-black/30 px-4">
            <div
                class="flex max-h-full flex-col rounded-md border border-border bg-background p-4 shadow-lg"
                style=format!("width: {}; max-width: 100%; height: {};", request.width, request.height)
            >
                <div class="mb-3 space-y-1">
                    <div class="text-sm font-medium">"Add child"</div>
                    <div class="text-xs text-muted-foreground">"Select a template and name the new item."</div>
                </div>

                <div class="flex-1 space-y-1 overflow-y-auto">
                    {template_list
                        .into_iter()
                        .map(|t| {
                            let id = t.id.clone();
                            let is_chosen = {
                                let id = id.clone();
                                move || chosen_template.get().as_deref() == Some(id.as_str())
                            };
                            let chosen_attr = is_chosen.clone();
                            let tooltip = t.description.clone();
                            view! {
                                <button
                                    type="button"
                                    class="flex w-full items-start gap-2 rounded-md border border-transparent px-2 py-1.5 text-left text-sm hover:bg-accent data-[chosen=true]:border-border data-[chosen=true]:bg-accent"
                                    data-chosen=move || chosen_attr().to_string()
                                    title=tooltip
                                    on:click=move |_| chosen_template.set(Some(id.clone()))
                                >
                                    <span class="size-4 shrink-0">
                                        <Show when=is_chosen fallback=|| ().into_view()>
                                            <Check class="size-4" />
                                        </Show>
                                    </span>
                                    <span class="flex-1">
                                        <span class="block font-medium">{t.name}</span>
                                        <span class="block text-xs text-muted-foreground">{t.description}</span>
                                    </span>
                                </button>
                            }
                        })
                        .collect_view()}
                </div>

                <div class="space-y-2 pt-3">
                    <div class="space-y-1">
                        <Label class="text-xs">"Name"</Label>
                        <Input
                            node_ref=name_ref
                            bind_value=name
                            class="h-8 text-sm border-border bg-background"
                        />
                    </div>

                    <Show when=move || error.get().is_some() fallback=|| ().into_view()>
                        {move || error.get().map(|e| view! {
                            <Alert class="border-destructive/30">
                                <AlertDescription class="text-destructive text-xs">{e}</AlertDescription>
                            </Alert>
                        })}
                    </Show>

                    <div class="flex items-center justify-end gap-2 pt-2">
                        <Button
                            variant=ButtonVariant::Outline
                            size=ButtonSize::Sm
                            on:click=move |_| app_state.close_modal(None)
                        >
                            "Cancel"
                        </Button>
                        <Button size=ButtonSize::Sm on:click=move |_| on_ok()>
                            "OK"
                        </Button>
                    </div>
                </div>
            </div>
        </div>
    }
}

/// The content editor, framed. Closing it is the only result it reports.
#[component]
pub fn ContentEditorDialog(request: ModalRequest) -> impl IntoView {
    let app_state = expect_context::<AppContext>().0;

    view! {
        <div class="fixed inset-0 z-50 flex items-center justify-center bg-black/30 px-4">
            <div
                class="flex max-h-full flex-col rounded-md border border-border bg-background shadow-lg"
                style=format!("width: {}; max-width: 100%; height: {};", request.width, request.height)
            >
                <div class="flex items-center justify-between border-b border-border px-4 py-2">
                    <div class="text-sm font-medium">"Content editor"</div>
                    <button
                        class="text-muted-foreground hover:text-foreground"
                        aria-label="Close"
                        on:click=move |_| app_state.close_modal(None)
                    >
                        <X class="size-4" />
                    </button>
                </div>
                <iframe class="w-full flex-1 border-0" src=request.url.clone() />
            </div>
        </div>
    }
}
