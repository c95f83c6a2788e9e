use crate::child_set::SelectionState;
use crate::components::hooks::use_random::use_random_id_for;
use crate::components::ui::{Button, ButtonSize, ButtonVariant};
use crate::controller::{Command, FieldContext, Message};
use crate::state::AppContext;
use icons::{ChevronDown, ChevronUp};
use leptos::prelude::*;

/// Ordered child list of one item with move, edit, add and remove commands.
#[component]
pub fn ChildlistField(
    #[prop(into)] item_id: Signal<String>,
    #[prop(into)] language: Signal<String>,
    #[prop(optional)] read_only: bool,
) -> impl IntoView {
    let app_state = expect_context::<AppContext>().0;
    let host = app_state.host;
    let widget_id = StoredValue::new(use_random_id_for("childlist"));

    let field_context = move || FieldContext {
        widget_id: widget_id.get_value(),
        item_id: item_id.get_untracked(),
        language: language.get_untracked(),
        read_only,
        selection: SelectionState::new(host.selected_id.get_untracked()),
    };

    // Re-read on navigation, language switch and refresh notifications.
    Effect::new(move |_| {
        item_id.track();
        language.track();
        host.refresh.track();
        app_state.with_controller(field_context(), |c| c.render());
    });

    // A different item means a different list; the old selection is meaningless there.
    Effect::new(move |prev: Option<String>| {
        let current = item_id.get();
        if prev.is_some_and(|p| p != current) {
            host.selected_id.set(String::new());
        }
        current
    });

    let send = move |command: Command| {
        if read_only {
            return;
        }
        let message = Message::command(command, &widget_id.get_value());
        app_state.with_controller(field_context(), |c| c.handle_message(&message));
    };

    let render = move || host.render.get();
    let options = move || render().map(|r| r.options).unwrap_or_default();
    let list_id = move || render().map(|r| r.list_id).unwrap_or_default();
    let selected_id_field = move || render().map(|r| r.selected_id_field).unwrap_or_default();
    let help_id = move || render().map(|r| r.help_id).unwrap_or_default();
    let help_text = move || {
        let selected = host.selected_id.get();
        options()
            .into_iter()
            .find(|o| o.value == selected)
            .map(|o| o.label)
            .unwrap_or_default()
    };

    view! {
        <div class="space-y-2" id=widget_id.get_value()>
            <div class="flex items-start gap-2">
                <select
                    id=list_id
                    multiple=true
                    size="10"
                    disabled=read_only
                    class="min-w-64 flex-1 rounded-md border border-border bg-background p-1 text-sm outline-none focus-visible:ring-2 focus-visible:ring-ring/50 disabled:opacity-50"
                    on:change=move |ev| host.selected_id.set(event_target_value(&ev))
                >
                    {move || {
                        let selected = host.selected_id.get();
                        options()
                            .into_iter()
                            .map(|o| {
                                let is_selected = o.selected || o.value == selected;
                                view! {
                                    <option value=o.value.clone() selected=is_selected>
                                        {o.label}
                                    </option>
                                }
                            })
                            .collect_view()
                    }}
                </select>

                <div class="flex flex-col gap-1">
                    <Button
                        variant=ButtonVariant::Outline
                        size=ButtonSize::Icon
                        attr:title="Move up"
                        attr:disabled=read_only
                        on:click=move |_| send(Command::MoveUp)
                    >
                        <ChevronUp />
                    </Button>
                    <Button
                        variant=ButtonVariant::Outline
                        size=ButtonSize::Icon
                        attr:title="Move down"
                        attr:disabled=read_only
                        on:click=move |_| send(Command::MoveDown)
                    >
                        <ChevronDown />
                    </Button>
                </div>
            </div>

            <input type="hidden" id=selected_id_field prop:value=move || host.selected_id.get() />
            <div id=help_id class="min-h-4 text-xs text-muted-foreground">{help_text}</div>

            <div class="flex items-center gap-2">
                <Button size=ButtonSize::Sm attr:disabled=read_only on:click=move |_| send(Command::Add)>
                    "Add"
                </Button>
                <Button
                    variant=ButtonVariant::Outline
                    size=ButtonSize::Sm
                    attr:disabled=read_only
                    on:click=move |_| send(Command::Edit)
                >
                    "Edit"
                </Button>
                <Button
                    variant=ButtonVariant::Destructive
                    size=ButtonSize::Sm
                    attr:disabled=read_only
                    on:click=move |_| send(Command::Remove)
                >
                    "Remove"
                </Button>
            </div>
        </div>
    }
}
