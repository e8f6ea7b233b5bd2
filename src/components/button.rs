use std::cell::RefCell;
use std::rc::{Rc, Weak};

use super::store::{render_content, render_flag_attribute, Prop};
use crate::ui::{Content, DomEvent, Element};

/// Activation callback.
pub type ClickCallback = Rc<dyn Fn()>;

/// Visual style, rendered as the `btn-{kind}` class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonKind {
    Primary,
    Secondary,
    Success,
    Link,
}

impl ButtonKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ButtonKind::Primary => "primary",
            ButtonKind::Secondary => "secondary",
            ButtonKind::Success => "success",
            ButtonKind::Link => "link",
        }
    }
}

pub struct ButtonSettings {
    pub title: Content,
    /// Bootstrap icon name, rendered as `<i class="bi bi-{icon}">`
    pub icon: Option<String>,
    pub kind: ButtonKind,
    pub class_name: String,
    pub enabled: bool,
    pub on_click: Option<ClickCallback>,
}

impl Default for ButtonSettings {
    fn default() -> Self {
        Self {
            title: Content::default(),
            icon: None,
            kind: ButtonKind::Primary,
            class_name: "btn".to_string(),
            enabled: true,
            on_click: None,
        }
    }
}

struct ButtonProps {
    title: Prop<Content>,
    enabled: Prop<bool>,
}

/// A clickable button with a swappable title.
pub struct Button {
    el: Element,
    title_slot: Element,
    props: RefCell<ButtonProps>,
    on_click: RefCell<Option<ClickCallback>>,
}

impl Button {
    pub fn new(settings: ButtonSettings) -> Rc<Self> {
        let ButtonSettings {
            title,
            icon,
            kind,
            class_name,
            enabled,
            on_click,
        } = settings;

        Rc::new_cyclic(|weak: &Weak<Button>| {
            let weak = weak.clone();
            let el = Element::new("button")
                .class(&format!("btn btn-{} {}", kind.as_str(), class_name))
                .listen(
                    "click",
                    Rc::new(move |event: &mut DomEvent| {
                        event.prevent_default();
                        event.stop_propagation();
                        if let Some(button) = weak.upgrade() {
                            button.activate();
                        }
                    }),
                );

            if let Some(icon) = &icon {
                el.append(&Element::new("i").class(&format!("bi bi-{}", icon)));
            }

            let title_slot = Element::new("span");
            render_content(&title_slot, &title);
            el.append(&title_slot);
            render_flag_attribute(&el, "disabled", !enabled);

            Button {
                el,
                title_slot,
                props: RefCell::new(ButtonProps {
                    title: Prop::new(title),
                    enabled: Prop::new(enabled),
                }),
                on_click: RefCell::new(on_click),
            }
        })
    }

    pub fn element(&self) -> &Element {
        &self.el
    }

    pub fn title(&self) -> Content {
        self.props.borrow().title.get().clone()
    }

    pub fn is_enabled(&self) -> bool {
        *self.props.borrow().enabled.get()
    }

    pub fn set_title(&self, title: impl Into<Content>, force: bool) {
        let slot = &self.title_slot;
        self.props
            .borrow_mut()
            .title
            .apply(title.into(), force, |content| render_content(slot, content));
    }

    pub fn set_enabled(&self, enabled: bool, force: bool) {
        let el = &self.el;
        self.props
            .borrow_mut()
            .enabled
            .apply(enabled, force, |enabled| render_flag_attribute(el, "disabled", !enabled));
    }

    pub fn set_on_click(&self, on_click: Option<ClickCallback>) {
        *self.on_click.borrow_mut() = on_click;
    }

    /// Simulates a user activation of the underlying element.
    pub fn click(&self) -> DomEvent {
        self.el.click()
    }

    fn activate(&self) {
        if !self.is_enabled() {
            tracing::trace!("click ignored on disabled button");
            return;
        }
        let callback = self.on_click.borrow().clone();
        if let Some(callback) = callback {
            callback();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn counting_button(hits: &Rc<Cell<u32>>) -> Rc<Button> {
        let hits = hits.clone();
        Button::new(ButtonSettings {
            title: "Go".into(),
            on_click: Some(Rc::new(move || hits.set(hits.get() + 1))),
            ..Default::default()
        })
    }

    #[test]
    fn test_render_markup() {
        let button = Button::new(ButtonSettings {
            title: "Save".into(),
            icon: Some("check".to_string()),
            kind: ButtonKind::Link,
            ..Default::default()
        });
        assert_eq!(
            button.element().to_html(),
            "<button class=\"btn btn-link\"><i class=\"bi bi-check\"></i><span>Save</span></button>"
        );
    }

    #[test]
    fn test_initially_disabled_is_rendered() {
        let button = Button::new(ButtonSettings {
            enabled: false,
            ..Default::default()
        });
        assert!(button.element().has_attribute("disabled"));
        assert!(!button.is_enabled());
    }

    #[test]
    fn test_set_title_noop_when_unchanged() {
        let button = Button::new(ButtonSettings {
            title: "Go".into(),
            ..Default::default()
        });
        let before = button.title_slot.mutation_count();
        button.set_title("Go", false);
        assert_eq!(button.title_slot.mutation_count(), before);

        button.set_title("Go", true);
        assert!(button.title_slot.mutation_count() > before);
        assert_eq!(button.element().text_content(), "Go");
    }

    #[test]
    fn test_set_title_with_node() {
        let button = Button::new(ButtonSettings::default());
        let strong = Element::new("strong").text("Bold");
        button.set_title(&strong, false);
        assert_eq!(button.element().text_content(), "Bold");
        assert_eq!(button.title(), Content::Node(strong));
    }

    #[test]
    fn test_set_enabled_toggles_disabled_attribute() {
        let button = Button::new(ButtonSettings::default());
        button.set_enabled(false, false);
        assert!(button.element().has_attribute("disabled"));

        let before = button.element().mutation_count();
        button.set_enabled(false, false);
        assert_eq!(button.element().mutation_count(), before);

        button.set_enabled(true, false);
        assert!(!button.element().has_attribute("disabled"));
    }

    #[test]
    fn test_click_invokes_callback_and_suppresses_default() {
        let hits = Rc::new(Cell::new(0));
        let button = counting_button(&hits);
        let event = button.click();
        assert_eq!(hits.get(), 1);
        assert!(event.default_prevented());
        assert!(event.propagation_stopped());
    }

    #[test]
    fn test_click_does_not_bubble() {
        let outer_hits = Rc::new(Cell::new(0));
        let hits = outer_hits.clone();
        let button = Button::new(ButtonSettings::default());
        let wrapper = Element::new("div")
            .listen("click", Rc::new(move |_: &mut DomEvent| hits.set(hits.get() + 1)))
            .child(button.element());
        button.click();
        assert_eq!(outer_hits.get(), 0);
        drop(wrapper);
    }

    #[test]
    fn test_click_without_callback_is_noop() {
        let button = Button::new(ButtonSettings::default());
        let event = button.click();
        assert!(event.default_prevented());
    }

    #[test]
    fn test_disabled_button_ignores_clicks() {
        let hits = Rc::new(Cell::new(0));
        let button = counting_button(&hits);
        button.set_enabled(false, false);
        button.click();
        assert_eq!(hits.get(), 0);
    }
}
