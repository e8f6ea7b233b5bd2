use std::cell::RefCell;
use std::rc::{Rc, Weak};

use super::store::{render_content, render_flag_attribute, render_flag_class, Prop};
use crate::ui::{Content, DomEvent, Element};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Text,
    Password,
    Email,
}

impl InputKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            InputKind::Text => "text",
            InputKind::Password => "password",
            InputKind::Email => "email",
        }
    }
}

pub struct InputSettings {
    pub label: Content,
    pub value: String,
    pub kind: InputKind,
    pub placeholder: Option<String>,
    pub error: Content,
    pub has_error: bool,
    pub enabled: bool,
}

impl Default for InputSettings {
    fn default() -> Self {
        Self {
            label: Content::default(),
            value: String::new(),
            kind: InputKind::Text,
            placeholder: None,
            error: Content::default(),
            has_error: false,
            enabled: true,
        }
    }
}

struct InputProps {
    label: Prop<Content>,
    error: Prop<Content>,
    has_error: Prop<bool>,
    enabled: Prop<bool>,
}

struct InputState {
    value: Prop<String>,
}

/// Labelled text field with an inline error line.
///
/// The error text and the invalid flag are separate props: only the flag
/// decides whether the error line is visible.
pub struct Input {
    el: Element,
    label_slot: Element,
    field: Element,
    error_slot: Element,
    props: RefCell<InputProps>,
    state: RefCell<InputState>,
}

impl Input {
    pub fn new(settings: InputSettings) -> Rc<Self> {
        let InputSettings {
            label,
            value,
            kind,
            placeholder,
            error,
            has_error,
            enabled,
        } = settings;

        Rc::new_cyclic(|weak: &Weak<Input>| {
            let weak = weak.clone();
            let label_slot = Element::new("span");
            render_content(&label_slot, &label);

            let field = Element::new("input")
                .attr("type", kind.as_str())
                .class("form-control")
                .listen(
                    "input",
                    Rc::new(move |event: &mut DomEvent| {
                        if let Some(input) = weak.upgrade() {
                            input.set_value(&event.target().value(), false);
                        }
                    }),
                );
            if let Some(placeholder) = &placeholder {
                field.set_attribute("placeholder", placeholder);
            }
            field.set_value(&value);
            render_flag_class(&field, "is-invalid", has_error);
            render_flag_attribute(&field, "disabled", !enabled);

            let error_slot = Element::new("span");
            render_content(&error_slot, &error);
            let error_wrapper = Element::new("div").class("invalid-feedback").child(&error_slot);

            let el = Element::new("label")
                .class("form-label")
                .child(&label_slot)
                .child(&field)
                .child(&error_wrapper);

            Input {
                el,
                label_slot,
                field,
                error_slot,
                props: RefCell::new(InputProps {
                    label: Prop::new(label),
                    error: Prop::new(error),
                    has_error: Prop::new(has_error),
                    enabled: Prop::new(enabled),
                }),
                state: RefCell::new(InputState {
                    value: Prop::new(value),
                }),
            }
        })
    }

    pub fn element(&self) -> &Element {
        &self.el
    }

    /// The `<input>` node itself.
    pub fn field(&self) -> &Element {
        &self.field
    }

    pub fn label(&self) -> Content {
        self.props.borrow().label.get().clone()
    }

    pub fn set_label(&self, label: impl Into<Content>, force: bool) {
        let slot = &self.label_slot;
        self.props
            .borrow_mut()
            .label
            .apply(label.into(), force, |content| render_content(slot, content));
    }

    /// Last committed value of the field.
    pub fn value(&self) -> String {
        self.state.borrow().value.get().clone()
    }

    pub fn set_value(&self, value: &str, force: bool) {
        let field = &self.field;
        self.state
            .borrow_mut()
            .value
            .apply(value.to_string(), force, |value| field.set_value(value));
    }

    pub fn error(&self) -> Content {
        self.props.borrow().error.get().clone()
    }

    pub fn has_error(&self) -> bool {
        *self.props.borrow().has_error.get()
    }

    pub fn show_error(&self, error: impl Into<Content>, force: bool) {
        let slot = &self.error_slot;
        let field = &self.field;
        let mut props = self.props.borrow_mut();
        props
            .error
            .apply(error.into(), force, |content| render_content(slot, content));
        props
            .has_error
            .apply(true, force, |flag| render_flag_class(field, "is-invalid", *flag));
    }

    /// Clears the invalid flag. The error text is left in place.
    pub fn reset_error(&self, force: bool) {
        let field = &self.field;
        self.props
            .borrow_mut()
            .has_error
            .apply(false, force, |flag| render_flag_class(field, "is-invalid", *flag));
    }

    pub fn is_enabled(&self) -> bool {
        *self.props.borrow().enabled.get()
    }

    pub fn set_enabled(&self, enabled: bool, force: bool) {
        let field = &self.field;
        self.props
            .borrow_mut()
            .enabled
            .apply(enabled, force, |enabled| render_flag_attribute(field, "disabled", !enabled));
    }

    /// Simulates the user typing until the field holds `value`.
    pub fn type_text(&self, value: &str) {
        self.field.type_text(value);
    }
}
