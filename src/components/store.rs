//! Change-gated value cells backing component props and state.
//!
//! A component keeps one typed record of `Prop<T>` fields for its props and
//! another for its state. Each field pairs with a setter on the component
//! that supplies the render step for that field.

use crate::ui::{Content, Element};

/// A stored value whose updates are skipped when nothing changed.
#[derive(Debug, Clone, Default)]
pub struct Prop<T> {
    value: T,
}

impl<T: PartialEq> Prop<T> {
    pub fn new(value: T) -> Self {
        Self { value }
    }

    pub fn get(&self) -> &T {
        &self.value
    }

    /// Apply `value`, running `render` first.
    ///
    /// Without `force`, an update equal to the stored value returns `false`
    /// and neither renders nor stores anything. Returns `true` when the update
    /// was applied.
    pub fn apply<F>(&mut self, value: T, force: bool, render: F) -> bool
    where
        F: FnOnce(&T),
    {
        if !force && self.value == value {
            return false;
        }
        render(&value);
        self.value = value;
        true
    }
}

/// Render step shared by every text-or-node slot.
pub fn render_content(slot: &Element, content: &Content) {
    slot.replace_content(content);
}

/// Render step for boolean attributes such as `disabled`.
pub fn render_flag_attribute(el: &Element, name: &str, present: bool) {
    if present {
        el.set_attribute(name, "");
    } else {
        el.remove_attribute(name);
    }
}

/// Render step for classes toggled by a flag, such as `is-invalid`.
pub fn render_flag_class(el: &Element, class: &str, present: bool) {
    if present {
        el.add_class(class);
    } else {
        el.remove_class(class);
    }
}
