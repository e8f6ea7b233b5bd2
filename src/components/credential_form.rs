use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use super::input::{Input, InputKind, InputSettings};
use super::validation::{Field, ValidationErrorMap};
use super::Component;
use crate::internationalization::{Language, Translate};
use crate::messaging::{BusEvent, Channel, EventBus, Subscription};
use crate::ui::Element;

pub struct CredentialFormSettings {
    pub lang: Language,
}

impl Default for CredentialFormSettings {
    fn default() -> Self {
        Self {
            lang: Language::Russian,
        }
    }
}

/// Login and password inputs with per-field error display.
///
/// `show_error` always re-asserts both fields: a field missing from the map
/// has its error cleared. The last map is kept so a language change can
/// re-render it.
pub struct CredentialForm {
    el: Element,
    login: Rc<Input>,
    password: Rc<Input>,
    translator: Rc<dyn Translate>,
    lang: Cell<Language>,
    errors: RefCell<ValidationErrorMap>,
    subscription: RefCell<Option<Subscription>>,
}

impl CredentialForm {
    pub fn new(
        settings: CredentialFormSettings,
        bus: &EventBus,
        translator: Rc<dyn Translate>,
    ) -> Rc<Self> {
        let lang = settings.lang;
        let id = bus.register();

        Rc::new_cyclic(|weak: &Weak<CredentialForm>| {
            let login = Input::new(InputSettings {
                label: translator.translate(lang, "LOGIN", &[]).into(),
                kind: InputKind::Text,
                ..Default::default()
            });
            let password = Input::new(InputSettings {
                label: translator.translate(lang, "PASSWORD", &[]).into(),
                kind: InputKind::Password,
                ..Default::default()
            });

            let el = Element::new("div")
                .class("d-flex flex-column")
                .child(login.element())
                .child(password.element());

            let listener = weak.clone();
            let subscription = bus.subscribe(id, Channel::ChangeLang, move |event: &BusEvent| {
                let BusEvent::ChangeLang(lang) = event;
                if let Some(form) = listener.upgrade() {
                    form.set_lang(*lang);
                }
                Ok(())
            });

            CredentialForm {
                el,
                login,
                password,
                translator,
                lang: Cell::new(lang),
                errors: RefCell::new(ValidationErrorMap::new()),
                subscription: RefCell::new(Some(subscription)),
            }
        })
    }

    pub fn login(&self) -> String {
        self.login.value()
    }

    pub fn password(&self) -> String {
        self.password.value()
    }

    pub fn login_input(&self) -> &Rc<Input> {
        &self.login
    }

    pub fn password_input(&self) -> &Rc<Input> {
        &self.password
    }

    pub fn lang(&self) -> Language {
        self.lang.get()
    }

    /// The map most recently passed to [`CredentialForm::show_error`].
    pub fn errors(&self) -> ValidationErrorMap {
        self.errors.borrow().clone()
    }

    pub fn show_error(&self, errors: &ValidationErrorMap) {
        *self.errors.borrow_mut() = errors.clone();
        self.render_errors();
    }

    /// Relabel both fields and re-render the stored errors in `lang`.
    pub fn set_lang(&self, lang: Language) {
        self.lang.set(lang);
        self.login
            .set_label(self.translator.translate(lang, "LOGIN", &[]), false);
        self.password
            .set_label(self.translator.translate(lang, "PASSWORD", &[]), false);
        self.render_errors();
        tracing::debug!(lang = %lang, "credential form relabelled");
    }

    fn input_for(&self, field: Field) -> &Input {
        match field {
            Field::Login => &*self.login,
            Field::Password => &*self.password,
        }
    }

    fn render_errors(&self) {
        let lang = self.lang.get();
        let errors = self.errors.borrow();
        for field in Field::ALL {
            let input = self.input_for(field);
            match errors.get(field.as_str()) {
                Some(error) => {
                    let text = self.translator.translate(lang, &error.code, &error.args);
                    input.show_error(text, false);
                }
                None => input.reset_error(false),
            }
        }
    }
}

impl Component for CredentialForm {
    fn name(&self) -> &str {
        "credential_form"
    }

    fn element(&self) -> &Element {
        &self.el
    }

    fn teardown(&self) {
        self.subscription.borrow_mut().take();
    }
}
