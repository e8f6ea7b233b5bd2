use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use tokio::sync::Notify;
use tracing::Instrument;
use uuid::Uuid;

use super::button::{Button, ButtonKind, ButtonSettings};
use super::credential_form::{CredentialForm, CredentialFormSettings};
use super::store::{render_flag_class, Prop};
use super::validation::{validate, Credentials, ValidationErrorMap};
use super::Component;
use crate::internationalization::{Language, Translate};
use crate::messaging::{BusEvent, Channel, EventBus, Subscription};
use crate::network::{SubmitResponse, Submitter};
use crate::ui::Element;

/// Message key shown when a submission could not reach a verdict.
pub const ERR_TRY_AGAIN: &str = "ERR_TRY_AGAIN";
/// Message key shown when the server rejects without naming a field.
pub const ERR_INVALID_CREDENTIALS: &str = "ERR_INVALID_CREDENTIALS";

/// Called with the submitted credentials once the server accepts them.
pub type SuccessCallback = Rc<dyn Fn(&Credentials)>;

pub struct LoginFormSettings {
    pub lang: Language,
    /// Endpoint name handed to the submitter
    pub endpoint: String,
    pub on_success: Option<SuccessCallback>,
}

impl Default for LoginFormSettings {
    fn default() -> Self {
        Self {
            lang: Language::Russian,
            endpoint: "login".to_string(),
            on_success: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitPhase {
    Idle,
    Validating,
    Submitting,
}

/// How a call to [`LoginForm::submit`] ended. The form is back to
/// [`SubmitPhase::Idle`] in every case.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// A previous submission is still in flight; nothing was sent
    Busy,
    ValidationFailed(ValidationErrorMap),
    Accepted,
    Rejected(ValidationErrorMap),
    TransportError(String),
}

struct LoginFormState {
    /// Message key of the form-level notice, if one is showing
    notice: Prop<Option<String>>,
}

/// Credential form plus submit button, owning validation and submission.
pub struct LoginForm {
    el: Element,
    form: Rc<CredentialForm>,
    button: Rc<Button>,
    notice: Element,
    translator: Rc<dyn Translate>,
    submitter: Rc<dyn Submitter>,
    endpoint: String,
    on_success: Option<SuccessCallback>,
    lang: Cell<Language>,
    phase: Cell<SubmitPhase>,
    click_pending: Cell<bool>,
    clicks: Notify,
    state: RefCell<LoginFormState>,
    subscription: RefCell<Option<Subscription>>,
}

impl LoginForm {
    pub fn new(
        settings: LoginFormSettings,
        bus: &EventBus,
        translator: Rc<dyn Translate>,
        submitter: Rc<dyn Submitter>,
    ) -> Rc<Self> {
        let LoginFormSettings {
            lang,
            endpoint,
            on_success,
        } = settings;
        let id = bus.register();

        Rc::new_cyclic(|weak: &Weak<LoginForm>| {
            let form = CredentialForm::new(CredentialFormSettings { lang }, bus, translator.clone());

            let clicked = weak.clone();
            let button = Button::new(ButtonSettings {
                title: translator.translate(lang, "TO_LOGIN", &[]).into(),
                kind: ButtonKind::Primary,
                class_name: "btn mt-3".to_string(),
                on_click: Some(Rc::new(move || {
                    if let Some(login_form) = clicked.upgrade() {
                        login_form.request_submit();
                    }
                })),
                ..Default::default()
            });

            let notice = Element::new("div").class("form-text text-danger d-none");

            let el = Element::new("div")
                .class("d-flex flex-column")
                .child(form.element())
                .child(&notice)
                .child(button.element());

            let listener = weak.clone();
            let subscription = bus.subscribe(id, Channel::ChangeLang, move |event: &BusEvent| {
                let BusEvent::ChangeLang(lang) = event;
                if let Some(login_form) = listener.upgrade() {
                    login_form.set_lang(*lang);
                }
                Ok(())
            });

            LoginForm {
                el,
                form,
                button,
                notice,
                translator,
                submitter,
                endpoint,
                on_success,
                lang: Cell::new(lang),
                phase: Cell::new(SubmitPhase::Idle),
                click_pending: Cell::new(false),
                clicks: Notify::new(),
                state: RefCell::new(LoginFormState {
                    notice: Prop::new(None),
                }),
                subscription: RefCell::new(Some(subscription)),
            }
        })
    }

    pub fn form(&self) -> &Rc<CredentialForm> {
        &self.form
    }

    pub fn submit_button(&self) -> &Rc<Button> {
        &self.button
    }

    pub fn phase(&self) -> SubmitPhase {
        self.phase.get()
    }

    pub fn lang(&self) -> Language {
        self.lang.get()
    }

    /// Message key of the form-level notice currently showing.
    pub fn notice(&self) -> Option<String> {
        self.state.borrow().notice.get().clone()
    }

    pub fn notice_element(&self) -> &Element {
        &self.notice
    }

    /// Current field errors, as last shown by the credential form.
    pub fn errors(&self) -> ValidationErrorMap {
        self.form.errors()
    }

    /// Whether a click is waiting for [`LoginForm::process_clicks`].
    pub fn has_pending_submit(&self) -> bool {
        self.click_pending.get()
    }

    /// Serve submit-button clicks until the returned future is dropped.
    ///
    /// Clicks never run the submission themselves; they queue a request that
    /// this loop picks up. Run it next to the page, e.g. with `spawn_local`
    /// on a `LocalSet`.
    pub async fn process_clicks(&self) {
        loop {
            self.clicks.notified().await;
            if self.click_pending.replace(false) {
                let outcome = self.submit().await;
                tracing::debug!(?outcome, "click submission finished");
            }
        }
    }

    fn request_submit(&self) {
        self.click_pending.set(true);
        self.clicks.notify_one();
        tracing::trace!("submit requested by click");
    }

    /// Validate the fields and, if they pass, send them to the server.
    ///
    /// Returns [`SubmitOutcome::Busy`] without doing anything while an
    /// earlier submission is still waiting for its response. Dropping the
    /// future mid-request puts the form back to idle.
    pub async fn submit(&self) -> SubmitOutcome {
        if self.phase.get() == SubmitPhase::Submitting {
            tracing::debug!("submission already in flight, ignoring");
            return SubmitOutcome::Busy;
        }

        self.phase.set(SubmitPhase::Validating);
        self.set_notice(None, false);
        let credentials = Credentials::new(self.form.login(), self.form.password());

        let validation = validate(&credentials);
        if validation.has_error {
            tracing::debug!(fields = validation.errors.len(), "local validation failed");
            self.form.show_error(&validation.errors);
            self.phase.set(SubmitPhase::Idle);
            return SubmitOutcome::ValidationFailed(validation.errors);
        }

        let in_flight = InFlight::enter(self);

        let submission_id = Uuid::new_v4();
        let span = tracing::info_span!("submission", id = %submission_id, endpoint = %self.endpoint);
        let submitter = self.submitter.clone();
        let result = submitter
            .submit(&self.endpoint, &credentials)
            .instrument(span.clone())
            .await;
        drop(in_flight);

        let _entered = span.enter();
        match result {
            Ok(SubmitResponse::Ok) => {
                tracing::info!("credentials accepted");
                self.form.show_error(&ValidationErrorMap::new());
                if let Some(on_success) = &self.on_success {
                    on_success(&credentials);
                }
                SubmitOutcome::Accepted
            }
            Ok(SubmitResponse::Fail { data }) => {
                tracing::info!(fields = data.len(), "credentials rejected");
                self.form.show_error(&data);
                if data.is_empty() {
                    self.set_notice(Some(ERR_INVALID_CREDENTIALS.to_string()), false);
                }
                SubmitOutcome::Rejected(data)
            }
            Err(e) => {
                tracing::error!(error = %e, retryable = e.is_retryable(), "submission failed");
                self.set_notice(Some(ERR_TRY_AGAIN.to_string()), false);
                SubmitOutcome::TransportError(e.to_string())
            }
        }
    }

    fn set_lang(&self, lang: Language) {
        self.lang.set(lang);
        self.button
            .set_title(self.translator.translate(lang, "TO_LOGIN", &[]), false);
        let notice = self.notice();
        self.set_notice(notice, true);
    }

    fn set_notice(&self, key: Option<String>, force: bool) {
        let (el, translator, lang) = (&self.notice, &self.translator, self.lang.get());
        self.state
            .borrow_mut()
            .notice
            .apply(key, force, |key| match key {
                Some(key) => {
                    el.set_text(&translator.translate(lang, key, &[]));
                    render_flag_class(el, "d-none", false);
                }
                None => render_flag_class(el, "d-none", true),
            });
    }
}

/// Holds the form in `Submitting` with the button disabled. Dropping it,
/// including when the submit future is cancelled, restores `Idle`.
struct InFlight<'a> {
    form: &'a LoginForm,
}

impl<'a> InFlight<'a> {
    fn enter(form: &'a LoginForm) -> Self {
        form.phase.set(SubmitPhase::Submitting);
        form.button.set_enabled(false, false);
        InFlight { form }
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.form.button.set_enabled(true, false);
        self.form.phase.set(SubmitPhase::Idle);
    }
}

impl Component for LoginForm {
    fn name(&self) -> &str {
        "login_form"
    }

    fn element(&self) -> &Element {
        &self.el
    }

    fn teardown(&self) {
        self.subscription.borrow_mut().take();
        self.form.teardown();
    }
}
