use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use async_trait::async_trait;
use tokio::sync::Notify;
use tokio::task::LocalSet;

use form_widgets::components::validation::ERR_FIELD_REQUIRED;
use form_widgets::components::{
    Component, Credentials, FieldError, LangSwitcher, LangSwitcherSettings, LoginForm,
    LoginFormSettings, SubmitOutcome, SubmitPhase, ValidationErrorMap,
};
use form_widgets::infrastructure::error::WidgetError;
use form_widgets::internationalization::{I18n, Language};
use form_widgets::messaging::{Channel, EventBus};
use form_widgets::network::{SubmitResponse, Submitter};
use form_widgets::ui::Content;

/// Replays canned responses and records every request.
#[derive(Default)]
struct ScriptedSubmitter {
    responses: RefCell<VecDeque<Result<SubmitResponse, WidgetError>>>,
    requests: RefCell<Vec<(String, Credentials)>>,
}

impl ScriptedSubmitter {
    fn with(responses: Vec<Result<SubmitResponse, WidgetError>>) -> Rc<Self> {
        Rc::new(Self {
            responses: RefCell::new(responses.into()),
            requests: RefCell::new(Vec::new()),
        })
    }

    fn request_count(&self) -> usize {
        self.requests.borrow().len()
    }
}

#[async_trait(?Send)]
impl Submitter for ScriptedSubmitter {
    async fn submit(&self, endpoint: &str, credentials: &Credentials) -> Result<SubmitResponse, WidgetError> {
        self.requests
            .borrow_mut()
            .push((endpoint.to_string(), credentials.clone()));
        self.responses
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Err(WidgetError::network("no scripted response", None)))
    }
}

/// Holds every request until the gate is opened.
struct GatedSubmitter {
    gate: Notify,
    calls: Cell<usize>,
}

#[async_trait(?Send)]
impl Submitter for GatedSubmitter {
    async fn submit(&self, _endpoint: &str, _credentials: &Credentials) -> Result<SubmitResponse, WidgetError> {
        self.calls.set(self.calls.get() + 1);
        self.gate.notified().await;
        Ok(SubmitResponse::Ok)
    }
}

struct Page {
    bus: Rc<EventBus>,
    form: Rc<LoginForm>,
    switcher: Rc<LangSwitcher>,
    signed_in: Rc<RefCell<Vec<Credentials>>>,
}

fn page(submitter: Rc<dyn Submitter>) -> Page {
    let bus = Rc::new(EventBus::new());
    let signed_in = Rc::new(RefCell::new(Vec::new()));
    let sink = signed_in.clone();
    let form = LoginForm::new(
        LoginFormSettings {
            on_success: Some(Rc::new(move |credentials: &Credentials| {
                sink.borrow_mut().push(credentials.clone());
            })),
            ..Default::default()
        },
        &bus,
        Rc::new(I18n::new()),
        submitter,
    );
    let switcher = LangSwitcher::new(LangSwitcherSettings::default(), bus.clone());
    Page {
        bus,
        form,
        switcher,
        signed_in,
    }
}

fn fill(form: &LoginForm, login: &str, password: &str) {
    form.form().login_input().type_text(login);
    form.form().password_input().type_text(password);
}

fn rejection(field: &str, code: &str) -> SubmitResponse {
    SubmitResponse::Fail {
        data: ValidationErrorMap::new().with(field, FieldError::new(code)),
    }
}

#[tokio::test]
async fn test_validation_flags_exactly_the_blank_fields() {
    let submitter = ScriptedSubmitter::with(vec![]);
    let page = page(submitter.clone());

    for (login, password, expect_login, expect_password) in [
        ("", "", true, true),
        ("   ", "secret", true, false),
        ("admin", "\t", false, true),
    ] {
        fill(&page.form, login, password);
        match page.form.submit().await {
            SubmitOutcome::ValidationFailed(errors) => {
                assert_eq!(errors.contains("login"), expect_login);
                assert_eq!(errors.contains("password"), expect_password);
                assert_eq!(page.form.form().login_input().has_error(), expect_login);
                assert_eq!(page.form.form().password_input().has_error(), expect_password);
                for (_, error) in errors.iter() {
                    assert_eq!(error.code, ERR_FIELD_REQUIRED);
                }
            }
            other => panic!("expected validation failure, got {:?}", other),
        }
    }

    assert_eq!(submitter.request_count(), 0);
}

#[tokio::test]
async fn test_server_errors_round_trip_into_fields() {
    let submitter = ScriptedSubmitter::with(vec![
        Ok(rejection("login", "ERR_USER_NOT_FOUND")),
        Ok(SubmitResponse::Ok),
    ]);
    let page = page(submitter.clone());
    fill(&page.form, "ghost", "secret");

    let outcome = page.form.submit().await;
    assert!(matches!(outcome, SubmitOutcome::Rejected(_)));
    let login = page.form.form().login_input();
    assert!(login.has_error());
    assert_eq!(login.error(), Content::from("Пользователь не найден"));
    assert!(!page.form.form().password_input().has_error());
    assert!(page.signed_in.borrow().is_empty());

    let outcome = page.form.submit().await;
    assert_eq!(outcome, SubmitOutcome::Accepted);
    assert!(!login.has_error());
    assert!(page.form.errors().is_empty());
    assert_eq!(*page.signed_in.borrow(), vec![Credentials::new("ghost", "secret")]);

    let requests = submitter.requests.borrow();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].0, "login");
}

#[tokio::test]
async fn test_language_switch_rerenders_labels_and_errors() {
    let submitter = ScriptedSubmitter::with(vec![Ok(rejection("password", "ERR_INVALID_CREDENTIALS"))]);
    let page = page(submitter);
    fill(&page.form, "admin", "wrong");
    page.form.submit().await;

    page.switcher.english_button().click();

    let credentials = page.form.form();
    assert_eq!(credentials.lang(), Language::English);
    assert_eq!(credentials.login_input().label(), Content::from("Login"));
    assert_eq!(credentials.password_input().label(), Content::from("Password"));
    assert_eq!(
        credentials.password_input().error(),
        Content::from("Invalid login or password")
    );
    assert!(credentials.password_input().has_error());
    assert!(!credentials.login_input().has_error());
    assert_eq!(page.form.submit_button().title(), Content::from("Sign in"));

    page.switcher.russian_button().click();
    assert_eq!(page.form.submit_button().title(), Content::from("Войти"));
    assert_eq!(
        credentials.password_input().error(),
        Content::from("Неверный логин или пароль")
    );
}

#[tokio::test]
async fn test_transport_failure_keeps_fields_and_shows_retry_notice() {
    let submitter = ScriptedSubmitter::with(vec![Err(WidgetError::network(
        "connection refused",
        Some("http://localhost:8080/api/login".to_string()),
    ))]);
    let page = page(submitter);
    fill(&page.form, "admin", "secret");

    let outcome = page.form.submit().await;
    assert!(matches!(outcome, SubmitOutcome::TransportError(_)));
    assert_eq!(page.form.notice().as_deref(), Some("ERR_TRY_AGAIN"));
    assert!(!page.form.form().login_input().has_error());
    assert_eq!(page.form.form().login(), "admin");
    assert!(page.signed_in.borrow().is_empty());
}

#[tokio::test]
async fn test_click_submits_once_while_in_flight() {
    let local = LocalSet::new();
    local
        .run_until(async {
            let submitter = Rc::new(GatedSubmitter {
                gate: Notify::new(),
                calls: Cell::new(0),
            });
            let page = page(submitter.clone());
            fill(&page.form, "admin", "secret");
            let runner = page.form.clone();
            tokio::task::spawn_local(async move { runner.process_clicks().await });

            page.form.submit_button().click();
            for _ in 0..100 {
                if page.form.phase() == SubmitPhase::Submitting {
                    break;
                }
                tokio::task::yield_now().await;
            }
            assert_eq!(page.form.phase(), SubmitPhase::Submitting);
            assert!(!page.form.submit_button().is_enabled());

            page.form.submit_button().click();
            assert_eq!(page.form.submit().await, SubmitOutcome::Busy);

            submitter.gate.notify_one();
            for _ in 0..100 {
                if page.form.phase() == SubmitPhase::Idle {
                    break;
                }
                tokio::task::yield_now().await;
            }
            assert_eq!(page.form.phase(), SubmitPhase::Idle);
            assert!(page.form.submit_button().is_enabled());
            assert_eq!(submitter.calls.get(), 1);
            assert_eq!(page.signed_in.borrow().len(), 1);
        })
        .await;
}

#[test]
fn test_unmount_releases_every_subscription() {
    let page = page(ScriptedSubmitter::with(vec![]));
    assert_eq!(page.bus.subscriber_count(Channel::ChangeLang), 3);

    page.form.unmount();
    assert_eq!(page.bus.subscriber_count(Channel::ChangeLang), 1);

    drop(page.switcher);
    assert_eq!(page.bus.subscriber_count(Channel::ChangeLang), 0);
}
