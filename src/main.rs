use clap::Parser;
use std::rc::Rc;

use form_widgets::cli::args::Args;
use form_widgets::components::{
    Component, Credentials, LangSwitcher, LangSwitcherSettings, LoginForm, LoginFormSettings,
};
use form_widgets::config::Config;
use form_widgets::infrastructure::logging::{setup_logging, LoggingConfig};
use form_widgets::internationalization::{default_catalog, Language, Translate};
use form_widgets::messaging::EventBus;
use form_widgets::network::{HttpSubmitter, Submitter};
use form_widgets::ui::Element;

/// Number of language switchers on the page; they are kept in sync by the bus.
const SWITCHER_COUNT: usize = 3;

async fn render_page(args: &Args, config: &Config) -> anyhow::Result<String> {
    let bus = Rc::new(EventBus::new());
    let translator: Rc<dyn Translate> = Rc::new(default_catalog());
    let submitter: Rc<dyn Submitter> = Rc::new(HttpSubmitter::from_config(config)?);

    let page = Element::new("main").class("container");
    page.mount_root();
    let header = Element::new("header").class("d-flex justify-content-end");
    let footer = Element::new("footer").class("d-flex justify-content-center");
    page.append(&header);

    let switchers: Vec<Rc<LangSwitcher>> = (0..SWITCHER_COUNT)
        .map(|_| {
            LangSwitcher::new(
                LangSwitcherSettings {
                    lang: config.language,
                    ..Default::default()
                },
                bus.clone(),
            )
        })
        .collect();

    let login_form = LoginForm::new(
        LoginFormSettings {
            lang: config.language,
            endpoint: config.login_endpoint.clone(),
            on_success: Some(Rc::new(|credentials: &Credentials| {
                tracing::info!(login = %credentials.login, "signed in");
            })),
        },
        &bus,
        translator,
        submitter,
    );

    for (index, switcher) in switchers.iter().enumerate() {
        match index {
            0 => switcher.mount(&header),
            _ => switcher.mount(&footer),
        }
    }
    login_form.mount(&page);
    page.append(&footer);

    login_form.form().login_input().type_text(&args.login);
    login_form.form().password_input().type_text(&args.password);

    if let Some(lang) = &args.switch_lang {
        let lang: Language = lang.parse()?;
        let switcher = &switchers[0];
        match lang {
            Language::Russian => switcher.russian_button().click(),
            Language::English => switcher.english_button().click(),
        };
    }

    if args.submit {
        let outcome = login_form.submit().await;
        tracing::info!(?outcome, "submission finished");
    }

    Ok(page.to_html())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = Config::load(&args)?;
    config.validate()?;

    let logging = LoggingConfig::default()
        .with_level(&config.log_level)?
        .with_format(args.log_format)
        .with_file(args.log_file.as_deref());
    setup_logging(logging)?;

    tracing::debug!(?config, "effective configuration");

    let local = tokio::task::LocalSet::new();
    let html = local.run_until(render_page(&args, &config)).await?;
    println!("{}", html);

    Ok(())
}
