use std::cell::RefCell;
use std::rc::{Rc, Weak};

use super::button::{Button, ButtonKind, ButtonSettings};
use super::store::Prop;
use super::Component;
use crate::internationalization::{default_catalog, Language};
use crate::messaging::{BusEvent, Channel, EventBus, SubscriberId, Subscription};
use crate::ui::{Content, Element};

pub struct LangSwitcherSettings {
    pub lang: Language,
    pub russian_title: Content,
    pub english_title: Content,
}

impl Default for LangSwitcherSettings {
    /// Titles come from the built-in catalog; each language names itself.
    fn default() -> Self {
        let catalog = default_catalog();
        Self {
            lang: Language::Russian,
            russian_title: catalog.get(Language::Russian, "LANG_RU").into(),
            english_title: catalog.get(Language::English, "LANG_EN").into(),
        }
    }
}

struct LangSwitcherState {
    active_lang: Prop<Language>,
}

/// Pair of link buttons choosing the page language.
///
/// Only the button for the inactive language is enabled. Every switcher on
/// the page follows `changeLang`, so several of them stay in step.
pub struct LangSwitcher {
    el: Element,
    bus: Rc<EventBus>,
    id: SubscriberId,
    russian: Rc<Button>,
    english: Rc<Button>,
    state: RefCell<LangSwitcherState>,
    subscription: RefCell<Option<Subscription>>,
}

impl LangSwitcher {
    pub fn new(settings: LangSwitcherSettings, bus: Rc<EventBus>) -> Rc<Self> {
        let id = bus.register();

        let switcher = Rc::new_cyclic(|weak: &Weak<LangSwitcher>| {
            let russian = Button::new(ButtonSettings {
                title: settings.russian_title,
                kind: ButtonKind::Link,
                on_click: Some(select_on_click(weak, Language::Russian)),
                ..Default::default()
            });
            let english = Button::new(ButtonSettings {
                title: settings.english_title,
                kind: ButtonKind::Link,
                on_click: Some(select_on_click(weak, Language::English)),
                ..Default::default()
            });

            let el = Element::new("div")
                .class("d-flex flex-row align-items-center")
                .child(russian.element())
                .text("|")
                .child(english.element());

            let listener = weak.clone();
            let subscription = bus.subscribe(id, Channel::ChangeLang, move |event: &BusEvent| {
                let BusEvent::ChangeLang(lang) = event;
                if let Some(switcher) = listener.upgrade() {
                    tracing::debug!(lang = %lang, "lang switcher received changeLang");
                    switcher.set_active_lang(*lang, false);
                }
                Ok(())
            });

            LangSwitcher {
                el,
                bus: bus.clone(),
                id,
                russian,
                english,
                state: RefCell::new(LangSwitcherState {
                    active_lang: Prop::new(settings.lang),
                }),
                subscription: RefCell::new(Some(subscription)),
            }
        });

        switcher.set_active_lang(settings.lang, true);
        switcher
    }

    pub fn active_lang(&self) -> Language {
        *self.state.borrow().active_lang.get()
    }

    pub fn russian_button(&self) -> &Rc<Button> {
        &self.russian
    }

    pub fn english_button(&self) -> &Rc<Button> {
        &self.english
    }

    /// Announce `lang` to the rest of the page, then switch locally.
    ///
    /// The bus never echoes a dispatch back to its sender, so the local
    /// update has to happen here.
    pub fn select(&self, lang: Language) {
        self.bus.dispatch(self.id, &BusEvent::ChangeLang(lang));
        self.set_active_lang(lang, false);
    }

    fn set_active_lang(&self, lang: Language, force: bool) {
        let (russian, english) = (&self.russian, &self.english);
        self.state
            .borrow_mut()
            .active_lang
            .apply(lang, force, |lang| {
                russian.set_enabled(*lang != Language::Russian, false);
                english.set_enabled(*lang != Language::English, false);
            });
    }
}

fn select_on_click(switcher: &Weak<LangSwitcher>, lang: Language) -> Rc<dyn Fn()> {
    let switcher = switcher.clone();
    Rc::new(move || {
        if let Some(switcher) = switcher.upgrade() {
            switcher.select(lang);
        }
    })
}

impl Component for LangSwitcher {
    fn name(&self) -> &str {
        "lang_switcher"
    }

    fn element(&self) -> &Element {
        &self.el
    }

    fn teardown(&self) {
        self.subscription.borrow_mut().take();
    }
}
