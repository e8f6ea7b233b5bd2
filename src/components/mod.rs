pub mod button;
pub mod credential_form;
pub mod input;
pub mod lang_switcher;
pub mod login_form;
pub mod store;
pub mod validation;

use crate::ui::Element;

pub use button::{Button, ButtonKind, ButtonSettings, ClickCallback};
pub use credential_form::{CredentialForm, CredentialFormSettings};
pub use input::{Input, InputKind, InputSettings};
pub use lang_switcher::{LangSwitcher, LangSwitcherSettings};
pub use login_form::{LoginForm, LoginFormSettings, SubmitOutcome, SubmitPhase};
pub use store::Prop;
pub use validation::{validate, Credentials, FieldError, Validation, ValidationErrorMap};

/// 组件基础 trait，复合组件都实现它
pub trait Component {
    /// 组件名称，用于日志和调试
    fn name(&self) -> &str;

    /// 组件的根元素
    fn element(&self) -> &Element;

    /// 释放总线订阅等外部资源
    fn teardown(&self) {}

    /// 挂载到父元素下
    fn mount(&self, parent: &Element) {
        parent.append(self.element());
        tracing::trace!(component = self.name(), "mounted");
    }

    /// 从页面移除并释放资源
    fn unmount(&self) {
        self.teardown();
        self.element().detach();
        tracing::trace!(component = self.name(), "unmounted");
    }
}
