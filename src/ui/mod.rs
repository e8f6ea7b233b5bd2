// 无头 UI 树：组件渲染的目标
pub mod content;
pub mod element;

pub use content::Content;
pub use element::{DomEvent, Element, EventListener, LifecycleHook};
