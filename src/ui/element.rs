//! Headless element tree.
//!
//! Widgets build their markup out of [`Element`] handles and mutate them in
//! place. The tree keeps enough of a browser's behavior for the component
//! runtime to be exercised without one: attributes, class lists, input values,
//! bubbling events and mount/unmount lifecycle hooks.
//!
//! Every mutating call bumps the node's mutation counter, which is how tests
//! observe whether an update actually touched the UI.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::{Rc, Weak};

use super::content::Content;

/// Event listener callback.
///
/// Listeners receive the event mutably so they can stop propagation or
/// suppress the default action.
pub type EventListener = Rc<dyn Fn(&mut DomEvent)>;

/// Mount/unmount hook.
pub type LifecycleHook = Rc<dyn Fn(&Element)>;

/// An event travelling up the element tree.
pub struct DomEvent {
    kind: String,
    target: Element,
    default_prevented: bool,
    propagation_stopped: bool,
}

impl DomEvent {
    pub fn new(kind: impl Into<String>, target: &Element) -> Self {
        Self {
            kind: kind.into(),
            target: target.clone(),
            default_prevented: false,
            propagation_stopped: false,
        }
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn target(&self) -> &Element {
        &self.target
    }

    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    pub fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }

    pub fn propagation_stopped(&self) -> bool {
        self.propagation_stopped
    }
}

enum Child {
    Text(String),
    Node(Element),
}

struct Node {
    tag: String,
    attributes: BTreeMap<String, String>,
    classes: Vec<String>,
    children: Vec<Child>,
    value: String,
    listeners: Vec<(String, EventListener)>,
    on_mount: Option<LifecycleHook>,
    on_unmount: Option<LifecycleHook>,
    mounted: bool,
    parent: Weak<RefCell<Node>>,
    mutations: u64,
}

/// Shared handle to a live node.
#[derive(Clone)]
pub struct Element(Rc<RefCell<Node>>);

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Element(Rc::new(RefCell::new(Node {
            tag: tag.into(),
            attributes: BTreeMap::new(),
            classes: Vec::new(),
            children: Vec::new(),
            value: String::new(),
            listeners: Vec::new(),
            on_mount: None,
            on_unmount: None,
            mounted: false,
            parent: Weak::new(),
            mutations: 0,
        })))
    }

    // Builder helpers used while a widget assembles its markup.

    /// Adds every whitespace-separated class in `names`.
    pub fn class(self, names: &str) -> Self {
        for name in names.split_whitespace() {
            self.add_class(name);
        }
        self
    }

    pub fn attr(self, name: &str, value: &str) -> Self {
        self.set_attribute(name, value);
        self
    }

    pub fn text(self, text: &str) -> Self {
        self.append_text(text);
        self
    }

    pub fn child(self, child: &Element) -> Self {
        self.append(child);
        self
    }

    pub fn listen(self, kind: &str, listener: EventListener) -> Self {
        self.on(kind, listener);
        self
    }

    pub fn on_mount(self, hook: LifecycleHook) -> Self {
        self.0.borrow_mut().on_mount = Some(hook);
        self
    }

    pub fn on_unmount(self, hook: LifecycleHook) -> Self {
        self.0.borrow_mut().on_unmount = Some(hook);
        self
    }

    pub fn tag(&self) -> String {
        self.0.borrow().tag.clone()
    }

    pub fn ptr_eq(&self, other: &Element) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub fn parent(&self) -> Option<Element> {
        self.0.borrow().parent.upgrade().map(Element)
    }

    pub fn is_mounted(&self) -> bool {
        self.0.borrow().mounted
    }

    /// Number of mutations applied to this node itself (not its descendants).
    pub fn mutation_count(&self) -> u64 {
        self.0.borrow().mutations
    }

    fn touch(&self) {
        self.0.borrow_mut().mutations += 1;
    }

    pub fn attribute(&self, name: &str) -> Option<String> {
        self.0.borrow().attributes.get(name).cloned()
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.0.borrow().attributes.contains_key(name)
    }

    pub fn set_attribute(&self, name: &str, value: &str) {
        self.0
            .borrow_mut()
            .attributes
            .insert(name.to_string(), value.to_string());
        self.touch();
    }

    pub fn remove_attribute(&self, name: &str) {
        self.0.borrow_mut().attributes.remove(name);
        self.touch();
    }

    pub fn has_class(&self, name: &str) -> bool {
        self.0.borrow().classes.iter().any(|c| c == name)
    }

    pub fn add_class(&self, name: &str) {
        {
            let mut node = self.0.borrow_mut();
            if !node.classes.iter().any(|c| c == name) {
                node.classes.push(name.to_string());
            }
        }
        self.touch();
    }

    pub fn remove_class(&self, name: &str) {
        self.0.borrow_mut().classes.retain(|c| c != name);
        self.touch();
    }

    pub fn value(&self) -> String {
        self.0.borrow().value.clone()
    }

    pub fn set_value(&self, value: &str) {
        self.0.borrow_mut().value = value.to_string();
        self.touch();
    }

    pub fn children(&self) -> Vec<Element> {
        self.0
            .borrow()
            .children
            .iter()
            .filter_map(|child| match child {
                Child::Node(el) => Some(el.clone()),
                Child::Text(_) => None,
            })
            .collect()
    }

    fn append_text(&self, text: &str) {
        self.0.borrow_mut().children.push(Child::Text(text.to_string()));
        self.touch();
    }

    /// Attaches `child` as the last child, detaching it from any previous
    /// parent first. Mount hooks fire when `self` is already mounted.
    pub fn append(&self, child: &Element) {
        child.detach();
        child.0.borrow_mut().parent = Rc::downgrade(&self.0);
        self.0.borrow_mut().children.push(Child::Node(child.clone()));
        self.touch();
        if self.is_mounted() {
            child.mount_subtree();
        }
    }

    /// Removes `self` from its parent, firing unmount hooks.
    pub fn detach(&self) {
        let Some(parent) = self.parent() else {
            return;
        };
        parent.0.borrow_mut().children.retain(|child| match child {
            Child::Node(el) => !el.ptr_eq(self),
            Child::Text(_) => true,
        });
        parent.touch();
        self.0.borrow_mut().parent = Weak::new();
        self.unmount_subtree();
    }

    /// Replaces all children with a single text node.
    pub fn set_text(&self, text: &str) {
        self.clear_children();
        self.append_text(text);
    }

    /// Replaces all children with `content`. Previously mounted child nodes
    /// are unmounted before the new content goes in.
    pub fn replace_content(&self, content: &Content) {
        match content {
            Content::Text(text) => self.set_text(text),
            Content::Node(node) => {
                if node.ptr_eq(self) {
                    return;
                }
                self.clear_children();
                self.append(node);
            }
        }
    }

    fn clear_children(&self) {
        let removed: Vec<Child> = std::mem::take(&mut self.0.borrow_mut().children);
        self.touch();
        for child in removed {
            if let Child::Node(el) = child {
                el.0.borrow_mut().parent = Weak::new();
                el.unmount_subtree();
            }
        }
    }

    /// Marks this element as the root of a live tree.
    pub fn mount_root(&self) {
        self.mount_subtree();
    }

    fn mount_subtree(&self) {
        let hook = {
            let mut node = self.0.borrow_mut();
            if node.mounted {
                return;
            }
            node.mounted = true;
            node.on_mount.clone()
        };
        if let Some(hook) = hook {
            hook(self);
        }
        for child in self.children() {
            child.mount_subtree();
        }
    }

    fn unmount_subtree(&self) {
        if !self.is_mounted() {
            return;
        }
        for child in self.children() {
            child.unmount_subtree();
        }
        let hook = {
            let mut node = self.0.borrow_mut();
            node.mounted = false;
            node.on_unmount.clone()
        };
        if let Some(hook) = hook {
            hook(self);
        }
    }

    pub fn on(&self, kind: &str, listener: EventListener) {
        self.0
            .borrow_mut()
            .listeners
            .push((kind.to_string(), listener));
    }

    /// Delivers `event` to this element and then to its ancestors until a
    /// listener stops propagation.
    pub fn emit(&self, event: &mut DomEvent) {
        let mut current = Some(self.clone());
        while let Some(el) = current {
            let listeners: Vec<EventListener> = el
                .0
                .borrow()
                .listeners
                .iter()
                .filter(|(kind, _)| kind == event.kind())
                .map(|(_, listener)| listener.clone())
                .collect();
            for listener in listeners {
                listener(event);
            }
            if event.propagation_stopped() {
                break;
            }
            current = el.parent();
        }
    }

    /// Simulates a user activation.
    pub fn click(&self) -> DomEvent {
        let mut event = DomEvent::new("click", self);
        self.emit(&mut event);
        event
    }

    /// Simulates the user typing so that the field now holds `value`.
    pub fn type_text(&self, value: &str) -> DomEvent {
        self.0.borrow_mut().value = value.to_string();
        let mut event = DomEvent::new("input", self);
        self.emit(&mut event);
        event
    }

    pub fn text_content(&self) -> String {
        let node = self.0.borrow();
        let mut out = String::new();
        for child in &node.children {
            match child {
                Child::Text(text) => out.push_str(text),
                Child::Node(el) => out.push_str(&el.text_content()),
            }
        }
        out
    }

    /// Depth-first search for the first descendant carrying `class`.
    pub fn find_by_class(&self, class: &str) -> Option<Element> {
        for child in self.children() {
            if child.has_class(class) {
                return Some(child);
            }
            if let Some(found) = child.find_by_class(class) {
                return Some(found);
            }
        }
        None
    }

    pub fn to_html(&self) -> String {
        let node = self.0.borrow();
        let mut out = format!("<{}", node.tag);
        if !node.classes.is_empty() {
            out.push_str(&format!(" class=\"{}\"", escape(&node.classes.join(" "))));
        }
        for (name, value) in &node.attributes {
            if value.is_empty() {
                out.push_str(&format!(" {}", name));
            } else {
                out.push_str(&format!(" {}=\"{}\"", name, escape(value)));
            }
        }
        if node.tag == "input" {
            // password values never leave the field
            if node.attributes.get("type").map(String::as_str) != Some("password") {
                out.push_str(&format!(" value=\"{}\"", escape(&node.value)));
            }
            out.push('>');
            return out;
        }
        out.push('>');
        for child in &node.children {
            match child {
                Child::Text(text) => out.push_str(&escape(text)),
                Child::Node(el) => out.push_str(&el.to_html()),
            }
        }
        out.push_str(&format!("</{}>", node.tag));
        out
    }
}

impl PartialEq for Element {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Debug for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Element").field(&self.to_html()).finish()
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
