//! In-memory TodoMVC page for running the suite without a browser.
//!
//! [`FakeTodoApp`] renders the same element tree as the React TodoMVC
//! example (class names, tags, attributes) from a small state model and
//! implements [`Driver`] against it. It reproduces the behaviours the suite
//! depends on:
//!
//! - state is persisted to a `localStorage` stand-in on every change and
//!   reloaded on navigation or refresh
//! - the list and footer are not rendered while there are no tasks
//! - the destroy button is hover-only and the checkboxes are transparent, so
//!   a direct click fails while a script-dispatched click succeeds
//! - route fragments (`#/active`, `#/completed`) filter the visible items
//! - optional render lag: lookups come back empty for a few polls after each
//!   change, which exercises the implicit wait

use crate::driver::{Driver, Key};
use crate::locator::Selector;
use crate::result::{ProbeError, ProbeResult};
use crate::todo::Filter;
use async_trait::async_trait;
use std::sync::atomic::{AtomicU32, Ordering};

const TITLE: &str = "React • TodoMVC";
const PLACEHOLDER: &str = "What needs to be done?";

/// Element of the fake page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FakeElement {
    /// `section.todoapp`
    App,
    /// `header.header`
    Header,
    /// `h1`
    Heading,
    /// `input.new-todo`
    NewTodo,
    /// `section.main`
    Main,
    /// `input.toggle-all`
    ToggleAll,
    /// `label` for the toggle-all checkbox
    ToggleAllLabel,
    /// `ul.todo-list`
    TodoList,
    /// `li` of one task
    Item(u64),
    /// `div.view` of one task
    View(u64),
    /// `input.toggle` of one task
    Toggle(u64),
    /// `label` holding the task name
    Label(u64),
    /// `button.destroy` of one task
    Destroy(u64),
    /// `input.edit` of one task
    Edit(u64),
    /// `footer.footer`
    Footer,
    /// `span.todo-count`
    TodoCount,
    /// `strong` holding the active count
    TodoCountValue,
    /// `ul.filters`
    Filters,
    /// `li` of one filter link
    FilterItem(Filter),
    /// `a` of one filter link
    FilterLink(Filter),
    /// `button.clear-completed`
    ClearCompleted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct StoredTodo {
    id: u64,
    title: String,
    completed: bool,
}

/// In-memory TodoMVC page implementing [`Driver`]
#[derive(Debug)]
pub struct FakeTodoApp {
    app_url: String,
    current_url: Option<String>,
    loaded: bool,
    todos: Vec<StoredTodo>,
    storage: Option<Vec<StoredTodo>>,
    route: Filter,
    next_id: u64,
    new_todo_value: String,
    editing: Option<(u64, String)>,
    render_lag: u32,
    pending_lag: AtomicU32,
    history: Vec<String>,
    closed: bool,
}

impl FakeTodoApp {
    /// Create a page served at `app_url`; the browser starts on `about:blank`
    #[must_use]
    pub fn new(app_url: impl Into<String>) -> Self {
        Self {
            app_url: base_of(&app_url.into()).to_string(),
            current_url: None,
            loaded: false,
            todos: Vec::new(),
            storage: None,
            route: Filter::All,
            next_id: 1,
            new_todo_value: String::new(),
            editing: None,
            render_lag: 0,
            pending_lag: AtomicU32::new(0),
            history: Vec::new(),
            closed: false,
        }
    }

    /// Make the next `polls` lookups after each change return nothing
    #[must_use]
    pub fn with_render_lag(mut self, polls: u32) -> Self {
        self.render_lag = polls;
        self
    }

    /// Pre-populate the persisted storage as if a previous visit left tasks
    /// behind
    pub fn seed_storage<S: AsRef<str>>(&mut self, todos: &[(S, bool)]) {
        let seeded = todos
            .iter()
            .map(|(title, completed)| {
                let id = self.allocate_id();
                StoredTodo {
                    id,
                    title: title.as_ref().to_string(),
                    completed: *completed,
                }
            })
            .collect();
        self.storage = Some(seeded);
    }

    /// Names and completion flags currently held in persisted storage
    #[must_use]
    pub fn stored_tasks(&self) -> Vec<(String, bool)> {
        self.storage
            .iter()
            .flatten()
            .map(|t| (t.title.clone(), t.completed))
            .collect()
    }

    /// Check if a call starting with `prefix` was recorded
    #[must_use]
    pub fn was_called(&self, prefix: &str) -> bool {
        self.history.iter().any(|c| c.starts_with(prefix))
    }

    /// Whether `quit` has been called
    #[must_use]
    pub const fn is_closed(&self) -> bool {
        self.closed
    }

    fn allocate_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn record(&mut self, call: String) {
        tracing::trace!(%call, "fake page call");
        self.history.push(call);
    }

    fn ensure_open(&self) -> ProbeResult<()> {
        if self.closed {
            Err(ProbeError::SessionClosed)
        } else {
            Ok(())
        }
    }

    fn changed(&mut self) {
        self.pending_lag.store(self.render_lag, Ordering::SeqCst);
    }

    fn persist(&mut self) {
        self.storage = Some(self.todos.clone());
        self.changed();
    }

    fn load_from_storage(&mut self) {
        self.todos = self.storage.clone().unwrap_or_default();
        self.editing = None;
        self.new_todo_value.clear();
        self.loaded = true;
        self.changed();
    }

    fn todo(&self, id: u64) -> Option<&StoredTodo> {
        self.todos.iter().find(|t| t.id == id)
    }

    fn active_count(&self) -> usize {
        self.todos.iter().filter(|t| !t.completed).count()
    }

    // ------------------------------------------------------------------
    // Rendering
    // ------------------------------------------------------------------

    fn children(&self, parent: Option<FakeElement>) -> Vec<FakeElement> {
        use FakeElement as E;

        let Some(parent) = parent else {
            return if self.loaded { vec![E::App] } else { Vec::new() };
        };
        let has_todos = !self.todos.is_empty();
        match parent {
            E::App => {
                let mut out = vec![E::Header];
                if has_todos {
                    out.extend([E::Main, E::Footer]);
                }
                out
            }
            E::Header => vec![E::Heading, E::NewTodo],
            E::Main => vec![E::ToggleAll, E::ToggleAllLabel, E::TodoList],
            E::TodoList => self
                .todos
                .iter()
                .filter(|t| self.route.admits(t.completed))
                .map(|t| E::Item(t.id))
                .collect(),
            E::Item(id) => vec![E::View(id), E::Edit(id)],
            E::View(id) => vec![E::Toggle(id), E::Label(id), E::Destroy(id)],
            E::Footer => {
                let mut out = vec![E::TodoCount, E::Filters];
                if self.todos.iter().any(|t| t.completed) {
                    out.push(E::ClearCompleted);
                }
                out
            }
            E::TodoCount => vec![E::TodoCountValue],
            E::Filters => Filter::ALL.iter().map(|f| E::FilterItem(*f)).collect(),
            E::FilterItem(filter) => vec![E::FilterLink(filter)],
            _ => Vec::new(),
        }
    }

    /// Pre-order descendants of `scope` (the whole document for `None`)
    fn descendants(&self, scope: Option<FakeElement>) -> Vec<FakeElement> {
        let mut out = Vec::new();
        let mut stack: Vec<FakeElement> = self.children(scope).into_iter().rev().collect();
        while let Some(node) = stack.pop() {
            out.push(node);
            stack.extend(self.children(Some(node)).into_iter().rev());
        }
        out
    }

    fn ensure_attached(&self, element: FakeElement) -> ProbeResult<()> {
        self.ensure_open()?;
        if self.descendants(None).contains(&element) {
            Ok(())
        } else {
            Err(ProbeError::StaleElement {
                message: format!("{element:?} is no longer attached to the page"),
            })
        }
    }

    fn tag(element: FakeElement) -> &'static str {
        use FakeElement as E;
        match element {
            E::App | E::Main => "section",
            E::Header => "header",
            E::Heading => "h1",
            E::NewTodo | E::ToggleAll | E::Toggle(_) | E::Edit(_) => "input",
            E::ToggleAllLabel | E::Label(_) => "label",
            E::TodoList | E::Filters => "ul",
            E::Item(_) | E::FilterItem(_) => "li",
            E::View(_) => "div",
            E::Destroy(_) | E::ClearCompleted => "button",
            E::Footer => "footer",
            E::TodoCount => "span",
            E::TodoCountValue => "strong",
            E::FilterLink(_) => "a",
        }
    }

    fn classes(&self, element: FakeElement) -> Vec<&'static str> {
        use FakeElement as E;
        match element {
            E::App => vec!["todoapp"],
            E::Header => vec!["header"],
            E::NewTodo => vec!["new-todo"],
            E::Main => vec!["main"],
            E::ToggleAll => vec!["toggle-all"],
            E::TodoList => vec!["todo-list"],
            E::Item(id) => {
                let mut classes = Vec::new();
                if self.todo(id).is_some_and(|t| t.completed) {
                    classes.push("completed");
                }
                if self.is_editing(id) {
                    classes.push("editing");
                }
                classes
            }
            E::View(_) => vec!["view"],
            E::Toggle(_) => vec!["toggle"],
            E::Destroy(_) => vec!["destroy"],
            E::Edit(_) => vec!["edit"],
            E::Footer => vec!["footer"],
            E::TodoCount => vec!["todo-count"],
            E::Filters => vec!["filters"],
            E::FilterLink(filter) if filter == self.route => vec!["selected"],
            E::ClearCompleted => vec!["clear-completed"],
            _ => Vec::new(),
        }
    }

    fn is_editing(&self, id: u64) -> bool {
        self.editing.as_ref().is_some_and(|(editing, _)| *editing == id)
    }

    fn own_text(&self, element: FakeElement) -> String {
        use FakeElement as E;
        match element {
            E::Heading => "todos".to_string(),
            E::ToggleAllLabel => "Mark all as complete".to_string(),
            E::Label(id) => self.todo(id).map(|t| t.title.clone()).unwrap_or_default(),
            E::TodoCountValue => self.active_count().to_string(),
            E::FilterLink(filter) => filter.label().to_string(),
            E::ClearCompleted => "Clear completed".to_string(),
            _ => String::new(),
        }
    }

    fn rendered_text(&self, element: FakeElement) -> String {
        if element == FakeElement::TodoCount {
            let count = self.active_count();
            let noun = if count == 1 { "item" } else { "items" };
            return format!("{count} {noun} left");
        }
        if self.is_hidden(element) {
            return String::new();
        }
        let own = self.own_text(element);
        let children = self
            .children(Some(element))
            .into_iter()
            .map(|child| self.rendered_text(child))
            .filter(|text| !text.is_empty());
        std::iter::once(own)
            .filter(|text| !text.is_empty())
            .chain(children)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Hidden by the application's stylesheet (display: none)
    fn is_hidden(&self, element: FakeElement) -> bool {
        use FakeElement as E;
        match element {
            E::Edit(id) => !self.is_editing(id),
            E::View(id) | E::Toggle(id) | E::Label(id) | E::Destroy(id) => self.is_editing(id),
            _ => false,
        }
    }

    /// Whether a user could click or type into the element directly
    fn check_interactable(&self, element: FakeElement) -> ProbeResult<()> {
        use FakeElement as E;
        let reason = match element {
            E::Destroy(_) => Some("destroy button is only displayed while hovering its item"),
            E::Toggle(_) | E::ToggleAll => Some("checkbox is rendered transparent"),
            _ if self.is_hidden(element) => Some("element is not displayed"),
            _ => None,
        };
        match reason {
            Some(reason) => Err(ProbeError::NotInteractable {
                message: format!("{element:?}: {reason}"),
            }),
            None => Ok(()),
        }
    }

    fn describe(&self, element: FakeElement) -> String {
        self.classes(element)
            .first()
            .map_or_else(|| Self::tag(element).to_string(), ToString::to_string)
    }

    // ------------------------------------------------------------------
    // Behaviour
    // ------------------------------------------------------------------

    fn activate(&mut self, element: FakeElement) {
        use FakeElement as E;
        match element {
            E::Toggle(id) => {
                if let Some(todo) = self.todos.iter_mut().find(|t| t.id == id) {
                    todo.completed = !todo.completed;
                }
                self.persist();
            }
            E::ToggleAll => {
                let target = !self.todos.iter().all(|t| t.completed);
                for todo in &mut self.todos {
                    todo.completed = target;
                }
                self.persist();
            }
            E::Destroy(id) => {
                self.todos.retain(|t| t.id != id);
                self.persist();
            }
            E::ClearCompleted => {
                self.todos.retain(|t| !t.completed);
                self.persist();
            }
            E::FilterLink(filter) => {
                self.route = filter;
                self.current_url = Some(format!("{}{}", self.app_url, filter.fragment()));
                self.changed();
            }
            _ => {}
        }
    }

    fn commit_new_todo(&mut self) {
        let title = self.new_todo_value.trim().to_string();
        self.new_todo_value.clear();
        if title.is_empty() {
            return;
        }
        let id = self.allocate_id();
        self.todos.push(StoredTodo {
            id,
            title,
            completed: false,
        });
        self.persist();
    }

    fn commit_edit(&mut self) {
        let Some((id, value)) = self.editing.take() else {
            return;
        };
        let title = value.trim().to_string();
        if title.is_empty() {
            self.todos.retain(|t| t.id != id);
        } else if let Some(todo) = self.todos.iter_mut().find(|t| t.id == id) {
            todo.title = title;
        }
        self.persist();
    }
}

fn base_of(url: &str) -> &str {
    url.split('#').next().unwrap_or(url)
}

#[async_trait]
impl Driver for FakeTodoApp {
    type Element = FakeElement;

    async fn navigate(&mut self, url: &str) -> ProbeResult<()> {
        self.ensure_open()?;
        self.record(format!("navigate:{url}"));
        let base = base_of(url);
        if base == self.app_url {
            let same_document = self.loaded
                && self
                    .current_url
                    .as_deref()
                    .is_some_and(|current| base_of(current) == base);
            if !same_document {
                self.load_from_storage();
            }
            let fragment = &url[base.len()..];
            self.route = Filter::from_fragment(fragment).unwrap_or(Filter::All);
            self.changed();
        } else {
            self.loaded = false;
            self.todos.clear();
        }
        self.current_url = Some(url.to_string());
        Ok(())
    }

    async fn refresh(&mut self) -> ProbeResult<()> {
        self.ensure_open()?;
        self.record("refresh".to_string());
        if self.loaded {
            self.load_from_storage();
        }
        Ok(())
    }

    async fn title(&self) -> ProbeResult<String> {
        self.ensure_open()?;
        Ok(if self.loaded { TITLE.to_string() } else { String::new() })
    }

    async fn current_url(&self) -> ProbeResult<String> {
        self.ensure_open()?;
        Ok(self
            .current_url
            .clone()
            .unwrap_or_else(|| "about:blank".to_string()))
    }

    async fn find_all(
        &self,
        scope: Option<&FakeElement>,
        selector: &Selector,
    ) -> ProbeResult<Vec<FakeElement>> {
        self.ensure_open()?;
        if let Some(scope) = scope {
            self.ensure_attached(*scope)?;
        }
        let lagging = self
            .pending_lag
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if lagging {
            return Ok(Vec::new());
        }
        Ok(self
            .descendants(scope.copied())
            .into_iter()
            .filter(|el| selector.matches(Self::tag(*el), &self.classes(*el)))
            .collect())
    }

    async fn text(&self, element: &FakeElement) -> ProbeResult<String> {
        self.ensure_attached(*element)?;
        Ok(self.rendered_text(*element))
    }

    async fn attribute(&self, element: &FakeElement, name: &str) -> ProbeResult<Option<String>> {
        use FakeElement as E;
        self.ensure_attached(*element)?;
        let value = match (name, *element) {
            ("class", el) => {
                let classes = self.classes(el);
                (!classes.is_empty()).then(|| classes.join(" "))
            }
            ("placeholder", E::NewTodo) => Some(PLACEHOLDER.to_string()),
            ("value", E::NewTodo) => Some(self.new_todo_value.clone()),
            ("value", E::Edit(id)) => match &self.editing {
                Some((editing, value)) if *editing == id => Some(value.clone()),
                _ => self.todo(id).map(|t| t.title.clone()),
            },
            ("checked", E::Toggle(id)) => self
                .todo(id)
                .is_some_and(|t| t.completed)
                .then(|| "true".to_string()),
            ("checked", E::ToggleAll) => self
                .todos
                .iter()
                .all(|t| t.completed)
                .then(|| "true".to_string()),
            ("type", E::Toggle(_) | E::ToggleAll) => Some("checkbox".to_string()),
            ("type", E::NewTodo | E::Edit(_)) => Some("text".to_string()),
            ("href", E::FilterLink(filter)) => Some(filter.fragment().to_string()),
            _ => None,
        };
        Ok(value)
    }

    async fn send_keys(&mut self, element: &FakeElement, text: &str) -> ProbeResult<()> {
        self.ensure_attached(*element)?;
        self.check_interactable(*element)?;
        self.record(format!("send_keys:{}", self.describe(*element)));
        match *element {
            FakeElement::NewTodo => self.new_todo_value.push_str(text),
            FakeElement::Edit(id) => {
                if let Some((editing, value)) = self.editing.as_mut() {
                    if *editing == id {
                        value.push_str(text);
                    }
                }
            }
            other => {
                return Err(ProbeError::NotInteractable {
                    message: format!("{other:?} does not accept text"),
                })
            }
        }
        Ok(())
    }

    async fn press_key(&mut self, element: &FakeElement, key: Key) -> ProbeResult<()> {
        self.ensure_attached(*element)?;
        self.check_interactable(*element)?;
        self.record(format!("press_key:{key}"));
        match (*element, key) {
            (FakeElement::NewTodo, Key::Enter) => self.commit_new_todo(),
            (FakeElement::NewTodo, Key::Backspace) => {
                self.new_todo_value.pop();
            }
            (FakeElement::Edit(_), Key::Enter) => self.commit_edit(),
            (FakeElement::Edit(_), Key::Backspace) => {
                if let Some((_, value)) = self.editing.as_mut() {
                    value.pop();
                }
            }
            (FakeElement::Edit(_), Key::Escape) => {
                self.editing = None;
                self.changed();
            }
            _ => {}
        }
        Ok(())
    }

    async fn click(&mut self, element: &FakeElement) -> ProbeResult<()> {
        self.ensure_attached(*element)?;
        self.check_interactable(*element)?;
        self.record(format!("click:{}", self.describe(*element)));
        self.activate(*element);
        Ok(())
    }

    async fn double_click(&mut self, element: &FakeElement) -> ProbeResult<()> {
        self.ensure_attached(*element)?;
        self.check_interactable(*element)?;
        self.record(format!("double_click:{}", self.describe(*element)));
        if let FakeElement::Item(id) | FakeElement::View(id) | FakeElement::Label(id) = *element {
            let title = self.todo(id).map(|t| t.title.clone()).unwrap_or_default();
            self.editing = Some((id, title));
            self.changed();
        }
        Ok(())
    }

    async fn script_click(&mut self, element: &FakeElement) -> ProbeResult<()> {
        self.ensure_attached(*element)?;
        self.record(format!("script_click:{}", self.describe(*element)));
        self.activate(*element);
        Ok(())
    }

    async fn clear_local_storage(&mut self) -> ProbeResult<()> {
        self.ensure_open()?;
        if !self.loaded {
            return Err(ProbeError::ScriptError {
                message: "localStorage is not available on about:blank".to_string(),
            });
        }
        self.record("clear_local_storage".to_string());
        self.storage = None;
        Ok(())
    }

    async fn quit(&mut self) -> ProbeResult<()> {
        self.ensure_open()?;
        self.record("quit".to_string());
        self.closed = true;
        self.loaded = false;
        Ok(())
    }
}
