//! Page object for the TodoMVC application.
//!
//! [`TodoPage`] is the vocabulary the scenarios are written in: add, delete,
//! edit, toggle and filter tasks, and read back what the page shows. Nothing
//! is cached; every query re-reads the live page through the session, so a
//! [`Task`] handle is only as fresh as the element it wraps.

use crate::driver::{Driver, Key};
use crate::locator::Selector;
use crate::result::{ProbeError, ProbeResult};
use crate::session::Session;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const NEW_TODO: &str = "new-todo";
const TODO_LIST: &str = "todo-list";
const FOOTER: &str = "footer";
const TODO_COUNT: &str = "todo-count";
const COMPLETED: &str = "completed";
const CLEAR_COMPLETED: &str = "clear-completed";
const TOGGLE_ALL: &str = "toggle-all";

/// Route filter of the task list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Filter {
    /// Every task (`#/`)
    All,
    /// Tasks not yet completed (`#/active`)
    Active,
    /// Completed tasks (`#/completed`)
    Completed,
}

impl Filter {
    /// All filters in the order the footer lists them
    pub const ALL: [Self; 3] = [Self::All, Self::Active, Self::Completed];

    /// URL fragment selecting this filter
    #[must_use]
    pub const fn fragment(self) -> &'static str {
        match self {
            Self::All => "#/",
            Self::Active => "#/active",
            Self::Completed => "#/completed",
        }
    }

    /// Caption of the footer link
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::All => "All",
            Self::Active => "Active",
            Self::Completed => "Completed",
        }
    }

    /// Filter selected by a URL fragment; an empty fragment selects `All`
    #[must_use]
    pub fn from_fragment(fragment: &str) -> Option<Self> {
        match fragment {
            "" | "#" | "#/" => Some(Self::All),
            "#/active" => Some(Self::Active),
            "#/completed" => Some(Self::Completed),
            _ => None,
        }
    }

    /// Whether a task with the given completion flag is listed
    #[must_use]
    pub const fn admits(self, completed: bool) -> bool {
        match self {
            Self::All => true,
            Self::Active => !completed,
            Self::Completed => completed,
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::All => "all",
            Self::Active => "active",
            Self::Completed => "completed",
        };
        f.write_str(name)
    }
}

impl FromStr for Filter {
    type Err = ProbeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "active" => Ok(Self::Active),
            "completed" => Ok(Self::Completed),
            other => Err(ProbeError::UnexpectedContent {
                message: format!("unknown filter '{other}'"),
            }),
        }
    }
}

/// A task row as currently rendered
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task<E> {
    element: E,
    position: usize,
}

impl<E> Task<E> {
    /// Element handle of the row
    #[must_use]
    pub const fn element(&self) -> &E {
        &self.element
    }

    /// Zero-based position in the visible list at lookup time
    #[must_use]
    pub const fn position(&self) -> usize {
        self.position
    }
}

/// Snapshot of a task read from the page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskState {
    /// Display name
    pub name: String,
    /// Completion flag
    pub completed: bool,
}

/// Task operations against the application of one session
#[derive(Debug)]
pub struct TodoPage<'s, D: Driver> {
    session: &'s mut Session<D>,
}

impl<'s, D: Driver> TodoPage<'s, D> {
    /// Create a page object over a session
    pub fn new(session: &'s mut Session<D>) -> Self {
        Self { session }
    }

    /// Underlying session
    #[must_use]
    pub fn session(&self) -> &Session<D> {
        &*self.session
    }

    /// Type a task name into the entry field and submit it
    ///
    /// # Errors
    ///
    /// Returns `ElementNotFound` if the entry field is absent.
    pub async fn add_task(&mut self, name: &str) -> ProbeResult<()> {
        tracing::debug!(name, "adding task");
        let input = self.session.find(&Selector::class(NEW_TODO)).await?;
        let driver = self.session.driver_mut();
        driver.send_keys(&input, name).await?;
        driver.press_key(&input, Key::Enter).await
    }

    /// Add several tasks in order
    ///
    /// # Errors
    ///
    /// Stops at the first task that cannot be added.
    pub async fn add_tasks<I, S>(&mut self, names: I) -> ProbeResult<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for name in names {
            self.add_task(name.as_ref()).await?;
        }
        Ok(())
    }

    /// Tasks in display order; empty when the list is not rendered
    ///
    /// # Errors
    ///
    /// Propagates driver failures.
    pub async fn current_tasks(&self) -> ProbeResult<Vec<Task<D::Element>>> {
        let Some(list) = self.session.try_find(&Selector::class(TODO_LIST)).await? else {
            return Ok(Vec::new());
        };
        let items = self
            .session
            .find_all_in(Some(&list), &Selector::tag("li"))
            .await?;
        Ok(items
            .into_iter()
            .enumerate()
            .map(|(position, element)| Task { element, position })
            .collect())
    }

    /// Tasks currently marked completed, in display order
    ///
    /// # Errors
    ///
    /// Propagates driver failures.
    pub async fn completed_tasks(&self) -> ProbeResult<Vec<Task<D::Element>>> {
        let mut completed = Vec::new();
        for task in self.current_tasks().await? {
            if self.is_completed(&task).await? {
                completed.push(task);
            }
        }
        Ok(completed)
    }

    /// First task of the list
    ///
    /// # Errors
    ///
    /// Returns `ElementNotFound` when the list is empty.
    pub async fn first_task(&self) -> ProbeResult<Task<D::Element>> {
        self.current_tasks()
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| ProbeError::ElementNotFound {
                selector: format!(".{TODO_LIST} li"),
                timeout_ms: self.session.implicit_wait().timeout_ms,
            })
    }

    /// First task whose name equals `name`
    ///
    /// # Errors
    ///
    /// Propagates driver failures.
    pub async fn find_task(&self, name: &str) -> ProbeResult<Option<Task<D::Element>>> {
        for task in self.current_tasks().await? {
            if self.task_name(&task).await? == name {
                return Ok(Some(task));
            }
        }
        Ok(None)
    }

    /// Display name of a task
    ///
    /// # Errors
    ///
    /// Returns `StaleElement` if the row is gone.
    pub async fn task_name(&self, task: &Task<D::Element>) -> ProbeResult<String> {
        let label = self
            .session
            .find_in(Some(&task.element), &Selector::tag("label"))
            .await?;
        self.session.driver().text(&label).await
    }

    /// Whether a task is marked completed
    ///
    /// # Errors
    ///
    /// Returns `StaleElement` if the row is gone.
    pub async fn is_completed(&self, task: &Task<D::Element>) -> ProbeResult<bool> {
        self.session.driver().has_class(&task.element, COMPLETED).await
    }

    /// Name and completion flag of a task
    ///
    /// # Errors
    ///
    /// Returns `StaleElement` if the row is gone.
    pub async fn task_state(&self, task: &Task<D::Element>) -> ProbeResult<TaskState> {
        Ok(TaskState {
            name: self.task_name(task).await?,
            completed: self.is_completed(task).await?,
        })
    }

    /// Names and completion flags of every listed task
    ///
    /// # Errors
    ///
    /// Propagates driver failures.
    pub async fn task_states(&self) -> ProbeResult<Vec<TaskState>> {
        let mut states = Vec::new();
        for task in self.current_tasks().await? {
            states.push(self.task_state(&task).await?);
        }
        Ok(states)
    }

    /// Remove a task with its destroy button
    ///
    /// # Errors
    ///
    /// Returns `ElementNotFound` if the row has no destroy button.
    pub async fn delete(&mut self, task: &Task<D::Element>) -> ProbeResult<()> {
        let destroy = self
            .session
            .find_in(Some(&task.element), &Selector::class("destroy"))
            .await?;
        self.script_click(&destroy, "destroy").await
    }

    /// Flip the completion flag of a task
    ///
    /// # Errors
    ///
    /// Returns `ElementNotFound` if the row has no checkbox.
    pub async fn toggle_complete(&mut self, task: &Task<D::Element>) -> ProbeResult<()> {
        let toggle = self
            .session
            .find_in(Some(&task.element), &Selector::class("toggle"))
            .await?;
        self.script_click(&toggle, "toggle").await
    }

    /// Mark every task completed, or every task active if all already are
    ///
    /// # Errors
    ///
    /// Returns `ElementNotFound` when the list is empty.
    pub async fn toggle_all(&mut self) -> ProbeResult<()> {
        let toggle_all = self.session.find(&Selector::class(TOGGLE_ALL)).await?;
        self.script_click(&toggle_all, TOGGLE_ALL).await
    }

    /// Rename a task through its inline editor
    ///
    /// # Errors
    ///
    /// Returns `ElementNotFound` if the editor does not open.
    pub async fn edit_name(&mut self, task: &Task<D::Element>, new_name: &str) -> ProbeResult<()> {
        let old_name = self.task_name(task).await?;
        tracing::debug!(%old_name, new_name, "editing task");
        let view = self
            .session
            .find_in(Some(&task.element), &Selector::class("view"))
            .await?;
        self.session.driver_mut().double_click(&view).await?;

        let editor = self
            .session
            .find_in(Some(&task.element), &Selector::class("edit"))
            .await?;
        let driver = self.session.driver_mut();
        for _ in old_name.chars() {
            driver.press_key(&editor, Key::Backspace).await?;
        }
        driver.send_keys(&editor, new_name).await?;
        driver.press_key(&editor, Key::Enter).await
    }

    /// Remove all completed tasks; nothing happens when none are completed
    ///
    /// # Errors
    ///
    /// Propagates driver failures.
    pub async fn clear_completed(&mut self) -> ProbeResult<()> {
        match self.session.try_find(&Selector::class(CLEAR_COMPLETED)).await? {
            Some(button) => self.script_click(&button, CLEAR_COMPLETED).await,
            None => {
                tracing::debug!("no completed tasks to clear");
                Ok(())
            }
        }
    }

    /// Number shown by the footer's active counter; 0 without a footer
    ///
    /// # Errors
    ///
    /// Returns `UnexpectedContent` if the counter is not a number.
    pub async fn active_count(&self) -> ProbeResult<usize> {
        let Some(footer) = self.session.try_find(&Selector::class(FOOTER)).await? else {
            return Ok(0);
        };
        let counter = self
            .session
            .find_in(Some(&footer), &Selector::class(TODO_COUNT))
            .await?;
        let value = self
            .session
            .find_in(Some(&counter), &Selector::tag("strong"))
            .await?;
        let text = self.session.driver().text(&value).await?;
        text.trim()
            .parse()
            .map_err(|_| ProbeError::UnexpectedContent {
                message: format!("active counter shows '{text}'"),
            })
    }

    /// Show only the tasks admitted by `filter`
    ///
    /// # Errors
    ///
    /// Returns `NavigationError` if the route cannot be loaded.
    pub async fn apply_filter(&mut self, filter: Filter) -> ProbeResult<()> {
        self.session.navigate_route(filter.fragment()).await
    }

    /// Reload the page
    ///
    /// # Errors
    ///
    /// Propagates driver failures.
    pub async fn reload(&mut self) -> ProbeResult<()> {
        self.session.driver_mut().refresh().await
    }

    /// Page title
    ///
    /// # Errors
    ///
    /// Propagates driver failures.
    pub async fn title(&self) -> ProbeResult<String> {
        self.session.driver().title().await
    }

    /// Placeholder text of the entry field
    ///
    /// # Errors
    ///
    /// Returns `ElementNotFound` if the entry field is absent.
    pub async fn placeholder(&self) -> ProbeResult<String> {
        let input = self.session.find(&Selector::class(NEW_TODO)).await?;
        Ok(self
            .session
            .driver()
            .attribute(&input, "placeholder")
            .await?
            .unwrap_or_default())
    }

    /// Whether the task list is rendered
    ///
    /// # Errors
    ///
    /// Propagates driver failures.
    pub async fn is_list_visible(&self) -> ProbeResult<bool> {
        Ok(self.session.try_find(&Selector::class(TODO_LIST)).await?.is_some())
    }

    /// Whether the footer is rendered
    ///
    /// # Errors
    ///
    /// Propagates driver failures.
    pub async fn is_footer_visible(&self) -> ProbeResult<bool> {
        Ok(self.session.try_find(&Selector::class(FOOTER)).await?.is_some())
    }

    // Hidden and hover-only controls cannot take a native click, so the
    // handler is invoked from script.
    async fn script_click(&mut self, element: &D::Element, control: &str) -> ProbeResult<()> {
        tracing::debug!(control, "script click");
        self.session.driver_mut().script_click(element).await
    }
}
