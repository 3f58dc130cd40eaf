//! TodoMVC scenario catalog.
//!
//! Every scenario is a plain function over a [`Session`], generic in the
//! driver, so the same catalog runs against a real browser and against the
//! in-memory page. Scenarios assume the fixture has just opened an empty
//! application.

use crate::assertion::Assertion;
use crate::driver::Driver;
use crate::locator::Selector;
use crate::result::ProbeResult;
use crate::session::Session;
use crate::todo::{Filter, TodoPage};
use futures::future::BoxFuture;
use futures::FutureExt;
use std::fmt;

/// Body of a scenario
pub type ScenarioFn<D> = for<'a> fn(&'a mut Session<D>) -> BoxFuture<'a, ProbeResult<()>>;

/// A named end-to-end check
pub struct Scenario<D: Driver> {
    /// Stable identifier, e.g. `TodoMVC-3`
    pub id: &'static str,
    /// One-line description
    pub title: &'static str,
    /// Scenario body
    pub run: ScenarioFn<D>,
}

impl<D: Driver> Clone for Scenario<D> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<D: Driver> Copy for Scenario<D> {}

impl<D: Driver> fmt::Debug for Scenario<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scenario")
            .field("id", &self.id)
            .field("title", &self.title)
            .finish_non_exhaustive()
    }
}

impl<D: Driver> Scenario<D> {
    /// Whether `filter` selects this scenario (case-insensitive substring of
    /// id or title)
    #[must_use]
    pub fn matches(&self, filter: &str) -> bool {
        let filter = filter.to_lowercase();
        self.id.to_lowercase().contains(&filter) || self.title.to_lowercase().contains(&filter)
    }
}

macro_rules! scenario {
    ($id:literal, $title:literal, $body:ident) => {
        Scenario {
            id: $id,
            title: $title,
            run: $body::<D>,
        }
    };
}

/// All scenarios, in execution order
#[must_use]
pub fn catalog<D: Driver>() -> Vec<Scenario<D>> {
    vec![
        scenario!("TodoMVC-0", "page title and entry placeholder", title_and_placeholder),
        scenario!("TodoMVC-1", "add a task to the empty list", add_first_task),
        scenario!("TodoMVC-2", "add a task to a non-empty list", add_to_non_empty),
        scenario!("TodoMVC-3", "delete the only task", delete_only_task),
        scenario!("TodoMVC-4", "delete a task from a non-empty list", delete_from_non_empty),
        scenario!("TodoMVC-5", "mark a task completed", mark_completed),
        scenario!("TodoMVC-6", "unmark a completed task", unmark_completed),
        scenario!("TodoMVC-7", "task list survives a reload", list_survives_reload),
        scenario!("TodoMVC-8", "rename a task", edit_task_name),
        scenario!("TodoMVC-9", "clear completed tasks", clear_completed),
        scenario!("TodoMVC-10", "active filter shows open tasks", active_filter),
        scenario!("TodoMVC-11", "completed filter shows done tasks", completed_filter),
        scenario!("TodoMVC-12", "active counter follows completion", active_counter),
        scenario!("TodoMVC-13", "toggle all marks every task", toggle_all),
        scenario!("TodoMVC-P1", "active count equals open tasks", active_count_invariant),
        scenario!("TodoMVC-P2", "toggling twice restores state", toggle_involution),
    ]
}

async fn names<D: Driver>(page: &TodoPage<'_, D>) -> ProbeResult<Vec<String>> {
    Ok(page
        .task_states()
        .await?
        .into_iter()
        .map(|state| state.name)
        .collect())
}

fn title_and_placeholder<D: Driver>(session: &mut Session<D>) -> BoxFuture<'_, ProbeResult<()>> {
    async move {
        let page = TodoPage::new(session);
        Assertion::equals("React • TodoMVC", page.title().await?.as_str())
            .context("title")
            .check()?;
        Assertion::equals("What needs to be done?", page.placeholder().await?.as_str())
            .context("placeholder")
            .check()
    }
    .boxed()
}

fn add_first_task<D: Driver>(session: &mut Session<D>) -> BoxFuture<'_, ProbeResult<()>> {
    async move {
        let mut page = TodoPage::new(session);
        page.add_task("Buy milk").await?;
        Assertion::equals(&vec!["Buy milk".to_string()], &names(&page).await?).check()?;
        Assertion::is_true(page.is_footer_visible().await?, "footer should appear").check()
    }
    .boxed()
}

fn add_to_non_empty<D: Driver>(session: &mut Session<D>) -> BoxFuture<'_, ProbeResult<()>> {
    async move {
        let mut page = TodoPage::new(session);
        page.add_task("First task").await?;
        page.add_task("Second task").await?;
        Assertion::equals(
            &vec!["First task".to_string(), "Second task".to_string()],
            &names(&page).await?,
        )
        .check()
    }
    .boxed()
}

fn delete_only_task<D: Driver>(session: &mut Session<D>) -> BoxFuture<'_, ProbeResult<()>> {
    async move {
        let mut page = TodoPage::new(session);
        page.add_task("Doomed").await?;
        let task = page.first_task().await?;
        page.delete(&task).await?;

        let session = page.session();
        let list = session.find(&Selector::class("todo-list")).await;
        Assertion::is_not_found(&list).context("task list").check()?;
        let footer = session.find(&Selector::class("footer")).await;
        Assertion::is_not_found(&footer).context("footer").check()
    }
    .boxed()
}

fn delete_from_non_empty<D: Driver>(session: &mut Session<D>) -> BoxFuture<'_, ProbeResult<()>> {
    async move {
        let mut page = TodoPage::new(session);
        page.add_tasks(["Delete me", "Keep me"]).await?;
        let task = page.first_task().await?;
        page.delete(&task).await?;
        Assertion::equals(&vec!["Keep me".to_string()], &names(&page).await?).check()
    }
    .boxed()
}

fn mark_completed<D: Driver>(session: &mut Session<D>) -> BoxFuture<'_, ProbeResult<()>> {
    async move {
        let mut page = TodoPage::new(session);
        page.add_task("Finish report").await?;
        let task = page.first_task().await?;
        page.toggle_complete(&task).await?;
        Assertion::is_true(page.is_completed(&task).await?, "task should be completed").check()?;
        Assertion::has_length(&page.completed_tasks().await?, 1).check()
    }
    .boxed()
}

fn unmark_completed<D: Driver>(session: &mut Session<D>) -> BoxFuture<'_, ProbeResult<()>> {
    async move {
        let mut page = TodoPage::new(session);
        page.add_task("Changed my mind").await?;
        let task = page.first_task().await?;
        page.toggle_complete(&task).await?;
        page.toggle_complete(&task).await?;
        Assertion::is_false(page.is_completed(&task).await?, "task should be active").check()?;
        Assertion::has_length(&page.completed_tasks().await?, 0).check()
    }
    .boxed()
}

fn list_survives_reload<D: Driver>(session: &mut Session<D>) -> BoxFuture<'_, ProbeResult<()>> {
    async move {
        let mut page = TodoPage::new(session);
        page.add_tasks(["Persisted one", "Persisted two"]).await?;
        let before = page.task_states().await?;
        page.reload().await?;
        Assertion::equals(&before, &page.task_states().await?)
            .context("after reload")
            .check()
    }
    .boxed()
}

fn edit_task_name<D: Driver>(session: &mut Session<D>) -> BoxFuture<'_, ProbeResult<()>> {
    async move {
        let mut page = TodoPage::new(session);
        page.add_task("Old name").await?;
        let task = page.first_task().await?;
        page.edit_name(&task, "New name").await?;
        Assertion::equals(&vec!["New name".to_string()], &names(&page).await?).check()
    }
    .boxed()
}

fn clear_completed<D: Driver>(session: &mut Session<D>) -> BoxFuture<'_, ProbeResult<()>> {
    async move {
        let mut page = TodoPage::new(session);
        page.add_tasks(["Done already", "Still open"]).await?;
        let task = page.first_task().await?;
        page.toggle_complete(&task).await?;
        page.clear_completed().await?;
        Assertion::equals(&vec!["Still open".to_string()], &names(&page).await?).check()?;
        Assertion::has_length(&page.completed_tasks().await?, 0).check()
    }
    .boxed()
}

fn active_filter<D: Driver>(session: &mut Session<D>) -> BoxFuture<'_, ProbeResult<()>> {
    async move {
        let mut page = TodoPage::new(session);
        page.add_tasks(["Done", "Open"]).await?;
        let task = page.first_task().await?;
        page.toggle_complete(&task).await?;
        page.apply_filter(Filter::Active).await?;
        Assertion::equals(&vec!["Open".to_string()], &names(&page).await?).check()
    }
    .boxed()
}

fn completed_filter<D: Driver>(session: &mut Session<D>) -> BoxFuture<'_, ProbeResult<()>> {
    async move {
        let mut page = TodoPage::new(session);
        page.add_tasks(["Done", "Open"]).await?;
        let task = page.first_task().await?;
        page.toggle_complete(&task).await?;
        page.apply_filter(Filter::Completed).await?;
        Assertion::equals(&vec!["Done".to_string()], &names(&page).await?).check()
    }
    .boxed()
}

fn active_counter<D: Driver>(session: &mut Session<D>) -> BoxFuture<'_, ProbeResult<()>> {
    async move {
        let mut page = TodoPage::new(session);
        page.add_tasks(["One", "Two"]).await?;
        Assertion::equals(&2, &page.active_count().await?).check()?;
        let task = page.first_task().await?;
        page.toggle_complete(&task).await?;
        Assertion::equals(&1, &page.active_count().await?).check()
    }
    .boxed()
}

fn toggle_all<D: Driver>(session: &mut Session<D>) -> BoxFuture<'_, ProbeResult<()>> {
    async move {
        let mut page = TodoPage::new(session);
        page.add_tasks(["One", "Two"]).await?;
        page.toggle_all().await?;
        Assertion::has_length(&page.completed_tasks().await?, 2).check()?;
        Assertion::equals(&0, &page.active_count().await?).check()
    }
    .boxed()
}

fn active_count_invariant<D: Driver>(session: &mut Session<D>) -> BoxFuture<'_, ProbeResult<()>> {
    async move {
        let mut page = TodoPage::new(session);
        page.add_tasks(["Alpha", "Beta", "Gamma"]).await?;
        let tasks = page.current_tasks().await?;
        for task in tasks.iter().step_by(2) {
            page.toggle_complete(task).await?;
            let total = page.current_tasks().await?.len();
            let completed = page.completed_tasks().await?.len();
            Assertion::equals(&(total - completed), &page.active_count().await?)
                .context("active count")
                .check()?;
        }
        Ok(())
    }
    .boxed()
}

fn toggle_involution<D: Driver>(session: &mut Session<D>) -> BoxFuture<'_, ProbeResult<()>> {
    async move {
        let mut page = TodoPage::new(session);
        page.add_tasks(["Left", "Right"]).await?;
        let before = page.task_states().await?;
        let tasks = page.current_tasks().await?;
        page.toggle_complete(&tasks[1]).await?;
        page.toggle_complete(&tasks[1]).await?;
        Assertion::equals(&before, &page.task_states().await?)
            .context("after toggling twice")
            .check()
    }
    .boxed()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::SessionConfig;
    use crate::fake::FakeTodoApp;
    use crate::fixture::AppFixture;
    use crate::wait::WaitOptions;
    use std::collections::HashSet;

    const URL: &str = "http://todo.test/";

    fn session(app: FakeTodoApp, timeout_ms: u64) -> Session<FakeTodoApp> {
        let config = SessionConfig::default()
            .with_app_url(URL)
            .with_implicit_wait(WaitOptions::new().with_timeout(timeout_ms).with_poll_interval(1));
        Session::new(app, config)
    }

    async fn run_all(mut session: Session<FakeTodoApp>) {
        for scenario in catalog::<FakeTodoApp>() {
            let mut fixture = AppFixture::new();
            let result = fixture.run(&mut session, scenario.run).await;
            assert!(result.is_ok(), "{} failed: {:?}", scenario.id, result);
        }
        session.release().await.unwrap();
    }

    #[test]
    fn test_catalog_ids_are_unique_and_ordered() {
        let scenarios = catalog::<FakeTodoApp>();
        let ids: HashSet<_> = scenarios.iter().map(|s| s.id).collect();
        assert_eq!(ids.len(), scenarios.len());
        for (n, scenario) in scenarios.iter().take(14).enumerate() {
            assert_eq!(scenario.id, format!("TodoMVC-{n}"));
        }
    }

    #[test]
    fn test_matches() {
        let scenarios = catalog::<FakeTodoApp>();
        assert!(scenarios[3].matches("todomvc-3"));
        assert!(scenarios[3].matches("DELETE"));
        assert!(!scenarios[3].matches("filter"));
    }

    #[test]
    fn test_debug_omits_body() {
        let scenario = catalog::<FakeTodoApp>()[0];
        let debug = format!("{scenario:?}");
        assert!(debug.contains("TodoMVC-0"));
    }

    #[tokio::test]
    async fn test_catalog_passes_against_fake_page() {
        run_all(session(FakeTodoApp::new(URL), 20)).await;
    }

    #[tokio::test]
    async fn test_catalog_passes_with_render_lag() {
        run_all(session(FakeTodoApp::new(URL).with_render_lag(2), 200)).await;
    }

    #[tokio::test]
    async fn test_scenario_failure_is_reported() {
        let mut s = session(FakeTodoApp::new(URL), 20);
        s.open_app().await.unwrap();
        TodoPage::new(&mut s).add_task("stray").await.unwrap();
        // An unexpected leftover task breaks the exact-list expectation.
        let err = (catalog::<FakeTodoApp>()[1].run)(&mut s).await.unwrap_err();
        assert!(err.to_string().contains("Assertion failed"));
        s.release().await.unwrap();
    }
}
