//! Browser session: one driver, one configuration, implicit-wait lookups.
//!
//! A [`Session`] owns its [`Driver`] for the whole run. Every element lookup
//! made through it polls for up to the configured implicit wait, so callers
//! never sleep on their own. A session must be given back with
//! [`Session::release`]; [`with_session`] does that on every exit path.

use crate::browser::SessionConfig;
use crate::driver::Driver;
use crate::locator::Selector;
use crate::result::{ProbeError, ProbeResult};
use crate::wait::{poll_until, WaitOptions};
use futures::future::BoxFuture;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;

/// Handle to a running browser
#[derive(Debug)]
pub struct Session<D: Driver> {
    driver: D,
    config: SessionConfig,
    released: bool,
}

impl<D: Driver> Session<D> {
    /// Wrap an already started driver
    #[must_use]
    pub fn new(driver: D, config: SessionConfig) -> Self {
        Self {
            driver,
            config,
            released: false,
        }
    }

    /// Session configuration
    #[must_use]
    pub const fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Implicit wait applied to lookups
    #[must_use]
    pub const fn implicit_wait(&self) -> WaitOptions {
        self.config.implicit_wait
    }

    /// Underlying driver
    #[must_use]
    pub const fn driver(&self) -> &D {
        &self.driver
    }

    /// Underlying driver, mutably
    pub fn driver_mut(&mut self) -> &mut D {
        &mut self.driver
    }

    /// Navigate to the application URL
    ///
    /// # Errors
    ///
    /// Returns `NavigationError` if the browser cannot load the page.
    pub async fn open_app(&mut self) -> ProbeResult<()> {
        let url = self.config.app_url.clone();
        tracing::debug!(%url, "opening application");
        self.driver.navigate(&url).await
    }

    /// Navigate to a route of the application, e.g. `#/active`
    ///
    /// # Errors
    ///
    /// Returns `NavigationError` if the browser cannot load the page.
    pub async fn navigate_route(&mut self, fragment: &str) -> ProbeResult<()> {
        let url = self.config.route_url(fragment);
        tracing::debug!(%url, "navigating to route");
        self.driver.navigate(&url).await
    }

    /// Bring the application back to its initial state: load it, drop its
    /// persisted data, reload.
    ///
    /// # Errors
    ///
    /// Propagates navigation and script failures.
    pub async fn reset(&mut self) -> ProbeResult<()> {
        self.open_app().await?;
        self.driver.clear_local_storage().await?;
        self.driver.refresh().await
    }

    /// All elements matching `selector` below `scope`, waiting up to the
    /// implicit wait for at least one to appear. Empty after the wait.
    ///
    /// # Errors
    ///
    /// Propagates driver failures; an absent element is not an error.
    pub async fn find_all_in(
        &self,
        scope: Option<&D::Element>,
        selector: &Selector,
    ) -> ProbeResult<Vec<D::Element>> {
        let driver = &self.driver;
        let polled = poll_until(&self.config.implicit_wait, move || async move {
            let found = driver.find_all(scope, selector).await?;
            Ok((!found.is_empty()).then_some(found))
        })
        .await?;
        tracing::trace!(%selector, attempts = polled.attempts, found = !polled.timed_out(), "lookup");
        Ok(polled.value.unwrap_or_default())
    }

    /// All elements in the page matching `selector`
    ///
    /// # Errors
    ///
    /// Propagates driver failures.
    pub async fn find_all(&self, selector: &Selector) -> ProbeResult<Vec<D::Element>> {
        self.find_all_in(None, selector).await
    }

    /// First element below `scope` matching `selector`
    ///
    /// # Errors
    ///
    /// Returns `ElementNotFound` if nothing matched within the implicit wait.
    pub async fn find_in(
        &self,
        scope: Option<&D::Element>,
        selector: &Selector,
    ) -> ProbeResult<D::Element> {
        self.find_all_in(scope, selector)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| ProbeError::ElementNotFound {
                selector: selector.to_string(),
                timeout_ms: self.config.implicit_wait.timeout_ms,
            })
    }

    /// First element in the page matching `selector`
    ///
    /// # Errors
    ///
    /// Returns `ElementNotFound` if nothing matched within the implicit wait.
    pub async fn find(&self, selector: &Selector) -> ProbeResult<D::Element> {
        self.find_in(None, selector).await
    }

    /// First element matching `selector`, or `None` after the implicit wait
    ///
    /// # Errors
    ///
    /// Propagates driver failures.
    pub async fn try_find(&self, selector: &Selector) -> ProbeResult<Option<D::Element>> {
        Ok(self.find_all(selector).await?.into_iter().next())
    }

    /// Quit the browser and stop its driver service.
    ///
    /// # Errors
    ///
    /// Returns the driver's quit failure after logging it. The service is
    /// shut down regardless.
    pub async fn release(mut self) -> ProbeResult<()> {
        self.released = true;
        tracing::info!(browser = %self.config.browser, "releasing session");
        let result = self.driver.quit().await;
        if let Err(err) = &result {
            tracing::warn!(error = %err, "browser did not quit cleanly");
        }
        result
    }
}

impl<D: Driver> Drop for Session<D> {
    fn drop(&mut self) {
        if !self.released {
            tracing::warn!(
                browser = %self.config.browser,
                "session dropped without release; the browser may be left running"
            );
        }
    }
}

/// Run `body` with the session, then release it on every path.
///
/// A panic inside `body` is resumed after the session has been released.
///
/// # Errors
///
/// Returns the body's error if it failed, otherwise the release error.
pub async fn with_session<D, T, F>(mut session: Session<D>, body: F) -> ProbeResult<T>
where
    D: Driver,
    F: for<'a> FnOnce(&'a mut Session<D>) -> BoxFuture<'a, ProbeResult<T>>,
{
    let outcome = AssertUnwindSafe(body(&mut session)).catch_unwind().await;
    let released = session.release().await;
    match outcome {
        Err(panic) => std::panic::resume_unwind(panic),
        Ok(Err(err)) => Err(err),
        Ok(Ok(value)) => released.map(|()| value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake::{FakeElement, FakeTodoApp};

    const URL: &str = "http://todo.test/";

    fn session() -> Session<FakeTodoApp> {
        session_with(FakeTodoApp::new(URL))
    }

    fn session_with(app: FakeTodoApp) -> Session<FakeTodoApp> {
        let config = SessionConfig::default()
            .with_app_url(URL)
            .with_implicit_wait(WaitOptions::new().with_timeout(50).with_poll_interval(1));
        Session::new(app, config)
    }

    mod lookup_tests {
        use super::*;

        #[tokio::test]
        async fn test_find_after_open() {
            let mut s = session();
            s.open_app().await.unwrap();
            let el = s.find(&Selector::class("new-todo")).await.unwrap();
            assert_eq!(el, FakeElement::NewTodo);
            s.release().await.unwrap();
        }

        #[tokio::test]
        async fn test_missing_element_reports_selector_and_wait() {
            let mut s = session();
            s.open_app().await.unwrap();
            let err = s.find(&Selector::class("todo-list")).await.unwrap_err();
            match err {
                ProbeError::ElementNotFound { selector, timeout_ms } => {
                    assert_eq!(selector, ".todo-list");
                    assert_eq!(timeout_ms, 50);
                }
                other => panic!("unexpected error {other:?}"),
            }
            s.release().await.unwrap();
        }

        #[tokio::test]
        async fn test_try_find_and_find_all_return_empty() {
            let mut s = session();
            s.open_app().await.unwrap();
            assert!(s.try_find(&Selector::class("footer")).await.unwrap().is_none());
            assert!(s.find_all(&Selector::class("footer")).await.unwrap().is_empty());
            s.release().await.unwrap();
        }

        #[tokio::test]
        async fn test_implicit_wait_rides_out_render_lag() {
            let mut s = session_with(FakeTodoApp::new(URL).with_render_lag(5));
            s.open_app().await.unwrap();
            assert!(s.find(&Selector::class("new-todo")).await.is_ok());
            s.release().await.unwrap();
        }
    }

    mod lifecycle_tests {
        use super::*;

        #[tokio::test]
        async fn test_reset_clears_storage_and_reloads() {
            let mut app = FakeTodoApp::new(URL);
            app.seed_storage(&[("stale", false)]);
            let mut s = session_with(app);
            s.reset().await.unwrap();
            assert!(s.driver().stored_tasks().is_empty());
            assert!(s.try_find(&Selector::class("todo-list")).await.unwrap().is_none());
            assert!(s.driver().was_called("clear_local_storage"));
            assert!(s.driver().was_called("refresh"));
            s.release().await.unwrap();
        }

        #[tokio::test]
        async fn test_navigate_route_sets_fragment() {
            let mut s = session();
            s.navigate_route("#/active").await.unwrap();
            let url = s.driver().current_url().await.unwrap();
            assert_eq!(url, "http://todo.test/#/active");
            s.release().await.unwrap();
        }

        #[tokio::test]
        async fn test_with_session_releases_on_success() {
            let value = with_session(session(), |s| {
                async move {
                    s.open_app().await?;
                    s.driver().title().await
                }
                .boxed()
            })
            .await
            .unwrap();
            assert_eq!(value, "React • TodoMVC");
        }

        #[tokio::test]
        async fn test_with_session_releases_on_error() {
            let err = with_session(session(), |s| {
                async move {
                    s.open_app().await?;
                    s.find(&Selector::class("todo-list")).await.map(|_| ())
                }
                .boxed()
            })
            .await
            .unwrap_err();
            assert!(err.is_not_found());
        }

        #[tokio::test]
        async fn test_with_session_releases_before_resuming_panic() {
            let outcome = AssertUnwindSafe(with_session(session(), |s| {
                async move {
                    if s.config().headless {
                        return Ok(());
                    }
                    panic!("scenario blew up")
                }
                .boxed()
            }))
            .catch_unwind()
            .await;
            assert!(outcome.is_err());
        }
    }
}
