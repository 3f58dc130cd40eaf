//! Per-scenario fixture.
//!
//! Setup opens the application. Teardown goes back to the application URL,
//! clears `localStorage` and reloads, so the next scenario starts from an
//! empty, unfiltered list. Teardown runs whenever setup succeeded, also when
//! the scenario body fails or panics.

use crate::driver::Driver;
use crate::result::{ProbeError, ProbeResult};
use crate::session::Session;
use futures::future::BoxFuture;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;

/// State of the fixture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixtureState {
    /// Fixture is created but not set up.
    Registered,
    /// Fixture has been set up successfully.
    SetUp,
    /// Fixture has been torn down.
    TornDown,
    /// Setup or teardown failed.
    Failed,
}

/// Application fixture wrapped around every scenario
#[derive(Debug)]
pub struct AppFixture {
    state: FixtureState,
}

impl Default for AppFixture {
    fn default() -> Self {
        Self::new()
    }
}

impl AppFixture {
    /// Create a fixture that has not been set up
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: FixtureState::Registered,
        }
    }

    /// Current state
    #[must_use]
    pub const fn state(&self) -> FixtureState {
        self.state
    }

    /// Open the application under test
    ///
    /// # Errors
    ///
    /// Returns `FixtureError` if the application cannot be loaded.
    pub async fn setup<D: Driver>(&mut self, session: &mut Session<D>) -> ProbeResult<()> {
        match session.open_app().await {
            Ok(()) => {
                self.state = FixtureState::SetUp;
                Ok(())
            }
            Err(err) => {
                self.state = FixtureState::Failed;
                Err(ProbeError::FixtureError {
                    message: format!("setup failed: {err}"),
                })
            }
        }
    }

    /// Return to the application, drop its persisted data and reload it
    ///
    /// # Errors
    ///
    /// Returns `FixtureError` if the application cannot be loaded, storage
    /// cannot be cleared or the page cannot be reloaded.
    pub async fn teardown<D: Driver>(&mut self, session: &mut Session<D>) -> ProbeResult<()> {
        match session.reset().await {
            Ok(()) => {
                self.state = FixtureState::TornDown;
                Ok(())
            }
            Err(err) => {
                self.state = FixtureState::Failed;
                Err(ProbeError::FixtureError {
                    message: format!("teardown failed: {err}"),
                })
            }
        }
    }

    /// Set up, run `body`, tear down.
    ///
    /// A panic in `body` is resumed once teardown has run.
    ///
    /// # Errors
    ///
    /// Returns the setup error, the body's error, or the teardown error, in
    /// that order of precedence.
    pub async fn run<D, T, F>(&mut self, session: &mut Session<D>, body: F) -> ProbeResult<T>
    where
        D: Driver,
        F: for<'a> FnOnce(&'a mut Session<D>) -> BoxFuture<'a, ProbeResult<T>>,
    {
        self.setup(session).await?;
        let outcome = AssertUnwindSafe(body(&mut *session)).catch_unwind().await;
        let torn_down = self.teardown(session).await;
        if let Err(err) = &torn_down {
            tracing::warn!(error = %err, "teardown failed");
        }
        match outcome {
            Err(panic) => std::panic::resume_unwind(panic),
            Ok(Err(err)) => Err(err),
            Ok(Ok(value)) => torn_down.map(|()| value),
        }
    }
}
