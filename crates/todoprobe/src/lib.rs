//! todoprobe: end-to-end test suite for the TodoMVC (React) application.
//!
//! The crate drives a real browser through WebDriver and checks the
//! behaviour of the TodoMVC example app: adding, deleting, editing and
//! completing tasks, filtering, clearing completed tasks and persistence
//! across reloads.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────┐    ┌────────────┐    ┌────────────┐    ┌────────────┐
//! │ Scenario   │    │ TodoPage   │    │ Session    │    │ Driver     │
//! │ catalog    │───►│ (helpers)  │───►│ (implicit  │───►│ WebDriver  │
//! │ + runner   │    │            │    │  wait)     │    │ or fake    │
//! └────────────┘    └────────────┘    └────────────┘    └────────────┘
//! ```
//!
//! Every scenario runs inside an [`AppFixture`], which opens the app before
//! the body and clears its persisted state afterwards, whatever the outcome.
//!
//! # Example
//!
//! ```ignore
//! use todoprobe::{acquire_session, catalog, RunOptions, SessionConfig, SuiteRunner};
//!
//! let config = SessionConfig::for_browser("firefox")?.with_headless(true);
//! let mut session = acquire_session(config).await?;
//! let report = SuiteRunner::new(RunOptions::new())
//!     .run(&mut session, &catalog())
//!     .await;
//! session.release().await?;
//! assert!(report.all_passed());
//! ```

#![warn(missing_docs)]

mod assertion;
mod browser;
mod driver;
mod fixture;
mod locator;
mod result;
mod session;

/// In-memory TodoMVC page implementing [`Driver`].
pub mod fake;

/// Scenario catalog (TodoMVC-0 .. TodoMVC-13 and property scenarios).
pub mod scenario;

/// Sequential suite runner and report.
pub mod runner;

/// Page object for the application under test.
pub mod todo;

/// Implicit-wait polling.
pub mod wait;

/// WebDriver backend (chromedriver / geckodriver).
#[cfg(feature = "webdriver")]
pub mod webdriver;

pub use assertion::{Assertion, AssertionResult};
pub use browser::{
    BrowserKind, SessionConfig, DEFAULT_APP_URL, DEFAULT_STARTUP_TIMEOUT_MS, DEFAULT_WEBDRIVER_DIR,
};
pub use driver::{Driver, Key};
pub use fixture::{AppFixture, FixtureState};
pub use locator::Selector;
pub use result::{ProbeError, ProbeResult};
pub use runner::{RunOptions, ScenarioResult, SuiteReport, SuiteRunner};
pub use scenario::{catalog, Scenario};
pub use session::{with_session, Session};
pub use todo::{Filter, Task, TaskState, TodoPage};
pub use wait::{WaitOptions, DEFAULT_IMPLICIT_WAIT_MS, DEFAULT_POLL_INTERVAL_MS};
#[cfg(feature = "webdriver")]
pub use webdriver::{acquire_session, WebDriverBackend};
