//! W3C WebDriver backend (chromedriver / geckodriver).
//!
//! [`acquire_session`] starts the driver service for the configured browser
//! unless `webdriver_url` points at one that is already running, opens a
//! browser through it and wraps the result in a [`Session`]. The service
//! process is killed when the session is released, and also if the backend is
//! dropped without a release.
//!
//! The server-side implicit wait is left at zero: lookups here return
//! immediately and [`Session`] does the waiting.

use crate::browser::{BrowserKind, SessionConfig};
use crate::driver::{Driver, Key};
use crate::locator::Selector;
use crate::result::{ProbeError, ProbeResult};
use crate::session::Session;
use crate::wait::{poll_until, WaitOptions};
use async_trait::async_trait;
use std::fmt;
use std::net::{Ipv4Addr, TcpListener};
use std::process::Stdio;
use thirtyfour::prelude::*;
use thirtyfour::Key as WebKey;
use tokio::net::TcpStream;
use tokio::process::{Child, Command};

const SCRIPT_CLICK: &str = "arguments[0].click();";
const CLEAR_STORAGE: &str = "window.localStorage.clear();";

/// Launch a browser as described by `config`
///
/// # Errors
///
/// Returns `BrowserLaunchError` if the driver service or the browser cannot
/// be started.
pub async fn acquire_session(config: SessionConfig) -> ProbeResult<Session<WebDriverBackend>> {
    let backend = WebDriverBackend::launch(&config).await?;
    tracing::info!(browser = %config.browser, headless = config.headless, "session started");
    Ok(Session::new(backend, config))
}

/// [`Driver`] over a WebDriver server
pub struct WebDriverBackend {
    browser: BrowserKind,
    driver: Option<WebDriver>,
    service: Option<Child>,
}

impl fmt::Debug for WebDriverBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebDriverBackend")
            .field("browser", &self.browser)
            .field("open", &self.driver.is_some())
            .field("service_pid", &self.service.as_ref().and_then(Child::id))
            .finish()
    }
}

impl WebDriverBackend {
    /// Start the driver service if needed and open a browser
    ///
    /// # Errors
    ///
    /// Returns `BrowserLaunchError` on any startup failure.
    pub async fn launch(config: &SessionConfig) -> ProbeResult<Self> {
        let (server_url, service) = match &config.webdriver_url {
            Some(url) => {
                tracing::debug!(%url, "using running WebDriver server");
                (url.clone(), None)
            }
            None => {
                let (url, child) = start_service(config).await?;
                (url, Some(child))
            }
        };

        let driver = match config.browser {
            BrowserKind::Chrome => {
                let mut caps = DesiredCapabilities::chrome();
                caps.add_arg("--log-level=3").map_err(launch_error)?;
                if config.headless {
                    caps.set_headless().map_err(launch_error)?;
                    caps.add_arg("--disable-gpu").map_err(launch_error)?;
                }
                WebDriver::new(server_url.as_str(), caps).await
            }
            BrowserKind::Firefox => {
                let mut caps = DesiredCapabilities::firefox();
                if config.headless {
                    caps.set_headless().map_err(launch_error)?;
                }
                WebDriver::new(server_url.as_str(), caps).await
            }
        }
        .map_err(launch_error)?;

        Ok(Self {
            browser: config.browser,
            driver: Some(driver),
            service,
        })
    }

    /// Browser driven by this backend
    #[must_use]
    pub const fn browser(&self) -> BrowserKind {
        self.browser
    }

    fn driver(&self) -> ProbeResult<&WebDriver> {
        self.driver.as_ref().ok_or(ProbeError::SessionClosed)
    }

    async fn stop_service(&mut self) {
        if let Some(mut child) = self.service.take() {
            if let Err(err) = child.kill().await {
                tracing::warn!(error = %err, "could not stop driver service");
            }
        }
    }
}

fn launch_error(err: impl fmt::Display) -> ProbeError {
    ProbeError::BrowserLaunchError {
        message: err.to_string(),
    }
}

/// Map a WebDriver failure onto the error taxonomy by its message
fn action_error(action: &str, err: impl fmt::Display) -> ProbeError {
    let message = err.to_string();
    let lower = message.to_ascii_lowercase();
    if lower.contains("stale element") {
        ProbeError::StaleElement { message }
    } else if lower.contains("not interactable") {
        ProbeError::NotInteractable { message }
    } else {
        ProbeError::action(action, message)
    }
}

fn script_error(err: impl fmt::Display) -> ProbeError {
    ProbeError::ScriptError {
        message: err.to_string(),
    }
}

fn by(selector: &Selector) -> By {
    match selector {
        Selector::ClassName(name) => By::ClassName(name.as_str()),
        Selector::Tag(tag) => By::Tag(tag.as_str()),
        Selector::Css(css) => By::Css(css.as_str()),
    }
}

fn web_key(key: Key) -> WebKey {
    match key {
        Key::Enter => WebKey::Enter,
        Key::Backspace => WebKey::Backspace,
        Key::Escape => WebKey::Escape,
    }
}

/// Command-line arguments selecting the listening port of a driver service
fn service_args(browser: BrowserKind, port: u16) -> Vec<String> {
    match browser {
        BrowserKind::Chrome => vec![format!("--port={port}")],
        BrowserKind::Firefox => vec!["--port".to_string(), port.to_string()],
    }
}

fn free_port() -> ProbeResult<u16> {
    let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0))?;
    Ok(listener.local_addr()?.port())
}

async fn start_service(config: &SessionConfig) -> ProbeResult<(String, Child)> {
    let path = config.driver_path();
    let port = free_port()?;
    tracing::debug!(driver = %path.display(), port, "starting driver service");

    let child = Command::new(&path)
        .args(service_args(config.browser, port))
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .kill_on_drop(true)
        .spawn()
        .map_err(|err| ProbeError::BrowserLaunchError {
            message: format!("could not start {}: {err}", path.display()),
        })?;

    let readiness = WaitOptions::new().with_timeout(config.startup_timeout_ms);
    let polled = poll_until(&readiness, move || async move {
        Ok(TcpStream::connect((Ipv4Addr::LOCALHOST, port))
            .await
            .is_ok()
            .then_some(()))
    })
    .await?;
    if polled.timed_out() {
        return Err(ProbeError::BrowserLaunchError {
            message: format!(
                "{} did not accept connections on port {port} within {}ms",
                path.display(),
                config.startup_timeout_ms
            ),
        });
    }
    Ok((format!("http://{}:{port}", Ipv4Addr::LOCALHOST), child))
}

#[async_trait]
impl Driver for WebDriverBackend {
    type Element = WebElement;

    async fn navigate(&mut self, url: &str) -> ProbeResult<()> {
        tracing::debug!(%url, "goto");
        self.driver()?
            .goto(url)
            .await
            .map_err(|err| ProbeError::NavigationError {
                url: url.to_string(),
                message: err.to_string(),
            })
    }

    async fn refresh(&mut self) -> ProbeResult<()> {
        self.driver()?
            .refresh()
            .await
            .map_err(|err| action_error("refresh", err))
    }

    async fn title(&self) -> ProbeResult<String> {
        self.driver()?
            .title()
            .await
            .map_err(|err| action_error("title", err))
    }

    async fn current_url(&self) -> ProbeResult<String> {
        let url = self
            .driver()?
            .current_url()
            .await
            .map_err(|err| action_error("current_url", err))?;
        Ok(url.to_string())
    }

    async fn find_all(
        &self,
        scope: Option<&WebElement>,
        selector: &Selector,
    ) -> ProbeResult<Vec<WebElement>> {
        let found = match scope {
            Some(element) => element.find_all(by(selector)).await,
            None => self.driver()?.find_all(by(selector)).await,
        };
        found.map_err(|err| action_error("find", err))
    }

    async fn text(&self, element: &WebElement) -> ProbeResult<String> {
        element.text().await.map_err(|err| action_error("text", err))
    }

    async fn attribute(&self, element: &WebElement, name: &str) -> ProbeResult<Option<String>> {
        element
            .attr(name)
            .await
            .map_err(|err| action_error("attribute", err))
    }

    async fn send_keys(&mut self, element: &WebElement, text: &str) -> ProbeResult<()> {
        element
            .send_keys(text)
            .await
            .map_err(|err| action_error("send_keys", err))
    }

    async fn press_key(&mut self, element: &WebElement, key: Key) -> ProbeResult<()> {
        element
            .send_keys(web_key(key))
            .await
            .map_err(|err| action_error("press_key", err))
    }

    async fn click(&mut self, element: &WebElement) -> ProbeResult<()> {
        element.click().await.map_err(|err| action_error("click", err))
    }

    async fn double_click(&mut self, element: &WebElement) -> ProbeResult<()> {
        self.driver()?
            .action_chain()
            .double_click_element(element)
            .perform()
            .await
            .map_err(|err| action_error("double_click", err))
    }

    async fn script_click(&mut self, element: &WebElement) -> ProbeResult<()> {
        let target = element.to_json().map_err(script_error)?;
        self.driver()?
            .execute(SCRIPT_CLICK, vec![target])
            .await
            .map_err(script_error)?;
        Ok(())
    }

    async fn clear_local_storage(&mut self) -> ProbeResult<()> {
        self.driver()?
            .execute(CLEAR_STORAGE, Vec::new())
            .await
            .map_err(script_error)?;
        Ok(())
    }

    async fn quit(&mut self) -> ProbeResult<()> {
        let Some(driver) = self.driver.take() else {
            return Err(ProbeError::SessionClosed);
        };
        let result = driver
            .quit()
            .await
            .map_err(|err| action_error("quit", err));
        self.stop_service().await;
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_args() {
        assert_eq!(service_args(BrowserKind::Chrome, 9515), ["--port=9515"]);
        assert_eq!(service_args(BrowserKind::Firefox, 4444), ["--port", "4444"]);
    }

    #[test]
    fn test_free_port_is_bindable() {
        let port = free_port().unwrap();
        assert_ne!(port, 0);
        assert!(TcpListener::bind((Ipv4Addr::LOCALHOST, port)).is_ok());
    }

    #[test]
    fn test_action_error_classification() {
        assert!(matches!(
            action_error("text", "stale element reference: element is not attached"),
            ProbeError::StaleElement { .. }
        ));
        assert!(matches!(
            action_error("click", "element not interactable"),
            ProbeError::NotInteractable { .. }
        ));
        assert!(matches!(
            action_error("click", "connection refused"),
            ProbeError::ActionFailed { ref action, .. } if action == "click"
        ));
    }

    #[tokio::test]
    async fn test_missing_driver_binary_fails_to_launch() {
        let config = SessionConfig::new(BrowserKind::Firefox)
            .with_webdriver_dir("/nonexistent")
            .with_startup_timeout(200);
        // Only meaningful where geckodriver is not installed on PATH.
        if which_on_path(&BrowserKind::Firefox.driver_binary()) {
            return;
        }
        let err = WebDriverBackend::launch(&config).await.unwrap_err();
        assert!(matches!(err, ProbeError::BrowserLaunchError { .. }));
    }

    fn which_on_path(binary: &str) -> bool {
        std::env::var_os("PATH")
            .map(|paths| std::env::split_paths(&paths).any(|dir| dir.join(binary).is_file()))
            .unwrap_or(false)
    }
}
