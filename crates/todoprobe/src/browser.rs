//! Browser selection and session configuration.

use crate::result::{ProbeError, ProbeResult};
use crate::wait::WaitOptions;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

/// Address of the application under test
pub const DEFAULT_APP_URL: &str = "http://todomvc.com/examples/react/";

/// Directory searched for driver binaries before falling back to `PATH`
pub const DEFAULT_WEBDRIVER_DIR: &str = "webdrivers";

/// How long a freshly spawned driver service may take to accept connections
pub const DEFAULT_STARTUP_TIMEOUT_MS: u64 = 10_000;

/// Supported browsers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrowserKind {
    /// Google Chrome / Chromium via chromedriver
    Chrome,
    /// Mozilla Firefox via geckodriver
    Firefox,
}

impl BrowserKind {
    /// All supported browsers
    pub const ALL: [Self; 2] = [Self::Chrome, Self::Firefox];

    /// Lowercase name as accepted on the command line
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Chrome => "chrome",
            Self::Firefox => "firefox",
        }
    }

    /// File name of the driver binary for this browser on this platform
    #[must_use]
    pub fn driver_binary(self) -> String {
        let stem = match self {
            Self::Chrome => "chromedriver",
            Self::Firefox => "geckodriver",
        };
        format!("{stem}{}", std::env::consts::EXE_SUFFIX)
    }
}

impl Default for BrowserKind {
    fn default() -> Self {
        Self::Firefox
    }
}

impl fmt::Display for BrowserKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BrowserKind {
    type Err = ProbeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "chrome" => Ok(Self::Chrome),
            "firefox" => Ok(Self::Firefox),
            _ => Err(ProbeError::UnsupportedBrowser {
                name: s.to_string(),
            }),
        }
    }
}

/// Configuration of a browser session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Browser to launch
    pub browser: BrowserKind,
    /// Run without a visible window
    pub headless: bool,
    /// URL of the application under test
    pub app_url: String,
    /// Implicit wait applied to every element lookup
    pub implicit_wait: WaitOptions,
    /// Directory searched for driver binaries
    pub webdriver_dir: PathBuf,
    /// Already running WebDriver server (skips spawning a driver service)
    pub webdriver_url: Option<String>,
    /// Time allowed for a spawned driver service to come up
    pub startup_timeout_ms: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            browser: BrowserKind::default(),
            headless: false,
            app_url: DEFAULT_APP_URL.to_string(),
            implicit_wait: WaitOptions::default(),
            webdriver_dir: PathBuf::from(DEFAULT_WEBDRIVER_DIR),
            webdriver_url: None,
            startup_timeout_ms: DEFAULT_STARTUP_TIMEOUT_MS,
        }
    }
}

impl SessionConfig {
    /// Create a config for the given browser
    #[must_use]
    pub fn new(browser: BrowserKind) -> Self {
        Self {
            browser,
            ..Self::default()
        }
    }

    /// Create a config from a browser name, failing fast on unknown names
    pub fn for_browser(name: &str) -> ProbeResult<Self> {
        Ok(Self::new(name.parse()?))
    }

    /// Set headless mode
    #[must_use]
    pub const fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Set the application URL
    #[must_use]
    pub fn with_app_url(mut self, url: impl Into<String>) -> Self {
        self.app_url = url.into();
        self
    }

    /// Set the implicit wait
    #[must_use]
    pub const fn with_implicit_wait(mut self, wait: WaitOptions) -> Self {
        self.implicit_wait = wait;
        self
    }

    /// Set the driver binary directory
    #[must_use]
    pub fn with_webdriver_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.webdriver_dir = dir.into();
        self
    }

    /// Connect to an already running WebDriver server
    #[must_use]
    pub fn with_webdriver_url(mut self, url: impl Into<String>) -> Self {
        self.webdriver_url = Some(url.into());
        self
    }

    /// Set the driver service startup timeout
    #[must_use]
    pub const fn with_startup_timeout(mut self, timeout_ms: u64) -> Self {
        self.startup_timeout_ms = timeout_ms;
        self
    }

    /// Startup timeout as Duration
    #[must_use]
    pub const fn startup_timeout(&self) -> Duration {
        Duration::from_millis(self.startup_timeout_ms)
    }

    /// Path of the driver binary: the copy in `webdriver_dir` when present,
    /// otherwise the bare name resolved through `PATH`.
    #[must_use]
    pub fn driver_path(&self) -> PathBuf {
        let binary = self.browser.driver_binary();
        let local = self.webdriver_dir.join(&binary);
        if local.is_file() {
            local
        } else {
            Path::new(&binary).to_path_buf()
        }
    }

    /// URL of the application with a route fragment (e.g. `#/active`)
    #[must_use]
    pub fn route_url(&self, fragment: &str) -> String {
        let base = self.app_url.split('#').next().unwrap_or(&self.app_url);
        format!("{base}{fragment}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod browser_kind_tests {
        use super::*;

        #[test]
        fn test_parse_supported() {
            assert_eq!("chrome".parse::<BrowserKind>().unwrap(), BrowserKind::Chrome);
            assert_eq!("Firefox".parse::<BrowserKind>().unwrap(), BrowserKind::Firefox);
            assert_eq!(" CHROME ".parse::<BrowserKind>().unwrap(), BrowserKind::Chrome);
        }

        #[test]
        fn test_parse_unsupported() {
            let err = "safari".parse::<BrowserKind>().unwrap_err();
            assert!(matches!(err, ProbeError::UnsupportedBrowser { ref name } if name == "safari"));
        }

        #[test]
        fn test_default_is_firefox() {
            assert_eq!(BrowserKind::default(), BrowserKind::Firefox);
        }

        #[test]
        fn test_driver_binary() {
            assert!(BrowserKind::Chrome.driver_binary().starts_with("chromedriver"));
            assert!(BrowserKind::Firefox.driver_binary().starts_with("geckodriver"));
        }

        #[test]
        fn test_display_round_trips() {
            for kind in BrowserKind::ALL {
                assert_eq!(kind.to_string().parse::<BrowserKind>().unwrap(), kind);
            }
        }
    }

    mod session_config_tests {
        use super::*;

        #[test]
        fn test_defaults() {
            let config = SessionConfig::default();
            assert!(!config.headless);
            assert_eq!(config.app_url, DEFAULT_APP_URL);
            assert_eq!(config.implicit_wait.timeout_ms, 3_000);
            assert!(config.webdriver_url.is_none());
        }

        #[test]
        fn test_for_browser_fails_fast() {
            assert!(SessionConfig::for_browser("chrome").is_ok());
            assert!(matches!(
                SessionConfig::for_browser("opera"),
                Err(ProbeError::UnsupportedBrowser { .. })
            ));
        }

        #[test]
        fn test_builder() {
            let config = SessionConfig::new(BrowserKind::Chrome)
                .with_headless(true)
                .with_app_url("http://localhost:8080/")
                .with_webdriver_url("http://localhost:4444")
                .with_startup_timeout(500);
            assert!(config.headless);
            assert_eq!(config.app_url, "http://localhost:8080/");
            assert_eq!(config.webdriver_url.as_deref(), Some("http://localhost:4444"));
            assert_eq!(config.startup_timeout(), Duration::from_millis(500));
        }

        #[test]
        fn test_route_url_replaces_fragment() {
            let config = SessionConfig::default().with_app_url("http://app/#/active");
            assert_eq!(config.route_url("#/completed"), "http://app/#/completed");
            assert_eq!(config.route_url("#/"), "http://app/#/");
        }

        #[test]
        fn test_driver_path_falls_back_to_bare_name() {
            let config = SessionConfig::new(BrowserKind::Firefox)
                .with_webdriver_dir("/definitely/not/a/dir");
            assert_eq!(config.driver_path(), PathBuf::from(BrowserKind::Firefox.driver_binary()));
        }
    }
}
