use anyhow::{Context, Result, ensure};
use std::{env, net::IpAddr, path::PathBuf, sync::OnceLock, time::Duration};

/// Application configuration loaded and validated at startup
#[derive(Clone, Debug)]
pub struct AppConfig {
    /// HTTP server configuration
    pub ui: UiConfig,

    /// Remote network controller configuration
    pub controller: ControllerConfig,

    /// Path configuration
    pub paths: PathConfig,

    /// Shows the session mode selector
    pub developer_tools: bool,
}

#[derive(Clone, Debug)]
pub struct UiConfig {
    pub bind_address: IpAddr,
    pub port: u16,
    pub max_screens: usize,
    pub screen_idle_timeout: Duration,
}

#[derive(Clone, Debug)]
pub struct ControllerConfig {
    pub url: String,
    pub apply_timeout: Duration,
}

#[derive(Clone, Debug)]
pub struct PathConfig {
    pub config_dir: PathBuf,
    pub network_config_file: PathBuf,
}

impl AppConfig {
    /// Get or load the application configuration
    ///
    /// # Panics
    /// Panics if configuration loading fails, the service cannot run without it.
    pub fn get() -> &'static Self {
        static APP_CONFIG: OnceLock<AppConfig> = OnceLock::new();
        APP_CONFIG.get_or_init(|| {
            Self::load_internal().expect("failed to load application configuration")
        })
    }

    fn load_internal() -> Result<Self> {
        let ui = UiConfig::load()?;
        let controller = ControllerConfig::load()?;
        let paths = PathConfig::load()?;
        let developer_tools = env::var("DEVELOPER_TOOLS")
            .map(|value| parse_flag(&value))
            .unwrap_or(false);

        Ok(Self {
            ui,
            controller,
            paths,
            developer_tools,
        })
    }
}

impl UiConfig {
    fn load() -> Result<Self> {
        let port = env::var("UI_PORT")
            .unwrap_or_else(|_| "1977".to_string())
            .parse::<u16>()
            .context("failed to parse UI_PORT: invalid format")?;

        let bind_address = env::var("BIND_ADDRESS")
            .unwrap_or_else(|_| "127.0.0.1".to_string())
            .parse::<IpAddr>()
            .context("failed to parse BIND_ADDRESS: invalid format")?;

        let max_screens = env::var("MAX_SCREENS")
            .unwrap_or_else(|_| "16".to_string())
            .parse::<usize>()
            .context("failed to parse MAX_SCREENS: invalid format")?;

        ensure!(max_screens > 0, "failed to parse MAX_SCREENS: must not be 0");

        let idle_secs = env::var("SCREEN_IDLE_TIMEOUT_SECS")
            .unwrap_or_else(|_| "1800".to_string())
            .parse::<u64>()
            .context("failed to parse SCREEN_IDLE_TIMEOUT_SECS: invalid format")?;

        Ok(Self {
            bind_address,
            port,
            max_screens,
            screen_idle_timeout: Duration::from_secs(idle_secs),
        })
    }
}

impl ControllerConfig {
    fn load() -> Result<Self> {
        let url =
            env::var("CONTROLLER_URL").unwrap_or_else(|_| "http://127.0.0.1:5225".to_string());

        ensure!(
            url.starts_with("http://") || url.starts_with("https://"),
            "failed to parse CONTROLLER_URL: expected http(s) URL, got {url:?}"
        );

        let secs = env::var("APPLY_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".to_string())
            .parse::<u64>()
            .context("failed to parse APPLY_TIMEOUT_SECS: invalid format")?;

        ensure!(secs > 0, "failed to parse APPLY_TIMEOUT_SECS: must not be 0");

        Ok(Self {
            url,
            apply_timeout: Duration::from_secs(secs),
        })
    }
}

impl PathConfig {
    fn load() -> Result<Self> {
        #[cfg(not(any(test, feature = "mock")))]
        let config_dir =
            PathBuf::from(env::var("CONFIG_PATH").unwrap_or_else(|_| "/data/config".to_string()));

        // In test/mock mode, use a temp directory that is shared by all tests of a run
        #[cfg(any(test, feature = "mock"))]
        let config_dir = {
            let dir: PathBuf =
                env::temp_dir().join(format!("netcfg-reconciler-{}", std::process::id()));
            std::fs::create_dir_all(&dir).context("failed to create temp config dir")?;
            dir
        };

        let network_config_file = config_dir.join("network_config.json");

        Ok(Self {
            config_dir,
            network_config_file,
        })
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "true" | "1")
}
