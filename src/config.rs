use anyhow::{Context, Result};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use zbus::names::InterfaceName;
use zbus::zvariant::ObjectPath;

/// Предел числа быстрых перепроверок
pub const MAX_FAST_ATTEMPTS: usize = 16;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub logging: LoggingConfig,
    pub source: SourceConfig,
    pub retry: RetryConfig,
    pub bus: BusConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SourceConfig {
    /// "niri" или "dry_run"
    pub mode: String,
    /// Период сценария эмуляции окон
    pub dry_run_interval_ms: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RetryConfig {
    /// Задержки быстрых перепроверок заголовка, каждая отсчитывается от предыдущей проверки
    pub fast_delays_ms: Vec<u64>,
    pub slow_poll_interval_ms: u64,
    /// Предел медленных опросов; None — опрашивать бесконечно
    #[serde(default)]
    pub max_slow_polls: Option<u32>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BusConfig {
    pub object_path: String,
    pub interface: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            logging: LoggingConfig {
                level: "info".to_string(),
                format: "compact".to_string(),
            },
            source: SourceConfig {
                mode: "niri".to_string(),
                dry_run_interval_ms: 3000,
            },
            retry: RetryConfig {
                fast_delays_ms: vec![50, 150, 350],
                slow_poll_interval_ms: 500,
                max_slow_polls: None,
            },
            bus: BusConfig {
                object_path: "/ActiveWindow".to_string(),
                interface: "org.ahkwayland.ActiveWindow".to_string(),
            },
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(config_path: P) -> Result<Self> {
        let config_path = config_path.as_ref();

        // Файл необязателен: недостающие поля берутся из значений по умолчанию
        let figment = Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file(config_path))
            .merge(Env::prefixed("AHK_").split("__"));

        let config: Config = figment
            .extract()
            .with_context(|| format!("Не удалось загрузить конфигурацию из {:?}", config_path))?;

        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        match self.logging.level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => anyhow::bail!("Неверный уровень логирования: {}", self.logging.level),
        }

        match self.logging.format.as_str() {
            "compact" | "full" => {}
            _ => anyhow::bail!("Неверный формат логирования: {}", self.logging.format),
        }

        match self.source.mode.as_str() {
            "niri" | "dry_run" => {}
            _ => anyhow::bail!("Неверный источник окон: {}", self.source.mode),
        }

        if self.source.dry_run_interval_ms < 100 {
            anyhow::bail!("dry_run_interval_ms должно быть минимум 100");
        }

        if self.retry.fast_delays_ms.is_empty() {
            anyhow::bail!("fast_delays_ms не может быть пустым");
        }

        if self.retry.fast_delays_ms.len() > MAX_FAST_ATTEMPTS {
            anyhow::bail!(
                "fast_delays_ms содержит {} задержек, максимум {}",
                self.retry.fast_delays_ms.len(),
                MAX_FAST_ATTEMPTS
            );
        }

        if let Some(pos) = self.retry.fast_delays_ms.iter().position(|&d| d == 0) {
            anyhow::bail!("Задержка #{} в fast_delays_ms должна быть больше 0", pos + 1);
        }

        if self.retry.slow_poll_interval_ms < 50 {
            anyhow::bail!("slow_poll_interval_ms должно быть минимум 50");
        }

        if self.retry.max_slow_polls == Some(0) {
            anyhow::bail!("max_slow_polls должно быть больше 0 (или не задано)");
        }

        ObjectPath::try_from(self.bus.object_path.as_str())
            .with_context(|| format!("Неверный путь объекта D-Bus: {}", self.bus.object_path))?;
        InterfaceName::try_from(self.bus.interface.as_str())
            .with_context(|| format!("Неверное имя интерфейса D-Bus: {}", self.bus.interface))?;

        Ok(())
    }
}

impl RetryConfig {
    pub fn fast_delays(&self) -> Vec<Duration> {
        self.fast_delays_ms
            .iter()
            .map(|&ms| Duration::from_millis(ms))
            .collect()
    }

    pub fn slow_poll_interval(&self) -> Duration {
        Duration::from_millis(self.slow_poll_interval_ms)
    }
}
