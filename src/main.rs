use anyhow::{anyhow, Result};
use clap::Parser;
use std::future::Future;
use tokio::signal;
use tokio::sync::mpsc;
use tokio::task::{JoinError, JoinHandle};
use tracing::{error, info, warn};
mod config;
mod error;
mod events;
mod services;
mod utils;

use config::Config;
use services::{
    create_publisher,
    create_window_source,
    BridgeService,
    RetrySequencer,
    SignalListener,
};

#[derive(Parser, Debug)]
#[command(name = "ahk-active-window")]
#[command(about = "Публикует смену активного окна композитора в D-Bus для AHK")]
struct Args {
    /// Путь к файлу конфигурации
    #[arg(short, long, default_value = "ahk-active-window.toml")]
    config: String,

    /// Режим сухого запуска (эмуляция окон, сигналы только в лог)
    #[arg(long)]
    dry_run: bool,

    /// Слушать опубликованные сигналы вместо публикации
    #[arg(long, conflicts_with = "dry_run")]
    listen: bool,

    /// Уровень логирования (по умолчанию из конфигурации)
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Загрузка конфигурации
    let config = Config::load(&args.config)?;

    // Инициализация системы логирования
    let level = args.log_level.as_deref().unwrap_or(&config.logging.level);
    init_tracing(level, &config.logging.format)?;

    info!("Запуск AHK Active Window v{}", env!("CARGO_PKG_VERSION"));
    info!("Конфигурация загружена из: {}", args.config);

    if args.listen {
        return run_listener(config).await;
    }

    if args.dry_run {
        warn!("Режим сухого запуска - окна эмулируются, D-Bus не используется");
    }

    // Инициализация компонентов
    let publisher = create_publisher(&config, args.dry_run).await?;
    let window_source = create_window_source(&config, args.dry_run)?;
    let (source_tx, source_rx) = mpsc::unbounded_channel();
    let bridge = BridgeService::new(
        RetrySequencer::from_config(&config.retry),
        publisher,
        source_rx,
    );

    info!("Все компоненты инициализированы");

    let source_handle = tokio::spawn(async move { window_source.run(source_tx).await });
    let bridge_handle = tokio::spawn(async move { bridge.run().await });

    info!("Все сервисы запущены");

    let shutdown = async {
        match signal::ctrl_c().await {
            Ok(()) => info!("Получен сигнал завершения (Ctrl+C)"),
            Err(err) => error!("Ошибка при ожидании сигнала завершения: {}", err),
        }
    };
    supervise(source_handle, bridge_handle, shutdown).await?;

    info!("AHK Active Window завершил работу");
    Ok(())
}

/// Ждёт Ctrl+C либо остановки любого из сервисов, затем останавливает оба.
/// Остановка сервиса раньше сигнала завершения считается ошибкой.
async fn supervise<F>(
    mut source_handle: JoinHandle<error::Result<()>>,
    mut bridge_handle: JoinHandle<error::Result<()>>,
    shutdown: F,
) -> Result<()>
where
    F: Future<Output = ()>,
{
    let mut source_done = false;
    let mut bridge_done = false;

    let outcome = tokio::select! {
        // Ошибка источника первична: мост после неё лишь видит закрытый канал
        biased;
        result = &mut source_handle => {
            source_done = true;
            service_exit("источник окон", result)
        }
        result = &mut bridge_handle => {
            bridge_done = true;
            service_exit("мост активного окна", result)
        }
        () = shutdown => Ok(()),
    };

    info!("Завершение работы...");

    source_handle.abort();
    bridge_handle.abort();

    // Ожидаем завершения задач (с таймаутом)
    let shutdown_timeout = tokio::time::Duration::from_secs(5);
    let shutdown_result = tokio::time::timeout(shutdown_timeout, async {
        if !source_done {
            let _ = source_handle.await;
        }
        if !bridge_done {
            let _ = bridge_handle.await;
        }
    })
    .await;

    match shutdown_result {
        Ok(_) => info!("Все сервисы завершили работу корректно"),
        Err(_) => warn!("Таймаут при завершении сервисов"),
    }

    outcome
}

fn service_exit(
    name: &str,
    result: std::result::Result<error::Result<()>, JoinError>,
) -> Result<()> {
    match result {
        Ok(Ok(())) => {
            error!("Сервис {} остановился до сигнала завершения", name);
            Err(anyhow!("сервис {} остановился до сигнала завершения", name))
        }
        Ok(Err(e)) => {
            error!("Ошибка в сервисе {}: {}", name, e);
            Err(anyhow::Error::new(e).context(format!("сервис {} остановлен с ошибкой", name)))
        }
        Err(e) => {
            error!("Сервис {} аварийно завершился: {}", name, e);
            Err(anyhow!("сервис {} аварийно завершился: {}", name, e))
        }
    }
}

async fn run_listener(config: Config) -> Result<()> {
    let listener = SignalListener::new(config.bus);

    tokio::select! {
        result = listener.run() => {
            if let Err(e) = result {
                error!("Ошибка в слушателе сигналов: {}", e);
            }
        }
        _ = signal::ctrl_c() => {
            info!("Получен сигнал завершения (Ctrl+C)");
        }
    }

    Ok(())
}

fn init_tracing(level: &str, format: &str) -> Result<()> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))?;

    let registry = tracing_subscriber::registry().with(filter);

    match format {
        "full" => registry.with(tracing_subscriber::fmt::layer()).init(),
        _ => registry
            .with(tracing_subscriber::fmt::layer().compact())
            .init(),
    }

    Ok(())
}
