//! Long running modes: `watch` and `serve`

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use colored::Colorize;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::actions::fsm::ActionKind;
use crate::app::options::{AppOptions, WatchOptions};
use crate::app::state::{AppState, Dashboard};
use crate::errors::ShipkitError;
use crate::notify::{Level, MemoryNotifier};
use crate::server::serve::serve;
use crate::server::state::ServerState;
use crate::view::confirm::DeleteConfirmation;
use crate::view::list::render;
use crate::workers::list_refresh;

/// Live deployments list until `shutdown_signal` fires
pub async fn run_watch(
    options: AppOptions,
    state: Arc<AppState>,
    notifier: Arc<MemoryNotifier>,
    shutdown_signal: impl Future<Output = ()> + Send + 'static,
) -> Result<(), ShipkitError> {
    info!("Starting watch mode...");

    let (shutdown_tx, _shutdown_rx): (broadcast::Sender<()>, _) = broadcast::channel(1);
    let mut shutdown_manager =
        ShutdownManager::new(shutdown_tx.clone(), options.watch.max_shutdown_delay);
    shutdown_manager.with_app_state(state.clone())?;

    if let Err(e) = init_watch(&options, &state, notifier, &shutdown_tx, &mut shutdown_manager).await {
        error!("Failed to start watch mode: {}", e);
        shutdown_manager.shutdown().await?;
        return Err(e);
    }

    shutdown_signal.await;
    info!("Shutdown signal received, shutting down...");

    drop(shutdown_tx);
    shutdown_manager.shutdown().await
}

/// Serve the config relay until `shutdown_signal` fires
pub async fn run_relay(
    options: AppOptions,
    shutdown_signal: impl Future<Output = ()> + Send + 'static,
) -> Result<(), ShipkitError> {
    let server_state = Arc::new(ServerState::new(&options.relay));
    let handle = serve(&options.server_options(), server_state, shutdown_signal).await?;
    handle
        .await
        .map_err(|e| ShipkitError::ShutdownError(e.to_string()))?
}

// =============================== INITIALIZATION ================================== //

async fn init_watch(
    options: &AppOptions,
    state: &Arc<AppState>,
    notifier: Arc<MemoryNotifier>,
    shutdown_tx: &broadcast::Sender<()>,
    shutdown_manager: &mut ShutdownManager,
) -> Result<(), ShipkitError> {
    init_list_refresh_worker(
        options.watch.list_refresh.clone(),
        state.dashboard.clone(),
        shutdown_manager,
        shutdown_tx.subscribe(),
    )?;

    init_render_worker(
        &options.watch,
        state.dashboard.clone(),
        notifier,
        shutdown_manager,
        shutdown_tx.subscribe(),
    )?;

    init_input_worker(
        state.dashboard.clone(),
        shutdown_manager,
        shutdown_tx.subscribe(),
    )?;

    if options.watch.enable_relay {
        init_relay_server(options, shutdown_manager, shutdown_tx.subscribe()).await?;
    }

    Ok(())
}

fn init_list_refresh_worker(
    options: list_refresh::Options,
    dashboard: Arc<Dashboard>,
    shutdown_manager: &mut ShutdownManager,
    mut shutdown_rx: broadcast::Receiver<()>,
) -> Result<(), ShipkitError> {
    info!("Initializing list refresh worker...");

    let handle = tokio::spawn(async move {
        list_refresh::run(
            &options,
            dashboard.as_ref(),
            tokio::time::sleep,
            Box::pin(async move {
                let _ = shutdown_rx.recv().await;
            }),
        )
        .await;
    });

    shutdown_manager.with_list_refresh_worker_handle(handle)
}

fn init_render_worker(
    options: &WatchOptions,
    dashboard: Arc<Dashboard>,
    notifier: Arc<MemoryNotifier>,
    shutdown_manager: &mut ShutdownManager,
    mut shutdown_rx: broadcast::Receiver<()>,
) -> Result<(), ShipkitError> {
    let interval = options.render_interval;
    let handle = tokio::spawn(async move {
        loop {
            draw(&dashboard, &notifier);
            tokio::select! {
                _ = shutdown_rx.recv() => return,
                _ = tokio::time::sleep(interval) => {}
            }
        }
    });

    shutdown_manager.with_render_worker_handle(handle)
}

/// A line typed on stdin while watching
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchCommand {
    Start(String),
    Stop(String),
    /// Deployment and the typed confirmation
    Delete(String, String),
    Refresh,
}

/// Parse `start <id|name>`, `stop <id|name>`, `delete <id> <name>` or `refresh`.
///
/// Start and stop take the rest of the line as the target, so names may
/// contain spaces. The delete confirmation is kept exactly as typed after
/// the single space that follows the id.
pub fn parse_watch_command(line: &str) -> Option<WatchCommand> {
    let line = line.trim_end_matches(['\r', '\n']).trim_start();
    let (verb, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    match verb {
        "start" | "stop" => {
            let target = rest.trim();
            if target.is_empty() {
                return None;
            }
            let target = target.to_string();
            Some(if verb == "start" {
                WatchCommand::Start(target)
            } else {
                WatchCommand::Stop(target)
            })
        }
        "delete" => {
            let rest = rest.trim_start();
            let (target, typed) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
            if target.is_empty() {
                return None;
            }
            Some(WatchCommand::Delete(target.to_string(), typed.to_string()))
        }
        "refresh" if rest.trim().is_empty() => Some(WatchCommand::Refresh),
        _ => None,
    }
}

fn init_input_worker(
    dashboard: Arc<Dashboard>,
    shutdown_manager: &mut ShutdownManager,
    mut shutdown_rx: broadcast::Receiver<()>,
) -> Result<(), ShipkitError> {
    // stdin reads block; a detached thread does not hold up process exit
    let (line_tx, mut line_rx) = mpsc::unbounded_channel::<String>();
    std::thread::spawn(move || {
        for line in std::io::stdin().lines() {
            match line {
                Ok(line) => {
                    if line_tx.send(line).is_err() {
                        return;
                    }
                }
                Err(e) => {
                    warn!("Failed to read command: {}", e);
                    return;
                }
            }
        }
    });

    let handle = tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = shutdown_rx.recv() => return,
                line = line_rx.recv() => match line {
                    Some(line) => dispatch(&dashboard, &line),
                    None => return,
                },
            }
        }
    });

    shutdown_manager.with_input_worker_handle(handle)
}

/// Run a typed command without blocking the screen
fn dispatch(dashboard: &Arc<Dashboard>, line: &str) {
    let Some(command) = parse_watch_command(line) else {
        debug!("Ignoring unknown command {:?}", line);
        return;
    };

    let resolve = |target: &str| {
        dashboard
            .deployments()
            .into_iter()
            .find(|d| d.id == target || d.name == target)
    };

    let (kind, deployment) = match command {
        WatchCommand::Refresh => {
            let dashboard = dashboard.clone();
            tokio::spawn(async move {
                if dashboard.refresh().await.is_ok() {
                    dashboard.track();
                    dashboard.fetch_all().await;
                }
            });
            return;
        }
        WatchCommand::Start(target) => (ActionKind::Start, resolve(&target)),
        WatchCommand::Stop(target) => (ActionKind::Stop, resolve(&target)),
        WatchCommand::Delete(target, typed) => {
            let deployment = resolve(&target);
            if let Some(deployment) = &deployment {
                let mut confirm = DeleteConfirmation::new(deployment.name.clone());
                confirm.set_input(typed);
                if !confirm.can_confirm() {
                    warn!("{}", confirm.prompt());
                    return;
                }
            }
            (ActionKind::Delete, deployment)
        }
    };

    let Some(deployment) = deployment else {
        warn!("No deployment matches {:?}", line);
        return;
    };
    if dashboard.coordinator().is_loading(kind, &deployment.id) {
        return;
    }

    let dashboard = dashboard.clone();
    tokio::spawn(async move {
        if dashboard.act(kind, &deployment.id).await.is_ok() {
            dashboard.track();
        }
    });
}

fn draw(dashboard: &Dashboard, notifier: &MemoryNotifier) {
    // clear screen, cursor home
    print!("\x1b[2J\x1b[H");
    println!("{}", "Shipkit deployments (Ctrl-C to exit)".bold());
    println!(
        "{}\n",
        "commands: start <name> | stop <name> | delete <id> <name> | refresh".dimmed()
    );
    print!("{}", render(&dashboard.view()));
    if let Some(latest) = notifier.latest() {
        let line = match latest.level {
            Level::Success => latest.message.green(),
            Level::Error => latest.message.red(),
        };
        println!("\n{}", line);
    }
}

async fn init_relay_server(
    options: &AppOptions,
    shutdown_manager: &mut ShutdownManager,
    mut shutdown_rx: broadcast::Receiver<()>,
) -> Result<(), ShipkitError> {
    info!("Initializing config relay...");

    let server_state = Arc::new(ServerState::new(&options.relay));
    let handle = serve(&options.server_options(), server_state, async move {
        let _ = shutdown_rx.recv().await;
    })
    .await?;

    shutdown_manager.with_relay_server_handle(handle)
}

// ================================= SHUTDOWN ===================================== //

struct ShutdownManager {
    shutdown_tx: broadcast::Sender<()>,
    max_shutdown_delay: Duration,
    app_state: Option<Arc<AppState>>,
    list_refresh_worker_handle: Option<JoinHandle<()>>,
    render_worker_handle: Option<JoinHandle<()>>,
    input_worker_handle: Option<JoinHandle<()>>,
    relay_server_handle: Option<JoinHandle<Result<(), ShipkitError>>>,
}

impl ShutdownManager {
    pub fn new(shutdown_tx: broadcast::Sender<()>, max_shutdown_delay: Duration) -> Self {
        Self {
            shutdown_tx,
            max_shutdown_delay,
            app_state: None,
            list_refresh_worker_handle: None,
            render_worker_handle: None,
            input_worker_handle: None,
            relay_server_handle: None,
        }
    }

    pub fn with_app_state(&mut self, state: Arc<AppState>) -> Result<(), ShipkitError> {
        if self.app_state.is_some() {
            return Err(ShipkitError::ShutdownError("app_state already set".to_string()));
        }
        self.app_state = Some(state);
        Ok(())
    }

    pub fn with_list_refresh_worker_handle(
        &mut self,
        handle: JoinHandle<()>,
    ) -> Result<(), ShipkitError> {
        if self.list_refresh_worker_handle.is_some() {
            return Err(ShipkitError::ShutdownError(
                "list_refresh_handle already set".to_string(),
            ));
        }
        self.list_refresh_worker_handle = Some(handle);
        Ok(())
    }

    pub fn with_render_worker_handle(&mut self, handle: JoinHandle<()>) -> Result<(), ShipkitError> {
        if self.render_worker_handle.is_some() {
            return Err(ShipkitError::ShutdownError("render_handle already set".to_string()));
        }
        self.render_worker_handle = Some(handle);
        Ok(())
    }

    pub fn with_input_worker_handle(&mut self, handle: JoinHandle<()>) -> Result<(), ShipkitError> {
        if self.input_worker_handle.is_some() {
            return Err(ShipkitError::ShutdownError("input_handle already set".to_string()));
        }
        self.input_worker_handle = Some(handle);
        Ok(())
    }

    pub fn with_relay_server_handle(
        &mut self,
        handle: JoinHandle<Result<(), ShipkitError>>,
    ) -> Result<(), ShipkitError> {
        if self.relay_server_handle.is_some() {
            return Err(ShipkitError::ShutdownError("server_handle already set".to_string()));
        }
        self.relay_server_handle = Some(handle);
        Ok(())
    }

    pub async fn shutdown(&mut self) -> Result<(), ShipkitError> {
        let _ = self.shutdown_tx.send(());

        match tokio::time::timeout(self.max_shutdown_delay, self.shutdown_impl()).await {
            Ok(result) => result,
            Err(_) => {
                error!(
                    "Shutdown timed out after {:?}, forcing shutdown...",
                    self.max_shutdown_delay
                );
                std::process::exit(1);
            }
        }
    }

    async fn shutdown_impl(&mut self) -> Result<(), ShipkitError> {
        info!("Shutting down Shipkit console...");

        // 1. List refresh worker
        if let Some(handle) = self.list_refresh_worker_handle.take() {
            handle.await.map_err(|e| ShipkitError::ShutdownError(e.to_string()))?;
        }

        // 2. Render worker
        if let Some(handle) = self.render_worker_handle.take() {
            handle.await.map_err(|e| ShipkitError::ShutdownError(e.to_string()))?;
        }

        // 3. Input worker
        if let Some(handle) = self.input_worker_handle.take() {
            handle.await.map_err(|e| ShipkitError::ShutdownError(e.to_string()))?;
        }

        // 4. Relay server
        if let Some(handle) = self.relay_server_handle.take() {
            handle.await.map_err(|e| ShipkitError::ShutdownError(e.to_string()))??;
        }

        // 5. App state, stops the poller
        if let Some(state) = self.app_state.take() {
            state.shutdown().await?;
        }

        info!("Shutdown complete");
        Ok(())
    }
}
