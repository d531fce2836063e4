//! Main application orchestration.
//!
//! Startup order:
//! 1. REST bootstrap of market, market data, accounts, orders, position,
//!    assets, and liquidity provision into the store
//! 2. Stream tasks (five data-node topics plus the reference ticker)
//! 3. Status server
//! 4. Strategy bootstrap (fatal on error), then the requote loop
//!
//! Shutdown is a single [`CancellationToken`] cancelled on SIGINT/SIGTERM.

use crate::config::AppConfig;
use crate::error::AppResult;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use vmm_core::MarketId;
use vmm_datanode::{bootstrap, run_stream, DataNodeClient, Scope, DATANODE_STREAMS};
use vmm_executor::{DynSubmitter, WalletClient};
use vmm_feed::{subscribe_frame, ReferencePriceFeed, StateStore, StreamHealth, StreamKind, TickerHandler};
use vmm_status::StatusState;
use vmm_strategy::StrategyEngine;
use vmm_ws::{ConnectionConfig, ConnectionManager};

/// How long stream and server tasks get to wind down after cancellation.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// Main application.
pub struct Application {
    config: AppConfig,
    store: Arc<StateStore>,
    reference: Arc<ReferencePriceFeed>,
    health: Arc<StreamHealth>,
    submitter: DynSubmitter,
    shutdown: CancellationToken,
}

impl Application {
    /// Create the application with the wallet service as submitter.
    pub fn new(config: AppConfig) -> AppResult<Self> {
        let wallet = WalletClient::new(
            &config.wallet.url,
            config.wallet.token.clone(),
            config.party_id.clone(),
        )?;
        info!(endpoint = %wallet.endpoint(), "Wallet client configured");
        Ok(Self::with_submitter(config, Arc::new(wallet)))
    }

    /// Create the application around any submitter.
    pub fn with_submitter(config: AppConfig, submitter: DynSubmitter) -> Self {
        Self {
            config,
            store: Arc::new(StateStore::new()),
            reference: Arc::new(ReferencePriceFeed::new()),
            health: Arc::new(StreamHealth::with_streams(&StreamKind::ALL)),
            submitter,
            shutdown: CancellationToken::new(),
        }
    }

    pub fn store(&self) -> Arc<StateStore> {
        self.store.clone()
    }

    pub fn reference(&self) -> Arc<ReferencePriceFeed> {
        self.reference.clone()
    }

    pub fn health(&self) -> Arc<StreamHealth> {
        self.health.clone()
    }

    /// Cancelling this token stops every task and returns from [`run`](Self::run).
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    fn scope(&self) -> Scope {
        Scope {
            party_id: self.config.party_id.clone(),
            market_id: MarketId::new(self.config.market_id.clone()),
        }
    }

    /// Load the initial state over REST.
    pub async fn bootstrap_state(&self) -> AppResult<()> {
        let client = DataNodeClient::new(&self.config.datanode_url)?;
        bootstrap(&client, &self.store, &self.scope()).await?;
        Ok(())
    }

    pub fn strategy_engine(&self) -> StrategyEngine {
        StrategyEngine::new(
            self.config.strategy.clone(),
            MarketId::new(self.config.market_id.clone()),
            self.store.clone(),
            self.reference.clone(),
            self.health.clone(),
            self.submitter.clone(),
        )
    }

    /// Spawn the data-node subscriptions and the reference ticker.
    pub fn spawn_streams(&self, tasks: &mut JoinSet<()>) {
        let template = self.config.connection_template();
        let ws_base = self.config.datanode_ws_base();
        info!(%ws_base, "Starting data node streams");

        for kind in DATANODE_STREAMS {
            let ws_base = ws_base.clone();
            let scope = self.scope();
            let store = self.store.clone();
            let health = self.health.clone();
            let template = template.clone();
            let token = self.shutdown.clone();
            tasks.spawn(async move {
                if let Err(e) = run_stream(kind, &ws_base, scope, store, health, template, token).await
                {
                    error!(stream = %kind, error = %e, "Stream stopped");
                }
            });
        }

        let ticker_config = ConnectionConfig {
            url: self.config.reference_ws_url.clone(),
            handshake: vec![subscribe_frame(&self.config.reference_symbol)],
            ..template
        };
        let handler = Arc::new(TickerHandler::new(
            self.reference.clone(),
            self.health.clone(),
        ));
        let manager = ConnectionManager::new(
            StreamKind::ReferencePrice.as_str(),
            ticker_config,
            handler,
            self.shutdown.clone(),
        );
        info!(symbol = %self.config.reference_symbol, "Starting reference price stream");
        tasks.spawn(async move {
            if let Err(e) = manager.connect().await {
                error!(error = %e, "Reference price stream stopped");
            }
        });
    }

    /// Bind the status server and spawn it. Binding errors are fatal.
    async fn spawn_status(&self, tasks: &mut JoinSet<()>) -> AppResult<()> {
        let config = self.config.status.clone();
        if !config.enabled {
            info!("Status server disabled");
            return Ok(());
        }
        let listener = vmm_status::bind(&config).await?;

        let state = StatusState::new(self.store.clone(), self.reference.clone(), self.health.clone());
        let token = self.shutdown.clone();
        tasks.spawn(async move {
            if let Err(e) = vmm_status::serve(listener, state, &config, token).await {
                error!(error = %e, "Status server failed");
            }
        });
        Ok(())
    }

    /// Run until shutdown. Returns early with the error if startup fails.
    pub async fn run(self) -> AppResult<()> {
        tokio::spawn(wait_for_signal(self.shutdown.clone()));

        if let Err(e) = self.bootstrap_state().await {
            self.shutdown.cancel();
            return Err(e);
        }

        let mut tasks = JoinSet::new();
        self.spawn_streams(&mut tasks);
        if let Err(e) = self.spawn_status(&mut tasks).await {
            self.stop(tasks).await;
            return Err(e);
        }

        let engine = self.strategy_engine();
        if let Err(e) = engine.bootstrap().await {
            error!(error = %e, "Strategy bootstrap failed");
            self.stop(tasks).await;
            return Err(e.into());
        }

        engine.run(self.shutdown.clone()).await;
        self.stop(tasks).await;
        info!("Shutdown complete");
        Ok(())
    }

    async fn stop(&self, mut tasks: JoinSet<()>) {
        self.shutdown.cancel();
        let drained = tokio::time::timeout(SHUTDOWN_GRACE, async {
            while tasks.join_next().await.is_some() {}
        })
        .await;
        if drained.is_err() {
            warn!(remaining = tasks.len(), "Tasks did not stop in time, aborting");
            tasks.abort_all();
        }
    }
}

/// Cancel `shutdown` on SIGINT or SIGTERM.
async fn wait_for_signal(shutdown: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Cannot listen for SIGINT");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Cannot listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("SIGINT received"),
        () = terminate => info!("SIGTERM received"),
        () = shutdown.cancelled() => return,
    }
    shutdown.cancel();
}
