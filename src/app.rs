use sqlx::PgPool;
use tokio::task::JoinHandle;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::api::{cors_layer, create_router, AppState};
use crate::carbon::EmissionFactors;
use crate::config::Config;
use crate::db::{FactorRepository, PanchayatRepository, UsageRepository, UserRepository};
use crate::forecast::{Forecaster, GeminiClient};
use crate::services::{
    AnalyticsService, AuthService, FactorService, JwtKeys, PanchayatService, UsageService,
    UserService,
};

/// Running application: the HTTP server task.
pub struct Application {
    pub server_handle: JoinHandle<Result<(), std::io::Error>>,
}

impl Application {
    /// Build the application state from `config` and start serving.
    ///
    /// The active emission factors are loaded (or created from defaults) before the
    /// server accepts requests.
    pub async fn build(config: Config, pool: PgPool) -> Result<Self, Box<dyn std::error::Error>> {
        info!("Initializing application components");

        let state = build_state(&config, pool).await?;
        let app = create_router(state)
            .layer(cors_layer(&config.cors_allowed_origins))
            .layer(TraceLayer::new_for_http());

        let addr = config.server_addr();
        info!("Starting HTTP server on {}", addr);

        let server_handle = tokio::spawn(async move {
            let listener = tokio::net::TcpListener::bind(&addr).await?;
            axum::serve(listener, app).await
        });

        info!("Application initialized successfully");

        Ok(Self { server_handle })
    }

    pub async fn run_until_stopped(self) -> Result<(), Box<dyn std::error::Error>> {
        self.server_handle.await??;
        Ok(())
    }
}

/// Wires repositories, services and the forecast client into the router state.
pub async fn build_state(
    config: &Config,
    pool: PgPool,
) -> Result<AppState, Box<dyn std::error::Error>> {
    // Create repositories
    let user_repo = UserRepository::new(pool.clone());
    let panchayat_repo = PanchayatRepository::new(pool.clone());
    let usage_repo = UsageRepository::new(pool.clone());
    let factor_repo = FactorRepository::new(pool);

    let factor_service = FactorService::load(factor_repo, &EmissionFactors::default()).await?;

    let gemini = GeminiClient::new(
        config.gemini_api_url.clone(),
        config.gemini_model.clone(),
        config.gemini_api_key.clone(),
        config.forecast_timeout(),
    )?;
    if !gemini.is_configured() {
        info!("GEMINI_API_KEY not set; predictions will report the service as not configured");
    }

    let keys = JwtKeys::new(&config.jwt_secret, config.access_token_ttl());

    Ok(AppState {
        auth_service: AuthService::new(user_repo.clone(), keys),
        user_service: UserService::new(user_repo),
        panchayat_service: PanchayatService::new(panchayat_repo),
        usage_service: UsageService::new(usage_repo.clone()),
        analytics_service: AnalyticsService::new(usage_repo, factor_service.clone()),
        factor_service,
        forecaster: Forecaster::new(gemini),
    })
}
