use investment_advisor::{
    api::start_server, config::Settings, engine::RecommendationEngine, predictor::LinearModel,
};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Load environment variables
    dotenv::dotenv().ok();

    let settings = Settings::from_env()?;

    info!("🚀 Investment Advisor - API Server");
    info!("📍 Port: {}", settings.port);

    let engine = match &settings.model_path {
        Some(path) => match LinearModel::from_json_file(path) {
            Ok(model) => RecommendationEngine::with_model(Arc::new(model), settings.engine.clone()),
            Err(e) => {
                warn!(error = %e, path = %path.display(), "Model could not be loaded - using rule-based allocation");
                RecommendationEngine::rule_based(settings.engine.clone())
            }
        },
        None => {
            info!("ADVISOR_MODEL_PATH not set - using rule-based allocation");
            RecommendationEngine::rule_based(settings.engine.clone())
        }
    };

    info!(predictor = %engine.variant(), "✅ Engine initialized");
    info!("📡 Starting API server...");

    start_server(Arc::new(engine), settings.port).await?;

    Ok(())
}
