use clap::Parser;
use investment_advisor::{
    config::Settings, engine::RecommendationEngine, predictor::LinearModel,
};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Personalized allocation of a monthly surplus
#[derive(Debug, Parser)]
#[command(name = "advisor", version)]
struct Cli {
    /// Monthly income
    #[arg(long)]
    income: f64,

    /// Monthly expenses
    #[arg(long)]
    expenses: f64,

    #[arg(long, default_value_t = 30)]
    age: u32,

    #[arg(long, default_value_t = 0)]
    dependents: u32,

    /// Income stability, 1 (volatile) to 5 (very stable)
    #[arg(long, default_value_t = 3)]
    stability: u32,

    /// Model artifact; overrides ADVISOR_MODEL_PATH
    #[arg(long)]
    model: Option<PathBuf>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    dotenv::dotenv().ok();

    let cli = Cli::parse();

    let settings = match Settings::from_env() {
        Ok(s) => s,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::from(2);
        }
    };

    let engine = match cli.model.or(settings.model_path) {
        Some(path) => match LinearModel::from_json_file(&path) {
            Ok(model) => RecommendationEngine::with_model(Arc::new(model), settings.engine),
            Err(e) => {
                warn!(error = %e, "Model could not be loaded - using rule-based allocation");
                RecommendationEngine::rule_based(settings.engine)
            }
        },
        None => RecommendationEngine::rule_based(settings.engine),
    };

    let profile = serde_json::json!({
        "monthly_income": cli.income,
        "monthly_expenses": cli.expenses,
        "age": cli.age,
        "dependents": cli.dependents,
        "income_stability": cli.stability,
    });

    info!(predictor = %engine.variant(), "Running recommendation");

    match engine.recommend(&profile) {
        Ok(result) => match serde_json::to_string_pretty(&result) {
            Ok(json) => {
                println!("{}", json);
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("{}", e);
                ExitCode::FAILURE
            }
        },
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}
