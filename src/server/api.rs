use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::{ConfigError, EngineConfig};
use crate::data::difficulty::{DifficultyProfile, DifficultyRegistry};
use crate::optimizer::probability::{estimate, EstimateMethod};
use crate::optimizer::ranking::{round_percent, FailureReport, OptimizationReport};
use crate::optimizer::{optimize_scenario, OptimizationScenario, TargetWindow};

const MAX_TOTAL_DICE: u32 = 20;
const MAX_REQUIRED_RESERVED: u32 = 10;
const MAX_PROBABILITY_DICE: u32 = 100;
const MAX_TRIALS: u32 = 1_000_000;

/// Config and difficulty table shared by every request. Built once at startup.
#[derive(Debug, Clone)]
pub struct ApiContext {
    pub config: EngineConfig,
    pub registry: DifficultyRegistry,
}

impl Default for ApiContext {
    fn default() -> Self {
        Self {
            config: EngineConfig::default(),
            registry: DifficultyRegistry::builtin().clone(),
        }
    }
}

impl ApiContext {
    pub fn from_config(config: EngineConfig) -> Result<Self, ConfigError> {
        let registry = config.registry()?;
        Ok(Self { config, registry })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct OptimizeRequest {
    pub total_dice: u32,
    pub difficulty: String,
    pub required_reserved: u32,
    pub hazard_die: Option<bool>,
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProbabilityRequest {
    pub dice: u32,
    pub min: u32,
    pub max: u32,
    pub hazard_die: Option<bool>,
    pub seed: Option<u64>,
    pub trials: Option<u32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProbabilityResponse {
    pub status: &'static str,
    pub dice: u32,
    pub window: [u32; 2],
    pub hazard_die: bool,
    pub probability: f64,
    pub success_percent: f64,
    pub method: EstimateMethod,
    pub seed: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ValidationIssue {
    pub field: &'static str,
    pub messages: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ValidationErrorResponse {
    pub status: &'static str,
    pub message: &'static str,
    pub errors: Vec<ValidationIssue>,
}

#[derive(Debug)]
pub enum PayloadError {
    Parse(serde_json::Error),
    Validation(ValidationErrorResponse),
    /// The search ran but could not produce a split.
    Search(FailureReport),
    Internal(String),
}

impl fmt::Display for PayloadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(err) => write!(f, "{err}"),
            Self::Validation(_) => write!(f, "invalid request"),
            Self::Search(failure) => write!(f, "{}", failure.message),
            Self::Internal(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for PayloadError {}

pub fn health_payload() -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&serde_json::json!({
        "status": "ok",
        "service": "psi-optimizer-api",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

pub fn difficulties_payload(ctx: &ApiContext) -> Result<String, serde_json::Error> {
    let list: Vec<&DifficultyProfile> = ctx.registry.profiles().iter().collect();
    serde_json::to_string_pretty(&serde_json::json!({ "difficulties": list }))
}

pub fn optimize_payload(ctx: &ApiContext, body: &str) -> Result<String, PayloadError> {
    let request: OptimizeRequest = serde_json::from_str(body).map_err(PayloadError::Parse)?;
    validate_optimize_request(&request)?;
    let seed = resolve_seed(ctx, request.seed)?;
    let hazard_die = request.hazard_die.unwrap_or(false);

    let scenario = OptimizationScenario {
        total_dice: request.total_dice,
        difficulty: &request.difficulty,
        required_reserved: request.required_reserved,
        options: ctx.config.search_options(hazard_die, seed),
    };
    match optimize_scenario(&ctx.registry, &scenario) {
        report @ OptimizationReport::Ok(_) => {
            serde_json::to_string_pretty(&report).map_err(PayloadError::Parse)
        }
        OptimizationReport::Error(failure) => Err(PayloadError::Search(failure)),
    }
}

pub fn probability_payload(ctx: &ApiContext, body: &str) -> Result<String, PayloadError> {
    let request: ProbabilityRequest = serde_json::from_str(body).map_err(PayloadError::Parse)?;
    validate_probability_request(&request)?;
    let seed = resolve_seed(ctx, request.seed)?;
    let hazard_die = request.hazard_die.unwrap_or(false);

    let mut config = ctx.config.probability.with_seed(seed);
    if let Some(trials) = request.trials {
        config.fair_trials = trials;
        config.hazard_trials = trials;
    }
    let window = TargetWindow::new(request.min, request.max);
    let result = estimate(request.dice, window, hazard_die, &config);

    let response = ProbabilityResponse {
        status: "ok",
        dice: request.dice,
        window: window.bounds(),
        hazard_die,
        probability: result.probability,
        success_percent: round_percent(result.probability),
        method: result.method,
        seed,
    };
    serde_json::to_string_pretty(&response).map_err(PayloadError::Parse)
}

fn resolve_seed(ctx: &ApiContext, explicit: Option<u64>) -> Result<u64, PayloadError> {
    ctx.config
        .resolve_seed(explicit)
        .map_err(|err| PayloadError::Internal(err.to_string()))
}

fn range_issue(field: &'static str, value: u32, lo: u32, hi: u32) -> Option<ValidationIssue> {
    (!(lo..=hi).contains(&value)).then(|| ValidationIssue {
        field,
        messages: vec![format!("must be between {lo} and {hi}")],
    })
}

fn into_validation(errors: Vec<ValidationIssue>) -> Result<(), PayloadError> {
    if errors.is_empty() {
        return Ok(());
    }
    Err(PayloadError::Validation(ValidationErrorResponse {
        status: "error",
        message: "Validation failed",
        errors,
    }))
}

fn validate_optimize_request(request: &OptimizeRequest) -> Result<(), PayloadError> {
    let mut errors: Vec<ValidationIssue> = Vec::new();

    errors.extend(range_issue("total_dice", request.total_dice, 1, MAX_TOTAL_DICE));
    errors.extend(range_issue(
        "required_reserved",
        request.required_reserved,
        1,
        MAX_REQUIRED_RESERVED,
    ));
    if request.difficulty.trim().is_empty() {
        errors.push(ValidationIssue {
            field: "difficulty",
            messages: vec!["must not be empty".to_string()],
        });
    }

    into_validation(errors)
}

fn validate_probability_request(request: &ProbabilityRequest) -> Result<(), PayloadError> {
    let mut errors: Vec<ValidationIssue> = Vec::new();

    errors.extend(range_issue("dice", request.dice, 1, MAX_PROBABILITY_DICE));
    if request.min < 1 || request.min > request.max {
        errors.push(ValidationIssue {
            field: "min",
            messages: vec!["must be at least 1 and not above max".to_string()],
        });
    }
    if let Some(trials) = request.trials {
        errors.extend(range_issue("trials", trials, 1, MAX_TRIALS));
    }

    into_validation(errors)
}
