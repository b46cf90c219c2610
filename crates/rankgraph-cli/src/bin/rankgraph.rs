//! RankGraph CLI - score candidates against a role and simulate the bandit
//!
//! Usage:
//!   rankgraph score --role role.json --candidates candidates.json
//!   rankgraph simulate --role role.json --candidates candidates.json --rates 0.8,0.2
//!   rankgraph inspect snapshot.json

use std::path::{Path, PathBuf};
use std::process;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use serde_json::json;

use rankgraph_core::engine::snapshot::Snapshot;
use rankgraph_core::metrics::SimilarityBreakdown;
use rankgraph_core::{
    load_snapshot_json, parse_inputs, save_snapshot_json, BanditConfig, BetaPosterior,
    EntityWeights, GraphBandit, SimilarityConfig, SimilarityScorer,
};
use rankgraph_profile::{role_warnings, Profile};

#[derive(Parser)]
#[command(name = "rankgraph")]
#[command(version)]
#[command(about = "RankGraph - graph-warm-started candidate ranking CLI")]
#[command(
    long_about = "Score candidates against a role by entity-graph similarity and run a warm-started Thompson Sampling bandit"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print each candidate's similarity and warm-start prior
    Score {
        #[command(flatten)]
        inputs: Inputs,

        /// Output format
        #[arg(short, long, value_enum, default_value = "summary")]
        output: Output,
    },

    /// Run select -> simulated reward -> update rounds
    Simulate {
        #[command(flatten)]
        inputs: Inputs,

        /// Success probability per candidate, comma separated
        #[arg(long, value_delimiter = ',', required = true)]
        rates: Vec<f64>,

        /// Number of rounds
        #[arg(long, default_value_t = 100)]
        rounds: usize,

        /// RNG seed for reproducible runs
        #[arg(long)]
        seed: Option<u64>,

        /// Write the final state as a JSON snapshot
        #[arg(long, value_name = "FILE")]
        snapshot: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "summary")]
        output: Output,
    },

    /// Load, validate, and print a JSON snapshot
    Inspect {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
}

#[derive(clap::Args)]
struct Inputs {
    /// Role profile (JSON object)
    #[arg(long, value_name = "FILE")]
    role: PathBuf,

    /// Candidate profiles (JSON array, object, or {"candidates": [...]})
    #[arg(long, value_name = "FILE")]
    candidates: PathBuf,

    /// TOML file with [bandit], [similarity], and [weights] tables
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
enum Output {
    Summary,
    Json,
}

/// Settings loaded from `--config`. Every table and key is optional.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct Settings {
    bandit: BanditConfig,
    similarity: SimilarityConfig,
    weights: EntityWeights,
}

impl Settings {
    fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config '{}'", path.display()))?;
        Self::parse(&text).with_context(|| format!("parsing config '{}'", path.display()))
    }

    fn parse(text: &str) -> Result<Self> {
        let settings: Settings = toml::from_str(text)?;
        settings.bandit.validate()?;
        settings.similarity.validate()?;
        settings.weights.validate()?;
        Ok(settings)
    }

    fn scorer(&self) -> Result<SimilarityScorer> {
        Ok(SimilarityScorer::default()
            .with_config(self.similarity)?
            .with_weights(self.weights)?)
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rankgraph=info,rankgraph_core=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(Cli::parse()) {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Score { inputs, output } => score(&inputs, output),
        Command::Simulate {
            inputs,
            rates,
            rounds,
            seed,
            snapshot,
            output,
        } => simulate(&inputs, &rates, rounds, seed, snapshot.as_deref(), output),
        Command::Inspect { file } => inspect(&file),
    }
}

fn load_inputs(inputs: &Inputs) -> Result<(Profile, Vec<Profile>)> {
    let role_json = std::fs::read_to_string(&inputs.role)
        .with_context(|| format!("reading role '{}'", inputs.role.display()))?;
    let candidates_json = std::fs::read_to_string(&inputs.candidates)
        .with_context(|| format!("reading candidates '{}'", inputs.candidates.display()))?;
    let (role, candidates) = parse_inputs(&role_json, &candidates_json)?;
    if candidates.is_empty() {
        bail!("no candidates in '{}'", inputs.candidates.display());
    }
    for warning in role_warnings(&role) {
        tracing::warn!("{}", warning);
    }
    Ok((role, candidates))
}

fn label(profile: &Profile, idx: usize) -> String {
    profile
        .id()
        .map(str::to_string)
        .unwrap_or_else(|| format!("#{}", idx))
}

/// Similarity breakdown and warm-start prior per candidate, in input order.
fn score_rows(
    settings: &Settings,
    role: &Profile,
    candidates: &[Profile],
) -> Result<Vec<(String, SimilarityBreakdown, BetaPosterior)>> {
    let scorer = settings.scorer()?;
    candidates
        .iter()
        .enumerate()
        .map(|(idx, candidate)| -> Result<_> {
            let breakdown = scorer.breakdown_profile(candidate, role)?;
            let prior =
                BetaPosterior::from_similarity(breakdown.score, settings.bandit.prior_scale);
            Ok((label(candidate, idx), breakdown, prior))
        })
        .collect()
}

fn score(inputs: &Inputs, output: Output) -> Result<()> {
    let settings = Settings::load(inputs.config.as_deref())?;
    let (role, candidates) = load_inputs(inputs)?;
    let rows = score_rows(&settings, &role, &candidates)?;

    match output {
        Output::Json => {
            let out: Vec<_> = rows
                .iter()
                .map(|(id, breakdown, prior)| {
                    json!({
                        "candidate": id,
                        "similarity": breakdown.score,
                        "categories": breakdown.categories,
                        "prior": { "alpha": prior.alpha, "beta": prior.beta },
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        Output::Summary => {
            println!("Role '{}' ({} candidates)\n", label(&role, 0), rows.len());
            for (id, breakdown, prior) in &rows {
                println!(
                    "  {}: similarity {:.4}  prior Beta({:.3}, {:.3})",
                    id, breakdown.score, prior.alpha, prior.beta
                );
                for c in breakdown.contributing() {
                    println!(
                        "      {:<10} {:.4}  ({} vs {} entities, weight {:.3})",
                        c.category.as_str(),
                        c.similarity.unwrap_or_default(),
                        c.candidate_entities,
                        c.role_entities,
                        c.weight
                    );
                }
            }
        }
    }
    Ok(())
}

fn simulate(
    inputs: &Inputs,
    rates: &[f64],
    rounds: usize,
    seed: Option<u64>,
    snapshot: Option<&Path>,
    output: Output,
) -> Result<()> {
    let settings = Settings::load(inputs.config.as_deref())?;
    let (role, candidates) = load_inputs(inputs)?;
    if rates.len() != candidates.len() {
        bail!(
            "{} rates given for {} candidates",
            rates.len(),
            candidates.len()
        );
    }
    if let Some(bad) = rates.iter().find(|r| !(0.0..=1.0).contains(*r)) {
        bail!("rate {} is outside [0, 1]", bad);
    }

    let scorer = settings.scorer()?;
    let (mut bandit, mut env_rng) = match seed {
        Some(seed) => (
            GraphBandit::with_seed(settings.bandit, scorer, seed)?,
            StdRng::seed_from_u64(seed.wrapping_add(1)),
        ),
        None => (
            GraphBandit::new(settings.bandit, scorer)?,
            StdRng::from_entropy(),
        ),
    };
    bandit.initialize_from_graph(&candidates, &role)?;

    let mut pulls = vec![0usize; candidates.len()];
    let mut successes = 0usize;
    for _ in 0..rounds {
        let arm = bandit.select_candidate()?;
        let reward = if env_rng.gen_bool(rates[arm]) { 1.0 } else { 0.0 };
        bandit.update(arm, reward)?;
        pulls[arm] += 1;
        if reward > 0.0 {
            successes += 1;
        }
    }
    tracing::info!(rounds, successes, "simulation finished");

    if let Some(path) = snapshot {
        let snap = Snapshot::capture(&bandit, role.id().map(str::to_string));
        std::fs::write(path, save_snapshot_json(&snap)?)
            .with_context(|| format!("writing snapshot '{}'", path.display()))?;
    }

    let ranking = bandit.ranking();
    match output {
        Output::Json => {
            let arms: Vec<_> = ranking
                .iter()
                .map(|&i| {
                    json!({
                        "candidate": label(&candidates[i], i),
                        "pulls": pulls[i],
                        "similarity": bandit.similarities().get(i),
                        "alpha": bandit.alpha(i),
                        "beta": bandit.beta(i),
                        "posterior_mean": bandit.posterior_mean(i),
                    })
                })
                .collect();
            let out = json!({ "rounds": rounds, "successes": successes, "ranking": arms });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        Output::Summary => {
            println!("{} rounds, {} successes\n", rounds, successes);
            println!("Ranking by posterior mean:");
            for (rank, &i) in ranking.iter().enumerate() {
                println!(
                    "  {}. {}  mean {:.4}  pulls {}  Beta({:.2}, {:.2})",
                    rank + 1,
                    label(&candidates[i], i),
                    bandit.posterior_mean(i).unwrap_or_default(),
                    pulls[i],
                    bandit.alpha(i).unwrap_or_default(),
                    bandit.beta(i).unwrap_or_default(),
                );
            }
            if let Some(path) = snapshot {
                println!("\nSnapshot written to {}", path.display());
            }
        }
    }
    Ok(())
}

fn inspect(file: &Path) -> Result<()> {
    let json = std::fs::read_to_string(file)
        .with_context(|| format!("reading snapshot '{}'", file.display()))?;
    let snapshot = load_snapshot_json(&json)?;
    let record = &snapshot.record;

    println!("✓ Snapshot valid");
    println!("  version:   {}", snapshot.metadata.version);
    println!(
        "  role:      {}",
        snapshot.metadata.role_id.as_deref().unwrap_or("-")
    );
    println!("  arms:      {}", record.num_arms);
    println!("  lambda_fg: {}", record.lambda_fg);
    println!("  b:         {}", record.b);
    for (i, arm) in record.arms().enumerate() {
        println!(
            "    [{}] Beta({:.3}, {:.3})  mean {:.4}",
            i,
            arm.alpha,
            arm.beta,
            arm.mean()
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_defaults() {
        let s = Settings::parse("").unwrap();
        assert_eq!(s.bandit, BanditConfig::default());
        assert_eq!(s.similarity, SimilarityConfig::default());
    }

    #[test]
    fn partial_tables_keep_other_defaults() {
        let s = Settings::parse(
            r#"
            [bandit]
            lambda_fg = 0.05
            decay = 0.9

            [weights]
            skills = 0.6
            experience = 0.3
            education = 0.1
            "#,
        )
        .unwrap();
        assert_eq!(s.bandit.lambda_fg, 0.05);
        assert_eq!(s.bandit.b, 1000.0);
        assert_eq!(s.bandit.decay, Some(0.9));
        assert_eq!(s.weights.skills, 0.6);
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(Settings::parse("[similarity]\np = 0").is_err());
        assert!(Settings::parse("[bandit]\nb = -1.0").is_err());
        assert!(Settings::parse("[unknown]\nx = 1").is_err());
    }

    #[test]
    fn score_priors_match_bandit_warm_start() {
        let settings = Settings::parse("[bandit]\nprior_scale = 4.0").unwrap();
        let role = Profile::new("ml").with_skills(["Python", "CUDA"]);
        let candidates = vec![
            Profile::new("a").with_skills(["Python", "CUDA", "PyTorch"]),
            Profile::new("b").with_skills(["JavaScript"]),
        ];
        let rows = score_rows(&settings, &role, &candidates).unwrap();

        let mut bandit =
            GraphBandit::with_seed(settings.bandit, settings.scorer().unwrap(), 1).unwrap();
        bandit.initialize_from_graph(&candidates, &role).unwrap();
        for (idx, (_, breakdown, prior)) in rows.iter().enumerate() {
            assert!((breakdown.score - bandit.similarities()[idx]).abs() < 1e-12);
            assert!((prior.alpha - bandit.alpha(idx).unwrap()).abs() < 1e-12);
            assert!((prior.beta - bandit.beta(idx).unwrap()).abs() < 1e-12);
        }
    }
}
