//! Shared fixtures for the RankGraph integration tests.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rankgraph_core::{BanditConfig, BanditRecord, GraphBandit, RankError, SimilarityScorer};
use rankgraph_profile::Profile;

/// Role asking for Python and CUDA.
pub fn ml_role() -> Profile {
    Profile::new("ml-engineer").with_skills(["Python", "CUDA"])
}

/// A strong candidate (Python/CUDA/PyTorch) and a weak one (JavaScript).
pub fn ml_candidates() -> Vec<Profile> {
    vec![
        Profile::new("cand-0").with_skills(["Python", "CUDA", "PyTorch"]),
        Profile::new("cand-1").with_skills(["JavaScript"]),
    ]
}

/// Seeded bandit with the default configuration.
pub fn seeded_bandit(seed: u64) -> GraphBandit {
    seeded_bandit_with(BanditConfig::default(), seed)
}

pub fn seeded_bandit_with(config: BanditConfig, seed: u64) -> GraphBandit {
    match GraphBandit::with_seed(config, SimilarityScorer::default(), seed) {
        Ok(bandit) => bandit,
        Err(e) => panic!("invalid test bandit config: {}", e),
    }
}

/// Outcome of a simulated run.
#[derive(Debug, Clone, Default)]
pub struct RunStats {
    pub pulls: Vec<usize>,
    pub successes: usize,
}

/// Runs `rounds` select/update cycles with Bernoulli rewards at `rates`.
///
/// Rewards come from their own RNG seeded with `reward_seed`, so runs with
/// the same seeds are identical.
pub fn simulate(
    bandit: &mut GraphBandit,
    rates: &[f64],
    rounds: usize,
    reward_seed: u64,
) -> Result<RunStats, RankError> {
    let mut env = StdRng::seed_from_u64(reward_seed);
    let mut stats = RunStats {
        pulls: vec![0; bandit.num_arms()],
        successes: 0,
    };
    for _ in 0..rounds {
        let arm = bandit.select_candidate()?;
        let reward = if env.gen_bool(rates[arm]) { 1.0 } else { 0.0 };
        bandit.update(arm, reward)?;
        stats.pulls[arm] += 1;
        if reward > 0.0 {
            stats.successes += 1;
        }
    }
    Ok(stats)
}

pub fn assert_close(actual: f64, expected: f64, tol: f64, label: &str) {
    assert!(
        (actual - expected).abs() <= tol,
        "{} mismatch: expected {:.15}, got {:.15}, diff={:.3e}",
        label,
        expected,
        actual,
        (actual - expected).abs()
    );
}

/// Asserts two records match within 1e-6 per parameter.
pub fn assert_records_close(actual: &BanditRecord, expected: &BanditRecord) {
    assert_eq!(actual.num_arms, expected.num_arms, "num_arms");
    assert_eq!(actual.alpha.len(), expected.alpha.len(), "alpha length");
    assert_eq!(actual.beta.len(), expected.beta.len(), "beta length");
    for (i, (a, e)) in actual.alpha.iter().zip(&expected.alpha).enumerate() {
        assert_close(*a, *e, 1e-6, &format!("alpha[{}]", i));
    }
    for (i, (a, e)) in actual.beta.iter().zip(&expected.beta).enumerate() {
        assert_close(*a, *e, 1e-6, &format!("beta[{}]", i));
    }
    assert_close(actual.lambda_fg, expected.lambda_fg, 1e-12, "lambda_fg");
    assert_close(actual.b, expected.b, 1e-12, "b");
}
