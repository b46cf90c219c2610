//! Graph-warm-started Thompson Sampling bandit.
//!
//! Each candidate is an arm with a Beta posterior over its success rate.
//! Warm start sets the priors from the candidate's graph similarity `s` to
//! the role:
//!
//! ```text
//! alpha = 1 + scale * s
//! beta  = 1 + scale * (1 - s)
//! ```
//!
//! Selection draws one sample per arm, adds a bounded feel-good bonus
//! `lambda_fg * min(b, mean)`, and returns the highest-scoring arm (lowest
//! index among ties). Updates are conjugate Beta-Bernoulli: a positive reward
//! increments `alpha`, anything else increments `beta`.
//!
//! ## Lifecycle
//!
//! A bandit with zero arms is uninitialized; `select_candidate` and `update`
//! fail until `initialize_from_graph` (or `initialize_with_priors`) succeeds.
//! Re-initializing replaces all arm state.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Beta, Distribution};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use rankgraph_profile::{validate_profiles, Profile};

use crate::engine::builder::{build_candidate_graph, build_role_graph};
use crate::engine::errors::RankError;
use crate::metrics::SimilarityScorer;

/// Minimum Beta parameter value after decay.
///
/// Beta requires α > 0 and β > 0 strictly; decay never shrinks a parameter
/// below this floor.
pub const MIN_BETA_PARAM: f64 = 0.01;

/// Default feel-good exploration weight.
pub const DEFAULT_LAMBDA_FG: f64 = 0.01;

/// Default cap on the feel-good term.
pub const DEFAULT_B: f64 = 1000.0;

/// Default pseudo-count mass given to the similarity prior.
pub const DEFAULT_PRIOR_SCALE: f64 = 10.0;

/// Beta posterior over one arm's success probability.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BetaPosterior {
    /// Pseudo-count of successes
    pub alpha: f64,
    /// Pseudo-count of failures
    pub beta: f64,
}

impl Default for BetaPosterior {
    fn default() -> Self {
        Self {
            alpha: 1.0,
            beta: 1.0,
        }
    }
}

impl BetaPosterior {
    /// Prior centered on a similarity score.
    pub fn from_similarity(similarity: f64, scale: f64) -> Self {
        Self {
            alpha: 1.0 + scale * similarity,
            beta: 1.0 + scale * (1.0 - similarity),
        }
    }

    /// Conjugate Beta-Bernoulli update.
    pub fn observe(&mut self, success: bool) {
        if success {
            self.alpha += 1.0;
        } else {
            self.beta += 1.0;
        }
    }

    /// Multiplies both parameters by `factor`, floored at [`MIN_BETA_PARAM`].
    pub fn decay(&mut self, factor: f64) {
        self.alpha = (self.alpha * factor).max(MIN_BETA_PARAM);
        self.beta = (self.beta * factor).max(MIN_BETA_PARAM);
    }

    /// Posterior mean α / (α + β).
    pub fn mean(&self) -> f64 {
        self.alpha / (self.alpha + self.beta)
    }

    pub fn variance(&self) -> f64 {
        let sum = self.alpha + self.beta;
        (self.alpha * self.beta) / (sum * sum * (sum + 1.0))
    }

    pub fn is_valid(&self) -> bool {
        self.alpha.is_finite() && self.beta.is_finite() && self.alpha > 0.0 && self.beta > 0.0
    }

    /// Draws one success probability from the posterior.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<f64, RankError> {
        let dist = Beta::new(self.alpha, self.beta).map_err(|e| {
            RankError::Numerical(format!(
                "cannot sample Beta({}, {}): {}",
                self.alpha, self.beta, e
            ))
        })?;
        Ok(dist.sample(rng))
    }
}

/// Tunable bandit parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BanditConfig {
    /// Weight of the feel-good exploration bonus
    pub lambda_fg: f64,
    /// Cap inside the feel-good bonus
    pub b: f64,
    /// Pseudo-count mass of the warm-start prior
    pub prior_scale: f64,
    /// Optional recency factor in (0, 1] applied before each update
    pub decay: Option<f64>,
}

impl Default for BanditConfig {
    fn default() -> Self {
        Self {
            lambda_fg: DEFAULT_LAMBDA_FG,
            b: DEFAULT_B,
            prior_scale: DEFAULT_PRIOR_SCALE,
            decay: None,
        }
    }
}

impl BanditConfig {
    pub fn validate(&self) -> Result<(), RankError> {
        if !self.lambda_fg.is_finite() || self.lambda_fg < 0.0 {
            return Err(RankError::InvalidArgument(format!(
                "lambda_fg must be finite and non-negative, got {}",
                self.lambda_fg
            )));
        }
        if !self.b.is_finite() || self.b <= 0.0 {
            return Err(RankError::InvalidArgument(format!(
                "b must be finite and positive, got {}",
                self.b
            )));
        }
        if !self.prior_scale.is_finite() || self.prior_scale < 0.0 {
            return Err(RankError::InvalidArgument(format!(
                "prior_scale must be finite and non-negative, got {}",
                self.prior_scale
            )));
        }
        if let Some(decay) = self.decay {
            if !(decay > 0.0 && decay <= 1.0) {
                return Err(RankError::InvalidArgument(format!(
                    "decay must be in (0, 1], got {}",
                    decay
                )));
            }
        }
        Ok(())
    }

    /// Feel-good bonus for an arm.
    pub fn bonus(&self, arm: &BetaPosterior) -> f64 {
        self.lambda_fg * self.b.min(arm.mean())
    }
}

/// Index of the largest score, lowest index among ties.
///
/// NaN scores never win. Returns `None` if no score is comparable.
pub fn argmax_lowest(scores: &[f64]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (idx, &score) in scores.iter().enumerate() {
        if score.is_nan() {
            continue;
        }
        match best {
            Some((_, top)) if score <= top => {}
            _ => best = Some((idx, score)),
        }
    }
    best.map(|(idx, _)| idx)
}

/// Thompson Sampling over candidates, warm-started from graph similarity.
#[derive(Debug)]
pub struct GraphBandit {
    config: BanditConfig,
    scorer: SimilarityScorer,
    arms: Vec<BetaPosterior>,
    similarities: Vec<f64>,
    rng: StdRng,
}

impl Default for GraphBandit {
    fn default() -> Self {
        Self {
            config: BanditConfig::default(),
            scorer: SimilarityScorer::default(),
            arms: Vec::new(),
            similarities: Vec::new(),
            rng: StdRng::from_entropy(),
        }
    }
}

impl GraphBandit {
    /// Uninitialized bandit with an entropy-seeded RNG.
    pub fn new(config: BanditConfig, scorer: SimilarityScorer) -> Result<Self, RankError> {
        Self::with_rng(config, scorer, StdRng::from_entropy())
    }

    /// Uninitialized bandit with a reproducible RNG.
    pub fn with_seed(
        config: BanditConfig,
        scorer: SimilarityScorer,
        seed: u64,
    ) -> Result<Self, RankError> {
        Self::with_rng(config, scorer, StdRng::seed_from_u64(seed))
    }

    fn with_rng(
        config: BanditConfig,
        scorer: SimilarityScorer,
        rng: StdRng,
    ) -> Result<Self, RankError> {
        config.validate()?;
        Ok(Self {
            config,
            scorer,
            arms: Vec::new(),
            similarities: Vec::new(),
            rng,
        })
    }

    /// Warm-starts one arm per candidate from its similarity to `role`.
    ///
    /// Each candidate is scored through its own one-sided graph against the
    /// one-sided role graph. On error the previous state is kept.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` if `candidates` is empty or holds duplicate ids
    /// - any error from similarity scoring
    pub fn initialize_from_graph(
        &mut self,
        candidates: &[Profile],
        role: &Profile,
    ) -> Result<(), RankError> {
        if candidates.is_empty() {
            return Err(RankError::InvalidArgument(
                "initialize_from_graph requires at least one candidate".into(),
            ));
        }
        validate_profiles(candidates)?;

        let role_graph = build_role_graph(role);
        let similarities = candidates
            .iter()
            .map(|candidate| {
                let candidate_graph = build_candidate_graph(candidate);
                self.scorer.graph_similarity(&role_graph, &candidate_graph)
            })
            .collect::<Result<Vec<_>, _>>()?;

        self.initialize_with_priors(&similarities)
    }

    /// Warm-starts from precomputed similarity scores, clamped to `[0, 1]`.
    pub fn initialize_with_priors(&mut self, similarities: &[f64]) -> Result<(), RankError> {
        if similarities.is_empty() {
            return Err(RankError::InvalidArgument(
                "at least one similarity score is required".into(),
            ));
        }
        if let Some(idx) = similarities.iter().position(|s| !s.is_finite()) {
            return Err(RankError::Numerical(format!(
                "similarity for arm {} is not finite",
                idx
            )));
        }

        let similarities: Vec<f64> = similarities.iter().map(|s| s.clamp(0.0, 1.0)).collect();
        self.arms = similarities
            .iter()
            .map(|&s| BetaPosterior::from_similarity(s, self.config.prior_scale))
            .collect();
        self.similarities = similarities;

        #[cfg(feature = "tracing")]
        tracing::info!(
            arms = self.arms.len(),
            mean_prior = self.similarities.iter().sum::<f64>() / self.similarities.len() as f64,
            "bandit warm-started"
        );
        Ok(())
    }

    /// Thompson-samples an arm using the bandit's own RNG.
    pub fn select_candidate(&mut self) -> Result<usize, RankError> {
        self.ensure_ready("select_candidate")?;
        let arm = select_from(&self.arms, &self.config, &mut self.rng)?;

        #[cfg(feature = "tracing")]
        tracing::debug!(arm, "selected candidate");
        Ok(arm)
    }

    /// Thompson-samples an arm with a caller-supplied RNG.
    pub fn select_candidate_with<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<usize, RankError> {
        self.ensure_ready("select_candidate")?;
        select_from(&self.arms, &self.config, rng)
    }

    /// Records an outcome for `arm`.
    ///
    /// `reward > 0` counts as a full success, so a fractional reward such as
    /// 0.3 increments `alpha` by one. Anything else is a failure. Nothing
    /// changes on error.
    ///
    /// # Errors
    ///
    /// - `InvalidState` before initialization
    /// - `InvalidArgument` if `arm` is out of range or `reward` is NaN
    pub fn update(&mut self, arm: usize, reward: f64) -> Result<(), RankError> {
        self.ensure_ready("update")?;
        let num_arms = self.arms.len();
        if reward.is_nan() {
            return Err(RankError::InvalidArgument(format!(
                "reward for arm {} is NaN",
                arm
            )));
        }
        let decay = self.config.decay;
        let posterior = self.arms.get_mut(arm).ok_or_else(|| {
            RankError::InvalidArgument(format!(
                "arm index {} out of range for {} arms",
                arm, num_arms
            ))
        })?;

        if let Some(factor) = decay {
            posterior.decay(factor);
        }
        posterior.observe(reward > 0.0);

        #[cfg(feature = "tracing")]
        tracing::debug!(
            arm,
            reward,
            alpha = posterior.alpha,
            beta = posterior.beta,
            "updated arm"
        );
        Ok(())
    }

    fn ensure_ready(&self, op: &str) -> Result<(), RankError> {
        if self.arms.is_empty() {
            return Err(RankError::InvalidState(format!(
                "{} called before initialize_from_graph",
                op
            )));
        }
        Ok(())
    }

    pub fn num_arms(&self) -> usize {
        self.arms.len()
    }

    pub fn is_ready(&self) -> bool {
        !self.arms.is_empty()
    }

    pub fn arm(&self, idx: usize) -> Option<&BetaPosterior> {
        self.arms.get(idx)
    }

    pub fn arms(&self) -> &[BetaPosterior] {
        &self.arms
    }

    pub fn alpha(&self, idx: usize) -> Option<f64> {
        self.arms.get(idx).map(|a| a.alpha)
    }

    pub fn beta(&self, idx: usize) -> Option<f64> {
        self.arms.get(idx).map(|a| a.beta)
    }

    pub fn posterior_mean(&self, idx: usize) -> Option<f64> {
        self.arms.get(idx).map(BetaPosterior::mean)
    }

    /// Similarity scores from the last warm start.
    ///
    /// Empty after a restore, which carries posteriors only.
    pub fn similarities(&self) -> &[f64] {
        &self.similarities
    }

    /// Arm indices by posterior mean, highest first, ties by index.
    pub fn ranking(&self) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.arms.len()).collect();
        order.sort_by(|&a, &b| {
            self.arms[b]
                .mean()
                .total_cmp(&self.arms[a].mean())
                .then(a.cmp(&b))
        });
        order
    }

    pub fn lambda_fg(&self) -> f64 {
        self.config.lambda_fg
    }

    pub fn b(&self) -> f64 {
        self.config.b
    }

    pub fn config(&self) -> &BanditConfig {
        &self.config
    }

    pub fn scorer(&self) -> &SimilarityScorer {
        &self.scorer
    }

    /// Replaces all arm state; used by snapshot restore.
    pub(crate) fn replace_state(&mut self, arms: Vec<BetaPosterior>, lambda_fg: f64, b: f64) {
        self.arms = arms;
        self.similarities.clear();
        self.config.lambda_fg = lambda_fg;
        self.config.b = b;
    }
}

fn select_from<R: Rng + ?Sized>(
    arms: &[BetaPosterior],
    config: &BanditConfig,
    rng: &mut R,
) -> Result<usize, RankError> {
    let scores = arms
        .iter()
        .map(|arm| Ok(arm.sample(rng)? + config.bonus(arm)))
        .collect::<Result<Vec<f64>, RankError>>()?;
    argmax_lowest(&scores)
        .ok_or_else(|| RankError::Numerical("no arm produced a comparable score".into()))
}
