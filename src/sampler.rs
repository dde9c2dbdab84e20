//! The Metropolis-Hastings chain over the two arm delays, and the driver
//! that runs a full configured chain against a model.

use anyhow::{Context, Result};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::OpenClosed01;

use crate::delay::DelayPair;
use crate::model::XComboModel;
use crate::prior::BoxPrior;
use crate::proposal::{ProposalCycle, ProposalMode, ProposalScheme};
use crate::storage::ChainSink;

/// Position of the chain with its cached log likelihood.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChainState {
    pub delays: DelayPair,
    pub log_likelihood: f64,
}

/// One emitted row: the state after an iteration's accept decision.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChainRecord {
    pub log_likelihood: f64,
    pub l1: f64,
    pub l2: f64,
}

impl ChainRecord {
    pub fn of(state: &ChainState) -> Self {
        Self {
            log_likelihood: state.log_likelihood,
            l1: state.delays.l1,
            l2: state.delays.l2,
        }
    }
}

/// Trial and accept counters, per proposal mode and overall.
///
/// The seed state counts as one overall accept, so the overall ratio is
/// accepted records over iterations, the way chain files are usually
/// post-processed.
#[derive(Debug, Clone, Copy)]
pub struct AcceptanceStats {
    trials: [u64; 3],
    accepts: [u64; 3],
    accepted_total: u64,
}

impl AcceptanceStats {
    fn new() -> Self {
        Self {
            trials: [0; 3],
            accepts: [0; 3],
            accepted_total: 1,
        }
    }

    fn register(&mut self, mode: ProposalMode, accepted: bool) {
        let index = mode.index();
        self.trials[index] += 1;
        if accepted {
            self.accepts[index] += 1;
            self.accepted_total += 1;
        }
    }

    pub fn trials(&self, mode: ProposalMode) -> u64 {
        self.trials[mode.index()]
    }

    pub fn accepts(&self, mode: ProposalMode) -> u64 {
        self.accepts[mode.index()]
    }

    pub fn total_trials(&self) -> u64 {
        self.trials.iter().sum()
    }

    /// Accepted states including the seed.
    pub fn accepted_total(&self) -> u64 {
        self.accepted_total
    }

    /// Overall accepted states over trials, seed included. Zero before
    /// the first trial.
    pub fn acceptance_ratio(&self) -> f64 {
        let trials = self.total_trials();
        if trials == 0 {
            return 0.0;
        }
        self.accepted_total as f64 / trials as f64
    }

    /// Accept fraction of a single proposal mode. Zero before the mode's
    /// first trial.
    pub fn mode_ratio(&self, mode: ProposalMode) -> f64 {
        let trials = self.trials(mode);
        if trials == 0 {
            return 0.0;
        }
        self.accepts(mode) as f64 / trials as f64
    }
}

/// Log of the Metropolis-Hastings acceptance probability, capped at zero.
///
/// `forward_log_density` scores drawing the proposal from the current
/// state, `reverse_log_density` the opposite direction. Any NaN in the
/// ratio propagates, so the comparison against the acceptance threshold
/// rejects.
fn log_acceptance(
    proposed_log_prior: f64,
    proposed_log_likelihood: f64,
    forward_log_density: f64,
    current_log_prior: f64,
    current_log_likelihood: f64,
    reverse_log_density: f64,
) -> f64 {
    let log_ratio = proposed_log_prior + proposed_log_likelihood + forward_log_density
        - current_log_prior
        - current_log_likelihood
        - reverse_log_density;
    if log_ratio.is_nan() {
        return f64::NAN;
    }
    log_ratio.min(0.0)
}

/// A single Metropolis-Hastings chain.
///
/// Seeded with a uniform draw from the prior box; each [`step`] rotates the
/// proposal mode, scores the proposal and keeps or discards it.
///
/// [`step`]: MetropolisChain::step
pub struct MetropolisChain<'model, R: Rng> {
    model: &'model XComboModel,
    prior: BoxPrior,
    proposals: ProposalScheme,
    cycle: ProposalCycle,
    rng: R,
    state: ChainState,
    stats: AcceptanceStats,
    iteration: u64,
}

impl<'model, R: Rng> MetropolisChain<'model, R> {
    pub fn new(model: &'model XComboModel, mut rng: R) -> Self {
        let settings = model.settings();
        let prior = BoxPrior::new(settings.prior_low, settings.prior_high);
        let proposals = ProposalScheme::new(
            settings.small_step,
            settings.large_step,
            settings.prior_low,
            settings.prior_high,
        );
        let delays = prior.draw(&mut rng);
        let state = ChainState {
            delays,
            log_likelihood: model.log_likelihood(delays),
        };
        Self {
            model,
            prior,
            proposals,
            cycle: ProposalCycle::new(),
            rng,
            state,
            stats: AcceptanceStats::new(),
            iteration: 0,
        }
    }

    pub fn state(&self) -> &ChainState {
        &self.state
    }

    pub fn stats(&self) -> &AcceptanceStats {
        &self.stats
    }

    /// Iterations taken so far, the seed state not counted.
    pub fn iteration(&self) -> u64 {
        self.iteration
    }

    /// The current state as an emitted row.
    pub fn record(&self) -> ChainRecord {
        ChainRecord::of(&self.state)
    }

    /// One iteration: propose from this iteration's mode, score it, accept
    /// or reject, and report the resulting state.
    pub fn step(&mut self) -> ChainRecord {
        let mode = self.cycle.advance();
        let proposal = self.proposals.draw(mode, &mut self.rng, self.state.delays);
        let proposed_log_likelihood = self.model.log_likelihood(proposal);

        let alpha = log_acceptance(
            self.prior.log_density(proposal),
            proposed_log_likelihood,
            self.proposals.log_density(mode, proposal, self.state.delays),
            self.prior.log_density(self.state.delays),
            self.state.log_likelihood,
            self.proposals.log_density(mode, self.state.delays, proposal),
        );
        let threshold: f64 = self.rng.sample(OpenClosed01);
        let accepted = alpha >= threshold.ln();

        if accepted {
            self.state = ChainState {
                delays: proposal,
                log_likelihood: proposed_log_likelihood,
            };
        }
        self.stats.register(mode, accepted);
        self.iteration += 1;
        self.record()
    }
}

/// What a finished run reports back.
#[derive(Debug, Clone, Copy)]
pub struct RunSummary {
    pub iterations: u64,
    pub final_state: ChainState,
    pub stats: AcceptanceStats,
}

impl RunSummary {
    pub fn acceptance_ratio(&self) -> f64 {
        self.stats.acceptance_ratio()
    }
}

/// Run a full chain against `model`, emitting rows into `sink`.
///
/// The seed row is emitted first, then one row per iteration, so the sink
/// sees `num_iterations + 1` rows. The sink is flushed on every exit path.
pub fn sample<S: ChainSink>(model: &XComboModel, sink: &mut S) -> Result<RunSummary> {
    sample_with_observer(model, sink, |_| {})
}

/// Like [`sample`], additionally calling `observer` on every emitted row,
/// the seed row included.
pub fn sample_with_observer<S, F>(
    model: &XComboModel,
    sink: &mut S,
    mut observer: F,
) -> Result<RunSummary>
where
    S: ChainSink,
    F: FnMut(&ChainRecord),
{
    let settings = model.settings();
    let rng = ChaCha8Rng::seed_from_u64(settings.seed);
    let mut chain = MetropolisChain::new(model, rng);

    let outcome = emit_all(&mut chain, settings.num_iterations, sink, &mut observer);
    let flushed = sink.flush().context("Could not flush the chain sink");
    outcome?;
    flushed?;

    Ok(RunSummary {
        iterations: settings.num_iterations,
        final_state: *chain.state(),
        stats: *chain.stats(),
    })
}

fn emit_all<S, F, R>(
    chain: &mut MetropolisChain<'_, R>,
    num_iterations: u64,
    sink: &mut S,
    observer: &mut F,
) -> Result<()>
where
    S: ChainSink,
    F: FnMut(&ChainRecord),
    R: Rng,
{
    let seed_record = chain.record();
    sink.record(&seed_record)
        .context("Could not write the seed row")?;
    observer(&seed_record);

    for _ in 0..num_iterations {
        let record = chain.step();
        sink.record(&record).context("Could not write a chain row")?;
        observer(&record);
    }
    Ok(())
}
