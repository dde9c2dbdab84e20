//! Bayesian ranging of interferometer arm delays.
//!
//! Two measurement channels are combined into a delay combination whose
//! residual cancels the common laser noise when the hypothesised arm
//! delays match the true ones. A Metropolis-Hastings chain explores the
//! two delay parameters under a flat prior, scoring each hypothesis with
//! a Gaussian likelihood whitened by the analytic secondary-noise PSD.
//!
//! ```
//! use tdi_ranging::{sample, MemoryChain, RangingSettings, TdiData, XComboModel};
//!
//! let settings = RangingSettings {
//!     num_iterations: 20,
//!     kernel_order: 7,
//!     ..RangingSettings::default()
//! };
//!
//! let channel: Vec<f64> = (0..64u64)
//!     .map(|n| (n.wrapping_mul(2654435761) % 1000) as f64 / 1000.0 - 0.5)
//!     .collect();
//! let data = TdiData::new(channel.clone(), channel)?;
//! let model = XComboModel::new(data, settings)?;
//!
//! let mut sink = MemoryChain::new();
//! let summary = sample(&model, &mut sink)?;
//! assert_eq!(sink.records().len(), 21);
//! assert!(summary.acceptance_ratio() > 0.0);
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod config;
pub mod data;
pub mod delay;
pub(crate) mod fft;
pub mod filter;
pub(crate) mod math;
pub mod model;
pub mod noise;
pub mod prior;
pub mod proposal;
pub mod sampler;
pub mod storage;

pub use config::{
    KernelWindow, ProposalStepSettings, RangingError, RangingSettings, SPEED_OF_LIGHT,
};
pub use data::{ChannelSource, TdiData, TextColumnSource};
pub use delay::{DelayDecomposition, DelayPair};
pub use model::XComboModel;
pub use noise::NoiseModel;
pub use prior::BoxPrior;
pub use proposal::{ProposalCycle, ProposalMode, ProposalScheme};
pub use sampler::{
    sample, sample_with_observer, AcceptanceStats, ChainRecord, ChainState, MetropolisChain,
    RunSummary,
};
pub use storage::{ChainSink, MemoryChain, TextChainWriter};
