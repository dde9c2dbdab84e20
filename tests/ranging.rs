use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::StandardNormal;

use tdi_ranging::{
    sample, sample_with_observer, DelayPair, MemoryChain, ProposalMode, RangingSettings, TdiData,
    TextChainWriter, XComboModel,
};

/// Laser phase noise measured twice, each channel carrying its own arm's
/// round trip: `ch_i(t) = p(t - d_i) - p(t)`. The combination built from
/// the matching delays cancels `p` exactly away from the edges.
fn synthetic_channels(len: usize, d1: usize, d2: usize, seed: u64) -> (Vec<f64>, Vec<f64>) {
    let margin = d1.max(d2);
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let phase: Vec<f64> = (0..len + margin)
        .map(|_| rng.sample::<f64, _>(StandardNormal))
        .collect();
    let channel = |delay: usize| -> Vec<f64> {
        (0..len)
            .map(|t| phase[t + margin - delay] - phase[t + margin])
            .collect()
    };
    (channel(d1), channel(d2))
}

#[test]
fn likelihood_peaks_at_the_true_delays() -> anyhow::Result<()> {
    let len = 512;
    let (channel_1, channel_2) = synthetic_channels(len, 6, 8, 99);
    let settings = RangingSettings {
        prior_low: 2.0,
        prior_high: 5.0,
        ..RangingSettings::default()
    };
    let model = XComboModel::new(TdiData::new(channel_1, channel_2)?, settings)?;

    let candidates = [2.5, 3.0, 3.5, 4.0, 4.5];
    let mut best = (f64::NEG_INFINITY, 0.0, 0.0);
    for &l1 in &candidates {
        for &l2 in &candidates {
            let logl = model.log_likelihood(DelayPair::new(l1, l2));
            assert!(logl.is_finite());
            if logl > best.0 {
                best = (logl, l1, l2);
            }
        }
    }
    assert_eq!((best.1, best.2), (3.0, 4.0));
    Ok(())
}

#[test]
fn chain_emits_seed_plus_one_row_per_iteration() -> anyhow::Result<()> {
    let (channel_1, channel_2) = synthetic_channels(64, 4, 6, 5);
    let settings = RangingSettings {
        prior_low: 1.5,
        prior_high: 4.5,
        num_iterations: 30,
        seed: 11,
        ..RangingSettings::default()
    };
    let model = XComboModel::new(TdiData::new(channel_1, channel_2)?, settings)?;
    let mut sink = MemoryChain::new();
    let summary = sample(&model, &mut sink)?;

    let records = sink.records();
    assert_eq!(records.len(), 31);
    assert_eq!(summary.iterations, 30);
    for mode in [
        ProposalMode::Small,
        ProposalMode::Large,
        ProposalMode::Uniform,
    ] {
        assert_eq!(summary.stats.trials(mode), 10);
    }

    // Rows change exactly when a proposal was accepted.
    let transitions = records.windows(2).filter(|pair| pair[0] != pair[1]).count() as u64;
    assert_eq!(summary.stats.accepted_total(), transitions + 1);
    let expected_ratio = (transitions + 1) as f64 / 30.0;
    assert!((summary.acceptance_ratio() - expected_ratio).abs() < 1e-12);
    Ok(())
}

#[test]
fn same_settings_reproduce_the_chain() -> anyhow::Result<()> {
    let (channel_1, channel_2) = synthetic_channels(64, 4, 6, 5);
    let settings = RangingSettings {
        prior_low: 1.5,
        prior_high: 4.5,
        num_iterations: 24,
        seed: 21,
        ..RangingSettings::default()
    };
    let model = XComboModel::new(
        TdiData::new(channel_1.clone(), channel_2.clone())?,
        settings,
    )?;

    let mut first = MemoryChain::new();
    sample(&model, &mut first)?;
    let mut second = MemoryChain::new();
    sample(&model, &mut second)?;
    assert_eq!(first.records(), second.records());

    let reseeded = RangingSettings { seed: 22, ..settings };
    let model = XComboModel::new(TdiData::new(channel_1, channel_2)?, reseeded)?;
    let mut third = MemoryChain::new();
    sample(&model, &mut third)?;
    assert_ne!(second.records(), third.records());
    Ok(())
}

#[test]
fn chain_file_round_trips() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("chainfile.dat");
    let (channel_1, channel_2) = synthetic_channels(64, 4, 6, 7);
    let settings = RangingSettings {
        prior_low: 1.5,
        prior_high: 4.5,
        num_iterations: 12,
        seed: 3,
        ..RangingSettings::default()
    };
    let model = XComboModel::new(TdiData::new(channel_1, channel_2)?, settings)?;

    let mut writer = TextChainWriter::create(&path)?;
    sample(&model, &mut writer)?;
    writer.finalize()?;

    let mut memory = MemoryChain::new();
    sample(&model, &mut memory)?;

    let contents = std::fs::read_to_string(&path)?;
    let mut lines = contents.lines();
    assert_eq!(lines.next(), Some("#likelihood L_1 L_2"));
    let rows: Vec<Vec<f64>> = lines
        .map(|line| {
            line.split_whitespace()
                .map(|field| field.parse().unwrap())
                .collect()
        })
        .collect();
    assert_eq!(rows.len(), 13);
    for (row, record) in rows.iter().zip(memory.records()) {
        assert_eq!(row.len(), 3);
        assert_eq!(row[0], record.log_likelihood);
        assert_eq!(row[1], record.l1);
        assert_eq!(row[2], record.l2);
    }
    Ok(())
}

#[test]
fn observer_sees_every_row() -> anyhow::Result<()> {
    let (channel_1, channel_2) = synthetic_channels(64, 4, 6, 15);
    let settings = RangingSettings {
        prior_low: 1.5,
        prior_high: 4.5,
        num_iterations: 9,
        seed: 2,
        ..RangingSettings::default()
    };
    let model = XComboModel::new(TdiData::new(channel_1, channel_2)?, settings)?;
    let mut sink = MemoryChain::new();
    let mut seen = Vec::new();
    sample_with_observer(&model, &mut sink, |record| seen.push(*record))?;
    assert_eq!(seen.len(), 10);
    assert_eq!(seen.as_slice(), sink.records());
    Ok(())
}

#[test]
fn flat_likelihood_accepts_every_uniform_jump() -> anyhow::Result<()> {
    let model = XComboModel::new(
        TdiData::new(vec![0.0; 64], vec![0.0; 64])?,
        RangingSettings {
            num_iterations: 30,
            seed: 8,
            ..RangingSettings::default()
        },
    )?;
    let mut sink = MemoryChain::new();
    let summary = sample(&model, &mut sink)?;

    assert!(sink.records().iter().all(|r| r.log_likelihood == 0.0));
    assert_eq!(summary.stats.trials(ProposalMode::Uniform), 10);
    assert_eq!(
        summary.stats.accepts(ProposalMode::Uniform),
        summary.stats.trials(ProposalMode::Uniform)
    );
    assert_eq!(summary.stats.mode_ratio(ProposalMode::Uniform), 1.0);
    Ok(())
}

#[test]
fn zero_iteration_run_emits_only_the_seed_row() -> anyhow::Result<()> {
    let model = XComboModel::new(
        TdiData::new(vec![0.0; 64], vec![0.0; 64])?,
        RangingSettings {
            num_iterations: 0,
            ..RangingSettings::default()
        },
    )?;
    let mut sink = MemoryChain::new();
    let summary = sample(&model, &mut sink)?;

    assert_eq!(sink.records().len(), 1);
    assert_eq!(summary.iterations, 0);
    assert_eq!(summary.stats.total_trials(), 0);
    assert_eq!(summary.acceptance_ratio(), 0.0);
    Ok(())
}

#[test]
fn delays_beyond_the_grid_degenerate_to_a_plain_difference() -> anyhow::Result<()> {
    let channel_1: Vec<f64> = (0..64).map(|n| (n as f64 * 0.37).sin()).collect();
    let channel_2: Vec<f64> = (0..64).map(|n| (n as f64 * 0.53).cos()).collect();
    let settings = RangingSettings {
        prior_low: 400.0,
        prior_high: 400.1,
        ..RangingSettings::default()
    };
    let model = XComboModel::new(
        TdiData::new(channel_1.clone(), channel_2.clone())?,
        settings,
    )?;

    let delays = DelayPair::new(400.05, 400.07);
    let residual = model.residual(delays);
    for ((r, x1), x2) in residual.iter().zip(&channel_1).zip(&channel_2) {
        assert!((r - (x1 - x2)).abs() < 1e-12);
    }
    assert!(model.log_likelihood(delays).is_finite());
    Ok(())
}
