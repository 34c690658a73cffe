//! End-to-end scenarios for the detectors and the oracle attack.

use lsb_steganalysis::{
    attack::{AttackOutcome, OracleAttack, DEFAULT_BUDGET},
    image::{Channel, ChannelKind, ImageSource, RgbImage, SyntheticConfig, SyntheticSource},
    pov::{PovTest, SampleMode, Sweep, SweepStrategy},
    rs::{Blocks, GroupClass, Mask, RsAnalyzer, RsDetector},
};

fn gray_image(channel: Channel) -> RgbImage {
    RgbImage::from_channels(channel.clone(), channel.clone(), channel).unwrap()
}

fn full_mask_detector() -> RsDetector {
    let analyzer = RsAnalyzer::new(Mask::filled(8, 8, true).unwrap());
    RsDetector::new(analyzer, 0.1).unwrap()
}

#[test]
fn all_zero_image_is_unusable_and_clean() {
    let image = RgbImage::from_interleaved(&[0u8; 16 * 16 * 3], 16, 16).unwrap();
    let detector = full_mask_detector();

    for (_, channel) in image.channels() {
        let blocks = Blocks::new(channel, detector.analyzer().mask()).unwrap();
        assert_eq!(blocks.len(), 4);
        for block in blocks {
            assert_eq!(
                detector.analyzer().classify_block(&block),
                (GroupClass::Unusable, GroupClass::Unusable)
            );
        }
    }

    let detection = detector.inspect(&image).unwrap();
    assert!(!detection.stego);
    for cs in &detection.signatures {
        assert_eq!(cs.signature.rm, 0.0);
        assert_eq!(cs.signature.sm, 0.0);
        assert_eq!(cs.signature.r_neg_m, 0.0);
        assert_eq!(cs.signature.s_neg_m, 0.0);
    }
}

#[test]
fn alternating_lsbs_match_uniform_model() {
    // Value i is ((i / 2) % 128) * 2 + (i % 2): every pair alternates 0, 1.
    let samples: Vec<u8> = (0..64 * 64)
        .map(|i: usize| (((i / 2) % 128) * 2 + (i % 2)) as u8)
        .collect();
    let channel = Channel::new(samples, 64, 64).unwrap();

    let full = PovTest::default().run(channel.samples()).unwrap();
    assert!(full.p_value > 0.9);

    let lsb = PovTest::default().run(&channel.lsb_plane()).unwrap();
    assert!(lsb.p_value > 0.9);
    assert_eq!(lsb.degrees_of_freedom, 1);

    let sweep = Sweep::new(
        PovTest::default(),
        SampleMode::LsbPlane,
        SweepStrategy::RowPrefix { steps: 100 },
    )
    .unwrap();
    let curve = sweep.run_channel(ChannelKind::Red, &channel).unwrap();
    let last = curve.points.last().unwrap();
    assert_eq!(last.fraction, 1.0);
    assert!(last.result.p_value > 0.9);
    assert!(curve.is_uniformly_high(0.05));
}

#[test]
fn attack_on_clean_image_probes_once() {
    let image = gray_image(Channel::filled(16, 16, 0).unwrap());
    let detector = full_mask_detector();

    let report = OracleAttack::new(&detector, DEFAULT_BUDGET).run(&image).unwrap();
    assert_eq!(report.outcome, AttackOutcome::Evaded);
    assert!(!report.budget_exhausted());
    assert_eq!(report.probes, 1);
    assert_eq!(report.modifications, 0);
    assert_eq!(report.image, image);
}

#[test]
fn attack_evades_after_one_clear() {
    // Samples alternate 101, 50 along each row. Flipping every LSB gives
    // 100, 51: smoother, so every block is Singular under the mask and
    // Unusable under its (empty) negation.
    let samples: Vec<u8> = (0..16 * 16).map(|i| if i % 2 == 0 { 101 } else { 50 }).collect();
    let image = gray_image(Channel::new(samples, 16, 16).unwrap());
    let detector = full_mask_detector();

    let before = detector.inspect(&image).unwrap();
    assert!(before.stego);
    assert_eq!(before.signatures[0].signature.sm, 1.0);

    let report = OracleAttack::new(&detector, DEFAULT_BUDGET).run(&image).unwrap();
    assert!(report.is_success());
    assert_eq!(report.probes, 2);
    assert_eq!(report.modifications, 1);
    assert_eq!(report.samples_changed, 3 * 128);
    assert!(report.image.channel(ChannelKind::Green).samples().iter().all(|v| v & 1 == 0));
    // Input untouched
    assert_eq!(image.channel(ChannelKind::Green).get(0, 0), 101);
}

#[test]
fn unaligned_image_keeps_its_size_through_attack() {
    let samples: Vec<u8> = (0..13 * 11).map(|i| if i % 2 == 0 { 101 } else { 50 }).collect();
    let image = gray_image(Channel::new(samples, 13, 11).unwrap());
    let detector = full_mask_detector();

    let report = OracleAttack::new(&detector, 5).run(&image).unwrap();
    assert_eq!(report.image.width(), 13);
    assert_eq!(report.image.height(), 11);
    assert!(report.probes <= 2);
}

#[test]
fn lsb_cleared_cover_rejects_equal_pairs() {
    let cover = SyntheticSource::new(SyntheticConfig {
        width: 128,
        height: 128,
        embed_rate: 0.0,
        seed: 5,
        ..Default::default()
    })
    .unwrap()
    .next_image()
    .unwrap();

    let (cleared, _) = cover.with_lsb_cleared();
    let sweep = Sweep::new(
        PovTest::default(),
        SampleMode::Values,
        SweepStrategy::RandomSubsample { steps: 10, seed: 3 },
    )
    .unwrap();

    // Only even values remain: every pair is maximally unbalanced.
    for curve in sweep.run_image(&cleared).unwrap() {
        assert!(!curve.points.is_empty());
        assert!(curve.points.iter().all(|p| p.result.p_value < 0.05));
    }
}

#[test]
fn synthetic_embedding_separates_cover_from_stego() {
    let generate = |embed_rate| {
        SyntheticSource::new(SyntheticConfig {
            embed_rate,
            seed: 9,
            ..Default::default()
        })
        .unwrap()
        .next_image()
        .unwrap()
    };
    let cover = generate(0.0);
    let stego = generate(1.0);

    let sweep = Sweep::new(
        PovTest::default(),
        SampleMode::Values,
        SweepStrategy::RandomSubsample { steps: 10, seed: 3 },
    )
    .unwrap();

    // The cover fills only the even half of each pair.
    for curve in sweep.run_image(&cover).unwrap() {
        assert_eq!(curve.skipped, 0);
        assert_eq!(curve.points.len(), 10);
        assert!(curve.points.iter().all(|p| p.result.p_value < 0.05));
        assert_eq!(curve.first_fraction_above(0.05), None);
    }

    // Full replacement follows the uniform pair model: chi-square near its df.
    for curve in sweep.run_image(&stego).unwrap() {
        let full = &curve.points.last().unwrap().result;
        assert_eq!(full.sample_size, 256 * 256);
        assert!(full.statistic < 3.0 * full.degrees_of_freedom as f64);
    }

    let detector = full_mask_detector();
    let clean = detector.inspect(&cover).unwrap();
    assert!(!clean.stego);
    let flagged = detector.inspect(&stego).unwrap();
    assert!(flagged.stego);

    let report = OracleAttack::new(&detector, DEFAULT_BUDGET).run(&stego).unwrap();
    assert_eq!(report.outcome, AttackOutcome::Evaded);
    assert_eq!(report.probes, 2);
    assert_eq!(report.modifications, 1);
    assert!(report.samples_changed > 0);
    for (_, channel) in report.image.channels() {
        assert!(channel.samples().iter().all(|v| v & 1 == 0));
    }
}
