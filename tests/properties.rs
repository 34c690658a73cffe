//! Property tests for the statistical invariants.

use lsb_steganalysis::{
    attack::OracleAttack,
    image::RgbImage,
    pov::{PairHistogram, PovError, PovTest},
    rs::{Mask, RsAnalyzer, RsDetector},
};
use proptest::prelude::*;

fn image_strategy() -> impl Strategy<Value = RgbImage> {
    prop::collection::vec(any::<u8>(), 16 * 16 * 3)
        .prop_map(|data| RgbImage::from_interleaved(&data, 16, 16).unwrap())
}

fn detector(seed: u64, threshold: f64) -> RsDetector {
    let mask = Mask::seeded(8, 8, Some(seed)).unwrap();
    RsDetector::new(RsAnalyzer::new(mask), threshold).unwrap()
}

proptest! {
    #[test]
    fn pair_buckets_conserve_samples(data in prop::collection::vec(any::<u8>(), 0..2000)) {
        let hist = PairHistogram::from_samples(&data);
        let total: u64 = hist.buckets().map(|b| b.total()).sum();
        prop_assert_eq!(total, data.len() as u64);
    }

    #[test]
    fn statistic_and_p_value_in_range(data in prop::collection::vec(any::<u8>(), 1..4000)) {
        match PovTest::default().run(&data) {
            Ok(result) => {
                prop_assert!(result.statistic >= 0.0);
                prop_assert!((0.0..=1.0).contains(&result.p_value));
                prop_assert!(result.degrees_of_freedom >= 1);
            }
            Err(e) => prop_assert!(e.is_inconclusive()),
        }
    }

    #[test]
    fn short_samples_are_degenerate(data in prop::collection::vec(any::<u8>(), 1..8)) {
        let result = PovTest::default().run(&data);
        let is_degenerate = matches!(result, Err(PovError::DegenerateHistogram { .. }));
        prop_assert!(is_degenerate);
    }

    #[test]
    fn constant_samples_are_degenerate(value in any::<u8>(), len in 1usize..5000) {
        let result = PovTest::default().run(&vec![value; len]);
        let is_degenerate = matches!(result, Err(PovError::DegenerateHistogram { .. }));
        prop_assert!(is_degenerate);
    }

    #[test]
    fn rs_masses_are_bounded(image in image_strategy(), seed in any::<u64>()) {
        let detection = detector(seed, 0.1).inspect(&image).unwrap();
        for cs in &detection.signatures {
            let s = cs.signature;
            for mass in [s.rm, s.sm, s.r_neg_m, s.s_neg_m] {
                prop_assert!((0.0..=1.0).contains(&mass));
            }
            prop_assert!(s.rm + s.sm <= 1.0 + 1e-12);
            prop_assert!(s.r_neg_m + s.s_neg_m <= 1.0 + 1e-12);
        }
    }

    #[test]
    fn detector_is_idempotent(image in image_strategy(), seed in any::<u64>()) {
        let detector = detector(seed, 0.1);
        let first = detector.inspect(&image).unwrap();
        let second = detector.inspect(&image).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn attack_stops_at_fixed_point(image in image_strategy(), seed in any::<u64>()) {
        // A zero threshold flags almost everything, so the loop must stop
        // on its own once there is nothing left to clear.
        let detector = detector(seed, 0.0);
        let report = OracleAttack::new(&detector, 1000).run(&image).unwrap();

        prop_assert!(report.modifications <= 1);
        prop_assert!(report.probes <= 2);
        prop_assert!(!report.budget_exhausted());
        let (_, changed) = report.image.with_lsb_cleared();
        prop_assert!(report.is_success() || changed == 0);
    }
}
