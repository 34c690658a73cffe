//! Metrics collection and registry.

use crate::attack::{AttackOutcome, AttackReport};
use crate::image::ChannelKind;
use crate::pov::{PovError, PovResult, SweepCurve};
use crate::rs::Detection;
use prometheus::{Encoder, GaugeVec, IntCounter, Opts, Registry, TextEncoder};
use thiserror::Error;

/// Errors that can occur during metrics operations.
#[derive(Debug, Error)]
pub enum MetricsError {
    /// Registration or encoding failed.
    #[error("prometheus error: {0}")]
    Prometheus(#[from] prometheus::Error),
}

/// Prometheus metrics registry for steganalysis runs.
pub struct MetricsRegistry {
    registry: Registry,

    // RS detector metrics
    detector_queries: IntCounter,
    stego_verdicts: IntCounter,
    rs_mass: GaugeVec,

    // Chi-square metrics
    pov_p_value: GaugeVec,
    pov_inconclusive: IntCounter,

    // Attack metrics
    attack_modifications: IntCounter,
    attack_evasions: IntCounter,
}

impl MetricsRegistry {
    /// Creates a new registry with all steganalysis metrics registered.
    pub fn new() -> Result<Self, MetricsError> {
        let registry = Registry::new();

        let detector_queries = IntCounter::new(
            "lsb_steganalysis_detector_queries_total",
            "Total RS detector invocations",
        )?;
        let stego_verdicts = IntCounter::new(
            "lsb_steganalysis_stego_verdicts_total",
            "RS detector invocations that reported stego-likely",
        )?;
        let rs_mass = GaugeVec::new(
            Opts::new(
                "lsb_steganalysis_rs_mass",
                "Latest RS group mass per channel (rm, sm, r_neg_m, s_neg_m)",
            ),
            &["channel", "group"],
        )?;

        let pov_p_value = GaugeVec::new(
            Opts::new(
                "lsb_steganalysis_pov_p_value",
                "Latest pairs-of-values p-value per channel",
            ),
            &["channel"],
        )?;
        let pov_inconclusive = IntCounter::new(
            "lsb_steganalysis_pov_inconclusive_total",
            "Pairs-of-values tests with no usable pair",
        )?;

        let attack_modifications = IntCounter::new(
            "lsb_steganalysis_attack_modifications_total",
            "LSB-clearing passes applied by oracle attacks",
        )?;
        let attack_evasions = IntCounter::new(
            "lsb_steganalysis_attack_evasions_total",
            "Oracle attacks that ended with a clean verdict",
        )?;

        registry.register(Box::new(detector_queries.clone()))?;
        registry.register(Box::new(stego_verdicts.clone()))?;
        registry.register(Box::new(rs_mass.clone()))?;
        registry.register(Box::new(pov_p_value.clone()))?;
        registry.register(Box::new(pov_inconclusive.clone()))?;
        registry.register(Box::new(attack_modifications.clone()))?;
        registry.register(Box::new(attack_evasions.clone()))?;

        Ok(Self {
            registry,
            detector_queries,
            stego_verdicts,
            rs_mass,
            pov_p_value,
            pov_inconclusive,
            attack_modifications,
            attack_evasions,
        })
    }

    /// Records one detector answer.
    pub fn record_detection(&self, detection: &Detection) {
        self.detector_queries.inc();
        if detection.stego {
            self.stego_verdicts.inc();
        }
        for cs in &detection.signatures {
            let channel = cs.channel.as_str();
            let s = &cs.signature;
            for (group, value) in [
                ("rm", s.rm),
                ("sm", s.sm),
                ("r_neg_m", s.r_neg_m),
                ("s_neg_m", s.s_neg_m),
            ] {
                self.rs_mass.with_label_values(&[channel, group]).set(value);
            }
        }
    }

    /// Records one pairs-of-values test outcome.
    ///
    /// Inconclusive tests only bump a counter; the last p-value is kept.
    pub fn record_pov(&self, channel: ChannelKind, result: &Result<PovResult, PovError>) {
        match result {
            Ok(r) => self
                .pov_p_value
                .with_label_values(&[channel.as_str()])
                .set(r.p_value),
            Err(e) if e.is_inconclusive() => self.pov_inconclusive.inc(),
            Err(_) => {}
        }
    }

    /// Records a sweep curve: the p-value at its largest fraction, plus one
    /// inconclusive test per skipped fraction.
    pub fn record_curve(&self, curve: &SweepCurve) {
        if let Some(last) = curve.points.last() {
            self.pov_p_value
                .with_label_values(&[curve.channel.as_str()])
                .set(last.result.p_value);
        }
        self.pov_inconclusive.inc_by(curve.skipped as u64);
    }

    /// Records a finished oracle attack.
    ///
    /// Every detector answer the attack received is recorded as a detection.
    pub fn record_attack(&self, report: &AttackReport) {
        for detection in &report.history {
            self.record_detection(detection);
        }
        self.attack_modifications.inc_by(report.modifications as u64);
        if report.outcome == AttackOutcome::Evaded {
            self.attack_evasions.inc();
        }
    }

    /// Returns the underlying Prometheus registry.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Encodes all metrics in Prometheus text format.
    pub fn encode(&self) -> Result<String, MetricsError> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}
