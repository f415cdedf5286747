use std::collections::{BTreeMap, BTreeSet};

use crate::core::distance::{geodesic_km, round2};
use crate::core::stats::{mean, sample_stdev, Band};
use crate::models::{PairRecord, Participant};

/// Default width factor for the acceptance band
pub const DEFAULT_BAND_FACTOR: f64 = 0.5;

/// A pairing decision for a newly submitted participant
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PairDecision {
    pub partner_id: i64,
    pub distance_km: f64,
}

/// Result of running the pairing engine for one submission
#[derive(Debug)]
pub struct PairResult {
    pub decision: Option<PairDecision>,
    pub candidates_considered: usize,
}

/// Pairing engine - selects a partner whose distance is close to typical
///
/// # Algorithm
/// 1. Candidates: everyone but the subject, not already matched, ascending by id
/// 2. Geodesic distance from the subject to every candidate
/// 3. Mean and sample standard deviation of those distances
/// 4. Acceptance band `[mean - f*stdev, mean + f*stdev]`, inclusive
/// 5. First candidate in scan order inside the band wins (first-fit, not
///    nearest-match; iteration order is the tie-breaker)
///
/// The band adapts to the population's spread, so no fixed distance
/// threshold is needed whether the deployment covers a dense city or a
/// sparse region.
#[derive(Debug, Clone)]
pub struct Pairer {
    band_factor: f64,
}

impl Pairer {
    pub fn new(band_factor: f64) -> Self {
        Self { band_factor }
    }

    pub fn with_default_band() -> Self {
        Self {
            band_factor: DEFAULT_BAND_FACTOR,
        }
    }

    /// Decide a partner for `subject` out of `population`
    ///
    /// Pure function of its inputs: no hidden state, no I/O. The caller is
    /// responsible for persisting both sides of the decision atomically.
    ///
    /// Already-matched participants never become candidates, so an existing
    /// pair is never broken by a later submission.
    pub fn decide(&self, subject: &Participant, population: &[Participant]) -> PairResult {
        let mut candidates: Vec<&Participant> = population
            .iter()
            .filter(|c| c.id != subject.id && c.matched_with.is_none())
            .collect();
        candidates.sort_by_key(|c| c.id);

        if candidates.is_empty() {
            return PairResult {
                decision: None,
                candidates_considered: 0,
            };
        }

        let distances: Vec<f64> = candidates
            .iter()
            .map(|c| geodesic_km(subject.latitude, subject.longitude, c.latitude, c.longitude))
            .collect();

        let center = mean(&distances);
        let spread = sample_stdev(&distances, center);
        let band = Band::around(center, self.band_factor * spread);

        let decision = candidates
            .iter()
            .zip(&distances)
            .find(|(_, d)| band.contains(**d))
            .map(|(c, d)| PairDecision {
                partner_id: c.id,
                distance_km: *d,
            });

        PairResult {
            decision,
            candidates_considered: candidates.len(),
        }
    }
}

impl Default for Pairer {
    fn default() -> Self {
        Self::with_default_band()
    }
}

/// Reconstruct the set of mutual pairs from `matched_with` back-references
///
/// Each unordered pair appears exactly once; the dedup key is the id pair in
/// canonical (ascending) order, which also fixes the output order. Distances
/// are recomputed rather than read from any cached value, and rounded to two
/// decimals. One-sided references are skipped.
pub fn list_pairs(population: &[Participant]) -> Vec<PairRecord> {
    let by_id: BTreeMap<i64, &Participant> =
        population.iter().map(|p| (p.id, p)).collect();

    let mut keys = BTreeSet::new();
    for p in population {
        let Some(partner_id) = p.matched_with else {
            continue;
        };
        let Some(partner) = by_id.get(&partner_id) else {
            continue;
        };
        if partner.matched_with != Some(p.id) {
            continue;
        }
        keys.insert((p.id.min(partner_id), p.id.max(partner_id)));
    }

    keys.iter()
        .filter_map(|(a, b)| {
            let left = by_id.get(a)?;
            let right = by_id.get(b)?;
            let distance = geodesic_km(
                left.latitude,
                left.longitude,
                right.latitude,
                right.longitude,
            );
            Some(PairRecord {
                name_a: left.name.clone(),
                phone_a: left.phone.clone(),
                name_b: right.name.clone(),
                phone_b: right.phone.clone(),
                distance_km: round2(distance),
            })
        })
        .collect()
}
