// Integration tests for Pairup
//
// Drives the pairing engine the way the submission handler does: decide on
// a snapshot of the population, then apply both sides of the decision, one
// submission at a time.

use chrono::Utc;
use pairup::core::{list_pairs, Pairer};
use pairup::models::Participant;

fn create_participant(id: i64, lat: f64, lon: f64) -> Participant {
    Participant {
        id,
        name: format!("Person {}", id),
        phone: format!("+9715000000{:02}", id),
        latitude: lat,
        longitude: lon,
        matched_with: None,
        created_at: Utc::now(),
    }
}

/// Submit a participant: push into the population, run the engine, apply
/// the decision symmetrically (the in-memory analog of the transactional
/// double update).
fn submit(pairer: &Pairer, population: &mut Vec<Participant>, newcomer: Participant) {
    let result = pairer.decide(&newcomer, population);
    let newcomer_id = newcomer.id;
    population.push(newcomer);

    if let Some(decision) = result.decision {
        for p in population.iter_mut() {
            if p.id == newcomer_id {
                p.matched_with = Some(decision.partner_id);
            } else if p.id == decision.partner_id {
                p.matched_with = Some(newcomer_id);
            }
        }
    }
}

fn assert_symmetric(population: &[Participant]) {
    for p in population {
        if let Some(partner_id) = p.matched_with {
            let partner = population
                .iter()
                .find(|q| q.id == partner_id)
                .unwrap_or_else(|| panic!("dangling partner id {}", partner_id));
            assert_eq!(
                partner.matched_with,
                Some(p.id),
                "one-sided match between {} and {}",
                p.id,
                partner_id
            );
        }
    }
}

#[test]
fn test_sequential_submissions_stay_symmetric() {
    let pairer = Pairer::with_default_band();
    let mut population: Vec<Participant> = Vec::new();

    // A cluster around Dubai Marina plus one far-away submitter
    submit(&pairer, &mut population, create_participant(1, 25.080, 55.140));
    submit(&pairer, &mut population, create_participant(2, 25.085, 55.145));
    submit(&pairer, &mut population, create_participant(3, 25.090, 55.150));
    submit(&pairer, &mut population, create_participant(4, 25.095, 55.155));
    submit(&pairer, &mut population, create_participant(5, 24.450, 54.380));

    assert_symmetric(&population);
}

#[test]
fn test_second_submission_always_pairs_with_first() {
    let pairer = Pairer::with_default_band();
    let mut population: Vec<Participant> = Vec::new();

    submit(&pairer, &mut population, create_participant(1, 25.0, 55.0));
    assert!(population[0].matched_with.is_none(), "a lone submitter stays unmatched");

    submit(&pairer, &mut population, create_participant(2, 25.045, 55.0));

    assert_eq!(population[0].matched_with, Some(2));
    assert_eq!(population[1].matched_with, Some(1));

    let pairs = list_pairs(&population);
    assert_eq!(pairs.len(), 1);
    assert!(pairs[0].distance_km > 4.8 && pairs[0].distance_km < 5.2);
}

#[test]
fn test_matched_pair_is_not_broken_by_later_submissions() {
    let pairer = Pairer::with_default_band();
    let mut population: Vec<Participant> = Vec::new();

    submit(&pairer, &mut population, create_participant(1, 25.0, 55.0));
    submit(&pairer, &mut population, create_participant(2, 25.0, 55.0));
    // 1 and 2 are paired; 3 finds no free candidate
    submit(&pairer, &mut population, create_participant(3, 25.0, 55.0));

    assert_eq!(population[0].matched_with, Some(2));
    assert_eq!(population[1].matched_with, Some(1));
    assert!(population[2].matched_with.is_none());

    // 4 pairs with the only free participant, 3
    submit(&pairer, &mut population, create_participant(4, 25.0, 55.0));
    assert_eq!(population[2].matched_with, Some(4));
    assert_eq!(population[3].matched_with, Some(3));

    assert_symmetric(&population);
}

#[test]
fn test_no_participant_appears_in_two_pairs() {
    let pairer = Pairer::with_default_band();
    let mut population: Vec<Participant> = Vec::new();

    for i in 1..=10 {
        let jitter = (i as f64) * 0.004;
        submit(&pairer, &mut population, create_participant(i, 25.0 + jitter, 55.0));
    }

    let pairs = list_pairs(&population);

    let mut seen = std::collections::HashSet::new();
    for pair in &pairs {
        assert!(seen.insert(pair.phone_a.clone()), "{} listed twice", pair.phone_a);
        assert!(seen.insert(pair.phone_b.clone()), "{} listed twice", pair.phone_b);
    }
}

#[test]
fn test_listing_is_idempotent() {
    let pairer = Pairer::with_default_band();
    let mut population: Vec<Participant> = Vec::new();

    for i in 1..=6 {
        let jitter = (i as f64) * 0.01;
        submit(&pairer, &mut population, create_participant(i, 25.0 + jitter, 55.0));
    }

    let first = list_pairs(&population);
    let second = list_pairs(&population);

    assert_eq!(first, second);
}

#[test]
fn test_deleting_a_matched_participant_frees_the_partner() {
    let pairer = Pairer::with_default_band();
    let mut population: Vec<Participant> = Vec::new();

    submit(&pairer, &mut population, create_participant(1, 25.0, 55.0));
    submit(&pairer, &mut population, create_participant(2, 25.0, 55.0));
    assert_eq!(list_pairs(&population).len(), 1);

    // The in-memory analog of the transactional delete: unlink, then remove
    population.retain(|p| p.id != 1);
    for p in population.iter_mut() {
        if p.matched_with == Some(1) {
            p.matched_with = None;
        }
    }

    assert!(list_pairs(&population).is_empty());
    assert_symmetric(&population);

    // The freed participant is a candidate again
    submit(&pairer, &mut population, create_participant(3, 25.0, 55.0));
    assert_eq!(population[0].matched_with, Some(3));
}

#[test]
fn test_resubmission_updates_position_without_new_identity() {
    // The store keys upserts by phone; the engine sees the updated position
    // under the same id. Simulated here by editing the row in place.
    let pairer = Pairer::with_default_band();
    let mut population: Vec<Participant> = Vec::new();

    submit(&pairer, &mut population, create_participant(1, 25.0, 55.0));

    // Same person resubmits from a new location before anyone else arrives
    population[0].latitude = 26.0;
    assert_eq!(population.len(), 1);
    assert!(population[0].matched_with.is_none());

    submit(&pairer, &mut population, create_participant(2, 26.01, 55.0));
    assert_eq!(population[0].matched_with, Some(2));
}
