use std::collections::{BTreeMap, BTreeSet};

use proptest::prelude::*;

use custody_consensus::{ConsensusError, ObservationConsensus, ObservationMode, ObservationOutcome};
use custody_nullables::NullStore;
use custody_store::{CandidateStore, UtxoStore};
use custody_types::{Address, CandidateKey, UtxoKey};

fn signer(i: u8) -> Address {
    Address::new(format!("tz1signer{i}"))
}

fn candidate(c: u8) -> CandidateKey {
    CandidateKey::deposit(Address::new(format!("tz1receiver{c}")), 1000 + c as u128)
}

fn key() -> UtxoKey {
    UtxoKey::new(vec![7; 32], 0)
}

proptest! {
    /// Against a straightforward model: the key stays unconfirmed until one
    /// candidate collects `threshold` distinct signers, that candidate wins,
    /// and every later vote is rejected.
    #[test]
    fn promotion_matches_model(
        threshold in 1u32..5,
        votes in prop::collection::vec((0u8..8, 0u8..3), 0..40),
    ) {
        let engine = ObservationConsensus::new(threshold);
        let mut store = NullStore::new();

        let mut voted: BTreeSet<u8> = BTreeSet::new();
        let mut buckets: BTreeMap<u8, usize> = BTreeMap::new();
        let mut winner: Option<u8> = None;

        for (s, c) in votes {
            let result = engine.observe(
                &mut store,
                &key(),
                candidate(c),
                &signer(s),
                ObservationMode::Deposit,
            );
            if winner.is_some() {
                prop_assert!(matches!(result, Err(ConsensusError::UtxoAlreadyConfirmed(_))));
                continue;
            }
            if !voted.insert(s) {
                prop_assert!(
                    matches!(result, Err(ConsensusError::SignerAlreadyConfirmed { .. })),
                    "second vote from signer must be rejected"
                );
                continue;
            }
            let count = buckets.entry(c).or_default();
            *count += 1;
            if *count >= threshold as usize {
                winner = Some(c);
                prop_assert!(matches!(result, Ok(ObservationOutcome::Promoted(_))));
            } else {
                prop_assert_eq!(result.unwrap(), ObservationOutcome::Pending { approvals: *count });
            }
        }

        match winner {
            Some(c) => {
                let record = store.get_utxo(&key()).unwrap().unwrap();
                prop_assert_eq!(record.receiver, candidate(c).receiver);
                prop_assert_eq!(record.amount, candidate(c).amount);
                prop_assert!(store.get_candidates(&key()).unwrap().is_none());
            }
            None => {
                prop_assert!(store.get_utxo(&key()).unwrap().is_none());
                if let Some(pending) = store.get_candidates(&key()).unwrap() {
                    prop_assert!(pending.is_consistent());
                    prop_assert!(pending.candidates.values().all(|b| b.len() < threshold as usize));
                }
            }
        }
    }

    /// Reordering the approvers of the winning candidate never changes the
    /// promoted record.
    #[test]
    fn promotion_is_order_insensitive_within_candidate(
        threshold in 1u32..6,
        seed in any::<u64>(),
    ) {
        let mut order: Vec<u8> = (0..threshold as u8).collect();
        // Deterministic shuffle driven by the seed.
        let mut state = seed;
        for i in (1..order.len()).rev() {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1);
            let j = (state >> 33) as usize % (i + 1);
            order.swap(i, j);
        }

        let engine = ObservationConsensus::new(threshold);
        let mut store = NullStore::new();
        let mut last = None;
        for s in order {
            last = Some(
                engine
                    .observe(&mut store, &key(), candidate(1), &signer(s), ObservationMode::Deposit)
                    .unwrap(),
            );
        }
        prop_assert!(last.unwrap().is_promoted());
        prop_assert_eq!(store.get_utxo(&key()).unwrap().unwrap().amount, candidate(1).amount);
    }
}
