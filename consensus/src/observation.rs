//! Observation engine: per-key candidate voting with first-to-threshold promotion.

use crate::error::ConsensusError;
use custody_store::{CandidateStore, UtxoStore};
use custody_types::{Address, CandidateKey, UtxoKey, UtxoRecord, UtxoState};
use tracing::{debug, info};

/// Which kind of external output is being observed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ObservationMode {
    /// A user deposit. Candidates carry a receiver and promote to `Initial`.
    Deposit,
    /// A change output of a custody spend. Candidates carry no receiver and
    /// promote straight to `SpentForMint`, ready for the next burn.
    Change,
}

impl ObservationMode {
    /// State a winning candidate is written with.
    pub fn promote_state(self) -> UtxoState {
        match self {
            Self::Deposit => UtxoState::Initial,
            Self::Change => UtxoState::SpentForMint,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Deposit => "deposit",
            Self::Change => "change",
        }
    }
}

/// Result of a single observation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ObservationOutcome {
    /// Vote recorded; the reported candidate now has `approvals` signers.
    Pending { approvals: usize },
    /// The reported candidate reached the threshold and is now confirmed.
    Promoted(UtxoRecord),
    /// The key was already confirmed and the observation was ignored.
    Skipped,
}

impl ObservationOutcome {
    pub fn is_promoted(&self) -> bool {
        matches!(self, Self::Promoted(_))
    }
}

/// Aggregates signer reports into confirmed UTXO records.
///
/// The engine holds no state of its own: pending candidates and confirmed
/// records both live in the store it is handed.
#[derive(Clone, Copy, Debug)]
pub struct ObservationConsensus {
    threshold: u32,
}

impl ObservationConsensus {
    pub fn new(threshold: u32) -> Self {
        Self { threshold }
    }

    /// Record `reporter`'s claim that `key` holds `candidate`.
    ///
    /// Fails if `key` is already confirmed, or if `reporter` has already
    /// voted for any candidate of `key`. A signer cannot change its vote.
    pub fn observe<S>(
        &self,
        store: &mut S,
        key: &UtxoKey,
        candidate: CandidateKey,
        reporter: &Address,
        mode: ObservationMode,
    ) -> Result<ObservationOutcome, ConsensusError>
    where
        S: UtxoStore + CandidateStore + ?Sized,
    {
        if store.contains_utxo(key)? {
            return Err(ConsensusError::UtxoAlreadyConfirmed(key.to_string()));
        }

        let mut pending = store.get_candidates(key)?.unwrap_or_default();
        if pending.has_voted(reporter) {
            return Err(ConsensusError::SignerAlreadyConfirmed {
                signer: reporter.to_string(),
                utxo: key.to_string(),
            });
        }

        let approvals = pending.record_vote(reporter.clone(), candidate.clone());
        debug!(
            utxo = %key,
            signer = %reporter,
            mode = mode.name(),
            approvals,
            threshold = self.threshold,
            "observation recorded"
        );

        if approvals as u64 >= u64::from(self.threshold) {
            let record = candidate.into_record(mode.promote_state());
            promote(store, key, &record)?;
            info!(
                utxo = %key,
                state = %record.state,
                amount = record.amount,
                discarded_candidates = pending.candidates.len() - 1,
                "UTXO confirmed by signer threshold"
            );
            Ok(ObservationOutcome::Promoted(record))
        } else {
            store.put_candidates(key, &pending)?;
            Ok(ObservationOutcome::Pending { approvals })
        }
    }

    /// Like [`observe`](Self::observe), but an already confirmed key is
    /// skipped instead of rejected. Used for batched change reports, which
    /// signers may resubmit after the batch was partly confirmed.
    pub fn observe_unsettled<S>(
        &self,
        store: &mut S,
        key: &UtxoKey,
        candidate: CandidateKey,
        reporter: &Address,
        mode: ObservationMode,
    ) -> Result<ObservationOutcome, ConsensusError>
    where
        S: UtxoStore + CandidateStore + ?Sized,
    {
        if store.contains_utxo(key)? {
            debug!(utxo = %key, signer = %reporter, "skipping already confirmed UTXO");
            return Ok(ObservationOutcome::Skipped);
        }
        self.observe(store, key, candidate, reporter, mode)
    }
}

/// Replace the pending candidate set of `key` with its confirmed record.
///
/// The candidate set goes away as a whole: losing candidates and their
/// votes are not kept anywhere.
fn promote<S>(store: &mut S, key: &UtxoKey, record: &UtxoRecord) -> Result<(), ConsensusError>
where
    S: UtxoStore + CandidateStore + ?Sized,
{
    store.put_utxo(key, record)?;
    store.delete_candidates(key)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use custody_nullables::NullStore;

    fn addr(name: &str) -> Address {
        Address::new(format!("tz1{name}"))
    }

    fn key() -> UtxoKey {
        UtxoKey::new(vec![0xaa; 32], 1)
    }

    #[test]
    fn competing_candidates_first_to_threshold_wins() {
        let engine = ObservationConsensus::new(2);
        let mut store = NullStore::new();
        let bob = CandidateKey::deposit(addr("bob"), 1000);
        let alice = CandidateKey::deposit(addr("alice"), 1000);

        let r1 = engine
            .observe(&mut store, &key(), bob.clone(), &addr("s1"), ObservationMode::Deposit)
            .unwrap();
        assert_eq!(r1, ObservationOutcome::Pending { approvals: 1 });
        engine
            .observe(&mut store, &key(), alice, &addr("s2"), ObservationMode::Deposit)
            .unwrap();
        assert!(store.get_utxo(&key()).unwrap().is_none());

        let r3 = engine
            .observe(&mut store, &key(), bob, &addr("s3"), ObservationMode::Deposit)
            .unwrap();
        assert!(r3.is_promoted());

        let record = store.get_utxo(&key()).unwrap().unwrap();
        assert_eq!(record.state, UtxoState::Initial);
        assert_eq!(record.receiver, Some(addr("bob")));
        assert_eq!(record.amount, 1000);
        assert!(store.get_candidates(&key()).unwrap().is_none());
    }

    #[test]
    fn confirmed_key_rejects_further_votes() {
        let engine = ObservationConsensus::new(1);
        let mut store = NullStore::new();
        engine
            .observe(
                &mut store,
                &key(),
                CandidateKey::change(10),
                &addr("s1"),
                ObservationMode::Change,
            )
            .unwrap();
        let err = engine
            .observe(
                &mut store,
                &key(),
                CandidateKey::change(10),
                &addr("s2"),
                ObservationMode::Change,
            )
            .unwrap_err();
        assert!(matches!(err, ConsensusError::UtxoAlreadyConfirmed(_)));
    }

    #[test]
    fn signer_cannot_vote_twice_even_for_other_content() {
        let engine = ObservationConsensus::new(3);
        let mut store = NullStore::new();
        engine
            .observe(
                &mut store,
                &key(),
                CandidateKey::deposit(addr("bob"), 1000),
                &addr("s1"),
                ObservationMode::Deposit,
            )
            .unwrap();
        let err = engine
            .observe(
                &mut store,
                &key(),
                CandidateKey::deposit(addr("mallory"), 1000),
                &addr("s1"),
                ObservationMode::Deposit,
            )
            .unwrap_err();
        assert!(matches!(err, ConsensusError::SignerAlreadyConfirmed { .. }));

        let pending = store.get_candidates(&key()).unwrap().unwrap();
        assert_eq!(pending.approvers.len(), 1);
        assert_eq!(pending.candidates.len(), 1);
    }

    #[test]
    fn change_mode_promotes_to_spendable() {
        let engine = ObservationConsensus::new(2);
        let mut store = NullStore::new();
        for s in ["s1", "s2"] {
            engine
                .observe(
                    &mut store,
                    &key(),
                    CandidateKey::change(4200),
                    &addr(s),
                    ObservationMode::Change,
                )
                .unwrap();
        }
        let record = store.get_utxo(&key()).unwrap().unwrap();
        assert_eq!(record.state, UtxoState::SpentForMint);
        assert!(record.receiver.is_none());
    }

    #[test]
    fn unsettled_variant_skips_confirmed_keys() {
        let engine = ObservationConsensus::new(1);
        let mut store = NullStore::new();
        let first = engine
            .observe_unsettled(
                &mut store,
                &key(),
                CandidateKey::change(1),
                &addr("s1"),
                ObservationMode::Change,
            )
            .unwrap();
        assert!(first.is_promoted());
        let second = engine
            .observe_unsettled(
                &mut store,
                &key(),
                CandidateKey::change(999),
                &addr("s2"),
                ObservationMode::Change,
            )
            .unwrap();
        assert_eq!(second, ObservationOutcome::Skipped);
        assert_eq!(store.get_utxo(&key()).unwrap().unwrap().amount, 1);
    }

    #[test]
    fn zero_threshold_promotes_on_first_vote() {
        let engine = ObservationConsensus::new(0);
        let mut store = NullStore::new();
        let outcome = engine
            .observe(
                &mut store,
                &key(),
                CandidateKey::change(5),
                &addr("s1"),
                ObservationMode::Change,
            )
            .unwrap();
        assert!(outcome.is_promoted());
    }
}
