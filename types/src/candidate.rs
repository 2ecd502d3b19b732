//! Pending observation votes for a single UTXO key.

use crate::address::Address;
use crate::utxo::CandidateKey;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// All pending votes for one UTXO key.
///
/// `approvers` is the union of every candidate's approver set, and each
/// approver appears in exactly one candidate bucket. The consensus engine
/// rejects a second vote from the same signer before calling
/// [`CandidateSet::record_vote`], which is what keeps the buckets disjoint.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateSet {
    pub approvers: BTreeSet<Address>,
    pub candidates: BTreeMap<CandidateKey, BTreeSet<Address>>,
}

impl CandidateSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `signer` already voted for any candidate of this key.
    pub fn has_voted(&self, signer: &Address) -> bool {
        self.approvers.contains(signer)
    }

    /// Record a vote and return the candidate's approval count afterwards.
    pub fn record_vote(&mut self, signer: Address, candidate: CandidateKey) -> usize {
        self.approvers.insert(signer.clone());
        self.candidates
            .entry(candidate.clone())
            .or_default()
            .insert(signer);
        self.approvals(&candidate)
    }

    /// Number of distinct signers backing `candidate`.
    pub fn approvals(&self, candidate: &CandidateKey) -> usize {
        self.candidates.get(candidate).map_or(0, BTreeSet::len)
    }

    /// Check the bucket invariants: buckets are disjoint and their union is
    /// exactly `approvers`.
    pub fn is_consistent(&self) -> bool {
        let mut seen = BTreeSet::new();
        for bucket in self.candidates.values() {
            for signer in bucket {
                if !seen.insert(signer) {
                    return false;
                }
            }
        }
        seen.len() == self.approvers.len() && seen.into_iter().all(|s| self.approvers.contains(s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(s: &str) -> Address {
        Address::new(format!("tz1{s}"))
    }

    #[test]
    fn votes_accumulate_per_candidate() {
        let mut set = CandidateSet::new();
        let bob = CandidateKey::deposit(addr("bob"), 1000);
        let alice = CandidateKey::deposit(addr("alice"), 1000);

        assert_eq!(set.record_vote(addr("s1"), bob.clone()), 1);
        assert_eq!(set.record_vote(addr("s2"), alice.clone()), 1);
        assert_eq!(set.record_vote(addr("s3"), bob.clone()), 2);

        assert_eq!(set.approvals(&bob), 2);
        assert_eq!(set.approvals(&alice), 1);
        assert!(set.has_voted(&addr("s2")));
        assert!(!set.has_voted(&addr("s4")));
        assert!(set.is_consistent());
    }

    #[test]
    fn double_bucket_membership_is_inconsistent() {
        let mut set = CandidateSet::new();
        set.record_vote(addr("s1"), CandidateKey::change(1));
        set.record_vote(addr("s1"), CandidateKey::change(2));
        assert!(!set.is_consistent());
    }

    #[test]
    fn empty_set_is_consistent() {
        let set = CandidateSet::new();
        assert!(set.is_consistent());
    }
}
