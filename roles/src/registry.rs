//! Role registry: the reference access-control collaborator.

use crate::access::AccessControl;
use crate::error::RoleError;
use custody_types::Address;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::info;

/// Membership status of an administrator entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AdminStatus {
    /// Proposed by a set admin, not yet accepted.
    Proposed,
    /// Active administrator.
    Set,
}

/// Administrators, gatekeepers and trusted signers.
///
/// Every mutating method takes the caller and checks it first; a failed
/// check leaves the registry untouched.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RoleRegistry {
    admins: BTreeMap<Address, AdminStatus>,
    gatekeepers: BTreeSet<Address>,
    trusted_signers: BTreeSet<Address>,
}

impl RoleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry bootstrapped with already-set administrators.
    pub fn with_admins(admins: impl IntoIterator<Item = Address>) -> Self {
        Self {
            admins: admins
                .into_iter()
                .map(|a| (a, AdminStatus::Set))
                .collect(),
            ..Self::default()
        }
    }

    /// A registry with every role populated up front, as loaded from
    /// configuration.
    pub fn with_members(
        admins: impl IntoIterator<Item = Address>,
        gatekeepers: impl IntoIterator<Item = Address>,
        trusted_signers: impl IntoIterator<Item = Address>,
    ) -> Self {
        Self {
            gatekeepers: gatekeepers.into_iter().collect(),
            trusted_signers: trusted_signers.into_iter().collect(),
            ..Self::with_admins(admins)
        }
    }

    /// Number of set (not merely proposed) administrators.
    pub fn admin_count(&self) -> usize {
        self.admins
            .values()
            .filter(|s| **s == AdminStatus::Set)
            .count()
    }

    pub fn admin_status(&self, address: &Address) -> Option<AdminStatus> {
        self.admins.get(address).copied()
    }

    pub fn gatekeepers(&self) -> impl Iterator<Item = &Address> {
        self.gatekeepers.iter()
    }

    pub fn trusted_signers(&self) -> impl Iterator<Item = &Address> {
        self.trusted_signers.iter()
    }

    fn require_admin(&self, caller: &Address) -> Result<(), RoleError> {
        if self.is_admin(caller) {
            Ok(())
        } else {
            Err(RoleError::NotAdmin(caller.to_string()))
        }
    }

    /// Propose `proposed` as a new administrator.
    pub fn propose_administrator(
        &mut self,
        caller: &Address,
        proposed: &Address,
    ) -> Result<(), RoleError> {
        self.require_admin(caller)?;
        if self.admins.contains_key(proposed) {
            return Err(RoleError::AlreadyAdmin(proposed.to_string()));
        }
        self.admins.insert(proposed.clone(), AdminStatus::Proposed);
        info!(proposer = %caller, proposed = %proposed, "administrator proposed");
        Ok(())
    }

    /// Accept a pending proposal; the caller becomes a set administrator.
    pub fn accept_admin_proposal(&mut self, caller: &Address) -> Result<(), RoleError> {
        match self.admins.get_mut(caller) {
            Some(status @ AdminStatus::Proposed) => {
                *status = AdminStatus::Set;
                info!(admin = %caller, "administrator proposal accepted");
                Ok(())
            }
            _ => Err(RoleError::NotProposedAdmin(caller.to_string())),
        }
    }

    /// Remove an administrator or withdraw a pending proposal.
    ///
    /// Removing a set administrator fails while it is the only one left.
    pub fn remove_administrator(
        &mut self,
        caller: &Address,
        target: &Address,
    ) -> Result<(), RoleError> {
        self.require_admin(caller)?;
        if self.admins.get(target) == Some(&AdminStatus::Set) && self.admin_count() <= 1 {
            return Err(RoleError::CannotRemoveLastAdmin);
        }
        if self.admins.remove(target).is_some() {
            info!(remover = %caller, removed = %target, "administrator removed");
        }
        Ok(())
    }

    pub fn add_gatekeeper(&mut self, caller: &Address, gatekeeper: &Address) -> Result<(), RoleError> {
        self.require_admin(caller)?;
        self.gatekeepers.insert(gatekeeper.clone());
        info!(gatekeeper = %gatekeeper, "gatekeeper added");
        Ok(())
    }

    pub fn remove_gatekeeper(
        &mut self,
        caller: &Address,
        gatekeeper: &Address,
    ) -> Result<(), RoleError> {
        self.require_admin(caller)?;
        self.gatekeepers.remove(gatekeeper);
        info!(gatekeeper = %gatekeeper, "gatekeeper removed");
        Ok(())
    }

    pub fn add_trusted_signer(&mut self, caller: &Address, signer: &Address) -> Result<(), RoleError> {
        self.require_admin(caller)?;
        self.trusted_signers.insert(signer.clone());
        info!(signer = %signer, "trusted signer added");
        Ok(())
    }

    pub fn remove_trusted_signer(
        &mut self,
        caller: &Address,
        signer: &Address,
    ) -> Result<(), RoleError> {
        self.require_admin(caller)?;
        self.trusted_signers.remove(signer);
        info!(signer = %signer, "trusted signer removed");
        Ok(())
    }
}

impl AccessControl for RoleRegistry {
    fn is_admin(&self, address: &Address) -> bool {
        self.admins.get(address) == Some(&AdminStatus::Set)
    }

    fn is_gatekeeper(&self, address: &Address) -> bool {
        self.gatekeepers.contains(address)
    }

    fn is_trusted_signer(&self, address: &Address) -> bool {
        self.trusted_signers.contains(address)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(s: &str) -> Address {
        Address::new(format!("tz1{s}"))
    }

    #[test]
    fn two_step_admin_promotion() {
        let mut reg = RoleRegistry::with_admins([addr("root")]);
        reg.propose_administrator(&addr("root"), &addr("bob")).unwrap();
        assert!(!reg.is_admin(&addr("bob")));
        assert_eq!(reg.admin_status(&addr("bob")), Some(AdminStatus::Proposed));

        reg.accept_admin_proposal(&addr("bob")).unwrap();
        assert!(reg.is_admin(&addr("bob")));
        assert_eq!(reg.admin_count(), 2);
    }

    #[test]
    fn proposing_existing_admin_conflicts() {
        let mut reg = RoleRegistry::with_admins([addr("root")]);
        assert_eq!(
            reg.propose_administrator(&addr("root"), &addr("root")),
            Err(RoleError::AlreadyAdmin(addr("root").to_string()))
        );
        reg.propose_administrator(&addr("root"), &addr("bob")).unwrap();
        assert!(matches!(
            reg.propose_administrator(&addr("root"), &addr("bob")),
            Err(RoleError::AlreadyAdmin(_))
        ));
    }

    #[test]
    fn accept_without_proposal_fails() {
        let mut reg = RoleRegistry::with_admins([addr("root")]);
        assert!(matches!(
            reg.accept_admin_proposal(&addr("eve")),
            Err(RoleError::NotProposedAdmin(_))
        ));
        assert!(matches!(
            reg.accept_admin_proposal(&addr("root")),
            Err(RoleError::NotProposedAdmin(_))
        ));
    }

    #[test]
    fn last_admin_cannot_be_removed() {
        let mut reg = RoleRegistry::with_admins([addr("root")]);
        assert_eq!(
            reg.remove_administrator(&addr("root"), &addr("root")),
            Err(RoleError::CannotRemoveLastAdmin)
        );

        reg.propose_administrator(&addr("root"), &addr("bob")).unwrap();
        // A pending proposal does not count as a second admin.
        assert_eq!(
            reg.remove_administrator(&addr("root"), &addr("root")),
            Err(RoleError::CannotRemoveLastAdmin)
        );
        // But it can be withdrawn.
        reg.remove_administrator(&addr("root"), &addr("bob")).unwrap();
        assert_eq!(reg.admin_status(&addr("bob")), None);

        reg.propose_administrator(&addr("root"), &addr("bob")).unwrap();
        reg.accept_admin_proposal(&addr("bob")).unwrap();
        reg.remove_administrator(&addr("bob"), &addr("root")).unwrap();
        assert!(!reg.is_admin(&addr("root")));
        assert_eq!(reg.admin_count(), 1);
    }

    #[test]
    fn bootstrap_from_member_lists() {
        let reg = RoleRegistry::with_members([addr("root")], [addr("gk")], [addr("s1"), addr("s2")]);
        assert!(reg.is_admin(&addr("root")));
        assert!(reg.is_gatekeeper(&addr("gk")));
        assert_eq!(reg.trusted_signers().count(), 2);
    }

    #[test]
    fn only_admins_manage_roles() {
        let mut reg = RoleRegistry::with_admins([addr("root")]);
        assert!(matches!(
            reg.add_gatekeeper(&addr("eve"), &addr("eve")),
            Err(RoleError::NotAdmin(_))
        ));
        assert!(!reg.is_gatekeeper(&addr("eve")));

        reg.add_gatekeeper(&addr("root"), &addr("gk")).unwrap();
        reg.add_trusted_signer(&addr("root"), &addr("s1")).unwrap();
        assert!(reg.is_gatekeeper(&addr("gk")));
        assert!(reg.is_trusted_signer(&addr("s1")));
        assert!(!reg.is_trusted_signer(&addr("gk")));

        reg.remove_gatekeeper(&addr("root"), &addr("gk")).unwrap();
        reg.remove_trusted_signer(&addr("root"), &addr("s1")).unwrap();
        assert_eq!(reg.gatekeepers().count(), 0);
        assert_eq!(reg.trusted_signers().count(), 0);
    }
}
