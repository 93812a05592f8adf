//! Set of tokens approved for staking.
//!
//! Authorization is enforced by the owning contract; this module only keeps
//! the membership flag and an ordered listing consistent with each other.

use alloc::vec::Vec;
use odra::prelude::*;

#[odra::module]
pub struct TokenRegistry {
    allowed: Mapping<Address, bool>,
    listing: Var<Vec<Address>>,
}

#[odra::module]
impl TokenRegistry {
    pub fn is_allowed(&self, token: &Address) -> bool {
        self.allowed.get(token).unwrap_or_default()
    }

    pub fn tokens(&self) -> Vec<Address> {
        self.listing.get_or_default()
    }

    /// Returns false if the token was already listed.
    pub fn add(&mut self, token: &Address) -> bool {
        if self.is_allowed(token) {
            return false;
        }
        self.allowed.set(token, true);
        let mut listing = self.listing.get_or_default();
        listing.push(*token);
        self.listing.set(listing);
        true
    }

    /// Returns false if the token was not listed.
    pub fn remove(&mut self, token: &Address) -> bool {
        if !self.is_allowed(token) {
            return false;
        }
        self.allowed.set(token, false);
        let mut listing = self.listing.get_or_default();
        listing.retain(|t| t != token);
        self.listing.set(listing);
        true
    }
}
