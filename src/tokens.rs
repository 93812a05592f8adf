//! CEP-18 tokens: QBM (home token) and TestToken
//!
//! - QBM: minting gated by the Minter role
//! - TestToken: faucet token with configurable metadata, used as a second
//!   stakeable asset

use alloc::string::String;
use odra::casper_types::U256;
use odra::prelude::*;
use odra_modules::access::events::{RoleGranted, RoleRevoked};
use odra_modules::access::{AccessControl, Role, DEFAULT_ADMIN_ROLE};
use odra_modules::cep18::events::{Mint, SetAllowance, Transfer, TransferFrom};
use odra_modules::cep18_token::Cep18;

/// Role allowed to mint QBM: `"MINTER_ROLE"` right-padded with zeros.
pub const MINTER_ROLE: Role = role_id(b"MINTER_ROLE");

const fn role_id(name: &[u8]) -> Role {
    let mut id = [0u8; 32];
    let mut i = 0;
    while i < name.len() {
        id[i] = name[i];
        i += 1;
    }
    id
}

/// Token surface the farm consumes from any stakeable CEP-18 contract.
#[odra::external_contract]
pub trait Cep18Token {
    fn decimals(&self) -> u8;
    fn allowance(&self, owner: Address, spender: Address) -> U256;
    fn transfer(&mut self, recipient: Address, amount: U256);
    fn transfer_from(&mut self, owner: Address, recipient: Address, amount: U256);
}

#[odra::odra_error]
pub enum TokenError {
    Unauthorized = 60001,
}

impl TokenError {
    pub fn message(&self) -> &'static str {
        match self {
            TokenError::Unauthorized => "Only a minter can mint.",
        }
    }
}

/// QBM: home token of the farm. Deployer starts as Admin and Minter.
#[odra::module(
    events = [Mint, SetAllowance, Transfer, TransferFrom, RoleGranted, RoleRevoked],
    errors = TokenError
)]
pub struct QbmToken {
    token: SubModule<Cep18>,
    access: SubModule<AccessControl>,
}

#[odra::module]
impl QbmToken {
    pub fn init(&mut self) {
        self.token
            .init("QBM".to_string(), "QBM Token".to_string(), 18u8, U256::zero());
        let deployer = self.env().caller();
        self.access.unchecked_grant_role(&DEFAULT_ADMIN_ROLE, &deployer);
        self.access.unchecked_grant_role(&MINTER_ROLE, &deployer);
    }

    pub fn name(&self) -> String {
        self.token.name()
    }

    pub fn symbol(&self) -> String {
        self.token.symbol()
    }

    pub fn decimals(&self) -> u8 {
        self.token.decimals()
    }

    pub fn total_supply(&self) -> U256 {
        self.token.total_supply()
    }

    pub fn balance_of(&self, owner: Address) -> U256 {
        self.token.balance_of(&owner)
    }

    pub fn allowance(&self, owner: Address, spender: Address) -> U256 {
        self.token.allowance(&owner, &spender)
    }

    pub fn transfer(&mut self, recipient: Address, amount: U256) {
        self.token.transfer(&recipient, &amount);
    }

    pub fn approve(&mut self, spender: Address, amount: U256) {
        self.token.approve(&spender, &amount);
    }

    pub fn transfer_from(&mut self, owner: Address, recipient: Address, amount: U256) {
        self.token.transfer_from(&owner, &recipient, &amount);
    }

    /// Mint to `to`. Requires the Minter role; Admin alone is not enough.
    pub fn mint(&mut self, to: Address, amount: U256) {
        let caller = self.env().caller();
        if !self.access.has_role(&MINTER_ROLE, &caller) {
            self.env().revert(TokenError::Unauthorized);
        }
        self.token.raw_mint(&to, &amount);
    }

    pub fn default_admin_role(&self) -> Role {
        DEFAULT_ADMIN_ROLE
    }

    pub fn minter_role(&self) -> Role {
        MINTER_ROLE
    }

    pub fn has_role(&self, role: Role, account: Address) -> bool {
        self.access.has_role(&role, &account)
    }

    pub fn get_role_admin(&self, role: Role) -> Role {
        self.access.get_role_admin(&role)
    }

    pub fn grant_role(&mut self, role: Role, account: Address) {
        self.access.grant_role(&role, &account);
    }

    pub fn revoke_role(&mut self, role: Role, account: Address) {
        self.access.revoke_role(&role, &account);
    }

    /// `account` must be the caller.
    pub fn renounce_role(&mut self, role: Role, account: Address) {
        self.access.renounce_role(&role, &account);
    }
}

/// TestToken: anyone can call `faucet_mint`.
#[odra::module(events = [Mint, SetAllowance, Transfer, TransferFrom])]
pub struct TestToken {
    token: SubModule<Cep18>,
}

#[odra::module]
impl TestToken {
    pub fn init(&mut self, name: String, symbol: String, decimals: u8) {
        self.token.init(symbol, name, decimals, U256::zero());
    }

    pub fn name(&self) -> String {
        self.token.name()
    }

    pub fn symbol(&self) -> String {
        self.token.symbol()
    }

    pub fn decimals(&self) -> u8 {
        self.token.decimals()
    }

    pub fn total_supply(&self) -> U256 {
        self.token.total_supply()
    }

    pub fn balance_of(&self, owner: Address) -> U256 {
        self.token.balance_of(&owner)
    }

    pub fn allowance(&self, owner: Address, spender: Address) -> U256 {
        self.token.allowance(&owner, &spender)
    }

    pub fn transfer(&mut self, recipient: Address, amount: U256) {
        self.token.transfer(&recipient, &amount);
    }

    pub fn approve(&mut self, spender: Address, amount: U256) {
        self.token.approve(&spender, &amount);
    }

    pub fn transfer_from(&mut self, owner: Address, recipient: Address, amount: U256) {
        self.token.transfer_from(&owner, &recipient, &amount);
    }

    pub fn faucet_mint(&mut self, to: Address, amount: U256) {
        self.token.raw_mint(&to, &amount);
    }
}
