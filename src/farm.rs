//! TokenFarm: staking ledger with oracle-based valuation
//!
//! - Admins curate the set of stakeable tokens and bind a price feed to each
//! - Users stake allowed tokens after approving the farm as spender
//! - Views value a user's stake per token and in aggregate
//! - Admins can pay rewards in the home token, minted by the farm
//!
//! ## Units
//! Balances are kept in each token's base units. Values are
//! `balance * price / 10^token_decimals`, i.e. denominated in the raw units
//! of the token's feed. Rewards mint that value as home-token base units.
//!
//! ## Delisting
//! Removing a token from the allow-list keeps balances and the feed binding.
//! Delisted tokens stop contributing to `get_user_total_value` and cannot be
//! staked or valued individually, but can still be unstaked.

use alloc::vec::Vec;
use odra::casper_types::U256;
use odra::prelude::*;
use odra::ContractRef;

use odra_modules::access::events::{RoleGranted, RoleRevoked};
use odra_modules::access::{AccessControl, Role, DEFAULT_ADMIN_ROLE};

use crate::price_feed::{PriceFeedContractRef, PriceFeedRegistry};
use crate::registry::TokenRegistry;
use crate::tokens::{Cep18TokenContractRef, QbmTokenContractRef, MINTER_ROLE};
use crate::valuation::{self, TokenValue};

// ==========================================
// Events
// ==========================================

pub mod events {
    use odra::casper_types::U256;
    use odra::prelude::*;

    #[odra::event]
    pub struct TokenAllowed {
        pub token: Address,
    }

    #[odra::event]
    pub struct TokenRemoved {
        pub token: Address,
    }

    #[odra::event]
    pub struct PriceFeedSet {
        pub token: Address,
        pub price_feed: Address,
    }

    #[odra::event]
    pub struct Staked {
        pub user: Address,
        pub token: Address,
        pub amount: U256,
        pub new_balance: U256,
    }

    #[odra::event]
    pub struct Unstaked {
        pub user: Address,
        pub token: Address,
        pub amount: U256,
    }

    #[odra::event]
    pub struct RewardsIssued {
        pub user: Address,
        pub amount: U256,
    }
}

// ==========================================
// Errors
// ==========================================

#[odra::odra_error]
pub enum FarmError {
    Unauthorized = 1,
    TokenNotAllowed = 2,
    InvalidAmount = 3,
    InsufficientAllowance = 4,
    NoPriceFeed = 5,
    NothingStaked = 6,
    Overflow = 7,
}

impl FarmError {
    pub fn message(&self) -> &'static str {
        match self {
            FarmError::Unauthorized => "TokenFarm: Only admins can call this function.",
            FarmError::TokenNotAllowed => "TokenFarm: Token is not allowed.",
            FarmError::InvalidAmount => "TokenFarm: Amount must be greater than zero.",
            FarmError::InsufficientAllowance => "TokenFarm: Insufficient allowance.",
            FarmError::NoPriceFeed => "TokenFarm: No price feed set for token.",
            FarmError::NothingStaked => "TokenFarm: Nothing staked for token.",
            FarmError::Overflow => "TokenFarm: Arithmetic overflow.",
        }
    }
}

// ==========================================
// Contract
// ==========================================

#[odra::module(
    events = [
        events::TokenAllowed,
        events::TokenRemoved,
        events::PriceFeedSet,
        events::Staked,
        events::Unstaked,
        events::RewardsIssued,
        RoleGranted,
        RoleRevoked
    ],
    errors = FarmError
)]
pub struct TokenFarm {
    home_token: Var<Address>,

    access: SubModule<AccessControl>,
    registry: SubModule<TokenRegistry>,
    price_feeds: SubModule<PriceFeedRegistry>,

    // (user, token) -> staked amount in token base units
    balances: Mapping<(Address, Address), U256>,
    // user -> tokens with a nonzero stake
    staked_tokens: Mapping<Address, Vec<Address>>,
    // users with at least one nonzero stake, unordered
    stakers: List<Address>,
    // staker -> position in `stakers`
    staker_index: Mapping<Address, u32>,
}

#[odra::module]
impl TokenFarm {
    /// Deployer becomes Admin; `home_token` starts out allowed.
    pub fn init(&mut self, home_token: Address) {
        let deployer = self.env().caller();
        self.access.unchecked_grant_role(&DEFAULT_ADMIN_ROLE, &deployer);
        self.home_token.set(home_token);
        if self.registry.add(&home_token) {
            self.env().emit_event(events::TokenAllowed { token: home_token });
        }
    }

    // ==========================================
    // Token registry
    // ==========================================

    pub fn add_allowed_token(&mut self, token: Address) {
        self.require_admin();
        if self.registry.add(&token) {
            self.env().emit_event(events::TokenAllowed { token });
        }
    }

    pub fn remove_allowed_token(&mut self, token: Address) {
        self.require_admin();
        if self.registry.remove(&token) {
            self.env().emit_event(events::TokenRemoved { token });
        }
    }

    pub fn token_is_allowed(&self, token: Address) -> bool {
        self.registry.is_allowed(&token)
    }

    pub fn allowed_tokens(&self) -> Vec<Address> {
        self.registry.tokens()
    }

    pub fn home_token(&self) -> Option<Address> {
        self.home_token.get()
    }

    // ==========================================
    // Price feeds
    // ==========================================

    /// Bind `price_feed` to `token`, replacing any previous binding.
    pub fn set_price_feed(&mut self, token: Address, price_feed: Address) {
        self.require_admin();
        self.require_allowed(&token);
        self.price_feeds.bind(&token, &price_feed);
        self.env()
            .emit_event(events::PriceFeedSet { token, price_feed });
    }

    pub fn price_feed_of(&self, token: Address) -> Option<Address> {
        self.price_feeds.feed_of(&token)
    }

    // ==========================================
    // Valuation
    // ==========================================

    /// Latest answer of the token's feed, unscaled.
    pub fn get_token_value(&self, token: Address) -> TokenValue {
        self.require_allowed(&token);
        self.quote(&token)
    }

    pub fn get_user_single_token_value(&self, user: Address, token: Address) -> U256 {
        self.require_allowed(&token);
        let balance = self.balances.get(&(user, token)).unwrap_or_default();
        if balance.is_zero() {
            return U256::zero();
        }
        self.stake_value(&token, balance)
    }

    /// Sum over the user's staked tokens that are still allowed and priced.
    pub fn get_user_total_value(&self, user: Address) -> U256 {
        let values = self
            .staked_tokens
            .get(&user)
            .unwrap_or_default()
            .into_iter()
            .filter(|token| {
                self.registry.is_allowed(token) && self.price_feeds.feed_of(token).is_some()
            })
            .map(|token| {
                let balance = self.balances.get(&(user, token)).unwrap_or_default();
                self.stake_value(&token, balance)
            });
        valuation::total_value(values).unwrap_or_else(|| self.env().revert(FarmError::Overflow))
    }

    // ==========================================
    // Staking
    // ==========================================

    /// Pull `amount` of `token` from the caller into custody.
    /// The caller must have approved the farm for at least `amount`.
    pub fn stake_tokens(&mut self, amount: U256, token: Address) {
        let caller = self.env().caller();
        self.require_allowed(&token);
        if amount.is_zero() {
            self.env().revert(FarmError::InvalidAmount);
        }

        let farm = self.env().self_address();
        let mut asset = Cep18TokenContractRef::new(self.env().clone(), token);
        if asset.allowance(caller, farm) < amount {
            self.env().revert(FarmError::InsufficientAllowance);
        }

        let current = self.balances.get(&(caller, token)).unwrap_or_default();
        let new_balance = current
            .checked_add(amount)
            .unwrap_or_else(|| self.env().revert(FarmError::Overflow));

        asset.transfer_from(caller, farm, amount);

        if current.is_zero() {
            self.track_stake(caller, token);
        }
        self.balances.set(&(caller, token), new_balance);

        self.env().emit_event(events::Staked {
            user: caller,
            token,
            amount,
            new_balance,
        });
    }

    /// Return the caller's whole balance of `token`, listed or not.
    pub fn unstake_tokens(&mut self, token: Address) {
        let caller = self.env().caller();
        let balance = self.balances.get(&(caller, token)).unwrap_or_default();
        if balance.is_zero() {
            self.env().revert(FarmError::NothingStaked);
        }

        self.balances.set(&(caller, token), U256::zero());
        self.untrack_stake(caller, token);

        let mut asset = Cep18TokenContractRef::new(self.env().clone(), token);
        asset.transfer(caller, balance);

        self.env().emit_event(events::Unstaked {
            user: caller,
            token,
            amount: balance,
        });
    }

    /// Mint every staker its total value in home tokens.
    /// The farm must hold the Minter role on the home token.
    ///
    /// The reward is the raw value (see Units) minted as home-token base
    /// units: 2000 value pays 2000 base units, not 2000 whole QBM.
    pub fn issue_tokens(&mut self) {
        self.issue_tokens_batch(0, self.stakers.len());
    }

    /// Same as `issue_tokens` for stakers at positions `start..start + count`
    /// (clamped to the staker count), so large staker sets can be paid over
    /// several calls.
    pub fn issue_tokens_batch(&mut self, start: u32, count: u32) {
        self.require_admin();
        let home_token = self.home_token.get().unwrap_or_revert(&self.env());
        let mut home = QbmTokenContractRef::new(self.env().clone(), home_token);

        let end = start.saturating_add(count).min(self.stakers.len());
        for index in start..end {
            let Some(staker) = self.stakers.get(index) else {
                continue;
            };
            let amount = self.get_user_total_value(staker);
            if amount.is_zero() {
                continue;
            }
            home.mint(staker, amount);
            self.env().emit_event(events::RewardsIssued {
                user: staker,
                amount,
            });
        }
    }

    pub fn staking_balance(&self, user: Address, token: Address) -> U256 {
        self.balances.get(&(user, token)).unwrap_or_default()
    }

    pub fn staked_tokens_of(&self, user: Address) -> Vec<Address> {
        self.staked_tokens.get(&user).unwrap_or_default()
    }

    pub fn stakers(&self) -> Vec<Address> {
        self.stakers.iter().collect()
    }

    pub fn stakers_count(&self) -> u32 {
        self.stakers.len()
    }

    // ==========================================
    // Roles
    // ==========================================

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

    // ==========================================
    // Internal Functions
    // ==========================================

    fn require_admin(&self) {
        if !self.access.has_role(&DEFAULT_ADMIN_ROLE, &self.env().caller()) {
            self.env().revert(FarmError::Unauthorized);
        }
    }

    fn require_allowed(&self, token: &Address) {
        if !self.registry.is_allowed(token) {
            self.env().revert(FarmError::TokenNotAllowed);
        }
    }

    fn quote(&self, token: &Address) -> TokenValue {
        let feed_address = self
            .price_feeds
            .feed_of(token)
            .unwrap_or_else(|| self.env().revert(FarmError::NoPriceFeed));
        let feed = PriceFeedContractRef::new(self.env().clone(), feed_address);
        TokenValue {
            price: feed.latest_answer(),
            decimals: feed.decimals(),
        }
    }

    fn stake_value(&self, token: &Address, balance: U256) -> U256 {
        let quote = self.quote(token);
        let token_decimals = Cep18TokenContractRef::new(self.env().clone(), *token).decimals();
        valuation::stake_value(balance, quote.price, token_decimals)
            .unwrap_or_else(|| self.env().revert(FarmError::Overflow))
    }

    fn track_stake(&mut self, user: Address, token: Address) {
        let mut tokens = self.staked_tokens.get(&user).unwrap_or_default();
        if tokens.is_empty() {
            self.staker_index.set(&user, self.stakers.len());
            self.stakers.push(user);
        }
        if !tokens.contains(&token) {
            tokens.push(token);
        }
        self.staked_tokens.set(&user, tokens);
    }

    fn untrack_stake(&mut self, user: Address, token: Address) {
        let mut tokens = self.staked_tokens.get(&user).unwrap_or_default();
        tokens.retain(|t| *t != token);
        if tokens.is_empty() {
            self.remove_staker(user);
        }
        self.staked_tokens.set(&user, tokens);
    }

    // Swap-remove: the last staker takes the leaver's slot.
    fn remove_staker(&mut self, user: Address) {
        let index = self.staker_index.get(&user).unwrap_or_revert(&self.env());
        if let Some(last) = self.stakers.pop() {
            if last != user {
                self.stakers.replace(index, last);
                self.staker_index.set(&last, index);
            }
        }
    }
}
