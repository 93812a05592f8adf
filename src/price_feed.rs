//! Price feed interface, per-token feed bindings and a settable mock feed.
//!
//! A feed reports a raw integer answer together with the number of decimals
//! the answer is expressed in. The farm never rescales the answer itself.

use odra::casper_types::U256;
use odra::prelude::*;

/// External price feed contract (Chainlink aggregator shaped).
#[odra::external_contract]
pub trait PriceFeed {
    /// Latest reported price, raw.
    fn latest_answer(&self) -> U256;

    /// Decimal precision of `latest_answer`.
    fn decimals(&self) -> u8;
}

/// Token -> feed bindings. The latest binding wins; there is no removal.
#[odra::module]
pub struct PriceFeedRegistry {
    feeds: Mapping<Address, Address>,
}

#[odra::module]
impl PriceFeedRegistry {
    pub fn bind(&mut self, token: &Address, price_feed: &Address) {
        self.feeds.set(token, *price_feed);
    }

    pub fn feed_of(&self, token: &Address) -> Option<Address> {
        self.feeds.get(token)
    }
}

pub mod events {
    use odra::casper_types::U256;
    use odra::prelude::*;

    #[odra::event]
    pub struct AnswerUpdated {
        pub answer: U256,
        pub updated_at: u64,
    }
}

/// Mock aggregator for local deployments and tests.
/// Anyone may push a new answer.
#[odra::module(events = [events::AnswerUpdated])]
pub struct MockV3Aggregator {
    decimals: Var<u8>,
    answer: Var<U256>,
    updated_at: Var<u64>,
}

#[odra::module]
impl MockV3Aggregator {
    pub fn init(&mut self, decimals: u8, initial_answer: U256) {
        self.decimals.set(decimals);
        self.update_answer(initial_answer);
    }

    pub fn latest_answer(&self) -> U256 {
        self.answer.get_or_default()
    }

    pub fn decimals(&self) -> u8 {
        self.decimals.get_or_default()
    }

    pub fn latest_timestamp(&self) -> u64 {
        self.updated_at.get_or_default()
    }

    pub fn update_answer(&mut self, answer: U256) {
        let now = self.env().get_block_time();
        self.answer.set(answer);
        self.updated_at.set(now);
        self.env().emit_event(events::AnswerUpdated {
            answer,
            updated_at: now,
        });
    }
}
