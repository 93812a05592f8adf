//! Livenet deploy and demo binary for TokenFarm.
//!
//! Run with:
//! - Deploy only:      TOKEN_FARM_LIVENET_MODE=deploy cargo run --bin token_farm_livenet --features=livenet
//! - Deploy + demo:    TOKEN_FARM_LIVENET_MODE=deploy_and_demo cargo run --bin token_farm_livenet --features=livenet
//!
//! Required environment variables (Odra livenet):
//! - ODRA_CASPER_LIVENET_SECRET_KEY_PATH
//! - ODRA_CASPER_LIVENET_NODE_ADDRESS
//! - ODRA_CASPER_LIVENET_EVENTS_URL
//! - ODRA_CASPER_LIVENET_CHAIN_NAME
//!
//! Optional:
//! - ODRA_CASPER_LIVENET_DEPLOY_GAS    (motes)
//! - ODRA_CASPER_LIVENET_CALL_GAS      (motes)
//! - TOKEN_FARM_DEMO_PRICE             (raw feed answer, default: 2000)
//! - TOKEN_FARM_DEMO_FEED_DECIMALS     (default: 18)

use odra::casper_types::U256;
use odra::host::{Deployer, NoArgs};
use odra::prelude::*;

use token_farm::farm::{TokenFarm, TokenFarmHostRef, TokenFarmInitArgs};
use token_farm::price_feed::{MockV3Aggregator, MockV3AggregatorInitArgs};
use token_farm::tokens::{QbmToken, QbmTokenHostRef};

const MOTES_PER_CSPR: u64 = 1_000_000_000;
/// 1 QBM = 1e18 base units
const QBM_UNIT: u128 = 1_000_000_000_000_000_000;

const DEFAULT_DEPLOY_GAS_MOTES: u64 = 450_000_000_000; // 450 CSPR
const DEFAULT_CALL_GAS_MOTES: u64 = 50_000_000_000; // 50 CSPR
const DEFAULT_DEMO_PRICE: u64 = 2000;
const DEFAULT_DEMO_FEED_DECIMALS: u64 = 18;

fn main() {
    println!("============================================");
    println!("  TokenFarm x QBM - Livenet");
    println!("============================================\n");

    let env = odra_casper_livenet_env::env();

    let mode = std::env::var("TOKEN_FARM_LIVENET_MODE").unwrap_or_else(|_| "deploy".to_string());
    let should_demo = mode == "deploy_and_demo";

    let deploy_gas = read_u64_env("ODRA_CASPER_LIVENET_DEPLOY_GAS", DEFAULT_DEPLOY_GAS_MOTES);
    let call_gas = read_u64_env("ODRA_CASPER_LIVENET_CALL_GAS", DEFAULT_CALL_GAS_MOTES);
    let demo_price = read_u64_env("TOKEN_FARM_DEMO_PRICE", DEFAULT_DEMO_PRICE);
    let feed_decimals = read_u64_env("TOKEN_FARM_DEMO_FEED_DECIMALS", DEFAULT_DEMO_FEED_DECIMALS);
    let feed_decimals = u8::try_from(feed_decimals).unwrap_or(DEFAULT_DEMO_FEED_DECIMALS as u8);

    println!("[INFO] Mode: {}", mode);
    println!("[INFO] Caller: {:?}", env.caller());
    println!(
        "[INFO] Gas (motes): deploy={} ({} CSPR), calls={} ({} CSPR)",
        deploy_gas,
        deploy_gas / MOTES_PER_CSPR,
        call_gas,
        call_gas / MOTES_PER_CSPR
    );
    println!();

    // ==========================================
    // Step 1: Deploy QBM
    // ==========================================
    println!("[STEP 1] Deploying QBM token...");
    env.set_gas(deploy_gas);
    let mut qbm = QbmToken::deploy(&env, NoArgs);
    println!("[OK] QBM deployed at: {:?}", qbm.address());
    println!("     Name: {}", qbm.name());
    println!("     Symbol: {}", qbm.symbol());
    println!("     Decimals: {}", qbm.decimals());
    println!();

    // ==========================================
    // Step 2: Deploy TokenFarm
    // ==========================================
    println!("[STEP 2] Deploying TokenFarm...");
    env.set_gas(deploy_gas);
    let mut farm = TokenFarm::deploy(
        &env,
        TokenFarmInitArgs {
            home_token: qbm.address(),
        },
    );
    println!("[OK] TokenFarm deployed at: {:?}", farm.address());
    println!("     QBM allowed: {}", farm.token_is_allowed(qbm.address()));
    println!();

    // ==========================================
    // Step 3: Let the farm mint rewards
    // ==========================================
    println!("[STEP 3] Granting QBM minter role to TokenFarm...");
    env.set_gas(call_gas);
    let minter_role = qbm.minter_role();
    if qbm.has_role(minter_role, farm.address()) {
        println!("[OK] TokenFarm already holds the minter role.");
    } else {
        qbm.grant_role(minter_role, farm.address());
        println!(
            "[OK] Minter role granted: {}",
            qbm.has_role(minter_role, farm.address())
        );
    }
    println!();

    if should_demo {
        run_demo(&env, &mut qbm, &mut farm, demo_price, feed_decimals, call_gas, deploy_gas);
    }

    output_deploy_json(qbm.address(), farm.address());
}

fn run_demo(
    env: &odra::host::HostEnv,
    qbm: &mut QbmTokenHostRef,
    farm: &mut TokenFarmHostRef,
    demo_price: u64,
    feed_decimals: u8,
    call_gas: u64,
    deploy_gas: u64,
) {
    let caller = env.caller();
    let one_qbm = U256::from(QBM_UNIT);

    println!("[DEMO 1] Deploying mock price feed (price={}, decimals={})...", demo_price, feed_decimals);
    env.set_gas(deploy_gas);
    let feed = MockV3Aggregator::deploy(
        env,
        MockV3AggregatorInitArgs {
            decimals: feed_decimals,
            initial_answer: U256::from(demo_price),
        },
    );
    println!("[OK] Price feed deployed at: {:?}", feed.address());

    println!("[DEMO 2] Binding price feed to QBM...");
    env.set_gas(call_gas);
    farm.set_price_feed(qbm.address(), feed.address());
    let quote = farm.get_token_value(qbm.address());
    println!("[OK] QBM quote: price={} decimals={}", quote.price, quote.decimals);

    println!("[DEMO 3] Minting and staking 1 QBM...");
    env.set_gas(call_gas);
    qbm.mint(caller, one_qbm);
    env.set_gas(call_gas);
    qbm.approve(farm.address(), one_qbm);
    env.set_gas(call_gas);
    farm.stake_tokens(one_qbm, qbm.address());
    print_stake_info(farm, caller, qbm);

    println!("[DEMO 4] Issuing rewards...");
    env.set_gas(call_gas);
    farm.issue_tokens();
    println!("[OK] Rewards issued.");
    print_stake_info(farm, caller, qbm);
}

fn print_stake_info(farm: &TokenFarmHostRef, user: Address, qbm: &QbmTokenHostRef) {
    println!("     staked QBM: {}", farm.staking_balance(user, qbm.address()));
    println!(
        "     QBM value: {}",
        farm.get_user_single_token_value(user, qbm.address())
    );
    println!("     total value: {}", farm.get_user_total_value(user));
    println!("     stakers: {}", farm.stakers().len());
    println!("     user QBM balance: {}", qbm.balance_of(user));
    println!();
}

fn read_u64_env(name: &str, default_value: u64) -> u64 {
    match std::env::var(name) {
        Ok(raw) => {
            let cleaned = raw.trim().replace('_', "");
            cleaned.parse::<u64>().unwrap_or(default_value)
        }
        Err(_) => default_value,
    }
}

fn output_deploy_json(qbm_addr: Address, farm_addr: Address) {
    let chain_name =
        std::env::var("ODRA_CASPER_LIVENET_CHAIN_NAME").unwrap_or_else(|_| "casper-test".to_string());

    println!(
        r#"TOKEN_FARM_DEPLOY_JSON={{"chain_name":"{}","qbm_contract_hash":"{}","token_farm_contract_hash":"{}","deployed_at":"{}"}}"#,
        chain_name,
        format_address_hash(&qbm_addr),
        format_address_hash(&farm_addr),
        chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ")
    );
}

/// Hex of the address hash, falling back to the debug form.
fn format_address_hash(addr: &Address) -> String {
    let debug_str = format!("{:?}", addr);
    let (Some(start), Some(end)) = (debug_str.find('['), debug_str.rfind(']')) else {
        return debug_str;
    };
    debug_str[start + 1..end]
        .split(", ")
        .filter_map(|part| part.strip_prefix("0x").or_else(|| part.strip_prefix("0X")))
        .collect()
}
