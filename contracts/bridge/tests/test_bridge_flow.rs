//! Outgoing transfer (lock) integration tests.

use cosmwasm_std::{coins, to_json_binary, Addr, Coin, Uint128};
use cw_multi_test::{App, AppResponse, ContractWrapper, Executor};

use bridge::msg::{
    CalculateFeeResponse, ExecuteMsg, InstantiateMsg, LockedBalanceResponse, NonceResponse,
    QueryMsg, ReceiveMsg, TransferResponse,
};
use bridge::ContractError;

const OWNER: &str = "owner";
const USER: &str = "user";
const FEE_COLLECTOR: &str = "fee_collector";
const OPERATOR: &str = "operator";
const NATIVE_DENOM: &str = "uluna";
const THIS_CHAIN: u64 = 7;
const TARGET_CHAIN: u64 = 56;

fn mock_app() -> App {
    App::new(|router, _api, storage| {
        router
            .bank
            .init_balance(
                storage,
                &Addr::unchecked(USER),
                coins(1_000_000, NATIVE_DENOM),
            )
            .unwrap();
    })
}

fn store_bridge_code(app: &mut App) -> u64 {
    app.store_code(Box::new(ContractWrapper::new(
        bridge::contract::execute,
        bridge::contract::instantiate,
        bridge::contract::query,
    )))
}

fn instantiate_bridge(app: &mut App) -> Addr {
    let code_id = store_bridge_code(app);
    app.instantiate_contract(
        code_id,
        Addr::unchecked(OWNER),
        &InstantiateMsg {
            owner: None,
            fee_collector: FEE_COLLECTOR.to_string(),
            this_chain_id: THIS_CHAIN,
            operators: vec![OPERATOR.to_string()],
        },
        &[],
        "bridge",
        None,
    )
    .unwrap()
}

/// Register the target chain (1% fee, no fixed fee, bounds 10..=10_000)
/// and mark the native denom bridgeable.
fn setup_bridge(app: &mut App) -> Addr {
    let bridge_addr = instantiate_bridge(app);
    app.execute_contract(
        Addr::unchecked(OWNER),
        bridge_addr.clone(),
        &ExecuteMsg::SetChainConfig {
            chain_id: TARGET_CHAIN,
            min_amount: Uint128::new(10),
            max_amount: Uint128::new(10_000),
            fee_bps: 100,
            fixed_fee: Uint128::zero(),
            enabled: true,
        },
        &[],
    )
    .unwrap();
    app.execute_contract(
        Addr::unchecked(OWNER),
        bridge_addr.clone(),
        &ExecuteMsg::SetSupportedToken {
            chain_id: THIS_CHAIN,
            token: NATIVE_DENOM.to_string(),
            supported: true,
        },
        &[],
    )
    .unwrap();
    bridge_addr
}

fn bridge_native(app: &mut App, bridge_addr: &Addr, amount: u128) -> AppResponse {
    app.execute_contract(
        Addr::unchecked(USER),
        bridge_addr.clone(),
        &ExecuteMsg::Bridge {
            target_chain_id: TARGET_CHAIN,
            recipient: "0x000000000000000000000000000000000000dEaD".to_string(),
        },
        &coins(amount, NATIVE_DENOM),
    )
    .unwrap()
}

fn wasm_attr(res: &AppResponse, key: &str) -> String {
    res.events
        .iter()
        .filter(|e| e.ty == "wasm")
        .flat_map(|e| e.attributes.iter())
        .find(|a| a.key == key)
        .map(|a| a.value.clone())
        .unwrap_or_else(|| panic!("missing attribute {}", key))
}

#[test]
fn bridge_native_charges_one_percent_fee() {
    let mut app = mock_app();
    let bridge_addr = setup_bridge(&mut app);

    let res = bridge_native(&mut app, &bridge_addr, 100);

    assert_eq!(wasm_attr(&res, "fee"), "1");
    assert_eq!(wasm_attr(&res, "net_amount"), "99");
    assert_eq!(wasm_attr(&res, "nonce"), "0");

    // fee forwarded to the collector, net stays in contract custody
    let collector_balance = app
        .wrap()
        .query_balance(FEE_COLLECTOR, NATIVE_DENOM)
        .unwrap();
    assert_eq!(collector_balance.amount, Uint128::new(1));

    let locked: LockedBalanceResponse = app
        .wrap()
        .query_wasm_smart(
            &bridge_addr,
            &QueryMsg::LockedBalance {
                token: NATIVE_DENOM.to_string(),
            },
        )
        .unwrap();
    assert_eq!(locked.balance, Uint128::new(99));

    let nonce: NonceResponse = app
        .wrap()
        .query_wasm_smart(&bridge_addr, &QueryMsg::CurrentNonce {})
        .unwrap();
    assert_eq!(nonce.nonce, 1);
}

#[test]
fn repeated_transfers_get_distinct_identities() {
    let mut app = mock_app();
    let bridge_addr = setup_bridge(&mut app);

    // identical sender/recipient/token/amount in the same block
    let first = bridge_native(&mut app, &bridge_addr, 100);
    let second = bridge_native(&mut app, &bridge_addr, 100);

    assert_ne!(
        wasm_attr(&first, "message_id"),
        wasm_attr(&second, "message_id")
    );
}

#[test]
fn transfer_record_is_queryable_by_nonce() {
    let mut app = mock_app();
    let bridge_addr = setup_bridge(&mut app);

    let res = bridge_native(&mut app, &bridge_addr, 500);

    let transfer: TransferResponse = app
        .wrap()
        .query_wasm_smart(&bridge_addr, &QueryMsg::Transfer { nonce: 0 })
        .unwrap();
    let transfer = transfer.transfer.unwrap();
    assert_eq!(transfer.amount, Uint128::new(500));
    assert_eq!(transfer.fee, Uint128::new(5));
    assert_eq!(transfer.net_amount, Uint128::new(495));
    assert_eq!(transfer.message_id, wasm_attr(&res, "message_id"));
}

#[test]
fn amount_bounds_are_inclusive() {
    let mut app = mock_app();
    let bridge_addr = setup_bridge(&mut app);

    // both ends of 10..=10_000 pass
    bridge_native(&mut app, &bridge_addr, 10);
    bridge_native(&mut app, &bridge_addr, 10_000);

    let err: ContractError = app
        .execute_contract(
            Addr::unchecked(USER),
            bridge_addr.clone(),
            &ExecuteMsg::Bridge {
                target_chain_id: TARGET_CHAIN,
                recipient: "0x000000000000000000000000000000000000dEaD".to_string(),
            },
            &coins(9, NATIVE_DENOM),
        )
        .unwrap_err()
        .downcast()
        .unwrap();
    assert!(matches!(err, ContractError::BelowMinimumAmount { .. }));

    let err: ContractError = app
        .execute_contract(
            Addr::unchecked(USER),
            bridge_addr,
            &ExecuteMsg::Bridge {
                target_chain_id: TARGET_CHAIN,
                recipient: "0x000000000000000000000000000000000000dEaD".to_string(),
            },
            &coins(10_001, NATIVE_DENOM),
        )
        .unwrap_err()
        .downcast()
        .unwrap();
    assert!(matches!(err, ContractError::AboveMaximumAmount { .. }));
}

#[test]
fn fee_consuming_whole_amount_is_rejected() {
    let mut app = mock_app();
    let bridge_addr = instantiate_bridge(&mut app);

    app.execute_contract(
        Addr::unchecked(OWNER),
        bridge_addr.clone(),
        &ExecuteMsg::SetChainConfig {
            chain_id: TARGET_CHAIN,
            min_amount: Uint128::new(1),
            max_amount: Uint128::new(10_000),
            fee_bps: 0,
            fixed_fee: Uint128::new(50),
            enabled: true,
        },
        &[],
    )
    .unwrap();
    app.execute_contract(
        Addr::unchecked(OWNER),
        bridge_addr.clone(),
        &ExecuteMsg::SetSupportedToken {
            chain_id: THIS_CHAIN,
            token: NATIVE_DENOM.to_string(),
            supported: true,
        },
        &[],
    )
    .unwrap();

    let err: ContractError = app
        .execute_contract(
            Addr::unchecked(USER),
            bridge_addr,
            &ExecuteMsg::Bridge {
                target_chain_id: TARGET_CHAIN,
                recipient: "0x000000000000000000000000000000000000dEaD".to_string(),
            },
            &coins(40, NATIVE_DENOM),
        )
        .unwrap_err()
        .downcast()
        .unwrap();
    assert!(matches!(err, ContractError::FeeExceedsAmount { .. }));
}

#[test]
fn unknown_and_disabled_chains_are_rejected() {
    let mut app = mock_app();
    let bridge_addr = setup_bridge(&mut app);

    let err: ContractError = app
        .execute_contract(
            Addr::unchecked(USER),
            bridge_addr.clone(),
            &ExecuteMsg::Bridge {
                target_chain_id: 999,
                recipient: "0x000000000000000000000000000000000000dEaD".to_string(),
            },
            &coins(100, NATIVE_DENOM),
        )
        .unwrap_err()
        .downcast()
        .unwrap();
    assert!(matches!(err, ContractError::ChainNotSupported { chain_id: 999 }));

    // disable the registered chain, keep its config
    app.execute_contract(
        Addr::unchecked(OWNER),
        bridge_addr.clone(),
        &ExecuteMsg::SetChainConfig {
            chain_id: TARGET_CHAIN,
            min_amount: Uint128::new(10),
            max_amount: Uint128::new(10_000),
            fee_bps: 100,
            fixed_fee: Uint128::zero(),
            enabled: false,
        },
        &[],
    )
    .unwrap();

    let err: ContractError = app
        .execute_contract(
            Addr::unchecked(USER),
            bridge_addr,
            &ExecuteMsg::Bridge {
                target_chain_id: TARGET_CHAIN,
                recipient: "0x000000000000000000000000000000000000dEaD".to_string(),
            },
            &coins(100, NATIVE_DENOM),
        )
        .unwrap_err()
        .downcast()
        .unwrap();
    assert!(matches!(err, ContractError::ChainDisabled { .. }));
}

#[test]
fn unsupported_token_is_rejected() {
    let mut app = mock_app();
    let bridge_addr = instantiate_bridge(&mut app);

    app.execute_contract(
        Addr::unchecked(OWNER),
        bridge_addr.clone(),
        &ExecuteMsg::SetChainConfig {
            chain_id: TARGET_CHAIN,
            min_amount: Uint128::new(10),
            max_amount: Uint128::new(10_000),
            fee_bps: 100,
            fixed_fee: Uint128::zero(),
            enabled: true,
        },
        &[],
    )
    .unwrap();

    let err: ContractError = app
        .execute_contract(
            Addr::unchecked(USER),
            bridge_addr,
            &ExecuteMsg::Bridge {
                target_chain_id: TARGET_CHAIN,
                recipient: "0x000000000000000000000000000000000000dEaD".to_string(),
            },
            &coins(100, NATIVE_DENOM),
        )
        .unwrap_err()
        .downcast()
        .unwrap();
    assert!(matches!(err, ContractError::TokenNotSupported { .. }));
}

#[test]
fn fee_quote_matches_charged_fee() {
    let mut app = mock_app();
    let bridge_addr = setup_bridge(&mut app);

    let quote: CalculateFeeResponse = app
        .wrap()
        .query_wasm_smart(
            &bridge_addr,
            &QueryMsg::CalculateFee {
                amount: Uint128::new(100),
                target_chain_id: TARGET_CHAIN,
            },
        )
        .unwrap();
    assert_eq!(quote.fee, Uint128::new(1));
    assert_eq!(quote.net_amount, Some(Uint128::new(99)));

    let res = bridge_native(&mut app, &bridge_addr, 100);
    assert_eq!(wasm_attr(&res, "fee"), quote.fee.to_string());
}

#[test]
fn cw20_tokens_bridge_through_receive() {
    let mut app = mock_app();
    let bridge_addr = setup_bridge(&mut app);

    let cw20_code_id = app.store_code(Box::new(ContractWrapper::new(
        cw20_base::contract::execute,
        cw20_base::contract::instantiate,
        cw20_base::contract::query,
    )));
    let token_addr = app
        .instantiate_contract(
            cw20_code_id,
            Addr::unchecked(OWNER),
            &cw20_base::msg::InstantiateMsg {
                name: "Test Token".to_string(),
                symbol: "TEST".to_string(),
                decimals: 6,
                initial_balances: vec![cw20::Cw20Coin {
                    address: USER.to_string(),
                    amount: Uint128::new(1_000_000),
                }],
                mint: None,
                marketing: None,
            },
            &[],
            "token",
            None,
        )
        .unwrap();

    app.execute_contract(
        Addr::unchecked(OWNER),
        bridge_addr.clone(),
        &ExecuteMsg::SetSupportedToken {
            chain_id: THIS_CHAIN,
            token: token_addr.to_string(),
            supported: true,
        },
        &[],
    )
    .unwrap();

    let res = app
        .execute_contract(
            Addr::unchecked(USER),
            token_addr.clone(),
            &cw20::Cw20ExecuteMsg::Send {
                contract: bridge_addr.to_string(),
                amount: Uint128::new(1_000),
                msg: to_json_binary(&ReceiveMsg::Bridge {
                    target_chain_id: TARGET_CHAIN,
                    recipient: "0x000000000000000000000000000000000000dEaD".to_string(),
                })
                .unwrap(),
            },
            &[],
        )
        .unwrap();

    assert_eq!(wasm_attr(&res, "method"), "bridge");
    assert_eq!(wasm_attr(&res, "fee"), "10");
    assert_eq!(wasm_attr(&res, "net_amount"), "990");

    // fee forwarded to the collector in CW20 balance
    let collector: cw20::BalanceResponse = app
        .wrap()
        .query_wasm_smart(
            &token_addr,
            &cw20::Cw20QueryMsg::Balance {
                address: FEE_COLLECTOR.to_string(),
            },
        )
        .unwrap();
    assert_eq!(collector.balance, Uint128::new(10));

    let locked: LockedBalanceResponse = app
        .wrap()
        .query_wasm_smart(
            &bridge_addr,
            &QueryMsg::LockedBalance {
                token: token_addr.to_string(),
            },
        )
        .unwrap();
    assert_eq!(locked.balance, Uint128::new(990));
}

#[test]
fn bridge_without_funds_is_rejected() {
    let mut app = mock_app();
    let bridge_addr = setup_bridge(&mut app);

    let err: ContractError = app
        .execute_contract(
            Addr::unchecked(USER),
            bridge_addr,
            &ExecuteMsg::Bridge {
                target_chain_id: TARGET_CHAIN,
                recipient: "0x000000000000000000000000000000000000dEaD".to_string(),
            },
            &[] as &[Coin],
        )
        .unwrap_err()
        .downcast()
        .unwrap();
    assert!(matches!(err, ContractError::NoFunds));
}
