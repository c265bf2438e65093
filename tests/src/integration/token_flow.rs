//! # Token Flow
//!
//! Issuance and transfers of the example token contract, including the
//! rollback of failed transfers.

#[cfg(test)]
mod tests {
    use crate::contracts::token::{self, Balance, Stat};
    use crate::integration::{decode_rows, init_tracing};
    use contract_sdk::prelude::*;

    // =========================================================================
    // TEST FIXTURES
    // =========================================================================

    fn token_contract() -> ContractName {
        ContractName::new("alice", "token")
    }

    fn deployed() -> InMemoryHost {
        init_tracing();
        let host = InMemoryHost::new();
        host.deploy(token_contract(), token::contract().unwrap());
        host
    }

    fn create(host: &InMemoryHost, supply: u64) -> ContractResult<()> {
        host.apply(&Invocation::new(
            "alice",
            token_contract(),
            "create",
            &("Coin".to_string(), "COS".to_string(), supply, 3u32),
        ))
    }

    fn transfer(host: &InMemoryHost, from: &str, to: &str, amount: u64) -> ContractResult<()> {
        host.apply(&Invocation::new(
            from,
            token_contract(),
            "transfer",
            &(AccountName::from(from), AccountName::from(to), amount),
        ))
    }

    fn balance_of(host: &InMemoryHost, holder: &str) -> u64 {
        decode_rows::<Balance>(host, &token_contract(), "balances")
            .unwrap()
            .into_iter()
            .find(|b| b.token_owner.as_str() == holder)
            .map_or(0, |b| b.amount)
    }

    // =========================================================================
    // ISSUANCE
    // =========================================================================

    #[test]
    fn test_create_issues_supply_to_owner() {
        let host = deployed();
        create(&host, 1_000_000).unwrap();

        let stats = decode_rows::<Stat>(&host, &token_contract(), "stats").unwrap();
        assert_eq!(
            stats,
            vec![Stat {
                name: "Coin".into(),
                symbol: "COS".into(),
                total_supply: 1_000_000,
                decimals: 3,
            }]
        );

        let rows = host.table_rows(&token_contract(), "balances");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].0, AccountName::from("alice").encode());
        assert_eq!(balance_of(&host, "alice"), 1_000_000);
    }

    #[test]
    fn test_create_twice_rejected() {
        let host = deployed();
        create(&host, 1_000_000).unwrap();
        let err = create(&host, 5).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AssertionFailure);
        assert_eq!(balance_of(&host, "alice"), 1_000_000);
    }

    #[test]
    fn test_create_requires_owner_authority() {
        let host = deployed();
        let err = host
            .apply(&Invocation::new(
                "mallory",
                token_contract(),
                "create",
                &("Coin".to_string(), "COS".to_string(), 10u64, 0u32),
            ))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AuthorizationFailure);
        assert!(host.table_rows(&token_contract(), "stats").is_empty());
    }

    // =========================================================================
    // TRANSFER
    // =========================================================================

    #[test]
    fn test_transfer_and_insufficient_balance() {
        let host = deployed();
        create(&host, 100).unwrap();

        transfer(&host, "alice", "bob", 60).unwrap();
        assert_eq!(balance_of(&host, "alice"), 40);
        assert_eq!(balance_of(&host, "bob"), 60);

        let err = transfer(&host, "alice", "bob", 41).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AssertionFailure);
        assert_eq!(balance_of(&host, "alice"), 40);
        assert_eq!(balance_of(&host, "bob"), 60);
        assert_eq!(balance_of(&host, "alice") + balance_of(&host, "bob"), 100);
    }

    #[test]
    fn test_transfer_requires_sender_authority() {
        let host = deployed();
        create(&host, 100).unwrap();

        let err = host
            .apply(&Invocation::new(
                "bob",
                token_contract(),
                "transfer",
                &(AccountName::from("alice"), AccountName::from("bob"), 10u64),
            ))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AuthorizationFailure);
        assert_eq!(balance_of(&host, "alice"), 100);
    }

    #[test]
    fn test_transfer_back_updates_existing_row() {
        let host = deployed();
        create(&host, 100).unwrap();
        transfer(&host, "alice", "bob", 30).unwrap();
        transfer(&host, "bob", "alice", 10).unwrap();

        assert_eq!(balance_of(&host, "alice"), 80);
        assert_eq!(balance_of(&host, "bob"), 20);
        assert_eq!(host.table_rows(&token_contract(), "balances").len(), 2);
    }

    #[test]
    fn test_unknown_method_and_bad_params() {
        let host = deployed();
        let err = host
            .apply(&Invocation::new("alice", token_contract(), "mint", &()))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownMethod);

        let err = host
            .apply(&Invocation::new("alice", token_contract(), "create", &"Coin"))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::EncodingFault);
    }

    #[test]
    fn test_abi_descriptor() {
        let abi = token::contract().unwrap().abi();
        let json = abi.to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["contract"], "token");
        assert_eq!(value["methods"][0]["name"], "create");
        assert_eq!(
            value["methods"][0]["params"],
            serde_json::json!(["string", "string", "uint64", "uint32"])
        );
        assert_eq!(value["methods"][1]["name"], "transfer");
        assert_eq!(value["tables"][1]["singleton"], true);
    }
}
