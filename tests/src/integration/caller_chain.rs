//! # Caller Chain
//!
//! Identity, depth and value as seen at each level of a cross-contract
//! call chain, plus rollback of nested failures and the depth limit.

#[cfg(test)]
mod tests {
    use crate::contracts::probe::{self, Mark};
    use crate::integration::{decode_rows, init_tracing};
    use contract_sdk::prelude::*;

    // =========================================================================
    // TEST FIXTURES
    // =========================================================================

    fn outer() -> ContractName {
        ContractName::new("alice", "probe")
    }

    fn inner() -> ContractName {
        ContractName::new("bob", "probe")
    }

    fn deployed_with(config: HostConfig) -> InMemoryHost {
        init_tracing();
        let host = InMemoryHost::with_config(config);
        host.deploy(outer(), probe::contract().unwrap());
        host.deploy(inner(), probe::contract().unwrap());
        host.set_user_balance(&"carol".into(), 100);
        host
    }

    fn deployed() -> InMemoryHost {
        deployed_with(HostConfig::default())
    }

    fn direct<A: Encode>(target: ContractName, method: &str, args: &A) -> Invocation {
        Invocation::new("carol", target, method, args)
    }

    /// `outer` forwards `method(args)` to `target` with `value` coins.
    fn forwarded<A: Encode>(
        via: &str,
        target: &ContractName,
        method: &str,
        value: u64,
        args: &A,
    ) -> Invocation {
        let forward = (
            target.owner.clone(),
            target.name.clone(),
            method.to_string(),
            value,
            args.encode(),
        );
        direct(outer(), via, &forward)
    }

    fn marks(host: &InMemoryHost, contract: &ContractName) -> Vec<Mark> {
        decode_rows(host, contract, "marks").unwrap()
    }

    // =========================================================================
    // CONTEXT AT EACH LEVEL
    // =========================================================================

    #[test]
    fn test_top_level_context() {
        let host = deployed();
        host.apply(&direct(outer(), "is_contract_called_by_user", &(true,)))
            .unwrap();
        host.apply(&direct(outer(), "get_contract_depth", &(0u32,)))
            .unwrap();
        host.apply(&direct(
            outer(),
            "get_contract_caller",
            &(AccountName::from("carol"),),
        ))
        .unwrap();
        host.apply(&direct(
            outer(),
            "get_contract_caller_contract",
            &(AccountName::from(""), String::new()),
        ))
        .unwrap();

        let err = host
            .apply(&direct(outer(), "is_contract_called_by_user", &(false,)))
            .unwrap_err();
        assert_eq!(err, ContractError::assertion("is_contract_called_by_user"));
    }

    #[test]
    fn test_nested_context() {
        let host = deployed();
        let checks: Vec<(&str, Vec<u8>)> = vec![
            ("is_contract_called_by_user", (false,).encode()),
            ("get_contract_depth", (1u32,).encode()),
            (
                "get_contract_caller_contract",
                (AccountName::from("alice"), "probe".to_string()).encode(),
            ),
            ("get_contract_caller", (AccountName::from("carol"),).encode()),
        ];
        for (method, args) in checks {
            let invocation = direct(
                outer(),
                "forward",
                &(
                    inner().owner,
                    inner().name,
                    method.to_string(),
                    0u64,
                    args,
                ),
            );
            host.apply(&invocation).unwrap();
        }

        let err = host
            .apply(&forwarded(
                "forward",
                &inner(),
                "is_contract_called_by_user",
                0,
                &(true,),
            ))
            .unwrap_err();
        assert_eq!(err, ContractError::assertion("is_contract_called_by_user"));
    }

    #[test]
    fn test_authority_across_levels() {
        let host = deployed();
        host.apply(&forwarded(
            "forward",
            &inner(),
            "require_auth_contract",
            0,
            &(AccountName::from("alice"), "probe".to_string()),
        ))
        .unwrap();
        host.apply(&forwarded(
            "forward",
            &inner(),
            "require_auth",
            0,
            &(AccountName::from("carol"),),
        ))
        .unwrap();

        let err = host
            .apply(&direct(
                inner(),
                "require_auth_contract",
                &(AccountName::from("alice"), "probe".to_string()),
            ))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AuthorizationFailure);

        let err = host
            .apply(&direct(
                outer(),
                "require_auth",
                &(AccountName::from("dave"),),
            ))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AuthorizationFailure);
    }

    // =========================================================================
    // VALUE AND ROLLBACK
    // =========================================================================

    #[test]
    fn test_value_flows_down_the_chain() {
        let host = deployed();
        let invocation = forwarded("forward", &inner(), "get_contract_sender_value", 20, &(20u64,))
            .with_value(50);
        host.apply(&invocation).unwrap();

        assert_eq!(host.user_balance_of(&"carol".into()), 50);
        assert_eq!(host.contract_balance_of(&outer()), 30);
        assert_eq!(host.contract_balance_of(&inner()), 20);
    }

    #[test]
    fn test_nested_failure_reverts_everything() {
        let host = deployed();
        let invocation =
            forwarded("forward", &inner(), "fail", 20, &("inner refused".to_string(),))
                .with_value(50);
        let err = host.apply(&invocation).unwrap_err();
        assert_eq!(err, ContractError::assertion("inner refused"));

        assert_eq!(host.user_balance_of(&"carol".into()), 100);
        assert_eq!(host.contract_balance_of(&outer()), 0);
        assert_eq!(host.contract_balance_of(&inner()), 0);
    }

    #[test]
    fn test_caller_failure_after_nested_success_reverts_callee() {
        let host = deployed();
        let invocation = forwarded(
            "forward_then_fail",
            &inner(),
            "mark",
            10,
            &("from-outer".to_string(),),
        )
        .with_value(10);
        let err = host.apply(&invocation).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AssertionFailure);
        assert!(marks(&host, &inner()).is_empty());
        assert_eq!(host.contract_balance_of(&inner()), 0);
        assert_eq!(host.user_balance_of(&"carol".into()), 100);

        host.apply(&forwarded("forward", &inner(), "mark", 0, &("kept".to_string(),)))
            .unwrap();
        assert_eq!(
            marks(&host, &inner()),
            vec![Mark {
                label: "kept".into(),
                depth: 1,
            }]
        );
    }

    #[test]
    fn test_ignored_nested_failure_still_reverts_everything() {
        let host = deployed();
        let invocation = forwarded(
            "forward_ignoring_failure",
            &inner(),
            "fail",
            20,
            &("inner refused".to_string(),),
        )
        .with_value(50);
        let err = host.apply(&invocation).unwrap_err();
        assert_eq!(err, ContractError::assertion("inner refused"));

        assert!(host.console().iter().any(|l| l.starts_with("callee failed")));
        assert!(marks(&host, &outer()).is_empty());
        assert!(marks(&host, &inner()).is_empty());
        assert_eq!(host.user_balance_of(&"carol".into()), 100);
        assert_eq!(host.contract_balance_of(&outer()), 0);
        assert_eq!(host.contract_balance_of(&inner()), 0);

        host.apply(&forwarded(
            "forward_ignoring_failure",
            &inner(),
            "mark",
            0,
            &("fine".to_string(),),
        ))
        .unwrap();
        assert_eq!(marks(&host, &outer()).len(), 1);
        assert_eq!(marks(&host, &inner()).len(), 1);
    }

    #[test]
    fn test_insufficient_value_for_nested_call() {
        let host = deployed();
        let invocation =
            forwarded("forward", &inner(), "get_contract_sender_value", 20, &(20u64,))
                .with_value(5);
        let err = host.apply(&invocation).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AssertionFailure);
        assert_eq!(host.user_balance_of(&"carol".into()), 100);
    }

    #[test]
    fn test_transfer_to_user() {
        let host = deployed();
        host.apply(
            &direct(outer(), "transfer_to_user", &(AccountName::from("dave"), 15u64))
                .with_value(40),
        )
        .unwrap();
        assert_eq!(host.user_balance_of(&"dave".into()), 15);
        assert_eq!(host.contract_balance_of(&outer()), 25);

        let err = host
            .apply(&direct(
                outer(),
                "transfer_to_user",
                &(AccountName::from("dave"), 1000u64),
            ))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AssertionFailure);
        assert_eq!(host.contract_balance_of(&outer()), 25);
    }

    // =========================================================================
    // LIMITS
    // =========================================================================

    #[test]
    fn test_depth_limit() {
        let host = deployed_with(HostConfig::default().with_max_call_depth(3));
        let err = host.apply(&direct(outer(), "recurse", &())).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ResourceExceeded);
        assert!(marks(&host, &outer()).is_empty());
    }

    #[test]
    fn test_unknown_targets() {
        let host = deployed();
        let err = host
            .apply(&forwarded("forward", &inner(), "nope", 0, &()))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownMethod);

        let ghost = ContractName::new("zed", "ghost");
        let err = host
            .apply(&forwarded("forward", &ghost, "mark", 0, &("x".to_string(),)))
            .unwrap_err();
        assert_eq!(err, ContractError::UnknownContract("ghost@zed".into()));
    }
}
