//! Authentication Pipeline (AP): the before-tx/after-tx interceptor
//! pair that replaces default signature verification for AR
//! transactions (§4.4). The hardest and largest module in this crate;
//! everything else exists to support it.

use cosmwasm_std::{Addr, Binary, Event, Storage};

use crate::account::{AccountVariant, Account, PublicKey};
use crate::error::ContractError;
use crate::host::{
    AccountKeeper, ContractRuntime, DefaultSigVerifier, SignMode, SignModeHandler, SignatureData,
    SignatureV2, SignerData, Tx, sudo_with_gas_limit,
};
use crate::params::Params;
use crate::state;
use crate::sudo::{AccountSudoMsg, AfterTx, BeforeTx};

/// Gas cost the default signature-gas-metering step should apply to a
/// given declared public key, installed ahead of AP's before-tx
/// interceptor (§4.4 "Gas-consumer adjustment"). An AR's declared key
/// is always the sentinel, so this always returns zero for AR
/// transactions - the contract call is what actually pays, and
/// double-charging would distort fee estimates. Keyed off the
/// signature's declared public key (the real install point, ahead of
/// `before_tx`, only has a `SignatureV2` to look at - not yet a
/// resolved account), mirroring the original `SigVerificationGasConsumer`'s
/// `switch sig.PubKey.(type) { case *NilPubKey }`.
pub const DEFAULT_SIG_VERIFICATION_GAS_COST: u64 = 1000;

pub fn sig_verification_gas_cost(declared_public_key: &PublicKey) -> u64 {
    if declared_public_key.is_sentinel() {
        0
    } else {
        DEFAULT_SIG_VERIFICATION_GAS_COST
    }
}

/// The outcome of classifying a transaction (§4.4 step 1): the AR being
/// authenticated and its single declared signature.
struct Classification {
    signer: Addr,
    account_number: u64,
    sequence: u64,
    public_key: PublicKey,
    signature: SignatureV2,
}

/// Classifies `tx` as an AR transaction or not. Returns `Ok(None)` for
/// every "fall through to the default path" case (§8 "classification
/// soundness"); returns `Err(TxDecode)` only when the tx doesn't expose
/// the signature-verifiable capability at all, since that's a decode
/// failure the default path couldn't handle either.
fn classify(tx: &dyn Tx, account_keeper: &dyn AccountKeeper) -> Result<Option<Classification>, ContractError> {
    let signatures = tx.get_signatures_v2().ok_or(ContractError::TxDecode)?;
    let signers = tx.get_signers();

    if signers.len() != 1 || signatures.len() != 1 {
        return Ok(None);
    }

    let signer = signers.into_iter().next().expect("checked len == 1");
    let signature = signatures.into_iter().next().expect("checked len == 1");

    let ar = match account_keeper.get_account(&signer) {
        Some(AccountVariant::Abstract(ar)) => ar,
        _ => return Ok(None),
    };

    Ok(Some(Classification {
        signer,
        account_number: ar.get_account_number(),
        sequence: ar.get_sequence(),
        public_key: ar.get_public_key(),
        signature,
    }))
}

/// Before-tx interceptor (§4.4). On a non-AR tx, defers to
/// `default_verifier` and returns whatever it returns (§8 "fallback
/// fidelity"). On an AR tx, marks the signer slot, sequence-checks,
/// derives sign bytes, and sudos the account contract under
/// `params.max_gas_before`.
#[allow(clippy::too_many_arguments)]
pub fn before_tx(
    storage: &mut dyn Storage,
    account_keeper: &dyn AccountKeeper,
    contract_runtime: &dyn ContractRuntime,
    sign_mode_handler: &dyn SignModeHandler,
    default_verifier: &dyn DefaultSigVerifier,
    params: &Params,
    chain_id: &str,
    tx: &dyn Tx,
    simulate: bool,
) -> Result<Vec<Event>, ContractError> {
    let Some(classification) = classify(tx, account_keeper)? else {
        return default_verifier.verify(tx, simulate);
    };

    let Classification {
        signer,
        account_number,
        sequence,
        public_key,
        signature,
    } = classification;

    state::set_signer(storage, &signer);

    // Every exit past this point must leave the slot either occupied
    // (success, for after-tx to find) or cleared (failure) - never
    // stale across transactions (§4.4 state machine, §8 "slot
    // hygiene"). Failure paths below clear it explicitly before
    // returning.
    let result = run_before_tx(
        contract_runtime,
        sign_mode_handler,
        params,
        chain_id,
        tx,
        simulate,
        &signer,
        account_number,
        sequence,
        &public_key,
        &signature,
    );

    if result.is_err() {
        state::delete_signer(storage);
    }

    result
}

#[allow(clippy::too_many_arguments)]
fn run_before_tx(
    contract_runtime: &dyn ContractRuntime,
    sign_mode_handler: &dyn SignModeHandler,
    params: &Params,
    chain_id: &str,
    tx: &dyn Tx,
    simulate: bool,
    signer: &Addr,
    account_number: u64,
    sequence: u64,
    public_key: &PublicKey,
    signature: &SignatureV2,
) -> Result<Vec<Event>, ContractError> {
    if signature.sequence != sequence {
        return Err(ContractError::WrongSequence {
            expected: sequence,
            actual: signature.sequence,
        });
    }

    let (sign_mode, cred_bytes) = match &signature.data {
        SignatureData::Single {
            sign_mode,
            signature,
        } => (*sign_mode, signature.clone()),
        SignatureData::Multi => return Err(ContractError::NotSingleSignature),
    };

    // Sign bytes are derived over the resolved account's own pubkey
    // (§4.4 step 5: "sentinel-pubkey"), not whatever pubkey the
    // signature slot happens to declare - mirrors the original
    // `prepareCredentials`'s `PubKey: signerAcc.GetPubKey()`.
    let signer_data = SignerData {
        address: signer.clone(),
        chain_id: chain_id.to_string(),
        account_number,
        sequence,
        public_key: public_key.clone(),
    };

    let sign_bytes = sign_mode_handler.get_sign_bytes(sign_mode, &signer_data, tx)?;

    let sudo_msg = AccountSudoMsg::BeforeTx(BeforeTx {
        msgs: tx.get_msgs(),
        tx_bytes: Binary::from(sign_bytes),
        cred_bytes: if cred_bytes.is_empty() {
            None
        } else {
            Some(cred_bytes)
        },
        simulate,
    });

    tracing::debug!(signer = %signer, simulate, "before-tx hook invoked");

    sudo_with_gas_limit(contract_runtime, signer, &sudo_msg, params.max_gas_before)
}

/// After-tx interceptor (§4.4), run in the host's post-commit chain.
/// A no-op when the slot is empty: either the tx wasn't an AR
/// transaction, or before-tx already failed and cleared it.
pub fn after_tx(
    storage: &mut dyn Storage,
    contract_runtime: &dyn ContractRuntime,
    params: &Params,
    simulate: bool,
) -> Result<Vec<Event>, ContractError> {
    let Some(signer) = state::get_signer(storage) else {
        return Ok(vec![]);
    };

    state::delete_signer(storage);

    let sudo_msg = AccountSudoMsg::AfterTx(AfterTx { simulate });

    tracing::debug!(signer = %signer, simulate, "after-tx hook invoked");

    sudo_with_gas_limit(contract_runtime, &signer, &sudo_msg, params.max_gas_after)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::{AbstractAccountRecord, PublicKey};
    use crate::host::SignatureData;
    use crate::testing::{MockAccountKeeper, MockContractRuntime};
    use cosmwasm_std::testing::MockStorage;

    struct FixedTx {
        msgs: Vec<crate::sudo::TypedAny>,
        signers: Vec<Addr>,
        signatures: Option<Vec<SignatureV2>>,
    }

    impl Tx for FixedTx {
        fn get_msgs(&self) -> Vec<crate::sudo::TypedAny> {
            self.msgs.clone()
        }

        fn get_signers(&self) -> Vec<Addr> {
            self.signers.clone()
        }

        fn get_signatures_v2(&self) -> Option<Vec<SignatureV2>> {
            self.signatures.clone()
        }
    }

    /// Derives sign bytes as `"{chain_id}/{account_number}/{sequence}"`:
    /// deterministic and sufficient to distinguish every scenario in
    /// §8 without needing a real signing scheme.
    struct FakeSignModeHandler;

    impl SignModeHandler for FakeSignModeHandler {
        fn get_sign_bytes(
            &self,
            _sign_mode: SignMode,
            signer_data: &SignerData,
            _tx: &dyn Tx,
        ) -> Result<Vec<u8>, ContractError> {
            Ok(format!(
                "{}/{}/{}",
                signer_data.chain_id, signer_data.account_number, signer_data.sequence
            )
            .into_bytes())
        }
    }

    struct RejectingDefaultVerifier;

    impl DefaultSigVerifier for RejectingDefaultVerifier {
        fn verify(&self, _tx: &dyn Tx, _simulate: bool) -> Result<Vec<Event>, ContractError> {
            Err(ContractError::Std(cosmwasm_std::StdError::generic_err(
                "default verifier invoked",
            )))
        }
    }

    struct AcceptingDefaultVerifier;

    impl DefaultSigVerifier for AcceptingDefaultVerifier {
        fn verify(&self, _tx: &dyn Tx, _simulate: bool) -> Result<Vec<Event>, ContractError> {
            Ok(vec![Event::new("default-verified")])
        }
    }

    fn single_sig(sequence: u64, signature: Vec<u8>) -> SignatureV2 {
        SignatureV2 {
            public_key: PublicKey::Sentinel {
                address: Addr::unchecked("aa1abstract"),
            },
            data: SignatureData::Single {
                sign_mode: SignMode::Direct,
                signature: Binary::from(signature),
            },
            sequence,
        }
    }

    fn register_ar(account_keeper: &MockAccountKeeper, account_number: u64, sequence: u64) -> Addr {
        let addr = Addr::unchecked("aa1abstract");
        let mut ar = AbstractAccountRecord::default();
        ar.set_address(addr.clone()).unwrap();
        ar.set_account_number(account_number);
        ar.set_sequence(sequence);
        account_keeper.insert(AccountVariant::Abstract(ar));
        addr
    }

    /// Scenario 1: correct-key path (§8 #1, in spirit: "correct" here
    /// means the sign bytes the contract is configured to accept).
    #[test]
    fn before_tx_accepts_ar_with_matching_credential_and_marks_slot() {
        let mut storage = MockStorage::new();
        let account_keeper = MockAccountKeeper::new();
        let runtime = MockContractRuntime::new();
        let params = Params::default_allow_all();

        let addr = register_ar(&account_keeper, 12345, 88888);
        let expected_sign_bytes = b"chain-a/12345/88888".to_vec();
        runtime.expect_credential_check(addr.clone(), expected_sign_bytes);

        let tx = FixedTx {
            msgs: vec![],
            signers: vec![addr.clone()],
            signatures: Some(vec![single_sig(88888, b"proof".to_vec())]),
        };

        let events = before_tx(
            &mut storage,
            &account_keeper,
            &runtime,
            &FakeSignModeHandler,
            &RejectingDefaultVerifier,
            &params,
            "chain-a",
            &tx,
            false,
        )
        .unwrap();

        assert_eq!(events.len(), 1);
        assert_eq!(state::get_signer(&storage).unwrap(), addr);

        let after_events = after_tx(&mut storage, &runtime, &params, false).unwrap();
        assert_eq!(after_events.len(), 1);
        assert!(state::get_signer(&storage).is_none());
    }

    /// Scenario 2/3/4 share a shape: sign bytes the contract doesn't
    /// recognize (wrong key, wrong chain id, wrong account number all
    /// change the derived sign bytes upstream) are rejected by the
    /// contract and the slot is cleared.
    #[test]
    fn before_tx_rejects_mismatched_credential_and_clears_slot() {
        let mut storage = MockStorage::new();
        let account_keeper = MockAccountKeeper::new();
        let runtime = MockContractRuntime::new();
        let params = Params::default_allow_all();

        let addr = register_ar(&account_keeper, 12345, 88888);
        runtime.expect_credential_check(addr.clone(), b"chain-a/12345/88888".to_vec());

        // Signed under the wrong chain id: derived sign bytes won't
        // match what the contract expects.
        let tx = FixedTx {
            msgs: vec![],
            signers: vec![addr.clone()],
            signatures: Some(vec![single_sig(88888, b"proof".to_vec())]),
        };

        let err = before_tx(
            &mut storage,
            &account_keeper,
            &runtime,
            &FakeSignModeHandler,
            &RejectingDefaultVerifier,
            &params,
            "wrong-chain",
            &tx,
            false,
        )
        .unwrap_err();

        assert!(matches!(err, ContractError::Std(_)));
        assert!(state::get_signer(&storage).is_none());
    }

    /// Scenario 5: wrong sequence fails before the contract is even
    /// invoked.
    #[test]
    fn before_tx_rejects_wrong_sequence() {
        let mut storage = MockStorage::new();
        let account_keeper = MockAccountKeeper::new();
        let runtime = MockContractRuntime::new();
        let params = Params::default_allow_all();

        let addr = register_ar(&account_keeper, 12345, 88888);
        runtime.expect_always_accept(addr.clone());

        let tx = FixedTx {
            msgs: vec![],
            signers: vec![addr.clone()],
            signatures: Some(vec![single_sig(5786786, b"proof".to_vec())]),
        };

        let err = before_tx(
            &mut storage,
            &account_keeper,
            &runtime,
            &FakeSignModeHandler,
            &RejectingDefaultVerifier,
            &params,
            "chain-a",
            &tx,
            false,
        )
        .unwrap_err();

        assert_eq!(
            err,
            ContractError::WrongSequence {
                expected: 88888,
                actual: 5786786
            }
        );
        assert!(state::get_signer(&storage).is_none());
    }

    /// Scenario 6: gas-cap exceeded aborts the tx and leaves no state
    /// behind.
    #[test]
    fn before_tx_aborts_on_gas_cap_exceeded() {
        let mut storage = MockStorage::new();
        let account_keeper = MockAccountKeeper::new();
        let runtime = MockContractRuntime::new();
        let params = Params::new_allow_all(1, 1_000_000);

        let addr = register_ar(&account_keeper, 12345, 88888);
        runtime.expect_gas_cost(addr.clone(), 100);

        let tx = FixedTx {
            msgs: vec![],
            signers: vec![addr.clone()],
            signatures: Some(vec![single_sig(88888, b"proof".to_vec())]),
        };

        let err = before_tx(
            &mut storage,
            &account_keeper,
            &runtime,
            &FakeSignModeHandler,
            &RejectingDefaultVerifier,
            &params,
            "chain-a",
            &tx,
            false,
        )
        .unwrap_err();

        assert_eq!(
            err,
            ContractError::OutOfGas {
                limit: 1,
                consumed: 100
            }
        );
        assert!(state::get_signer(&storage).is_none());
    }

    /// Scenario 7: simulate mode with no credential still classifies
    /// and still invokes the contract.
    #[test]
    fn before_tx_simulate_with_empty_credential_still_invokes_contract() {
        let mut storage = MockStorage::new();
        let account_keeper = MockAccountKeeper::new();
        let runtime = MockContractRuntime::new();
        let params = Params::default_allow_all();

        let addr = register_ar(&account_keeper, 12345, 88888);
        runtime.expect_credential_check(addr.clone(), b"anything".to_vec());

        let tx = FixedTx {
            msgs: vec![],
            signers: vec![addr.clone()],
            signatures: Some(vec![single_sig(88888, vec![])]),
        };

        let events = before_tx(
            &mut storage,
            &account_keeper,
            &runtime,
            &FakeSignModeHandler,
            &RejectingDefaultVerifier,
            &params,
            "chain-a",
            &tx,
            true,
        )
        .unwrap();

        assert_eq!(events.len(), 1);
    }

    /// Scenario 8: a two-signer tx where one signer is an AR is not an
    /// AR transaction; it falls through to the default verifier.
    #[test]
    fn before_tx_falls_through_to_default_verifier_for_multi_signer_tx() {
        let mut storage = MockStorage::new();
        let account_keeper = MockAccountKeeper::new();
        let runtime = MockContractRuntime::new();
        let params = Params::default_allow_all();

        let ar_addr = register_ar(&account_keeper, 12345, 88888);
        let other_addr = Addr::unchecked("aa1other");

        let tx = FixedTx {
            msgs: vec![],
            signers: vec![ar_addr.clone(), other_addr],
            signatures: Some(vec![
                single_sig(88888, b"proof".to_vec()),
                single_sig(1, b"proof2".to_vec()),
            ]),
        };

        let events = before_tx(
            &mut storage,
            &account_keeper,
            &runtime,
            &FakeSignModeHandler,
            &AcceptingDefaultVerifier,
            &params,
            "chain-a",
            &tx,
            false,
        )
        .unwrap();

        assert_eq!(events[0].ty, "default-verified");
        assert!(state::get_signer(&storage).is_none());
    }

    #[test]
    fn before_tx_fails_tx_decode_when_not_signature_verifiable() {
        let mut storage = MockStorage::new();
        let account_keeper = MockAccountKeeper::new();
        let runtime = MockContractRuntime::new();
        let params = Params::default_allow_all();

        let tx = FixedTx {
            msgs: vec![],
            signers: vec![Addr::unchecked("whoever")],
            signatures: None,
        };

        let err = before_tx(
            &mut storage,
            &account_keeper,
            &runtime,
            &FakeSignModeHandler,
            &AcceptingDefaultVerifier,
            &params,
            "chain-a",
            &tx,
            false,
        )
        .unwrap_err();

        assert_eq!(err, ContractError::TxDecode);
    }

    #[test]
    fn before_tx_fails_not_single_signature_for_multi_sig_data() {
        let mut storage = MockStorage::new();
        let account_keeper = MockAccountKeeper::new();
        let runtime = MockContractRuntime::new();
        let params = Params::default_allow_all();

        let addr = register_ar(&account_keeper, 12345, 88888);
        runtime.expect_always_accept(addr.clone());

        let tx = FixedTx {
            msgs: vec![],
            signers: vec![addr.clone()],
            signatures: Some(vec![SignatureV2 {
                public_key: PublicKey::Sentinel {
                    address: addr.clone(),
                },
                data: SignatureData::Multi,
                sequence: 88888,
            }]),
        };

        let err = before_tx(
            &mut storage,
            &account_keeper,
            &runtime,
            &FakeSignModeHandler,
            &AcceptingDefaultVerifier,
            &params,
            "chain-a",
            &tx,
            false,
        )
        .unwrap_err();

        assert_eq!(err, ContractError::NotSingleSignature);
        assert!(state::get_signer(&storage).is_none());
    }

    #[test]
    fn after_tx_is_noop_without_a_marked_signer() {
        let mut storage = MockStorage::new();
        let runtime = MockContractRuntime::new();
        let params = Params::default_allow_all();

        let events = after_tx(&mut storage, &runtime, &params, false).unwrap();
        assert!(events.is_empty());
    }

    #[test]
    fn gas_consumer_charges_zero_for_sentinel_pubkeys_and_default_for_others() {
        let sentinel = PublicKey::Sentinel {
            address: Addr::unchecked("aa1abstract"),
        };
        assert_eq!(sig_verification_gas_cost(&sentinel), 0);

        let real_key = PublicKey::Secp256k1(Binary::default());
        assert_eq!(
            sig_verification_gas_cost(&real_key),
            DEFAULT_SIG_VERIFICATION_GAS_COST
        );
    }
}
