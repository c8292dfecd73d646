//! Summary rollup derivation against live issuance.

mod common;

use managed_wallet::{CredentialKind, CredentialQuery, SUMMARY_TYPE};

use common::{engine, AUTHORITY, TENANT};

#[test]
fn membership_rolls_up_into_the_summary() {
    let engine = engine();
    let membership = engine
        .issuer
        .issue(
            AUTHORITY,
            CredentialKind::Membership { bpn: TENANT.into(), organization: "Tenant One".into() },
        )
        .expect("should issue membership");

    let summary = engine.issuer.issue_summary(TENANT).expect("should derive summary");

    assert!(summary.has_type(SUMMARY_TYPE));
    let subject = summary.credential_subject.iter().next().expect("subject present");
    assert_eq!(subject.claims["items"], serde_json::json!(["MembershipCredential"]));
    assert_eq!(subject.claims["holderIdentifier"], TENANT);
    assert_eq!(
        summary.expiration_date, membership.expiration_date,
        "summary expires with its only special credential"
    );
    assert!(engine.validator.validate_credential(&summary).valid());
}

#[test]
fn reissue_replaces_the_previous_summary() {
    let engine = engine();
    engine
        .issuer
        .issue(
            AUTHORITY,
            CredentialKind::Membership { bpn: TENANT.into(), organization: "Tenant One".into() },
        )
        .expect("should issue membership");

    let first = engine.issuer.issue_summary(TENANT).expect("first derivation");

    engine
        .issuer
        .issue(
            AUTHORITY,
            CredentialKind::Dismantler {
                bpn: TENANT.into(),
                activity_type: "vehicleDismantle".into(),
                allowed_vehicle_brands: vec![],
            },
        )
        .expect("should issue dismantler");

    let second = engine.issuer.issue_summary(TENANT).expect("second derivation");

    let summaries = engine.store.find_all(
        &CredentialQuery::new()
            .holder(engine.config.did_for(TENANT))
            .any_types([SUMMARY_TYPE]),
    );
    assert_eq!(summaries.total, 1, "a wallet carries at most one summary credential");
    assert_eq!(summaries.items[0].id, second.id);
    assert!(engine.store.find_one(&CredentialQuery::new().id(&first.id)).is_none());

    let subject = second.credential_subject.iter().next().expect("subject present");
    let mut items: Vec<String> = subject.claims["items"]
        .as_array()
        .expect("items is a list")
        .iter()
        .map(|v| v.as_str().unwrap_or_default().to_string())
        .collect();
    items.sort();
    assert_eq!(items, vec!["DismantlerCredential", "MembershipCredential"]);
}

#[test]
fn summary_over_empty_wallet_has_no_items() {
    let engine = engine();
    let summary = engine.issuer.issue_summary(TENANT).expect("should derive summary");

    let subject = summary.credential_subject.iter().next().expect("subject present");
    assert_eq!(subject.claims["items"], serde_json::json!([]));
}
