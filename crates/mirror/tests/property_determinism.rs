// Property-based tests for the reconciliation engine.
// CI: 128 cases (default). Soak: PROPTEST_CASES=10000 cargo test --release

use proptest::prelude::*;
use tablemirror::bucket::identity_digest;
use tablemirror::report::DiagnosticKind;
use tablemirror::{FieldLink, Mirror, RowSet, Side, Value};

fn config() -> ProptestConfig {
    ProptestConfig {
        cases: std::env::var("PROPTEST_CASES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(128),
        failure_persistence: None,
        ..ProptestConfig::default()
    }
}

// ---------------------------------------------------------------------------
// Generators
// ---------------------------------------------------------------------------

fn arb_value() -> impl Strategy<Value = Value> {
    prop_oneof![
        3 => (-1000i64..1000).prop_map(Value::Integer),
        2 => r"[a-zA-Zé€ ]{0,8}".prop_map(Value::Text),
        1 => Just(Value::Null),
    ]
}

/// Rows of (key, payload); keys drawn from a small pool so buckets collide.
fn arb_rows() -> impl Strategy<Value = Vec<(u8, Value)>> {
    prop::collection::vec((0u8..6, arb_value()), 0..12)
}

fn to_set(rows: &[(u8, Value)]) -> RowSet {
    let mut set = RowSet::new(["key", "payload"]);
    for (key, payload) in rows {
        set.push(vec![Value::text(format!("K{key}")), payload.clone()]).unwrap();
    }
    set
}

fn mirror() -> Mirror {
    Mirror::new(
        "prop",
        vec![
            FieldLink::new("key", "key").identity(),
            FieldLink::new("payload", "payload"),
        ],
    )
    .unwrap()
}

fn fingerprint(rows_a: &[(u8, Value)], rows_b: &[(u8, Value)]) -> Vec<String> {
    mirror()
        .compare(to_set(rows_a), to_set(rows_b))
        .unwrap()
        .diagnostics
        .iter()
        .map(|d| format!("{}|{}|{:?}|{:?}|{}", d.kind, d.message, d.value_a, d.value_b, d.digest))
        .collect()
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(config())]

    #[test]
    fn repeated_runs_are_identical(a in arb_rows(), b in arb_rows()) {
        prop_assert_eq!(fingerprint(&a, &b), fingerprint(&a, &b));
    }

    #[test]
    fn a_table_mirrors_itself(a in arb_rows()) {
        // Deduplicate keys so every bucket holds one row per side
        let mut seen = std::collections::HashSet::new();
        let unique: Vec<_> = a.into_iter().filter(|(k, _)| seen.insert(*k)).collect();
        prop_assert!(fingerprint(&unique, &unique).is_empty());
    }

    #[test]
    fn digest_depends_only_on_identity_values(key in "[a-z0-9]{0,10}", p1 in arb_value(), p2 in arb_value()) {
        let links = vec![
            FieldLink::new("key", "k").identity(),
            FieldLink::new("payload", "p"),
        ];
        let a = RowSet::new(["key", "payload"])
            .with_row(vec![Value::text(key.clone()), p1])
            .unwrap();
        let b = RowSet::new(["k", "p"])
            .with_row(vec![Value::text(key), p2])
            .unwrap();
        prop_assert_eq!(
            identity_digest(&a.rows()[0], &links, Side::A),
            identity_digest(&b.rows()[0], &links, Side::B)
        );
    }

    #[test]
    fn one_missing_match_per_unbalanced_bucket(a in arb_rows(), b in arb_rows()) {
        let report = mirror().compare(to_set(&a), to_set(&b)).unwrap();
        let unbalanced = (0u8..6)
            .filter(|k| {
                a.iter().filter(|(x, _)| x == k).count() != b.iter().filter(|(x, _)| x == k).count()
            })
            .count();
        let missing = report
            .diagnostics
            .iter()
            .filter(|d| d.kind == DiagnosticKind::MissingMatch)
            .count();
        prop_assert_eq!(missing, unbalanced);
    }
}
