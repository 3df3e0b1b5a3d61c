//! Policy behavior across the empty/non-empty asymmetry.

use std::io::Write;

use mml_model::TargetCuis;
use proptest::prelude::*;

fn cui_strategy() -> impl Strategy<Value = String> {
    "C[0-9]{7}"
}

proptest! {
    #[test]
    fn empty_policy_is_identity(cui in cui_strategy()) {
        let cuis = TargetCuis::new();
        prop_assert_eq!(cuis.get_target_cuis(&cui), vec![cui]);
    }

    #[test]
    fn nonempty_policy_drops_unknown(key in cui_strategy(), probe in cui_strategy()) {
        prop_assume!(key != probe);
        let mut cuis = TargetCuis::new();
        cuis.add(&key, [key.clone()]);
        prop_assert!(cuis.get_target_cuis(&probe).is_empty());
    }

    #[test]
    fn lookup_is_deterministic(key in cui_strategy(), targets in prop::collection::vec(cui_strategy(), 0..4)) {
        let mut cuis = TargetCuis::new();
        cuis.add(&key, targets);
        prop_assert_eq!(cuis.get_target_cuis(&key), cuis.get_target_cuis(&key));
    }
}

#[test]
fn loads_mapping_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "C0011849,C0011860").unwrap();
    writeln!(file, "C0011854,C0011860").unwrap();
    writeln!(file).unwrap();
    writeln!(file, "C0035647").unwrap();
    let cuis = TargetCuis::from_file(file.path()).unwrap();
    assert_eq!(cuis.n_keys(), 3);
    // two sources collapse onto one canonical CUI
    assert_eq!(cuis.n_values(), 2);
    assert_eq!(cuis.get_target_cuis("C0011849"), vec!["C0011860"]);
    assert_eq!(cuis.get_target_cuis("C0011854"), vec!["C0011860"]);
    assert_eq!(cuis.get_target_cuis("C0035647"), vec!["C0035647"]);
    assert!(cuis.contains("C0011860"));
    assert!(!cuis.contains("C0011849"));
}
