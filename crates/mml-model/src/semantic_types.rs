//! Static UMLS semantic-type table.
//!
//! Maps a Type Unique Identifier (TUI) to its short mnemonic (the
//! abbreviation MetaMap reports, e.g. `T047` -> `dsyn`). Built once
//! process-wide and read-only thereafter.

use std::collections::HashMap;
use std::sync::LazyLock;

/// TUI -> semantic-type mnemonic pairs, per the UMLS semantic network.
const TUI_TO_SEMTYPE: &[(&str, &str)] = &[
    ("T001", "orgm"),
    ("T002", "plnt"),
    ("T004", "fngs"),
    ("T005", "virs"),
    ("T007", "bact"),
    ("T008", "anim"),
    ("T010", "vtbt"),
    ("T011", "amph"),
    ("T012", "bird"),
    ("T013", "fish"),
    ("T014", "rept"),
    ("T015", "mamm"),
    ("T016", "humn"),
    ("T017", "anst"),
    ("T018", "emst"),
    ("T019", "cgab"),
    ("T020", "acab"),
    ("T021", "ffas"),
    ("T022", "bdsy"),
    ("T023", "bpoc"),
    ("T024", "tisu"),
    ("T025", "cell"),
    ("T026", "celc"),
    ("T028", "gngm"),
    ("T029", "blor"),
    ("T030", "bsoj"),
    ("T031", "bdsu"),
    ("T032", "orga"),
    ("T033", "fndg"),
    ("T034", "lbtr"),
    ("T037", "inpo"),
    ("T038", "biof"),
    ("T039", "phsf"),
    ("T040", "orgf"),
    ("T041", "menp"),
    ("T042", "ortf"),
    ("T043", "celf"),
    ("T044", "moft"),
    ("T045", "genf"),
    ("T046", "patf"),
    ("T047", "dsyn"),
    ("T048", "mobd"),
    ("T049", "comd"),
    ("T050", "emod"),
    ("T051", "evnt"),
    ("T052", "acty"),
    ("T053", "bhvr"),
    ("T054", "socb"),
    ("T055", "inbe"),
    ("T056", "dora"),
    ("T057", "ocac"),
    ("T058", "hlca"),
    ("T059", "lbpr"),
    ("T060", "diap"),
    ("T061", "topp"),
    ("T062", "resa"),
    ("T063", "mbrt"),
    ("T064", "gora"),
    ("T065", "edac"),
    ("T066", "mcha"),
    ("T067", "phpr"),
    ("T068", "hcpp"),
    ("T069", "eehu"),
    ("T070", "npop"),
    ("T071", "enty"),
    ("T072", "phob"),
    ("T073", "mnob"),
    ("T074", "medd"),
    ("T075", "resd"),
    ("T077", "conc"),
    ("T078", "idcn"),
    ("T079", "tmco"),
    ("T080", "qlco"),
    ("T081", "qnco"),
    ("T082", "spco"),
    ("T083", "geoa"),
    ("T085", "mosq"),
    ("T086", "nusq"),
    ("T087", "amas"),
    ("T088", "crbs"),
    ("T089", "rnlw"),
    ("T090", "ocdi"),
    ("T091", "bmod"),
    ("T092", "orgt"),
    ("T093", "hcro"),
    ("T094", "pros"),
    ("T095", "shro"),
    ("T096", "grup"),
    ("T097", "prog"),
    ("T098", "popg"),
    ("T099", "famg"),
    ("T100", "aggp"),
    ("T101", "podg"),
    ("T102", "grpa"),
    ("T103", "chem"),
    ("T104", "chvs"),
    ("T109", "orch"),
    ("T114", "nnon"),
    ("T116", "aapp"),
    ("T120", "chvf"),
    ("T121", "phsu"),
    ("T122", "bodm"),
    ("T123", "bacs"),
    ("T125", "horm"),
    ("T126", "enzy"),
    ("T127", "vita"),
    ("T129", "imft"),
    ("T130", "irda"),
    ("T131", "hops"),
    ("T167", "sbst"),
    ("T168", "food"),
    ("T169", "ftcn"),
    ("T170", "inpr"),
    ("T171", "lang"),
    ("T184", "sosy"),
    ("T185", "clas"),
    ("T190", "anab"),
    ("T191", "neop"),
    ("T192", "rcpt"),
    ("T194", "arch"),
    ("T195", "antb"),
    ("T196", "elii"),
    ("T197", "inch"),
    ("T200", "clnd"),
    ("T201", "clna"),
    ("T203", "drdd"),
    ("T204", "euka"),
];

static TABLE: LazyLock<HashMap<&'static str, &'static str>> =
    LazyLock::new(|| TUI_TO_SEMTYPE.iter().copied().collect());

/// Resolve a TUI to its semantic-type mnemonic, if known.
pub fn semtype_for_tui(tui: &str) -> Option<&'static str> {
    TABLE.get(tui).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_tuis_resolve() {
        assert_eq!(semtype_for_tui("T047"), Some("dsyn"));
        assert_eq!(semtype_for_tui("T078"), Some("idcn"));
        assert_eq!(semtype_for_tui("T184"), Some("sosy"));
    }

    #[test]
    fn unknown_tui_is_none() {
        assert_eq!(semtype_for_tui("T999"), None);
        assert_eq!(semtype_for_tui(""), None);
    }
}
