//! Property tests for target resolution.

use proptest::prelude::*;

use modship::domain::services::{NamingScheme, TargetTable};
use modship::domain::value_objects::{Arch, Os};
use modship::DeployError;

fn stem() -> impl Strategy<Value = String> {
    proptest::string::string_regex("[A-Za-z][A-Za-z0-9_]{0,15}").unwrap()
}

fn naming() -> impl Strategy<Value = NamingScheme> {
    (stem(), stem(), stem(), stem()).prop_map(|(name, krate, process, script)| NamingScheme {
        extension_name: name,
        extension_crate: krate,
        process_stem: process,
        launch_script_stem: script,
    })
}

fn pair() -> impl Strategy<Value = (Os, Arch)> {
    (
        prop_oneof![Just(Os::Windows), Just(Os::Linux)],
        prop_oneof![Just(Arch::X86), Just(Arch::X64)],
    )
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 128,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: every built-in pair resolves to non-empty names built from the stems.
    #[test]
    fn property_builtin_pairs_resolve((os, arch) in pair(), naming in naming()) {
        let resolved = TargetTable::builtin().resolve(os, arch, &naming).unwrap();

        prop_assert!(!resolved.compiler_triple.is_empty());
        prop_assert!(resolved.binary_file_name.starts_with(&naming.extension_name));
        prop_assert!(resolved.artifact_file_name.contains(&naming.extension_crate));
        prop_assert!(resolved.process_name.starts_with(&naming.process_stem));
        prop_assert!(resolved.launch_script_name.starts_with(&naming.launch_script_stem));
        prop_assert_eq!(
            resolved.binary_file_name.contains("_x64"),
            arch == Arch::X64
        );
    }

    /// PROPERTY: a removed pair fails with `UnsupportedTarget`, never a partial result.
    #[test]
    fn property_removed_pair_is_unsupported((os, arch) in pair(), naming in naming()) {
        let mut table = TargetTable::builtin();
        table.set(os, arch, "");

        let result = table.resolve(os, arch, &naming);

        prop_assert!(
            matches!(result, Err(DeployError::UnsupportedTarget { .. })),
            "unexpected result: {:?}",
            result
        );
    }

    /// PROPERTY: an override replaces exactly one pair.
    #[test]
    fn property_override_replaces_one_pair(
        (os, arch) in pair(),
        triple in "[a-z0-9_]{1,12}-[a-z]{1,8}-[a-z]{1,8}",
    ) {
        let mut table = TargetTable::builtin();
        let before = TargetTable::builtin();
        table.set(os, arch, triple.clone());

        prop_assert_eq!(table.triple(os, arch), Some(triple.as_str()));
        for other_os in Os::ALL {
            for other_arch in [Arch::X86, Arch::X64] {
                if (other_os, other_arch) != (os, arch) {
                    prop_assert_eq!(
                        table.triple(other_os, other_arch),
                        before.triple(other_os, other_arch)
                    );
                }
            }
        }
    }
}
