//! Property tests for key rendering and set/get consistency.

use proptest::prelude::*;
use ydb_core::Key;
use ydb_testkit::{
    expected_display, subscripts_strategy, value_strategy, varname_strategy, TestConn,
};

proptest! {
    #[test]
    fn display_reproduces_every_component(
        varname in varname_strategy(),
        subs in subscripts_strategy(),
    ) {
        let key = Key::new(&varname, subs.as_slice());
        prop_assert_eq!(key.to_string(), expected_display(&varname, &subs));
        prop_assert_eq!(key.varname(), varname.as_str());
        let got: Vec<String> = key.subscripts().map(|s| s.into_owned()).collect();
        prop_assert_eq!(got, subs);
    }

    #[test]
    fn set_then_get_returns_value(
        varname in varname_strategy(),
        subs in subscripts_strategy(),
        value in value_strategy(2048),
    ) {
        let conn = TestConn::memory();
        let n = conn.node(&varname, subs.as_slice());
        n.set(&value).unwrap();
        prop_assert_eq!(n.get().unwrap(), value);
    }

    #[test]
    fn unset_key_yields_default(
        varname in varname_strategy(),
        subs in subscripts_strategy(),
    ) {
        let conn = TestConn::memory();
        let n = conn.node(&varname, subs.as_slice());
        prop_assert_eq!(n.get_or("D").unwrap(), "D");
        let err = n.get().unwrap_err();
        prop_assert!(err.is_undefined());
    }
}
