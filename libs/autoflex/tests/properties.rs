//! Property-based tests for the transcoder
//!
//! These check the conversion guarantees across arbitrary field values
//! rather than hand-picked samples.

use std::collections::{BTreeMap, HashMap};

use autoflex::{Attr, ErrorKind, Record, Set};
use proptest::prelude::*;

#[derive(Debug, Clone, Default, PartialEq, Record)]
struct CounterApi {
    pub name: Option<String>,
    pub count: i32,
    pub zones: Vec<String>,
    pub labels: HashMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Record)]
struct CounterModel {
    pub name: Attr<String>,
    #[flex(narrowing)]
    pub count: Attr<i64>,
    pub zones: Attr<Vec<String>>,
    pub labels: Attr<BTreeMap<String, String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Record)]
struct MembersApi {
    pub members: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Record)]
struct MembersModel {
    pub members: Attr<Set<String>>,
}

fn counter_api_strategy() -> impl Strategy<Value = CounterApi> {
    (
        proptest::option::of("[a-z0-9-]{0,20}"),
        any::<i32>(),
        proptest::collection::vec("[a-z0-9-]{1,10}", 0..5),
        proptest::collection::hash_map("[a-z_]{1,10}", "[a-z0-9]{0,10}", 0..5),
    )
        .prop_map(|(name, count, zones, labels)| CounterApi {
            name,
            count,
            zones,
            labels,
        })
}

proptest! {
    #[test]
    fn prop_int32_survives_widening_and_narrowing(v in any::<i32>()) {
        let mut model = CounterModel::default();
        autoflex::flatten(&CounterApi { count: v, ..CounterApi::default() }, &mut model).unwrap();
        prop_assert_eq!(&model.count, &Attr::known(i64::from(v)));

        let mut api = CounterApi::default();
        autoflex::expand(&model, &mut api).unwrap();
        prop_assert_eq!(api.count, v);
    }

    #[test]
    fn prop_narrowing_rejects_out_of_range(
        v in prop_oneof![i64::MIN..i64::from(i32::MIN), (i64::from(i32::MAX) + 1)..=i64::MAX]
    ) {
        let model = CounterModel { count: Attr::known(v), ..CounterModel::default() };
        let err = autoflex::expand(&model, &mut CounterApi::default()).unwrap_err();
        prop_assert_eq!(err.kind(), ErrorKind::Value);
    }

    #[test]
    fn prop_absence_maps_to_null_never_unknown(api in counter_api_strategy()) {
        let mut model = CounterModel::default();
        autoflex::flatten(&api, &mut model).unwrap();

        prop_assert!(!model.name.is_unknown());
        prop_assert_eq!(model.name.is_null(), api.name.is_none());
        prop_assert_eq!(model.name.clone().into_option(), api.name.clone());
    }

    #[test]
    fn prop_flatten_then_expand_is_identity(api in counter_api_strategy()) {
        let mut model = CounterModel::default();
        autoflex::flatten(&api, &mut model).unwrap();

        let mut back = CounterApi::default();
        autoflex::expand(&model, &mut back).unwrap();
        prop_assert_eq!(back, api);
    }

    #[test]
    fn prop_empty_collections_stay_known(name in "[a-z]{0,10}") {
        let model = CounterModel {
            name: Attr::known(name),
            count: Attr::known(0),
            zones: Attr::known(Vec::new()),
            labels: Attr::known(BTreeMap::new()),
        };
        let mut api = CounterApi::default();
        autoflex::expand(&model, &mut api).unwrap();

        let mut again = CounterModel::default();
        autoflex::flatten(&api, &mut again).unwrap();
        prop_assert_eq!(again, model);
    }

    #[test]
    fn prop_sets_hold_each_member_once(
        members in proptest::collection::vec("[a-c]{1,2}", 0..20)
    ) {
        let mut model = MembersModel::default();
        autoflex::flatten(&MembersApi { members: members.clone() }, &mut model).unwrap();

        let mut distinct = members.clone();
        distinct.sort();
        distinct.dedup();

        let set = model.members.as_known().cloned().unwrap_or_default();
        prop_assert_eq!(set.len(), distinct.len());
        prop_assert!(members.iter().all(|m| set.contains(m)));
    }
}
