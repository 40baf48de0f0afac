//! Property-based tests for closure scopes.

use chrono::{Duration, NaiveDate};
use proptest::prelude::*;
use uuid::Uuid;
use ziklo_shared::types::{CostCenterId, EngineerId, ProjectId};

use crate::closure::scope::{ClosureScope, EntryCoordinates};

fn arb_date() -> impl Strategy<Value = NaiveDate> {
    (0i64..3650).prop_map(|days| {
        NaiveDate::from_ymd_opt(2020, 1, 1).expect("valid date") + Duration::days(days)
    })
}

fn arb_range() -> impl Strategy<Value = (NaiveDate, NaiveDate)> {
    (arb_date(), 0i64..90).prop_map(|(start, len)| (start, start + Duration::days(len)))
}

fn arb_uuids() -> impl Strategy<Value = Vec<Uuid>> {
    prop::collection::vec(any::<u128>().prop_map(Uuid::from_u128), 0..6)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Reordering or duplicating ids never changes the fingerprint.
    #[test]
    fn prop_fingerprint_order_independent(
        (start, end) in arb_range(),
        projects in arb_uuids(),
        engineers in arb_uuids(),
        seed in any::<u64>(),
    ) {
        let forward = ClosureScope::new(start, end).unwrap()
            .with_projects(projects.iter().copied().map(ProjectId::from_uuid))
            .with_engineers(engineers.iter().copied().map(EngineerId::from_uuid));

        let mut shuffled = projects.clone();
        shuffled.reverse();
        let rotate = usize::try_from(seed).unwrap_or(0) % shuffled.len().max(1);
        shuffled.rotate_left(rotate);
        shuffled.extend(projects.first().copied());

        let backward = ClosureScope::new(start, end).unwrap()
            .with_projects(shuffled.into_iter().map(ProjectId::from_uuid))
            .with_engineers(engineers.iter().rev().copied().map(EngineerId::from_uuid));

        prop_assert_eq!(forward.fingerprint(), backward.fingerprint());
        prop_assert_eq!(forward, backward);
    }

    /// Scopes with different date ranges never share a fingerprint.
    #[test]
    fn prop_fingerprint_separates_ranges(
        (start, end) in arb_range(),
        shift in 1i64..400,
    ) {
        let a = ClosureScope::new(start, end).unwrap();
        let b = ClosureScope::new(start, end + Duration::days(shift)).unwrap();
        prop_assert_ne!(a.fingerprint(), b.fingerprint());
    }

    /// A scope contained in its parent never covers an entry the parent misses.
    #[test]
    fn prop_contained_scope_covers_subset(
        (start, end) in arb_range(),
        offset in 0i64..90,
        len in 0i64..90,
        probe in arb_date(),
        project in any::<u128>(),
    ) {
        let parent = ClosureScope::new(start, end).unwrap();
        let span = (end - start).num_days();
        let offset = offset % (span + 1);
        let len = len % (span - offset + 1);
        let child_start = start + Duration::days(offset);
        let child_end = child_start + Duration::days(len);
        let child = ClosureScope::new(child_start, child_end).unwrap();
        prop_assert!(child.violation_within(&parent).is_none());

        let coords = EntryCoordinates {
            date: probe,
            project_id: ProjectId::from_uuid(Uuid::from_u128(project)),
            cost_center_id: CostCenterId::new(),
            engineer_id: EngineerId::new(),
        };
        if child.covers(&coords) {
            prop_assert!(parent.covers(&coords));
        }
    }

    /// The canonical form survives a serde round trip of the scope.
    #[test]
    fn prop_serde_preserves_fingerprint(
        (start, end) in arb_range(),
        projects in arb_uuids(),
    ) {
        let scope = ClosureScope::new(start, end).unwrap()
            .with_projects(projects.into_iter().map(ProjectId::from_uuid));
        let json = serde_json::to_string(&scope).unwrap();
        let back: ClosureScope = serde_json::from_str(&json).unwrap();
        prop_assert_eq!(scope.fingerprint(), back.fingerprint());
    }
}
