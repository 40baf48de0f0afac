//! Property-based tests for the mutation gate.

use chrono::{Duration, NaiveDate, Utc};
use proptest::prelude::*;
use ziklo_shared::types::{ClosureId, CostCenterId, EngineerId, ProjectId};

use crate::closure::gate::{GateDecision, MutationKind, evaluate};
use crate::closure::scope::{ClosureScope, EntryCoordinates};
use crate::closure::types::{ClosureException, ClosureStatus, ClosureVerdict, ExportClosure};

fn base() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 12, 1).expect("valid date")
}

fn arb_status() -> impl Strategy<Value = ClosureStatus> {
    prop_oneof![
        Just(ClosureStatus::Active),
        Just(ClosureStatus::Reopened),
        Just(ClosureStatus::PartiallyReopened),
    ]
}

fn arb_op() -> impl Strategy<Value = MutationKind> {
    prop_oneof![
        Just(MutationKind::Create),
        Just(MutationKind::Update),
        Just(MutationKind::Delete),
    ]
}

/// A closure over a random window of December with at most one exception.
fn arb_closure() -> impl Strategy<Value = ExportClosure> {
    (arb_status(), 0i64..20, 0i64..15, 0i64..10, 0i64..10).prop_map(
        |(status, start, len, ex_start, ex_len)| {
            let start_date = base() + Duration::days(start);
            let end_date = start_date + Duration::days(len);
            let scope = ClosureScope::new(start_date, end_date).expect("valid");
            let exceptions = if status == ClosureStatus::PartiallyReopened {
                let from = start_date + Duration::days(ex_start.min(len));
                let to = (from + Duration::days(ex_len)).min(end_date);
                vec![ClosureException {
                    scope: ClosureScope::new(from, to).expect("valid"),
                    note: "prop".to_string(),
                    created_by: None,
                    created_at: Utc::now(),
                }]
            } else {
                Vec::new()
            };
            let now = Utc::now();
            ExportClosure {
                id: ClosureId::new(),
                fingerprint: scope.fingerprint(),
                scope,
                status,
                revision: 1,
                version: 1,
                exceptions,
                record_count: 0,
                artifact_key: None,
                created_by: None,
                last_exported_by: None,
                reopened_by: None,
                reopened_at: None,
                created_at: now,
                updated_at: now,
            }
        },
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// The gate allows exactly when no covering closure blocks.
    #[test]
    fn prop_any_block_wins(
        closures in prop::collection::vec(arb_closure(), 0..6),
        day in 0i64..40,
        op in arb_op(),
    ) {
        let coords = EntryCoordinates {
            date: base() + Duration::days(day),
            project_id: ProjectId::new(),
            cost_center_id: CostCenterId::new(),
            engineer_id: EngineerId::new(),
        };
        let verdicts: Vec<ClosureVerdict> = closures.iter().map(|c| c.verdict(&coords)).collect();
        let blocked = verdicts.contains(&ClosureVerdict::Blocks);
        let adjusted = verdicts.contains(&ClosureVerdict::Reopened);

        match evaluate(&closures, &coords, op) {
            GateDecision::Allow { post_export_adjustment } => {
                prop_assert!(!blocked);
                prop_assert_eq!(post_export_adjustment, adjusted);
            }
            GateDecision::Block(reason) => {
                prop_assert!(blocked);
                prop_assert_eq!(reason.operation, op);
                let blocker = closures.iter().find(|c| c.id == reason.closure_id);
                prop_assert!(blocker.is_some_and(|c| c.verdict(&coords) == ClosureVerdict::Blocks));
            }
        }
    }

    /// Evaluation does not depend on the order closures are supplied in.
    #[test]
    fn prop_order_independent(
        closures in prop::collection::vec(arb_closure(), 0..6),
        day in 0i64..40,
    ) {
        let coords = EntryCoordinates {
            date: base() + Duration::days(day),
            project_id: ProjectId::new(),
            cost_center_id: CostCenterId::new(),
            engineer_id: EngineerId::new(),
        };
        let mut reversed = closures.clone();
        reversed.reverse();
        prop_assert_eq!(
            evaluate(&closures, &coords, MutationKind::Update),
            evaluate(&reversed, &coords, MutationKind::Update)
        );
    }
}
