//! Property-based tests for ratecard-core.
//!
//! These tests verify pricing and ledger invariants hold for arbitrary
//! inputs using proptest.
//!
//! Run with: cargo test -p ratecard-core --test `property_tests`

use proptest::prelude::*;
use ratecard_core::calculator::{evaluate, margin, PricingMode};
use ratecard_core::{
    summarize, CalculationInput, Decimal, Location, PositionDraft, PositionId, PositionLedger,
    RoleCatalog, RoleCost, Session,
};

// ============================================================================
// Arbitrary generators
// ============================================================================

fn arb_positive_cost() -> impl Strategy<Value = Decimal> {
    // 0.01 .. 10,000.00 per hour
    (1i64..1_000_000i64).prop_map(|n| Decimal::new(n, 2))
}

fn arb_cost() -> impl Strategy<Value = Decimal> {
    prop_oneof![
        1 => Just(Decimal::ZERO),
        9 => arb_positive_cost(),
    ]
}

fn arb_hours() -> impl Strategy<Value = Decimal> {
    (1i64..100_000i64).prop_map(|n| Decimal::new(n, 1))
}

fn arb_margin() -> impl Strategy<Value = Decimal> {
    // 0.0000 .. 0.9999
    (0i64..10_000i64).prop_map(|n| Decimal::new(n, 4))
}

fn arb_rate() -> impl Strategy<Value = Decimal> {
    (1i64..5_000_000i64).prop_map(|n| Decimal::new(n, 2))
}

fn arb_role_cost() -> impl Strategy<Value = RoleCost> {
    (arb_cost(), arb_cost(), arb_cost())
        .prop_map(|(on, off, near)| RoleCost::new("Role", on, off, near))
}

fn arb_mode() -> impl Strategy<Value = PricingMode> {
    prop_oneof![
        arb_margin().prop_map(PricingMode::Margin),
        arb_rate().prop_map(PricingMode::Rate),
    ]
}

fn arb_location() -> impl Strategy<Value = Option<Location>> {
    prop::option::of(prop_oneof![
        Just(Location::Onshore),
        Just(Location::Offshore),
        Just(Location::Nearshore),
    ])
}

#[derive(Debug, Clone)]
enum LedgerOp {
    Add,
    Remove(u64),
    Clear,
}

fn arb_ledger_op() -> impl Strategy<Value = LedgerOp> {
    prop_oneof![
        6 => Just(LedgerOp::Add),
        3 => (0u64..20).prop_map(LedgerOp::Remove),
        1 => Just(LedgerOp::Clear),
    ]
}

fn tolerance() -> Decimal {
    Decimal::new(1, 18)
}

// ============================================================================
// Calculator properties
// ============================================================================

proptest! {
    #[test]
    fn prop_margin_round_trip(cost in arb_positive_cost(), m in arb_margin()) {
        let client_rate = PricingMode::Margin(m).client_rate(cost);
        let achieved = margin(client_rate, cost);
        prop_assert!((achieved - m).abs() < tolerance(),
            "cost {} margin {} -> {}", cost, m, achieved);
    }

    #[test]
    fn prop_profit_identity(rc in arb_role_cost(), hours in arb_hours(), mode in arb_mode()) {
        let eval = evaluate(&rc, hours, mode).unwrap();
        for quote in eval.quotes() {
            prop_assert_eq!(quote.profit, quote.total_cost - hours * quote.cost_per_hour);
            prop_assert_eq!(quote.total_cost, hours * quote.client_rate);
        }
    }

    #[test]
    fn prop_margin_mode_margin_in_range(rc in arb_role_cost(), hours in arb_hours(), m in arb_margin()) {
        let eval = evaluate(&rc, hours, PricingMode::Margin(m)).unwrap();
        for quote in eval.quotes() {
            prop_assert!(quote.margin >= Decimal::ZERO);
            prop_assert!(quote.margin < Decimal::ONE);
            if quote.cost_per_hour.is_zero() {
                prop_assert_eq!(quote.margin, Decimal::ZERO);
            }
        }
    }

    #[test]
    fn prop_margin_mode_ranking_ignores_hours(
        rc in arb_role_cost(),
        h1 in arb_hours(),
        h2 in arb_hours(),
        m in arb_margin(),
    ) {
        let a = evaluate(&rc, h1, PricingMode::Margin(m)).unwrap();
        let b = evaluate(&rc, h2, PricingMode::Margin(m)).unwrap();
        prop_assert_eq!(a.best().location, b.best().location);
    }

    #[test]
    fn prop_best_is_not_beaten(rc in arb_role_cost(), hours in arb_hours(), mode in arb_mode()) {
        let eval = evaluate(&rc, hours, mode).unwrap();
        let best = eval.best();
        for quote in eval.quotes() {
            match mode {
                PricingMode::Margin(_) => prop_assert!(best.total_cost <= quote.total_cost),
                PricingMode::Rate(_) => prop_assert!(best.margin >= quote.margin),
            }
        }
        prop_assert_eq!(eval.ranked()[0].location, best.location);
    }

    #[test]
    fn prop_invalid_hours_rejected(rc in arb_role_cost(), mode in arb_mode(), n in 0i64..1000) {
        let hours = Decimal::new(-n, 1);
        prop_assert!(evaluate(&rc, hours, mode).is_err());
    }
}

// ============================================================================
// Ledger properties
// ============================================================================

proptest! {
    #[test]
    fn prop_ids_strictly_increase(ops in prop::collection::vec(arb_ledger_op(), 0..60)) {
        let mut ledger = PositionLedger::new();
        let mut issued: Vec<PositionId> = Vec::new();
        let draft = PositionDraft {
            role_cost: RoleCost::new("Role", Decimal::ONE, Decimal::ONE, Decimal::ONE),
            hours: Decimal::ONE,
            mode: PricingMode::Margin(Decimal::ZERO),
            selected: None,
        };

        for op in ops {
            match op {
                LedgerOp::Add => {
                    let id = ledger.add(draft.clone());
                    if let Some(last) = issued.last() {
                        prop_assert!(id > *last);
                    }
                    issued.push(id);
                }
                LedgerOp::Remove(raw) => {
                    let before = ledger.len();
                    let existed = ledger.get(PositionId::new(raw)).is_some();
                    ledger.remove(PositionId::new(raw));
                    prop_assert_eq!(ledger.len(), if existed { before - 1 } else { before });
                }
                LedgerOp::Clear => ledger.clear(),
            }

            // Insertion order is id order
            let ids: Vec<_> = ledger.all().iter().map(|p| p.id).collect();
            let mut sorted = ids.clone();
            sorted.sort();
            prop_assert_eq!(ids, sorted);
        }
    }

    #[test]
    fn prop_summary_totals_match_positions(
        entries in prop::collection::vec((arb_role_cost(), arb_hours(), arb_location()), 0..10),
        m in arb_margin(),
    ) {
        let mut ledger = PositionLedger::new();
        for (role_cost, hours, selected) in entries {
            ledger.add(PositionDraft {
                role_cost,
                hours,
                mode: PricingMode::Margin(m),
                selected,
            });
        }

        let summary = summarize(ledger.all());
        let hours: Decimal = ledger.all().iter().map(|p| p.hours).sum();
        let profit: Decimal = ledger.all().iter().map(|p| p.selected_quote().profit).sum();
        prop_assert_eq!(summary.position_count, ledger.len());
        prop_assert_eq!(summary.total_hours, hours);
        prop_assert_eq!(summary.total_profit, profit);
        let drift = summary.total_profit - (summary.total_client_charge - summary.total_cost);
        prop_assert!(drift.abs() < tolerance());
        prop_assert!(summary.optimal_client_charge <= summary.total_client_charge);
    }

    #[test]
    fn prop_extreme_inputs_never_panic(
        mantissa in any::<i64>(),
        scale in 0u32..=28,
        margin_digits in 0u32..=28,
        entries in 1usize..4,
    ) {
        let hours = Decimal::new(mantissa, scale)
            .abs()
            .checked_mul(Decimal::new(i64::MAX, 0))
            .unwrap_or(Decimal::MAX);
        let near_one = Decimal::ONE - Decimal::new(1, margin_digits);
        let catalog = RoleCatalog::from_roles([
            RoleCost::new("Role", Decimal::new(100, 0), Decimal::new(34, 0), Decimal::new(47, 0)),
        ]);

        let mut session = Session::new();
        for _ in 0..entries {
            let _ = session.add_position(&catalog, &CalculationInput::margin("Role", hours, near_one));
            let _ = session.summary();
        }
    }
}
