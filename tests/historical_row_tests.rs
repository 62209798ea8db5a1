//! Historical-row write pattern tests
//!
//! The audit-trail patterns: a primary versioned write composed with a
//! secondary historical insert into a history partition, with historical
//! sort keys derived from the row version so retried cycles never
//! duplicate audit rows.

use keyrow::{
    compose_versioned_key, CompositePrimaryKey, ConcurrencySimulatingTable, Error,
    HistoricalWrites, InMemoryTable, ItemPayload, PolymorphicRow, Result, RowWithItemVersion,
    StandardRowIdentity, Table, TypedRow, AttributeMap, DEFAULT_HISTORICAL_RETRIES,
    DEFAULT_VERSION_PAD_WIDTH,
};
use keyrow::decode_item;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Balance {
    cents: i64,
}

impl ItemPayload for Balance {
    const ROW_TYPE: &'static str = "Balance";
}

const BALANCE_HISTORY_ROW_TYPE: &str = "BalanceHistory";

impl ItemPayload for RowWithItemVersion<Balance> {
    const ROW_TYPE: &'static str = BALANCE_HISTORY_ROW_TYPE;
}

#[derive(Debug, PartialEq)]
struct HistoryRow(TypedRow<RowWithItemVersion<Balance>>);

impl PolymorphicRow for HistoryRow {
    fn from_row(row_type: &str, attributes: &AttributeMap) -> Result<Self> {
        match row_type {
            BALANCE_HISTORY_ROW_TYPE => {
                decode_item::<StandardRowIdentity, RowWithItemVersion<Balance>>(attributes)
                    .map(HistoryRow)
            }
            other => Err(Error::UnexpectedRowType {
                provided: other.to_string(),
            }),
        }
    }
}

const HISTORY_PARTITION: &str = "account#9.history";

fn primary_key() -> CompositePrimaryKey {
    CompositePrimaryKey::new("account#9", "balance")
}

/// Derive the audit copy: keyed by the primary's row version so a retried
/// cycle lands on a fresh key instead of duplicating rows
fn historical_for(item: &TypedRow<Balance>) -> TypedRow<RowWithItemVersion<Balance>> {
    let sort_key =
        compose_versioned_key(item.row_version(), &["balance"], DEFAULT_VERSION_PAD_WIDTH)
            .expect("static segments are valid");
    TypedRow::new_item(
        CompositePrimaryKey::new(HISTORY_PARTITION, sort_key),
        RowWithItemVersion::with_version(item.row_version(), item.row_value.clone()),
    )
}

fn history_rows<T: Table>(table: &T) -> Vec<HistoryRow> {
    table
        .query::<StandardRowIdentity, _>(HISTORY_PARTITION, None)
        .expect("history partition should decode")
}

// ============================================================================
// Plain Composition
// ============================================================================

#[test]
fn test_insert_with_historical_row() {
    let table = InMemoryTable::new();
    let primary = TypedRow::new_item(primary_key(), Balance { cents: 500 });
    let historical = historical_for(&primary);

    table
        .insert_item_with_historical_row::<StandardRowIdentity, _, _>(&primary, &historical)
        .unwrap();

    let history = history_rows(&table);
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].0.row_value.item_version, 1);
    assert_eq!(history[0].0.row_value.row_value.cents, 500);
}

#[test]
fn test_update_with_historical_row_appends_audit_copy() {
    let table = InMemoryTable::new();
    let v1 = TypedRow::new_item(primary_key(), Balance { cents: 500 });
    table
        .insert_item_with_historical_row::<StandardRowIdentity, _, _>(&v1, &historical_for(&v1))
        .unwrap();

    let v2 = v1.create_updated_item(Balance { cents: 350 });
    table
        .update_item_with_historical_row::<StandardRowIdentity, _, _>(
            &v2,
            &v1,
            &historical_for(&v2),
        )
        .unwrap();

    let history = history_rows(&table);
    assert_eq!(history.len(), 2);
    // ascending sort-key order: v00001 then v00002
    assert_eq!(history[0].0.row_value.item_version, 1);
    assert_eq!(history[1].0.row_value.item_version, 2);
    assert_eq!(history[1].0.row_value.row_value.cents, 350);
}

#[test]
fn test_update_with_historical_row_stale_existing_rejected() {
    let table = InMemoryTable::new();
    let v1 = TypedRow::new_item(primary_key(), Balance { cents: 500 });
    table.insert_item::<StandardRowIdentity, _>(&v1).unwrap();

    let v2 = v1.create_updated_item(Balance { cents: 400 });
    table
        .update_item::<StandardRowIdentity, _>(&v2, &v1)
        .unwrap();

    // the primary update fails, so no audit row is written either
    let stale = v1.create_updated_item(Balance { cents: 999 });
    let err = table
        .update_item_with_historical_row::<StandardRowIdentity, _, _>(
            &stale,
            &v1,
            &historical_for(&stale),
        )
        .unwrap_err();
    assert!(matches!(err, Error::ConditionalCheckFailed { .. }));
    assert!(history_rows(&table).is_empty());
}

// ============================================================================
// Clobber With History
// ============================================================================

fn next_balance(current: Option<&TypedRow<Balance>>) -> Result<TypedRow<Balance>> {
    Ok(match current {
        None => TypedRow::new_item(primary_key(), Balance { cents: 100 }),
        Some(existing) => existing.create_updated_item(Balance {
            cents: existing.row_value.cents + 100,
        }),
    })
}

#[test]
fn test_clobber_with_historical_creates_then_updates() {
    let table = InMemoryTable::new();

    let first = table
        .clobber_item_with_historical_row::<StandardRowIdentity, Balance, _, _, _>(
            &primary_key(),
            DEFAULT_HISTORICAL_RETRIES,
            next_balance,
            historical_for,
        )
        .unwrap();
    assert_eq!(first.row_version(), 1);
    assert_eq!(first.row_value.cents, 100);

    let second = table
        .clobber_item_with_historical_row::<StandardRowIdentity, Balance, _, _, _>(
            &primary_key(),
            DEFAULT_HISTORICAL_RETRIES,
            next_balance,
            historical_for,
        )
        .unwrap();
    assert_eq!(second.row_version(), 2);
    assert_eq!(second.row_value.cents, 200);

    let history = history_rows(&table);
    assert_eq!(history.len(), 2);
}

/// An insert conflict flips the retried cycle onto the update path
#[test]
fn test_clobber_with_historical_retries_across_insert_conflict() {
    let inner = InMemoryTable::new();
    let table = ConcurrencySimulatingTable::with_toggles(inner, 1, true, false);

    let written = table
        .clobber_item_with_historical_row::<StandardRowIdentity, Balance, _, _, _>(
            &primary_key(),
            DEFAULT_HISTORICAL_RETRIES,
            next_balance,
            historical_for,
        )
        .expect("one conflict fits inside the budget");

    // the injected concurrent insert created v1; the retried cycle updated it
    assert_eq!(written.row_version(), 2);
    assert_eq!(written.row_value.cents, 200);
    assert_eq!(table.injected_modifications(), 1);

    // exactly one audit row, keyed by the version that actually landed
    let history = history_rows(&table);
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].0.row_value.item_version, 2);
    assert_eq!(history[0].0.key.sort_key, "v00002.balance");
}

#[test]
fn test_clobber_with_historical_exhaustion() {
    let inner = InMemoryTable::new();
    let table = ConcurrencySimulatingTable::with_toggles(inner, usize::MAX, true, true);

    let result = table
        .clobber_item_with_historical_row::<StandardRowIdentity, Balance, _, _, _>(
            &primary_key(),
            2,
            next_balance,
            historical_for,
        );
    assert!(matches!(result, Err(Error::Concurrency { .. })));
}

// ============================================================================
// Conditional Update With History
// ============================================================================

#[test]
fn test_conditional_update_with_historical_under_contention() {
    let inner = InMemoryTable::new();
    let seed = TypedRow::new_item(primary_key(), Balance { cents: 100 });
    inner.insert_item::<StandardRowIdentity, _>(&seed).unwrap();
    let table = ConcurrencySimulatingTable::with_toggles(inner, 3, false, true);

    let updated = table
        .conditionally_update_item_with_historical_row::<StandardRowIdentity, Balance, _, _, _>(
            &primary_key(),
            DEFAULT_HISTORICAL_RETRIES,
            |current| Ok(current.create_updated_item(Balance {
                cents: current.row_value.cents * 2,
            })),
            historical_for,
        )
        .expect("3 conflicts fit inside the budget");

    // 1 + 3 injected bumps + 1 real update
    assert_eq!(updated.row_version(), 5);
    assert_eq!(updated.row_value.cents, 200);

    // re-derivation on retry: only the landed cycle wrote an audit row
    let history = history_rows(&table);
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].0.row_value.item_version, 5);
    assert_eq!(history[0].0.key.sort_key, "v00005.balance");
}

#[test]
fn test_conditional_update_with_historical_returns_updated_row() {
    let table = InMemoryTable::new();
    let seed = TypedRow::new_item(primary_key(), Balance { cents: 80 });
    table.insert_item::<StandardRowIdentity, _>(&seed).unwrap();

    let updated = table
        .conditionally_update_item_with_historical_row::<StandardRowIdentity, Balance, _, _, _>(
            &primary_key(),
            DEFAULT_HISTORICAL_RETRIES,
            |current| Ok(current.create_updated_item(Balance {
                cents: current.row_value.cents - 30,
            })),
            historical_for,
        )
        .unwrap();

    assert_eq!(updated.row_version(), 2);
    assert_eq!(updated.row_value.cents, 50);

    let stored = table
        .get_item::<StandardRowIdentity, Balance>(&primary_key())
        .unwrap()
        .unwrap();
    assert_eq!(stored, updated);
}

#[test]
fn test_conditional_update_with_historical_absent_row() {
    let table = InMemoryTable::new();
    let result = table
        .conditionally_update_item_with_historical_row::<StandardRowIdentity, Balance, _, _, _>(
            &primary_key(),
            DEFAULT_HISTORICAL_RETRIES,
            |current| Ok(current.clone()),
            historical_for,
        );
    assert!(matches!(result, Err(Error::ConditionalCheckFailed { .. })));
}
