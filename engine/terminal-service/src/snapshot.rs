//! Snapshot ingress parsing and the published read surface

use std::sync::Arc;

use chrono::{DateTime, Utc};
use equity_engine::{AccountSummary, Group, Position, Totals};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::warn;

/// Errors decoding a snapshot payload.
#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("malformed snapshot JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("snapshot document is missing the '{0}' field")]
    MissingField(&'static str),

    #[error("position groups payload is not a list")]
    GroupsNotAList,

    #[error("group is missing symbolName")]
    MissingGroupSymbol,
}

/// Immutable view of the engine published after each recompute cycle.
/// The rendering layer polls or subscribes to this; it never mutates it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TerminalSnapshot {
    pub account: AccountSummary,
    pub groups: Vec<Group>,
    pub totals: Totals,
    /// Equity under the account's free-margin mode.
    pub equity: f64,
    pub free_margin: f64,
    /// Undefined while no margin is in use.
    pub margin_level: Option<f64>,
    pub timestamp: DateTime<Utc>,
}

impl TerminalSnapshot {
    pub(crate) fn assemble(account: AccountSummary, groups: Vec<Group>, totals: Totals) -> Self {
        let equity = equity_engine::equity(account.balance, &totals, account.free_margin_mode);
        Self {
            free_margin: equity_engine::free_margin(equity, account.margin),
            margin_level: equity_engine::margin_level(equity, account.margin),
            equity,
            timestamp: Utc::now(),
            account,
            groups,
            totals,
        }
    }
}

/// What the read surface currently holds.
#[derive(Debug, Clone, Default)]
pub enum ReadState {
    /// No snapshot has been loaded; equity queries have no defined answer.
    #[default]
    NotReady,
    Ready(Arc<TerminalSnapshot>),
}

impl ReadState {
    pub fn is_ready(&self) -> bool {
        matches!(self, ReadState::Ready(_))
    }

    pub fn snapshot(&self) -> Option<&TerminalSnapshot> {
        match self {
            ReadState::Ready(snapshot) => Some(snapshot),
            ReadState::NotReady => None,
        }
    }
}

// The REST backend wraps every response body in {"data": ...}.
fn unwrap_data(value: &Value) -> &Value {
    value.get("data").unwrap_or(value)
}

/// Decode an account-summary payload (with or without the `data` wrapper).
pub fn parse_account(payload: &Value) -> Result<AccountSummary, SnapshotError> {
    Ok(serde_json::from_value(unwrap_data(payload).clone())?)
}

/// Decode a position-list payload (with or without the `data` wrapper).
///
/// Decode failures stay per-position: a position whose calculation block is
/// malformed loads with the calculation absent (profit undefined, group
/// degraded) and one undecodable position never fails the snapshot.
pub fn parse_groups(payload: &Value) -> Result<Vec<Group>, SnapshotError> {
    let raw_groups = unwrap_data(payload).as_array().ok_or(SnapshotError::GroupsNotAList)?;
    let mut groups = Vec::with_capacity(raw_groups.len());
    for raw_group in raw_groups {
        let symbol = raw_group
            .get("symbolName")
            .and_then(Value::as_str)
            .ok_or(SnapshotError::MissingGroupSymbol)?;
        let mut group = Group::new(symbol);
        if let Some(positions) = raw_group.get("positions").and_then(Value::as_array) {
            group.positions = positions.iter().filter_map(|raw| parse_position(raw.clone())).collect();
        }
        groups.push(group.recompute());
    }
    Ok(groups)
}

/// Decode one replay document: `{"account": ..., "groups": ...}`.
pub fn parse_snapshot_document(text: &str) -> Result<(AccountSummary, Vec<Group>), SnapshotError> {
    let document: Value = serde_json::from_str(text)?;
    let account = document.get("account").ok_or(SnapshotError::MissingField("account"))?;
    let groups = document.get("groups").ok_or(SnapshotError::MissingField("groups"))?;
    Ok((parse_account(account)?, parse_groups(groups)?))
}

fn parse_position(mut raw: Value) -> Option<Position> {
    match serde_json::from_value::<Position>(raw.clone()) {
        Ok(position) => Some(position),
        Err(error) => {
            // Most decode failures live in the nested calculation block;
            // retry without it rather than dropping the whole row.
            warn!(%error, "position failed to decode; retrying without plCalculation");
            raw.as_object_mut()?.remove("plCalculation");
            match serde_json::from_value::<Position>(raw) {
                Ok(position) => Some(position),
                Err(error) => {
                    warn!(%error, "skipping undecodable position");
                    None
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use equity_engine::FreeMarginMode;
    use serde_json::json;

    fn account_payload() -> Value {
        json!({
            "balance": 10000.0,
            "equity": 10000.0,
            "leverage": 100.0,
            "margin": 250.0,
            "freeMarginMode": 2,
            "currency": "USD",
            "digits": 2
        })
    }

    fn position_payload() -> Value {
        json!({
            "positionId": 505814,
            "symbolName": "EURUSD",
            "type": 0,
            "volume": 1.0,
            "contractSize": 100000.0,
            "openPrice": 1.1,
            "digits": 5,
            "digitsCurrency": 2,
            "profit": 12.5,
            "plCalculation": { "calculationMode": 2 }
        })
    }

    #[test]
    fn parses_a_data_wrapped_document() {
        let document = json!({
            "account": { "data": account_payload() },
            "groups": { "data": [ { "symbolName": "EURUSD", "positions": [position_payload()] } ] }
        });
        let (account, groups) = parse_snapshot_document(&document.to_string()).unwrap();
        assert_eq!(account.free_margin_mode, FreeMarginMode::UsePl);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].positions.len(), 1);
        // Aggregates are derived at load from the delivered profits.
        assert_eq!(groups[0].profit, Some(12.5));
    }

    #[test]
    fn malformed_calculation_block_degrades_the_position_only() {
        let mut position = position_payload();
        position["plCalculation"] = json!({ "calculationMode": 2, "conversionSymbol": 42 });
        let payload = json!([ { "symbolName": "EURUSD", "positions": [position] } ]);

        let groups = parse_groups(&payload).unwrap();
        let loaded = &groups[0].positions[0];
        assert_eq!(loaded.position_id, 505814);
        assert!(loaded.pl_calculation.is_none());
    }

    #[test]
    fn undecodable_position_is_skipped_not_fatal() {
        let payload = json!([ {
            "symbolName": "EURUSD",
            "positions": [ { "positionId": "not-a-number" }, position_payload() ]
        } ]);
        let groups = parse_groups(&payload).unwrap();
        assert_eq!(groups[0].positions.len(), 1);
    }

    #[test]
    fn missing_document_fields_are_errors() {
        assert!(matches!(
            parse_snapshot_document(r#"{"groups": []}"#),
            Err(SnapshotError::MissingField("account"))
        ));
        assert!(matches!(
            parse_snapshot_document(r#"{"account": {}}"#),
            Err(SnapshotError::MissingField("groups"))
        ));
    }

    #[test]
    fn group_without_symbol_is_an_error() {
        let payload = json!([ { "positions": [] } ]);
        assert!(matches!(parse_groups(&payload), Err(SnapshotError::MissingGroupSymbol)));
    }

    #[test]
    fn assemble_derives_equity_and_margin() {
        let account: AccountSummary = serde_json::from_value(account_payload()).unwrap();
        let totals = Totals { profit: 165.0, loss: -15.0, swap: 0.0, commission: 0.0, degraded: false };
        let snapshot = TerminalSnapshot::assemble(account, Vec::new(), totals);
        assert_eq!(snapshot.equity, 10_150.0);
        assert_eq!(snapshot.free_margin, 9_900.0);
        assert_eq!(snapshot.margin_level, Some(10_150.0 / 250.0 * 100.0));
    }
}
