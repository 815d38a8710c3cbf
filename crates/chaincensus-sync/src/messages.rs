//! Chain-sync wire messages.
//!
//! Requests are JSON-RPC 2.0 envelopes *without* ids: the node answers every
//! chain-sync request in submission order, so replies are matched to requests
//! purely by position. That FIFO guarantee is what makes the pipelined window
//! work without any correlation bookkeeping.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use chaincensus_core::{Block, CensusError, Point};

/// JSON-RPC error code the node uses for "no intersection found".
const INTERSECTION_NOT_FOUND: i64 = 1000;

/// An outbound chain-sync request.
#[derive(Debug, Clone, Serialize)]
pub struct Request {
    jsonrpc: &'static str,
    method: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    params: Option<Value>,
}

impl Request {
    /// Negotiate the starting point of the stream.
    pub fn find_intersection(points: &[Point]) -> Self {
        Self {
            jsonrpc: "2.0",
            method: "findIntersection",
            params: Some(json!({ "points": points })),
        }
    }

    /// Request the next block relative to the negotiated cursor.
    pub fn next_block() -> Self {
        Self { jsonrpc: "2.0", method: "nextBlock", params: None }
    }

    pub fn method(&self) -> &'static str {
        self.method
    }
}

/// A successfully negotiated intersection.
#[derive(Debug, Clone, Deserialize)]
pub struct Intersection {
    pub intersection: Point,
    pub tip: Point,
}

/// Outcome of a `findIntersection` exchange.
#[derive(Debug)]
pub enum IntersectionOutcome {
    Found(Intersection),
    /// The node knows none of the candidate points.
    NotFound,
}

/// A `nextBlock` reply. Forward replies carry a block; backward replies
/// announce a rollback to an earlier point.
#[derive(Debug, Deserialize)]
#[serde(tag = "direction", rename_all = "camelCase")]
pub enum NextBlock {
    Forward { block: Block, tip: Point },
    Backward { point: RollbackPoint, tip: Point },
}

/// The target of a rollback: a concrete point, or chain origin.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RollbackPoint {
    Origin(String),
    Point(Point),
}

impl std::fmt::Display for RollbackPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Origin(s) => f.write_str(s),
            Self::Point(p) => write!(f, "{p}"),
        }
    }
}

/// Parse a `findIntersection` reply.
pub fn parse_intersection(message: &Value) -> Result<IntersectionOutcome, CensusError> {
    check_method(message, "findIntersection")?;
    if let Some(error) = message.get("error") {
        if error.get("code").and_then(Value::as_i64) == Some(INTERSECTION_NOT_FOUND) {
            return Ok(IntersectionOutcome::NotFound);
        }
        return Err(protocol("findIntersection", format!("node error: {error}")));
    }
    let result = message
        .get("result")
        .ok_or_else(|| protocol("findIntersection", "reply without result".into()))?;
    let found: Intersection = serde_json::from_value(result.clone())
        .map_err(|e| protocol("findIntersection", e.to_string()))?;
    Ok(IntersectionOutcome::Found(found))
}

/// Parse a `nextBlock` reply.
pub fn parse_next_block(message: &Value) -> Result<NextBlock, CensusError> {
    check_method(message, "nextBlock")?;
    if let Some(error) = message.get("error") {
        return Err(protocol("nextBlock", format!("node error: {error}")));
    }
    let result = message
        .get("result")
        .ok_or_else(|| protocol("nextBlock", "reply without result".into()))?;
    serde_json::from_value(result.clone()).map_err(|e| protocol("nextBlock", e.to_string()))
}

/// FIFO sanity check: the reply's method must be the one we are waiting for.
fn check_method(message: &Value, expected: &'static str) -> Result<(), CensusError> {
    match message.get("method").and_then(Value::as_str) {
        Some(method) if method == expected => Ok(()),
        other => Err(protocol(
            expected,
            format!("out-of-order reply for method {other:?}"),
        )),
    }
}

fn protocol(context: &'static str, reason: String) -> CensusError {
    CensusError::Protocol { context, reason }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn find_intersection_serializes_without_id() {
        let req = Request::find_intersection(&[Point::new(42, "abcd")]);
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(value["jsonrpc"], "2.0");
        assert_eq!(value["method"], "findIntersection");
        assert_eq!(value["params"]["points"][0]["slot"], 42);
        assert!(value.get("id").is_none());
    }

    #[test]
    fn next_block_has_no_params() {
        let value = serde_json::to_value(Request::next_block()).unwrap();
        assert_eq!(value["method"], "nextBlock");
        assert!(value.get("params").is_none());
    }

    #[test]
    fn intersection_found() {
        let reply = serde_json::json!({
            "jsonrpc": "2.0",
            "method": "findIntersection",
            "result": {
                "intersection": {"slot": 100, "id": "aa"},
                "tip": {"slot": 500, "id": "bb", "height": 7}
            }
        });
        match parse_intersection(&reply).unwrap() {
            IntersectionOutcome::Found(found) => {
                assert_eq!(found.intersection.slot, 100);
                assert_eq!(found.tip.slot, 500);
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn intersection_not_found_code() {
        let reply = serde_json::json!({
            "jsonrpc": "2.0",
            "method": "findIntersection",
            "error": {"code": 1000, "message": "intersection not found"}
        });
        assert!(matches!(
            parse_intersection(&reply).unwrap(),
            IntersectionOutcome::NotFound
        ));
    }

    #[test]
    fn forward_and_backward_replies() {
        let forward = serde_json::json!({
            "method": "nextBlock",
            "result": {
                "direction": "forward",
                "block": {"slot": 101, "transactions": []},
                "tip": {"slot": 500, "id": "bb"}
            }
        });
        assert!(matches!(
            parse_next_block(&forward).unwrap(),
            NextBlock::Forward { block, .. } if block.slot == 101
        ));

        let backward = serde_json::json!({
            "method": "nextBlock",
            "result": {
                "direction": "backward",
                "point": {"slot": 90, "id": "cc"},
                "tip": {"slot": 500, "id": "bb"}
            }
        });
        assert!(matches!(
            parse_next_block(&backward).unwrap(),
            NextBlock::Backward { point: RollbackPoint::Point(p), .. } if p.slot == 90
        ));

        let to_origin = serde_json::json!({
            "method": "nextBlock",
            "result": {
                "direction": "backward",
                "point": "origin",
                "tip": {"slot": 500, "id": "bb"}
            }
        });
        assert!(matches!(
            parse_next_block(&to_origin).unwrap(),
            NextBlock::Backward { point: RollbackPoint::Origin(_), .. }
        ));
    }

    #[test]
    fn mismatched_method_is_a_protocol_error() {
        let reply = serde_json::json!({"method": "findIntersection", "result": {}});
        assert!(parse_next_block(&reply).is_err());
    }
}
