//! Protocol module - JSON message types for the line adapter
//!
//! One JSON object per line in each direction; every object carries a `type`.

use serde::{Deserialize, Serialize};

use match3_engine::BoardEvent;
use match3_types::{CellId, CellRecord, Direction, WorldPos};

// ============== Client -> Game Messages ==============

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InboundMessage {
    /// Swap the cell at `(row, col)` with its neighbor in `direction`.
    Swap {
        row: usize,
        col: usize,
        direction: Direction,
    },
    /// Pointer gesture in world units.
    Swipe {
        #[serde(default)]
        pointer: u64,
        from: [f32; 2],
        to: [f32; 2],
    },
    Restart,
    NextLevel,
    Snapshot,
}

// ============== Game -> Client Messages ==============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    InvalidMessage,
    UnknownType,
    LevelLoad,
    Internal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutboundMessage {
    /// Full board, sent on start, level change and on request.
    Level {
        level: u32,
        rows: usize,
        columns: usize,
        cells: Vec<CellRecord>,
    },
    Move {
        cell_id: CellId,
        position: WorldPos,
    },
    Fall {
        cell_id: CellId,
        position: WorldPos,
    },
    Destroy {
        cell_id: CellId,
    },
    CascadeComplete,
    Rejected {
        code: String,
        reason: String,
    },
    Error {
        code: ErrorCode,
        message: String,
    },
}

impl OutboundMessage {
    pub fn rejected(code: &str, reason: impl ToString) -> Self {
        Self::Rejected {
            code: code.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn error(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::Error {
            code,
            message: message.into(),
        }
    }
}

impl From<BoardEvent> for OutboundMessage {
    fn from(event: BoardEvent) -> Self {
        match event {
            BoardEvent::Moved { cell_id, position } => Self::Move { cell_id, position },
            BoardEvent::Fell { cell_id, position } => Self::Fall { cell_id, position },
            BoardEvent::Destroyed { cell_id } => Self::Destroy { cell_id },
            BoardEvent::CascadeComplete => Self::CascadeComplete,
        }
    }
}

// ============== Message Parsing ==============

/// Parsed incoming line
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedMessage {
    Known(InboundMessage),
    Unknown { msg_type: String },
}

/// Parse one line.
///
/// A well-formed object with an unrecognized `type` is not a parse error.
pub fn parse_message(json: &str) -> Result<ParsedMessage, serde_json::Error> {
    const KNOWN: [&str; 5] = ["swap", "swipe", "restart", "next_level", "snapshot"];

    match serde_json::from_str::<InboundMessage>(json) {
        Ok(msg) => Ok(ParsedMessage::Known(msg)),
        Err(e) => {
            #[derive(Debug, Deserialize)]
            struct TypeOnly<'a> {
                #[serde(rename = "type", borrow)]
                msg_type: Option<&'a str>,
            }
            let msg_type = serde_json::from_str::<TypeOnly>(json)?
                .msg_type
                .unwrap_or("unknown");
            if !KNOWN.contains(&msg_type) {
                return Ok(ParsedMessage::Unknown {
                    msg_type: msg_type.to_string(),
                });
            }
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_swap() {
        let msg = parse_message(r#"{"type":"swap","row":1,"col":2,"direction":"left"}"#).unwrap();
        assert_eq!(
            msg,
            ParsedMessage::Known(InboundMessage::Swap {
                row: 1,
                col: 2,
                direction: Direction::Left
            })
        );
    }

    #[test]
    fn test_parse_swipe_defaults_pointer() {
        let msg = parse_message(r#"{"type":"swipe","from":[0.5,0.5],"to":[1.5,0.5]}"#).unwrap();
        assert_eq!(
            msg,
            ParsedMessage::Known(InboundMessage::Swipe {
                pointer: 0,
                from: [0.5, 0.5],
                to: [1.5, 0.5]
            })
        );
    }

    #[test]
    fn test_parse_unit_variants() {
        assert_eq!(
            parse_message(r#"{"type":"next_level"}"#).unwrap(),
            ParsedMessage::Known(InboundMessage::NextLevel)
        );
    }

    #[test]
    fn test_unknown_type_is_not_an_error() {
        assert_eq!(
            parse_message(r#"{"type":"dance"}"#).unwrap(),
            ParsedMessage::Unknown {
                msg_type: "dance".to_string()
            }
        );
    }

    #[test]
    fn test_malformed_known_type_is_an_error() {
        assert!(parse_message(r#"{"type":"swap","row":1}"#).is_err());
        assert!(parse_message("not json").is_err());
    }

    #[test]
    fn test_outbound_shape() {
        let json = serde_json::to_value(OutboundMessage::from(BoardEvent::Destroyed { cell_id: CellId(4) })).unwrap();
        assert_eq!(json, serde_json::json!({"type": "destroy", "cell_id": 4}));

        let json = serde_json::to_value(OutboundMessage::CascadeComplete).unwrap();
        assert_eq!(json, serde_json::json!({"type": "cascade_complete"}));

        let json = serde_json::to_value(OutboundMessage::error(ErrorCode::UnknownType, "nope")).unwrap();
        assert_eq!(json["code"], "unknown_type");
    }
}
