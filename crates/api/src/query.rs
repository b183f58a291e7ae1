//! Drag queries - read-only access to the editor view.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// A query for drag state (read-only).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Query {
    /// Surface offset in canvas units, as used to place a dropped block.
    SurfaceTranslation,

    /// Name of the block currently on the drag surface.
    CurrentBlock,

    /// Whether the surface is empty or occupied.
    State,

    /// Markup dump of the whole view.
    Markup,
}

/// Response to a query.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum QueryResult {
    Translation { offset: Vec2 },

    CurrentBlock { block: Option<String> },

    State { occupied: bool, scale: f32 },

    Markup { markup: String },

    /// Error result.
    Error { message: String },
}

impl QueryResult {
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, QueryResult::Error { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_round_trips_through_json() {
        let query: Query = serde_json::from_str(r#"{"type": "surface_translation"}"#).unwrap();
        assert_eq!(query, Query::SurfaceTranslation);
    }

    #[test]
    fn translation_result_serializes_offset_as_array() {
        let result = QueryResult::Translation {
            offset: Vec2::new(10.0, 20.0),
        };
        let json = serde_json::to_value(&result).unwrap();

        assert_eq!(json["type"], "translation");
        assert_eq!(json["offset"], serde_json::json!([10.0, 20.0]));
    }
}
