//! Persistable board state.
//!
//! A snapshot is the full grid as an ordered list of `{row, column, element}`
//! records. Extents are recovered as `max(row) + 1` by `max(column) + 1`.

use serde::{Deserialize, Serialize};

use match3_types::{CellRecord, Element};

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BoardSnapshot {
    pub cells: Vec<CellRecord>,
}

impl BoardSnapshot {
    /// `(rows, columns)`, or `None` for an empty snapshot.
    pub fn extents(&self) -> Option<(usize, usize)> {
        let rows = self.cells.iter().map(|c| c.row).max()? + 1;
        let columns = self.cells.iter().map(|c| c.column).max()? + 1;
        Some((rows, columns))
    }

    /// Element recorded for a slot. The last record for a slot wins.
    pub fn element_at(&self, row: usize, column: usize) -> Option<Element> {
        self.cells
            .iter()
            .rev()
            .find(|c| c.row == row && c.column == column)
            .map(|c| c.element)
    }

    pub fn is_all_empty(&self) -> bool {
        self.cells.iter().all(|c| c.element.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extents_and_lookup() {
        let snap = BoardSnapshot {
            cells: vec![
                CellRecord::new(0, 0, Element::Fire),
                CellRecord::new(3, 1, Element::Water),
            ],
        };
        assert_eq!(snap.extents(), Some((4, 2)));
        assert_eq!(snap.element_at(3, 1), Some(Element::Water));
        assert_eq!(snap.element_at(1, 1), None);
        assert!(!snap.is_all_empty());
        assert_eq!(BoardSnapshot::default().extents(), None);
    }

    #[test]
    fn test_serializes_as_plain_list() {
        let snap = BoardSnapshot {
            cells: vec![CellRecord::new(0, 0, Element::Empty)],
        };
        let json = serde_json::to_string(&snap).unwrap();
        assert_eq!(json, r#"[{"row":0,"column":0,"element":"empty"}]"#);
    }
}
