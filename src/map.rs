//! Street map
//!
//! The map is a grid of `width x height` intersections in raster order. Each
//! intersection stores the colours of its four surrounding buildings,
//! clockwise from the top-left. Parsing the printed map image is done
//! elsewhere; this module reads the resulting grid from a TOML description:
//!
//! ```toml
//! width = 2
//! height = 1
//! cells = [
//!     ["green", "blue", "white", "green"],
//!     ["blue", "blue", "green", "white"],
//! ]
//! ```

use crate::common::types::{Cell, Color, Corners, Heading, Pose};
use crate::error::{Error, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct MapFile {
    width: usize,
    height: usize,
    cells: Vec<[Color; 4]>,
}

/// Immutable building-colour grid
#[derive(Debug, Clone, PartialEq)]
pub struct StreetMap {
    width: usize,
    height: usize,
    cells: Vec<Corners>,
}

impl StreetMap {
    /// Build a map from raster-ordered corner records
    pub fn new(width: usize, height: usize, cells: Vec<Corners>) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidMap(format!("map size {}x{} is empty", width, height)));
        }
        if cells.len() != width * height {
            return Err(Error::InvalidMap(format!(
                "expected {} intersections for a {}x{} map, found {}",
                width * height,
                width,
                height,
                cells.len()
            )));
        }
        for (index, corners) in cells.iter().enumerate() {
            if let Some(bad) = corners.0.iter().find(|c| !c.is_building()) {
                return Err(Error::InvalidMap(format!(
                    "intersection ({}, {}) has a {} building; only green, blue and white are allowed",
                    index % width,
                    index / width,
                    bad
                )));
            }
        }
        Ok(StreetMap {
            width,
            height,
            cells,
        })
    }

    /// Load a map description from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parse a map description from TOML text
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let file: MapFile = toml::from_str(contents)?;
        let cells = file.cells.into_iter().map(Corners).collect();
        let map = Self::new(file.width, file.height, cells)?;
        log::info!("Loaded {}x{} street map", map.width, map.height);
        Ok(map)
    }

    /// Intersections per row
    pub fn width(&self) -> usize {
        self.width
    }

    /// Intersections per column
    pub fn height(&self) -> usize {
        self.height
    }

    /// Number of intersections
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Always false for a validated map
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Raster index of a cell
    pub fn index(&self, cell: Cell) -> usize {
        cell.x + cell.y * self.width
    }

    /// Cell at a raster index
    pub fn cell(&self, index: usize) -> Cell {
        Cell::new(index % self.width, index / self.width)
    }

    /// Whether signed grid coordinates fall on the map
    pub fn contains(&self, x: i64, y: i64) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
    }

    /// Stored building colours around a cell
    pub fn corners(&self, cell: Cell) -> &Corners {
        &self.cells[self.index(cell)]
    }

    /// Adjacent intersection one step along `heading`, if it exists
    pub fn neighbor(&self, cell: Cell, heading: Heading) -> Option<Cell> {
        let (dx, dy) = heading.offset();
        let x = cell.x as i64 + dx;
        let y = cell.y as i64 + dy;
        if self.contains(x, y) {
            Some(Cell::new(x as usize, y as usize))
        } else {
            None
        }
    }

    /// Corners a robot at `pose` should read, clockwise from its front-left
    pub fn expected_observation(&self, pose: Pose) -> Corners {
        self.corners(pose.cell).rotated(pose.heading)
    }

    /// Iterate over all cells in raster order
    pub fn cells(&self) -> impl Iterator<Item = Cell> + '_ {
        (0..self.len()).map(move |i| self.cell(i))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SMALL: &str = r#"
        width = 2
        height = 1
        cells = [
            ["green", "blue", "white", "green"],
            ["blue", "blue", "green", "white"],
        ]
    "#;

    #[test]
    fn test_load_from_toml() {
        let map = StreetMap::from_toml_str(SMALL).unwrap();
        assert_eq!(map.width(), 2);
        assert_eq!(map.height(), 1);
        assert_eq!(map.corners(Cell::new(1, 0)).0[2], Color::Green);
    }

    #[test]
    fn test_neighbors_stop_at_edges() {
        let map = StreetMap::from_toml_str(SMALL).unwrap();
        let left = Cell::new(0, 0);
        assert_eq!(map.neighbor(left, Heading::Right), Some(Cell::new(1, 0)));
        assert_eq!(map.neighbor(left, Heading::Left), None);
        assert_eq!(map.neighbor(left, Heading::Up), None);
        assert_eq!(map.neighbor(left, Heading::Down), None);
    }

    #[test]
    fn test_raster_index_round_trip() {
        let map = StreetMap::from_toml_str(SMALL).unwrap();
        for cell in map.cells() {
            assert_eq!(map.cell(map.index(cell)), cell);
        }
    }

    #[test]
    fn test_rejects_wrong_cell_count() {
        let err = StreetMap::from_toml_str("width = 2\nheight = 2\ncells = []").unwrap_err();
        assert!(matches!(err, Error::InvalidMap(_)));
    }

    #[test]
    fn test_rejects_street_coloured_building() {
        let text = r#"
            width = 1
            height = 1
            cells = [["green", "yellow", "white", "green"]]
        "#;
        assert!(matches!(StreetMap::from_toml_str(text), Err(Error::InvalidMap(_))));
    }
}
