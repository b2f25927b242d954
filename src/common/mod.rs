//! Common utilities and types for the street-grid robot

/// Common types and utilities used across the codebase
pub mod types {
    use serde::{Deserialize, Serialize};
    use std::fmt;

    /// Surface and building colours, indexed the way the colour sensor reports them.
    ///
    /// Index 0 is reserved for "off-map" and never appears as a variant.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
    #[serde(rename_all = "lowercase")]
    pub enum Color {
        Black = 1,
        Blue = 2,
        Green = 3,
        Yellow = 4,
        Red = 5,
        White = 6,
    }

    impl Color {
        /// All colours in label order
        pub const ALL: [Color; 6] = [
            Color::Black,
            Color::Blue,
            Color::Green,
            Color::Yellow,
            Color::Red,
            Color::White,
        ];

        /// Convert a raw sensor label into a colour
        pub fn from_label(label: i32) -> Option<Color> {
            match label {
                1 => Some(Color::Black),
                2 => Some(Color::Blue),
                3 => Some(Color::Green),
                4 => Some(Color::Yellow),
                5 => Some(Color::Red),
                6 => Some(Color::White),
                _ => None,
            }
        }

        /// Raw sensor label of this colour
        pub fn label(self) -> i32 {
            self as i32
        }

        /// Street surface or intersection, i.e. somewhere the robot may drive
        pub fn is_drivable(self) -> bool {
            matches!(self, Color::Black | Color::Yellow)
        }

        /// Colours a building around an intersection may have
        pub fn is_building(self) -> bool {
            matches!(self, Color::Blue | Color::Green | Color::White)
        }
    }

    impl fmt::Display for Color {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            let name = match self {
                Color::Black => "black",
                Color::Blue => "blue",
                Color::Green => "green",
                Color::Yellow => "yellow",
                Color::Red => "red",
                Color::White => "white",
            };
            f.write_str(name)
        }
    }

    /// Grid-aligned facing direction. The discriminant is the heading index
    /// used throughout the belief state.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(rename_all = "lowercase")]
    pub enum Heading {
        Up = 0,
        Right = 1,
        Down = 2,
        Left = 3,
    }

    impl Heading {
        /// All headings in index order (clockwise from Up)
        pub const ALL: [Heading; 4] = [Heading::Up, Heading::Right, Heading::Down, Heading::Left];

        /// Position in [`Heading::ALL`], clockwise from Up
        pub fn index(self) -> usize {
            self as usize
        }

        /// Heading for an index, wrapping modulo four
        pub fn from_index(index: usize) -> Heading {
            Heading::ALL[index % 4]
        }

        /// Heading after executing `turn`
        pub fn turned(self, turn: Turn) -> Heading {
            Heading::from_index(self.index() + turn.quarter_turns())
        }

        /// Heading after a U-turn
        pub fn opposite(self) -> Heading {
            self.turned(Turn::Around)
        }

        /// Grid offset of one step in this direction (rows grow downwards)
        pub fn offset(self) -> (i64, i64) {
            match self {
                Heading::Up => (0, -1),
                Heading::Right => (1, 0),
                Heading::Down => (0, 1),
                Heading::Left => (-1, 0),
            }
        }

        /// Absolute angle in degrees, clockwise from Up
        pub fn degrees(self) -> f64 {
            90.0 * self.index() as f64
        }

        /// Smallest turn that takes this heading to `target`, or `None` if
        /// they already agree
        pub fn turn_to(self, target: Heading) -> Option<Turn> {
            match (target.index() + 4 - self.index()) % 4 {
                0 => None,
                1 => Some(Turn::Right),
                2 => Some(Turn::Around),
                _ => Some(Turn::Left),
            }
        }
    }

    impl fmt::Display for Heading {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            let name = match self {
                Heading::Up => "up",
                Heading::Right => "right",
                Heading::Down => "down",
                Heading::Left => "left",
            };
            f.write_str(name)
        }
    }

    /// Relative turn at an intersection
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum Turn {
        Left,
        Right,
        Around,
    }

    impl Turn {
        /// Number of clockwise quarter turns this turn amounts to
        pub fn quarter_turns(self) -> usize {
            match self {
                Turn::Right => 1,
                Turn::Around => 2,
                Turn::Left => 3,
            }
        }

        /// Signed rotation in degrees, positive is clockwise
        pub fn degrees(self) -> f64 {
            match self {
                Turn::Right => 90.0,
                Turn::Around => 180.0,
                Turn::Left => -90.0,
            }
        }

        /// Same turn in the other direction
        pub fn mirrored(self) -> Turn {
            match self {
                Turn::Left => Turn::Right,
                Turn::Right => Turn::Left,
                Turn::Around => Turn::Around,
            }
        }
    }

    /// An intersection of the street grid
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Cell {
        pub x: usize,
        pub y: usize,
    }

    impl Cell {
        /// Create a new cell
        pub fn new(x: usize, y: usize) -> Self {
            Cell { x, y }
        }
    }

    impl fmt::Display for Cell {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "({}, {})", self.x, self.y)
        }
    }

    /// A (cell, heading) hypothesis, or the committed pose after localization
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Pose {
        pub cell: Cell,
        pub heading: Heading,
    }

    impl Pose {
        /// Create a new pose
        pub fn new(x: usize, y: usize, heading: Heading) -> Self {
            Pose {
                cell: Cell::new(x, y),
                heading,
            }
        }
    }

    impl fmt::Display for Pose {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "{} facing {}", self.cell, self.heading)
        }
    }

    /// Building colours around an intersection, clockwise from the top-left
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    pub struct Corners(pub [Color; 4]);

    impl Corners {
        /// What a robot facing `heading` reads, clockwise from its front-left
        pub fn rotated(&self, heading: Heading) -> Corners {
            let h = heading.index();
            Corners(std::array::from_fn(|k| self.0[(k + h) % 4]))
        }

        /// Inverse of [`Corners::rotated`]
        pub fn unrotated(&self, heading: Heading) -> Corners {
            let h = heading.index();
            Corners(std::array::from_fn(|k| self.0[(k + 4 - h) % 4]))
        }
    }

    /// Four classified colours from one intersection scan, clockwise from
    /// the robot's front-left. `None` marks a corner no label could be
    /// agreed on; it never matches a map colour.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Observation(pub [Option<Color>; 4]);

    impl Observation {
        /// Observation with every corner classified
        pub fn from_colors(colors: [Color; 4]) -> Self {
            Observation(colors.map(Some))
        }

        /// Number of corners agreeing with `expected`
        pub fn matching_corners(&self, expected: &Corners) -> usize {
            self.0
                .iter()
                .zip(expected.0.iter())
                .filter(|(seen, want)| **seen == Some(**want))
                .count()
        }

        /// Whether all four corners agree
        pub fn matches(&self, expected: &Corners) -> bool {
            self.matching_corners(expected) == 4
        }
    }

    impl fmt::Display for Observation {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            let names: Vec<String> = self
                .0
                .iter()
                .map(|c| c.map_or_else(|| "?".to_string(), |c| c.to_string()))
                .collect();
            write!(f, "[{}]", names.join(", "))
        }
    }
}
