mod extrude;

pub use extrude::OffsetExtrude;
