//! Identifiers shared by the fake catalog and the fixtures.
#![allow(dead_code)]

pub const ARTIST_A: &str = "A";
pub const ARTIST_B: &str = "B";
pub const ARTIST_C: &str = "C";

pub const TRACK_X: &str = "X";
pub const TRACK_Y: &str = "Y";
pub const TRACK_Z: &str = "Z";
pub const TRACK_UNKNOWN: &str = "Unreleased Demo";

pub const TRACK_X_ID: &str = "t-ax";
pub const TRACK_Y_ID: &str = "t-by";
pub const TRACK_Z_ID: &str = "t-cz";

pub const ARTIST_A_ID: &str = "a-1";
pub const ARTIST_B_ID: &str = "b-1";
pub const ARTIST_C_ID: &str = "c-1";

pub const ARTIST_A_GENRES: [&str; 2] = ["pop", "rock"];
pub const ARTIST_C_GENRES: [&str; 3] = ["indie", "folk", "lo-fi"];
