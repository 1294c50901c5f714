pub mod cozy;

pub use cozy::{
    find_uci, gives_check, in_check, is_capture, legal_moves, Position, PositionError,
};
