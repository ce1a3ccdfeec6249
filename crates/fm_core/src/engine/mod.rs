//! Match rules, each a pure function over broadcast state plus the
//! calling agent's own random source. The round protocol in `fm_sim`
//! invokes these in a fixed order; nothing in here communicates.

pub mod chase;
pub mod contest;
pub mod goal;
pub mod movement;
pub mod shoot;
