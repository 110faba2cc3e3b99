//! The four concrete ticket kinds (§4.J), each a thin [`TicketSimulator`]
//! implementation over the shared [`BaseSimulator`] loop.

pub mod place;
pub mod win;
pub mod quinella;
pub mod trio;

pub use place::{PlaceRaceRecord, PlaceSimulator, PlaceSummary};
pub use quinella::{QuinellaRaceRecord, QuinellaSimulator, QuinellaSummary};
pub use trio::{TrioRaceRecord, TrioSimulator, TrioSummary};
pub use win::{WinRaceRecord, WinSimulator, WinSummary};
