//! Identifier newtypes.
//!
//! Every entity supplied by the upstream datasets carries a stable integer
//! id. Wrapping each one in its own type keeps a hall id from being passed
//! where a stop id is expected.

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u32);

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "{}"), self.0)
            }
        }
    };
}

id_type!(
    /// A physical transport stop.
    StopId,
    "stop#"
);
id_type!(
    /// A bus route (a fixed linear stop pattern).
    RouteId,
    "route#"
);
id_type!(
    /// The n-th run of a route on one service day, starting at 1.
    TripIndex,
    "trip#"
);
id_type!(
    /// A sports hall from the fixture list.
    HallId,
    "hall#"
);
id_type!(
    /// A lodging site (school) where squads sleep.
    LodgingId,
    "lodging#"
);
id_type!(
    /// A travelling squad.
    SquadId,
    "squad#"
);
id_type!(
    /// A fixture-list game.
    GameId,
    "game#"
);
id_type!(
    /// A communal tournament event (lunch, concert).
    EventId,
    "event#"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_and_debug() {
        assert_eq!(StopId(7).to_string(), "stop#7");
        assert_eq!(format!("{:?}", HallId(3)), "HallId(3)");
    }

    #[test]
    fn serde_is_transparent() {
        assert_eq!(serde_json::to_string(&RouteId(12)).unwrap(), "12");
        let id: SquadId = serde_json::from_str("42").unwrap();
        assert_eq!(id, SquadId(42));
    }
}
