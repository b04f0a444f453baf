use strum::{EnumIter, EnumString, IntoStaticStr};

/// Zone type of a grid tile.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, EnumIter, EnumString, IntoStaticStr,
)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ZoneTag {
    /// Settlement center.
    Gate,
    /// Generic wasteland tile.
    Waste,
    Factory,
    Hospital,
    RadioTower,
    PoliceStation,
    Supermarket,
    Pharmacy,
    GasStation,
    School,
    Warehouse,
    Bunker,
}

impl ZoneTag {
    /// Tags placed as points of interest at world generation.
    pub const POINTS_OF_INTEREST: [ZoneTag; 10] = [
        ZoneTag::Factory,
        ZoneTag::Hospital,
        ZoneTag::RadioTower,
        ZoneTag::PoliceStation,
        ZoneTag::Supermarket,
        ZoneTag::Pharmacy,
        ZoneTag::GasStation,
        ZoneTag::School,
        ZoneTag::Warehouse,
        ZoneTag::Bunker,
    ];

    pub fn is_point_of_interest(self) -> bool {
        !matches!(self, ZoneTag::Gate | ZoneTag::Waste)
    }

    pub fn as_str(self) -> &'static str {
        self.into()
    }
}

/// Visibility classification of a tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum DiscoveryState {
    Hidden,
    Explored,
    Town,
    PointOfInterest(ZoneTag),
}

impl DiscoveryState {
    pub fn is_revealed(self) -> bool {
        !matches!(self, DiscoveryState::Hidden)
    }
}
