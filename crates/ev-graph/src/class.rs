//! Road classification and the class-speed table.
//!
//! Travel times are normally carried by the dataset.  When an edge lacks one
//! it is synthesized from the edge length and an assumed speed for its road
//! class; an edge with neither length nor travel time costs a flat 60 s.

/// Road class of an edge, from the dataset's `highway` tag.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
pub enum HighwayClass {
    Motorway,
    Trunk,
    Primary,
    Secondary,
    Tertiary,
    /// Any `*_link` ramp (motorway_link, trunk_link, ...).
    Link,
    Residential,
    Unclassified,
    Service,
    #[default]
    Other,
}

/// Fallback speed when a class has no table entry: 13.89 m/s ≈ 50 km/h.
pub const DEFAULT_SPEED_MPS: f64 = 13.89;

impl HighwayClass {
    /// Map a `highway` tag value to a class.  Unknown tags land in `Other`
    /// rather than being dropped.
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "motorway" => Self::Motorway,
            "trunk" => Self::Trunk,
            "primary" => Self::Primary,
            "secondary" => Self::Secondary,
            "tertiary" => Self::Tertiary,
            "motorway_link" | "trunk_link" | "primary_link" | "secondary_link"
            | "tertiary_link" | "link" => Self::Link,
            "residential" | "living_street" => Self::Residential,
            "unclassified" => Self::Unclassified,
            "service" => Self::Service,
            _ => Self::Other,
        }
    }

    /// Canonical tag value for export.  Link ramps collapse to `"link"`;
    /// the distinction between ramp flavours is not modeled.
    pub fn tag(self) -> &'static str {
        match self {
            Self::Motorway => "motorway",
            Self::Trunk => "trunk",
            Self::Primary => "primary",
            Self::Secondary => "secondary",
            Self::Tertiary => "tertiary",
            Self::Link => "link",
            Self::Residential => "residential",
            Self::Unclassified => "unclassified",
            Self::Service => "service",
            Self::Other => "other",
        }
    }

    /// Assumed speed in m/s for travel-time synthesis.
    ///
    /// km/h values: motorway 100, trunk 80, primary/secondary/tertiary 50,
    /// residential/unclassified 30; everything else uses
    /// [`DEFAULT_SPEED_MPS`].
    pub fn speed_mps(self) -> f64 {
        match self {
            Self::Motorway => 100.0 / 3.6,
            Self::Trunk => 80.0 / 3.6,
            Self::Primary | Self::Secondary | Self::Tertiary => 50.0 / 3.6,
            Self::Residential | Self::Unclassified => 30.0 / 3.6,
            Self::Link | Self::Service | Self::Other => DEFAULT_SPEED_MPS,
        }
    }
}

/// Travel time in seconds for an edge without one in the dataset.
///
/// `length_m` may be `NAN` (absent); that case costs a flat 60 s.
#[inline]
pub fn synthesize_travel_time(length_m: f64, class: HighwayClass) -> f64 {
    if length_m.is_finite() {
        length_m / class.speed_mps()
    } else {
        60.0
    }
}
