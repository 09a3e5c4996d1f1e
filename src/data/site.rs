use std::fmt;

use crate::errors::Result;

use super::MapCoords;

pub const FEET_TO_METERS: f64 = 0.3048;

/// A site has at most this many runways.
pub const RUNWAY_SLOTS: usize = 3;

pub fn feet_to_meters(feet: f64) -> f64 {
    feet * FEET_TO_METERS
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Owner {
    /// The network's own sites. Drawn in the "mine" colours.
    Me,
    RacAir,
    Unowned,
}

impl Owner {
    pub fn is_mine(self) -> bool {
        self == Owner::Me
    }
}

impl fmt::Display for Owner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Owner::Me => "me!",
            Owner::RacAir => "RacAir",
            Owner::Unowned => "-",
        })
    }
}

/// Runway heading in tens of degrees, as painted on the runway (17 is 170°).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RunwayHeading(u8);

impl RunwayHeading {
    /// Parses the legacy data-entry form, where 0 marks an empty slot.
    pub fn from_tens(tens: u8) -> Result<Option<RunwayHeading>> {
        match tens {
            0 => Ok(None),
            1..=35 => Ok(Some(RunwayHeading(tens))),
            _ => Err(format!("Runway heading {} is outside 0..36", tens).into()),
        }
    }

    pub fn tens(self) -> u8 {
        self.0
    }
}

impl fmt::Display for RunwayHeading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}", self.0)
    }
}

/// Field elevation, always held in metres.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Elevation {
    meters: f64,
}

impl Elevation {
    pub fn from_feet(feet: f64) -> Self {
        Elevation { meters: feet_to_meters(feet) }
    }

    pub fn meters(self) -> f64 {
        self.meters
    }

    pub fn feet(self) -> f64 {
        self.meters / FEET_TO_METERS
    }
}

#[derive(Debug, Clone)]
pub struct Site {
    pub name: String,
    pub position: MapCoords,
    pub owner: Owner,
    /// Lot count. Descriptive only.
    pub lots: u32,
    pub runways: [Option<RunwayHeading>; RUNWAY_SLOTS],
    pub elevation: Elevation,
    pub ils: bool,
    pub rnav: bool,
    pub note: String,
    /// Shown in parentheses after the identifier on the map.
    pub map_note: Option<String>,
}

impl Site {
    pub fn new(name: &str, position: MapCoords, owner: Owner, lots: u32) -> Self {
        Site {
            name: name.to_string(),
            position,
            owner,
            lots,
            runways: [None; RUNWAY_SLOTS],
            elevation: Elevation::default(),
            ils: false,
            rnav: false,
            note: String::new(),
            map_note: None,
        }
    }

    /// Fills the runway slots in order from legacy heading values (0 = no runway).
    pub fn with_runways(mut self, headings: &[u8]) -> Result<Self> {
        if headings.len() > RUNWAY_SLOTS {
            return Err(format!(
                "Site {} lists {} runways, at most {} are supported",
                self.name,
                headings.len(),
                RUNWAY_SLOTS,
            ).into());
        }
        for (slot, tens) in self.runways.iter_mut().zip(headings) {
            *slot = RunwayHeading::from_tens(*tens)?;
        }
        Ok(self)
    }

    pub fn with_elevation(mut self, elevation: Elevation) -> Self {
        self.elevation = elevation;
        self
    }

    /// Sets the instrument approaches available at the site.
    pub fn with_approaches(mut self, ils: bool, rnav: bool) -> Self {
        self.ils = ils;
        self.rnav = rnav;
        self
    }

    pub fn with_note(mut self, note: &str) -> Self {
        self.note = note.to_string();
        self
    }

    pub fn with_map_note(mut self, map_note: &str) -> Self {
        self.map_note = Some(map_note.to_string());
        self
    }

    /// Occupied runway slots, in slot order.
    pub fn runway_headings(&self) -> impl Iterator<Item = RunwayHeading> + '_ {
        self.runways.iter().flatten().copied()
    }

    pub fn label(&self, id: &str) -> String {
        match &self.map_note {
            Some(note) if !note.is_empty() => format!("{} ({})", id, note),
            _ => id.to_string(),
        }
    }
}
