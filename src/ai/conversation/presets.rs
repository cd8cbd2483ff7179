//! Static per-mode data. Adding a mode means adding a `Preset` here,
//! nothing else in the driver branches on the mode.
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::brief::{BriefSchema, DETAILED_BRIEF, STANDARD_BRIEF};
use super::error::ConversationError;

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq, Hash, clap::ValueEnum)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Mode {
    IdentityScan,
    ProjectDesign,
    Brainstorming,
}

#[derive(Debug)]
pub struct Preset {
    pub mode: Mode,
    pub id: &'static str,
    pub name: &'static str,
    pub welcome: &'static str,
    pub focus: &'static str,
    pub schema: &'static BriefSchema,
}

static IDENTITY_SCAN: Preset = Preset {
    mode: Mode::IdentityScan,
    id: "IDENTITY_SCAN",
    name: "Identity scan",
    welcome: "Mode: identity scan.\nLet's define the look. How would you describe the character of your community (modern, classic, loud, quiet)?",
    focus: "FOCUS: Visual identity. Moodboard style. Colors and light.",
    schema: &DETAILED_BRIEF,
};

static PROJECT_DESIGN: Preset = Preset {
    mode: Mode::ProjectDesign,
    id: "PROJECT_DESIGN",
    name: "Project design",
    welcome: "Mode: project design.\nWhat is coming up (flyer, post)? And what mood should the image carry?",
    focus: "FOCUS: A concrete asset (flyer). Which subject works as the background?",
    schema: &STANDARD_BRIEF,
};

static BRAINSTORMING: Preset = Preset {
    mode: Mode::Brainstorming,
    id: "BRAINSTORMING",
    name: "Brainstorming",
    welcome: "Mode: brainstorming.\nWhich topic would you like to translate into an image?",
    focus: "FOCUS: Finding ideas. Modern metaphors, nothing kitschy.",
    schema: &STANDARD_BRIEF,
};

pub static PRESETS: [&Preset; 3] = [&IDENTITY_SCAN, &PROJECT_DESIGN, &BRAINSTORMING];

impl Mode {
    pub fn preset(self) -> &'static Preset {
        match self {
            Mode::IdentityScan => &IDENTITY_SCAN,
            Mode::ProjectDesign => &PROJECT_DESIGN,
            Mode::Brainstorming => &BRAINSTORMING,
        }
    }

    pub fn all() -> impl Iterator<Item = Mode> {
        PRESETS.iter().map(|p| p.mode)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.preset().id)
    }
}

/// Accepts the wire name (`PROJECT_DESIGN`) as well as the kebab case
/// CLI spelling (`project-design`), ignoring case.
impl FromStr for Mode {
    type Err = ConversationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().replace('-', "_").to_uppercase();
        PRESETS
            .iter()
            .find(|p| p.id == normalized)
            .map(|p| p.mode)
            .ok_or_else(|| ConversationError::UnknownMode(s.to_string()))
    }
}
