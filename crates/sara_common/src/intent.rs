//! Closed intent set and slot types.
//!
//! Intents form a fixed allow-list shared by the rule classifier and the
//! restricted arbiter. Keeping it as an enum makes the allow-list a
//! compile-time set instead of runtime string comparisons.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Every intent the pipeline can resolve to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Intent {
    /// Head of a department: "CSE HOD kaun hai" => slot [department]
    DepartmentHod,
    /// Placement stats: placement/package/ctc/lpa => slot [college]
    Placements,
    /// Courses offered: course/branch/degree => slot [college]
    Courses,
    /// Campus facilities: campus/hostel/library => slot [college]
    Campus,
    /// Director / principal of the college => slot [college]
    CollegeDirector,
    /// Chairman / owner of the college => slot [college]
    CollegeChairman,
    /// Current time, answered deterministically
    Time,
    /// Robot movement command, never forwarded to an LLM
    Movement,
    /// Greeting / chitchat handled by canned replies
    SmallTalk,
    /// Catch-all, routed to open generation
    General,
}

impl std::fmt::Display for Intent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl Intent {
    /// All intents, in the order shown to the arbiter.
    pub const ALL: [Intent; 10] = [
        Intent::Campus,
        Intent::CollegeChairman,
        Intent::CollegeDirector,
        Intent::Courses,
        Intent::DepartmentHod,
        Intent::General,
        Intent::Movement,
        Intent::Placements,
        Intent::SmallTalk,
        Intent::Time,
    ];

    /// Canonical wire label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::DepartmentHod => "DEPARTMENT_HOD",
            Self::Placements => "PLACEMENTS",
            Self::Courses => "COURSES",
            Self::Campus => "CAMPUS",
            Self::CollegeDirector => "COLLEGE_DIRECTOR",
            Self::CollegeChairman => "COLLEGE_CHAIRMAN",
            Self::Time => "TIME",
            Self::Movement => "MOVEMENT",
            Self::SmallTalk => "SMALL_TALK",
            Self::General => "GENERAL",
        }
    }

    /// Parse a canonical label. Anything outside the allow-list is rejected.
    pub fn from_label(s: &str) -> Option<Self> {
        match s {
            "DEPARTMENT_HOD" => Some(Self::DepartmentHod),
            "PLACEMENTS" => Some(Self::Placements),
            "COURSES" => Some(Self::Courses),
            "CAMPUS" => Some(Self::Campus),
            "COLLEGE_DIRECTOR" => Some(Self::CollegeDirector),
            "COLLEGE_CHAIRMAN" => Some(Self::CollegeChairman),
            "TIME" => Some(Self::Time),
            "MOVEMENT" => Some(Self::Movement),
            "SMALL_TALK" => Some(Self::SmallTalk),
            "GENERAL" => Some(Self::General),
            _ => None,
        }
    }

    /// True for intents that must be answered from the college corpus only.
    pub fn is_knowledge(&self) -> bool {
        matches!(
            self,
            Self::DepartmentHod
                | Self::Placements
                | Self::Courses
                | Self::Campus
                | Self::CollegeDirector
                | Self::CollegeChairman
        )
    }

    /// Slot names that must be filled before this intent is complete.
    pub fn required_slots(&self) -> &'static [&'static str] {
        match self {
            Self::DepartmentHod => &["department"],
            Self::Placements
            | Self::Courses
            | Self::Campus
            | Self::CollegeDirector
            | Self::CollegeChairman => &["college"],
            _ => &[],
        }
    }
}

/// Named slot values extracted from an utterance or inherited from context.
///
/// BTreeMap keeps persistence output stable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SlotSet(BTreeMap<String, String>);

impl SlotSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    /// True when the slot is present with a non-empty value.
    pub fn is_filled(&self, name: &str) -> bool {
        self.get(name).is_some_and(|v| !v.is_empty())
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl FromIterator<(String, String)> for SlotSet {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Whether the resolved intent has everything it needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IntentState {
    /// All required slots filled.
    Ok,
    /// Required slots still missing after the context merge.
    Clarify,
}

/// Which tier produced the final intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionSource {
    Rule,
    Arbiter,
}

/// Outcome of hybrid intent resolution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Resolution {
    pub intent: Intent,
    pub slots: SlotSet,
    pub state: IntentState,
    pub source: ResolutionSource,
}
