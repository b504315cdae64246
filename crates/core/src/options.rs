//! Option enums shared by the parameter normalizer, the node adapters
//! and the CLI.
//!
//! Every enum serializes to the exact string the generation service
//! expects and parses back from it via [`FromStr`](std::str::FromStr).

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Declare a string-valued option enum with `as_str`, `ALL`, `Display`
/// and `FromStr`.
macro_rules! string_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $label:literal {
            $( $(#[$vmeta:meta])* $variant:ident => $value:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $( $(#[$vmeta])* #[serde(rename = $value)] $variant ),+
        }

        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Wire value sent to the service.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $value),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = CoreError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($value => Ok($name::$variant),)+
                    other => Err(CoreError::Validation(format!(
                        "Invalid {} '{other}'. Must be one of: {}",
                        $label,
                        [$($value),+].join(", ")
                    ))),
                }
            }
        }
    };
}

string_enum! {
    /// GPU speed tier a job runs in.
    SpeedMode, "mode" {
        Fast => "fast",
        Relax => "relax",
        Turbo => "turbo",
    }
}

string_enum! {
    /// Gallery visibility. `Default` is never transmitted.
    Visibility, "visibility" {
        Default => "default",
        Stealth => "stealth",
        Public => "public",
    }
}

string_enum! {
    /// Tri-state personalization choice.
    PersonalizeMode, "personalize mode" {
        Off => "off",
        Default => "default",
        Custom => "custom",
    }
}

string_enum! {
    UpscaleType, "upscale type" {
        Subtle => "v7_2x_subtle",
        Creative => "v7_2x_creative",
    }
}

string_enum! {
    /// Pan direction, declared in the service's index order
    /// (0 = down, 1 = right, 2 = up, 3 = left).
    PanDirection, "pan direction" {
        Down => "down",
        Right => "right",
        Up => "up",
        Left => "left",
    }
}

string_enum! {
    VideoResolution, "video resolution" {
        R480 => "480",
        R720 => "720",
    }
}

string_enum! {
    MotionIntensity, "motion" {
        Low => "low",
        High => "high",
    }
}

string_enum! {
    /// Where the base prompt goes when joining keywords.
    PromptPosition, "prompt position" {
        First => "First",
        Last => "Last",
    }
}

impl Default for SpeedMode {
    fn default() -> Self {
        Self::Fast
    }
}

impl Default for Visibility {
    fn default() -> Self {
        Self::Default
    }
}

impl Default for PersonalizeMode {
    fn default() -> Self {
        Self::Off
    }
}

impl Default for UpscaleType {
    fn default() -> Self {
        Self::Subtle
    }
}

impl Default for PanDirection {
    fn default() -> Self {
        Self::Up
    }
}

impl Default for VideoResolution {
    fn default() -> Self {
        Self::R480
    }
}

impl Default for PromptPosition {
    fn default() -> Self {
        Self::First
    }
}

impl PanDirection {
    /// Numeric direction index used by the service.
    pub fn index(&self) -> u8 {
        match self {
            Self::Down => 0,
            Self::Right => 1,
            Self::Up => 2,
            Self::Left => 3,
        }
    }
}

/* --------------------------------------------------------------------------
   Quality
   -------------------------------------------------------------------------- */

/// Allowed quality values. Transmitted as an integer.
pub const VALID_QUALITIES: &[u8] = &[1, 2, 4];

/// Render quality, one of [`VALID_QUALITIES`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Quality(u8);

impl Quality {
    pub fn new(value: u8) -> Result<Self, CoreError> {
        if VALID_QUALITIES.contains(&value) {
            Ok(Self(value))
        } else {
            Err(CoreError::Validation(format!(
                "Invalid quality {value}. Must be one of: 1, 2, 4"
            )))
        }
    }

    pub fn value(&self) -> u8 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(1)
    }
}

impl TryFrom<u8> for Quality {
    type Error = CoreError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Quality> for u8 {
    fn from(q: Quality) -> u8 {
        q.0
    }
}

impl std::str::FromStr for Quality {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: u8 = s
            .trim()
            .parse()
            .map_err(|_| CoreError::Validation(format!("Invalid quality '{s}'")))?;
        Self::new(value)
    }
}

/* --------------------------------------------------------------------------
   Style version
   -------------------------------------------------------------------------- */

/// Style versions accepted alongside a textual style reference.
pub const VALID_STYLE_VERSIONS: &[&str] = &["4", "6", "7"];

/// Validate a style version against [`VALID_STYLE_VERSIONS`].
pub fn validate_style_version(version: &str) -> Result<(), CoreError> {
    if VALID_STYLE_VERSIONS.contains(&version) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid style version '{version}'. Must be one of: {}",
            VALID_STYLE_VERSIONS.join(", ")
        )))
    }
}

/// Highest result slot index a job can have.
pub const MAX_SLOT_INDEX: u8 = 3;

/// Validate a result slot index (0..=3).
pub fn validate_slot_index(index: u8) -> Result<(), CoreError> {
    if index > MAX_SLOT_INDEX {
        return Err(CoreError::Validation(format!(
            "Slot index must be between 0 and {MAX_SLOT_INDEX}, got {index}"
        )));
    }
    Ok(())
}
