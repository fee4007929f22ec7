use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::ModelError;

/// Macro to generate enum with as_str + std::str::FromStr pattern.
/// The string form doubles as the serde wire name.
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = ModelError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(ModelError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw = String::deserialize(deserializer)?;
                raw.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

str_enum!(InteractionSeverity {
    High => "high",
    Medium => "medium",
    Low => "low",
});

str_enum!(TierSource {
    PrimaryModel => "primary-model",
    FallbackModel => "fallback-model",
    Heuristic => "heuristic",
});

impl InteractionSeverity {
    /// Lenient parse for model output ("HIGH", " Medium ", "moderate").
    /// Anything unrecognised lands on `Medium`.
    pub fn parse_lenient(raw: &str) -> Self {
        let lowered = raw.trim().to_lowercase();
        match lowered.as_str() {
            "moderate" => Self::Medium,
            "severe" | "major" | "critical" => Self::High,
            "minor" | "mild" => Self::Low,
            other => other.parse().unwrap_or(Self::Medium),
        }
    }
}

impl TierSource {
    /// Anything other than the primary model is a degraded result.
    pub fn is_degraded(&self) -> bool {
        !matches!(self, Self::PrimaryModel)
    }
}
