//! QR error-correction levels as named in configuration.

use std::fmt;
use std::str::FromStr;

use qrcode::EcLevel;

/// Error-correction strength used for every rendered code.
///
/// Configuration names the levels `LOW`, `MEDIUM`, `HIGH` and `HIGHEST`
/// (case-insensitive); they map onto the four standard QR tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryLevel {
    /// ~7% of codewords can be restored
    Low,
    /// ~15% of codewords can be restored
    Medium,
    /// ~25% of codewords can be restored
    High,
    /// ~30% of codewords can be restored
    Highest,
}

impl RecoveryLevel {
    /// Configuration name of this level.
    pub fn name(&self) -> &'static str {
        match self {
            RecoveryLevel::Low => "LOW",
            RecoveryLevel::Medium => "MEDIUM",
            RecoveryLevel::High => "HIGH",
            RecoveryLevel::Highest => "HIGHEST",
        }
    }

    /// The QR symbol error-correction level for this tier.
    pub fn ec_level(&self) -> EcLevel {
        match self {
            RecoveryLevel::Low => EcLevel::L,
            RecoveryLevel::Medium => EcLevel::M,
            RecoveryLevel::High => EcLevel::Q,
            RecoveryLevel::Highest => EcLevel::H,
        }
    }
}

impl fmt::Display for RecoveryLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Returned when a name matches none of the four levels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownRecoveryLevel(pub String);

impl fmt::Display for UnknownRecoveryLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown recovery level {:?}", self.0)
    }
}

impl std::error::Error for UnknownRecoveryLevel {}

impl FromStr for RecoveryLevel {
    type Err = UnknownRecoveryLevel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "LOW" => Ok(RecoveryLevel::Low),
            "MEDIUM" => Ok(RecoveryLevel::Medium),
            "HIGH" => Ok(RecoveryLevel::High),
            "HIGHEST" => Ok(RecoveryLevel::Highest),
            _ => Err(UnknownRecoveryLevel(s.to_string())),
        }
    }
}
