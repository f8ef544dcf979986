use std::fmt;
use std::str::FromStr;

use anyhow::{Result, bail};
use serde::de;
use serde::{Deserialize, Deserializer};

// ---------------------------------------------------------------------------
// Bound
// ---------------------------------------------------------------------------

/// A window reach on one side of the index value: a signed offset, or
/// unbounded (no limit on that side).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    Finite(i64),
    Unbounded,
}

impl Bound {
    pub fn is_unbounded(&self) -> bool {
        matches!(self, Self::Unbounded)
    }

    pub fn is_negative(&self) -> bool {
        matches!(self, Self::Finite(v) if *v < 0)
    }

    pub fn finite(&self) -> Option<i64> {
        match self {
            Self::Finite(v) => Some(*v),
            Self::Unbounded => None,
        }
    }
}

impl From<i64> for Bound {
    fn from(v: i64) -> Self {
        Self::Finite(v)
    }
}

impl FromStr for Bound {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("unbounded") {
            return Ok(Self::Unbounded);
        }
        match s.parse::<i64>() {
            Ok(v) => Ok(Self::Finite(v)),
            Err(_) => bail!("invalid bound {s:?} (expected an integer or \"unbounded\")"),
        }
    }
}

impl fmt::Display for Bound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Finite(v) => write!(f, "{v}"),
            Self::Unbounded => write!(f, "unbounded"),
        }
    }
}

impl<'de> Deserialize<'de> for Bound {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Bound, D::Error> {
        struct BoundVisitor;

        impl de::Visitor<'_> for BoundVisitor {
            type Value = Bound;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "an integer or \"unbounded\"")
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Bound, E> {
                Ok(Bound::Finite(v))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Bound, E> {
                i64::try_from(v)
                    .map(Bound::Finite)
                    .map_err(|_| E::custom(format!("bound {v} out of range")))
            }

            fn visit_str<E: de::Error>(self, s: &str) -> Result<Bound, E> {
                s.parse().map_err(E::custom)
            }
        }

        deserializer.deserialize_any(BoundVisitor)
    }
}

// ---------------------------------------------------------------------------
// SlideParams
// ---------------------------------------------------------------------------

/// Raw sliding-window parameters, as supplied by a caller or a config
/// file, before derivation into concrete boundary sequences.
#[derive(Debug, Clone, Deserialize)]
pub struct SlideParams {
    /// Window reach below the index value. Negative values shift the
    /// lower edge forward past the value.
    pub before: Bound,
    /// Window reach above the index value.
    pub after: Bound,
    /// Evaluate every `step`-th index position; skipped positions stay
    /// at the missing-value marker.
    #[serde(default = "default_step")]
    pub step: usize,
    /// Skip edge windows extending past the covered index domain.
    #[serde(default)]
    pub complete: bool,
    /// Reach used for completeness trimming below, when it differs from
    /// `before`.
    #[serde(default)]
    pub min_before: Option<i64>,
    /// Reach used for completeness trimming above, when it differs from
    /// `after`.
    #[serde(default)]
    pub min_after: Option<i64>,
}

fn default_step() -> usize {
    1
}

impl SlideParams {
    pub fn new(before: Bound, after: Bound) -> Self {
        Self {
            before,
            after,
            step: 1,
            complete: false,
            min_before: None,
            min_after: None,
        }
    }

    /// Check parameter combinations before any derivation work.
    pub fn validate(&self) -> Result<()> {
        if self.step < 1 {
            bail!("`step` must be at least 1, not {}", self.step);
        }

        if self.before.is_negative() && self.after.is_negative() {
            bail!(
                "`before` ({}) and `after` ({}) cannot both be negative",
                self.before,
                self.after
            );
        }

        // A negative side pulls the window past the other side's edge;
        // its magnitude must stay within the other side's reach.
        if let (Some(after), Some(before)) = (self.after.finite(), self.before.finite()) {
            if after < 0 && after.unsigned_abs() > before.max(0) as u64 {
                bail!(
                    "when `after` ({after}) is negative, its absolute value ({}) cannot exceed `before` ({before})",
                    after.unsigned_abs()
                );
            }
            if before < 0 && before.unsigned_abs() > after.max(0) as u64 {
                bail!(
                    "when `before` ({before}) is negative, its absolute value ({}) cannot exceed `after` ({after})",
                    before.unsigned_abs()
                );
            }
        }

        if let Some(v) = self.min_before {
            if v < 0 {
                bail!("`min_before` ({v}) must be zero or positive");
            }
        }
        if let Some(v) = self.min_after {
            if v < 0 {
                bail!("`min_after` ({v}) must be zero or positive");
            }
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // -- 1. defaults_from_toml -----------------------------------------------

    #[test]
    fn defaults_from_toml() {
        let params: SlideParams = toml::from_str("before = 2\nafter = 0").unwrap();
        assert_eq!(params.before, Bound::Finite(2));
        assert_eq!(params.after, Bound::Finite(0));
        assert_eq!(params.step, 1);
        assert!(!params.complete);
        assert!(params.min_before.is_none());
    }

    // -- 2. unbounded_from_toml ----------------------------------------------

    #[test]
    fn unbounded_from_toml() {
        let params: SlideParams =
            toml::from_str("before = \"unbounded\"\nafter = 3\ncomplete = true").unwrap();
        assert!(params.before.is_unbounded());
        assert_eq!(params.after, Bound::Finite(3));
        assert!(params.complete);
    }

    // -- 3. bound_from_str ---------------------------------------------------

    #[test]
    fn bound_from_str() {
        assert_eq!("5".parse::<Bound>().unwrap(), Bound::Finite(5));
        assert_eq!("-2".parse::<Bound>().unwrap(), Bound::Finite(-2));
        assert_eq!("Unbounded".parse::<Bound>().unwrap(), Bound::Unbounded);
        assert!("soon".parse::<Bound>().is_err());
    }

    // -- 4. step_must_be_positive --------------------------------------------

    #[test]
    fn step_must_be_positive() {
        let mut params = SlideParams::new(Bound::Finite(1), Bound::Finite(0));
        params.step = 0;
        assert!(params.validate().is_err());
    }

    // -- 5. both_negative_rejected -------------------------------------------

    #[test]
    fn both_negative_rejected() {
        let params = SlideParams::new(Bound::Finite(-1), Bound::Finite(-1));
        assert!(params.validate().is_err());
    }

    // -- 6. negative_magnitude_limited ---------------------------------------

    #[test]
    fn negative_magnitude_limited() {
        // |after| exceeds before: rejected.
        let params = SlideParams::new(Bound::Finite(2), Bound::Finite(-3));
        assert!(params.validate().is_err());

        // |after| within before: fine.
        let params = SlideParams::new(Bound::Finite(3), Bound::Finite(-2));
        assert!(params.validate().is_ok());

        // An unbounded other side lifts the limit.
        let params = SlideParams::new(Bound::Unbounded, Bound::Finite(-10));
        assert!(params.validate().is_ok());
    }

    // -- 7. negative_before_symmetric ----------------------------------------

    #[test]
    fn negative_before_symmetric() {
        let params = SlideParams::new(Bound::Finite(-3), Bound::Finite(2));
        assert!(params.validate().is_err());

        let params = SlideParams::new(Bound::Finite(-2), Bound::Finite(3));
        assert!(params.validate().is_ok());
    }

    // -- 8. trim_reaches_must_be_non_negative --------------------------------

    #[test]
    fn trim_reaches_must_be_non_negative() {
        let mut params = SlideParams::new(Bound::Finite(1), Bound::Finite(0));
        params.min_before = Some(-1);
        assert!(params.validate().is_err());

        let mut params = SlideParams::new(Bound::Finite(1), Bound::Finite(0));
        params.min_after = Some(0);
        assert!(params.validate().is_ok());
    }
}
