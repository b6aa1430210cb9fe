//! Strategy selection: the closed set of pipeline variants.

use crate::domain::error::FractalTraderError;
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    /// Trend filter + fractal breakout.
    FractalOnly,
    /// Trend filter + fractal breakout + entry inside a recent order block.
    FractalOrderBlock,
}

impl Strategy {
    pub const ALL: [Strategy; 2] = [Strategy::FractalOnly, Strategy::FractalOrderBlock];

    pub fn name(&self) -> &'static str {
        match self {
            Strategy::FractalOnly => "fractal_refined_strategy",
            Strategy::FractalOrderBlock => "fractal_ob_strategy",
        }
    }

    /// Reward multiple of R at which a trade is taken off as a win.
    pub fn target_multiple(&self) -> f64 {
        match self {
            Strategy::FractalOnly => 2.0,
            Strategy::FractalOrderBlock => 2.5,
        }
    }

    pub fn uses_order_blocks(&self) -> bool {
        matches!(self, Strategy::FractalOrderBlock)
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Strategy {
    type Err = FractalTraderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "fractal_refined_strategy" | "fractal" => Ok(Strategy::FractalOnly),
            "fractal_ob_strategy" | "fractal_ob" => Ok(Strategy::FractalOrderBlock),
            _ => Err(FractalTraderError::UnknownStrategy {
                name: s.to_string(),
            }),
        }
    }
}

impl Serialize for Strategy {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_canonical_names() {
        assert_eq!(
            "fractal_refined_strategy".parse::<Strategy>().unwrap(),
            Strategy::FractalOnly
        );
        assert_eq!(
            "fractal_ob_strategy".parse::<Strategy>().unwrap(),
            Strategy::FractalOrderBlock
        );
    }

    #[test]
    fn parse_short_names_case_insensitive() {
        assert_eq!(" Fractal ".parse::<Strategy>().unwrap(), Strategy::FractalOnly);
        assert_eq!("FRACTAL_OB".parse::<Strategy>().unwrap(), Strategy::FractalOrderBlock);
    }

    #[test]
    fn unknown_strategy_is_an_error() {
        let err = "ob_refined_strategy".parse::<Strategy>().unwrap_err();
        assert!(matches!(
            err,
            FractalTraderError::UnknownStrategy { ref name } if name == "ob_refined_strategy"
        ));
    }

    #[test]
    fn display_round_trips() {
        for strategy in Strategy::ALL {
            assert_eq!(strategy.to_string().parse::<Strategy>().unwrap(), strategy);
        }
    }

    #[test]
    fn capabilities() {
        assert_eq!(Strategy::FractalOnly.target_multiple(), 2.0);
        assert_eq!(Strategy::FractalOrderBlock.target_multiple(), 2.5);
        assert!(!Strategy::FractalOnly.uses_order_blocks());
        assert!(Strategy::FractalOrderBlock.uses_order_blocks());
    }
}
