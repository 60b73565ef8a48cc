use crate::error::{ScrublineError, ScrublineResult};

/// Easing curve applied to a step's local progress.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ease {
    #[default]
    Linear,
    InQuad,
    OutQuad,
    InOutQuad,
    InCubic,
    OutCubic,
    InOutCubic,
}

impl Ease {
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::InQuad => pow_in(t, 2),
            Self::OutQuad => pow_out(t, 2),
            Self::InOutQuad => pow_in_out(t, 2),
            Self::InCubic => pow_in(t, 3),
            Self::OutCubic => pow_out(t, 3),
            Self::InOutCubic => pow_in_out(t, 3),
        }
    }

    /// Parse an easing identifier. Accepts both the canonical names and the
    /// `power<n>.<dir>` aliases used by web animation tooling (`power1` is
    /// quadratic, `power2` is cubic).
    pub fn parse(name: &str) -> ScrublineResult<Self> {
        let name = name.trim().to_ascii_lowercase();
        match name.as_str() {
            "linear" | "none" => Ok(Self::Linear),
            "inquad" | "power1.in" => Ok(Self::InQuad),
            "outquad" | "power1.out" => Ok(Self::OutQuad),
            "inoutquad" | "power1.inout" => Ok(Self::InOutQuad),
            "incubic" | "power2.in" => Ok(Self::InCubic),
            "outcubic" | "power2.out" => Ok(Self::OutCubic),
            "inoutcubic" | "power2.inout" => Ok(Self::InOutCubic),
            other => Err(ScrublineError::validation(format!(
                "unknown ease '{other}'"
            ))),
        }
    }
}

fn pow_in(t: f64, n: i32) -> f64 {
    t.powi(n)
}

fn pow_out(t: f64, n: i32) -> f64 {
    1.0 - (1.0 - t).powi(n)
}

fn pow_in_out(t: f64, n: i32) -> f64 {
    if t < 0.5 {
        0.5 * (2.0 * t).powi(n)
    } else {
        1.0 - 0.5 * (2.0 - 2.0 * t).powi(n)
    }
}
