//! Easing functions for animations
//!
//! Curves can be named the way animation libraries usually spell them
//! (`"power3.out"`, `"elastic.out(1, 0.3)"`, `"none"`) or in CSS form
//! (`"ease-out"`, `"cubic-bezier(0.22, 1, 0.36, 1)"`) and parsed with
//! [`str::parse`].

use std::f32::consts::PI;
use std::str::FromStr;
use unveil_core::Error;

/// Easing function type
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum Easing {
    #[default]
    Linear,
    EaseIn,
    EaseOut,
    EaseInOut,
    EaseInQuad,
    EaseOutQuad,
    EaseInOutQuad,
    EaseInCubic,
    EaseOutCubic,
    EaseInOutCubic,
    EaseInQuart,
    EaseOutQuart,
    EaseInOutQuart,
    EaseInQuint,
    EaseOutQuint,
    EaseInOutQuint,
    EaseInSine,
    EaseOutSine,
    EaseInOutSine,
    EaseOutExpo,
    /// Overshoot then settle; the parameter controls the overshoot
    BackOut(f32),
    /// Spring-like oscillation that settles at 1.0
    ElasticOut { amplitude: f32, period: f32 },
    /// `cubic-bezier(x1, y1, x2, y2)`; x control points lie in `0..=1`
    CubicBezier(f32, f32, f32, f32),
}

impl Easing {
    /// `power2.out`, used by counters and pointer follow
    pub const POWER2_OUT: Easing = Easing::EaseOutCubic;
    /// `power3.out`, the default reveal curve
    pub const POWER3_OUT: Easing = Easing::EaseOutQuart;
    /// `elastic.out(1, 0.3)`, the magnetic spring-back curve
    pub const ELASTIC_OUT: Easing = Easing::ElasticOut {
        amplitude: 1.0,
        period: 0.3,
    };

    /// Apply the easing function to a progress value (0.0 to 1.0)
    pub fn apply(&self, t: f32) -> f32 {
        match self {
            Easing::Linear => t,
            Easing::EaseIn => t * t * t,
            Easing::EaseOut => 1.0 - (1.0 - t).powi(3),
            Easing::EaseInOut => in_out(t, 3),
            Easing::EaseInQuad => t * t,
            Easing::EaseOutQuad => 1.0 - (1.0 - t) * (1.0 - t),
            Easing::EaseInOutQuad => in_out(t, 2),
            Easing::EaseInCubic => t * t * t,
            Easing::EaseOutCubic => 1.0 - (1.0 - t).powi(3),
            Easing::EaseInOutCubic => in_out(t, 3),
            Easing::EaseInQuart => t.powi(4),
            Easing::EaseOutQuart => 1.0 - (1.0 - t).powi(4),
            Easing::EaseInOutQuart => in_out(t, 4),
            Easing::EaseInQuint => t.powi(5),
            Easing::EaseOutQuint => 1.0 - (1.0 - t).powi(5),
            Easing::EaseInOutQuint => in_out(t, 5),
            Easing::EaseInSine => 1.0 - (t * PI / 2.0).cos(),
            Easing::EaseOutSine => (t * PI / 2.0).sin(),
            Easing::EaseInOutSine => -((PI * t).cos() - 1.0) / 2.0,
            Easing::EaseOutExpo => {
                if t >= 1.0 {
                    1.0
                } else {
                    1.0 - 2f32.powf(-10.0 * t)
                }
            }
            Easing::BackOut(overshoot) => {
                let p = t - 1.0;
                p * p * ((overshoot + 1.0) * p + overshoot) + 1.0
            }
            Easing::ElasticOut { amplitude, period } => elastic_out(t, *amplitude, *period),
            Easing::CubicBezier(x1, y1, x2, y2) => cubic_bezier(t, *x1, *y1, *x2, *y2),
        }
    }

    /// The `powerN` family: 0 is linear, 1 quad, 2 cubic, 3 quart, 4 quint
    fn power(level: u8, mode: Mode) -> Option<Easing> {
        use Easing::*;
        let curve = match (level, mode) {
            (0, _) => Linear,
            (1, Mode::In) => EaseInQuad,
            (1, Mode::Out) => EaseOutQuad,
            (1, Mode::InOut) => EaseInOutQuad,
            (2, Mode::In) => EaseInCubic,
            (2, Mode::Out) => EaseOutCubic,
            (2, Mode::InOut) => EaseInOutCubic,
            (3, Mode::In) => EaseInQuart,
            (3, Mode::Out) => EaseOutQuart,
            (3, Mode::InOut) => EaseInOutQuart,
            (4, Mode::In) => EaseInQuint,
            (4, Mode::Out) => EaseOutQuint,
            (4, Mode::InOut) => EaseInOutQuint,
            _ => return None,
        };
        Some(curve)
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mode {
    In,
    Out,
    InOut,
}

impl FromStr for Easing {
    type Err = Error;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let unknown = || Error::UnknownEasing(input.to_string());
        let normalized: String = input
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_ascii_lowercase();

        // Split off an optional "(a, b)" parameter list
        let (head, params) = match normalized.split_once('(') {
            Some((head, rest)) => {
                let inner = rest.strip_suffix(')').ok_or_else(unknown)?;
                let params = inner
                    .split(',')
                    .filter(|p| !p.is_empty())
                    .map(|p| p.parse::<f32>().map_err(|_| unknown()))
                    .collect::<Result<Vec<f32>, Error>>()?;
                (head.to_string(), params)
            }
            None => (normalized, Vec::new()),
        };

        match head.as_str() {
            "cubic-bezier" => {
                return match params[..] {
                    [x1, y1, x2, y2] if (0.0..=1.0).contains(&x1) && (0.0..=1.0).contains(&x2) => {
                        Ok(Easing::CubicBezier(x1, y1, x2, y2))
                    }
                    _ => Err(unknown()),
                };
            }
            "none" | "linear" => return Ok(Easing::Linear),
            "ease-in" => return Ok(Easing::EaseIn),
            "ease-out" => return Ok(Easing::EaseOut),
            "ease-in-out" => return Ok(Easing::EaseInOut),
            _ => {}
        }

        let (family, mode) = match head.split_once('.') {
            Some((family, "in")) => (family, Mode::In),
            Some((family, "out")) => (family, Mode::Out),
            Some((family, "inout")) => (family, Mode::InOut),
            Some(_) => return Err(unknown()),
            None => (head.as_str(), Mode::Out),
        };

        if let Some(level) = family.strip_prefix("power") {
            let level: u8 = level.parse().map_err(|_| unknown())?;
            return Easing::power(level, mode).ok_or_else(unknown);
        }

        let curve = match (family, mode) {
            ("sine", Mode::In) => Easing::EaseInSine,
            ("sine", Mode::Out) => Easing::EaseOutSine,
            ("sine", Mode::InOut) => Easing::EaseInOutSine,
            ("expo", Mode::Out) => Easing::EaseOutExpo,
            ("back", Mode::Out) => Easing::BackOut(params.first().copied().unwrap_or(1.7)),
            ("elastic", Mode::Out) => Easing::ElasticOut {
                amplitude: params.first().copied().unwrap_or(1.0),
                period: params.get(1).copied().unwrap_or(0.3),
            },
            _ => return Err(unknown()),
        };
        Ok(curve)
    }
}

/// Symmetric in-out power curve
fn in_out(t: f32, power: i32) -> f32 {
    if t < 0.5 {
        2f32.powi(power - 1) * t.powi(power)
    } else {
        1.0 - (-2.0 * t + 2.0).powi(power) / 2.0
    }
}

/// Elastic ease-out with the conventional amplitude/period parameterization.
///
/// Amplitudes below 1.0 are raised to 1.0 (the curve must still reach 1.0)
/// and shorten the period proportionally.
fn elastic_out(t: f32, amplitude: f32, period: f32) -> f32 {
    if t <= 0.0 {
        return 0.0;
    }
    if t >= 1.0 {
        return 1.0;
    }
    let a = amplitude.max(1.0);
    let period = if period > 0.0 { period } else { 0.3 };
    let p = period / amplitude.clamp(f32::EPSILON, 1.0);
    let shift = p / (2.0 * PI) * (1.0 / a).asin();
    a * 2f32.powf(-10.0 * t) * ((t - shift) * (2.0 * PI / p)).sin() + 1.0
}

/// CSS `cubic-bezier(x1, y1, x2, y2)` timing function
fn cubic_bezier(t: f32, x1: f32, y1: f32, x2: f32, y2: f32) -> f32 {
    if t <= 0.0 {
        return 0.0;
    }
    if t >= 1.0 {
        return 1.0;
    }
    let xs = BezierAxis::new(x1, x2);
    let ys = BezierAxis::new(y1, y2);
    ys.at(xs.solve(f64::from(t))) as f32
}

/// One coordinate of a cubic bezier running from 0 to 1, in power form
#[derive(Clone, Copy)]
struct BezierAxis {
    a: f64,
    b: f64,
    c: f64,
}

impl BezierAxis {
    fn new(p1: f32, p2: f32) -> Self {
        let c = 3.0 * f64::from(p1);
        let b = 3.0 * f64::from(p2 - p1) - c;
        Self {
            a: 1.0 - c - b,
            b,
            c,
        }
    }

    fn at(self, s: f64) -> f64 {
        ((self.a * s + self.b) * s + self.c) * s
    }

    fn slope(self, s: f64) -> f64 {
        (3.0 * self.a * s + 2.0 * self.b) * s + self.c
    }

    /// Curve parameter where this axis equals `target`
    ///
    /// Newton steps first; flat regions fall through to bisection.
    fn solve(self, target: f64) -> f64 {
        const EPS: f64 = 1e-7;
        let mut s = target;
        for _ in 0..8 {
            let err = self.at(s) - target;
            if err.abs() < EPS {
                return s;
            }
            let slope = self.slope(s);
            if slope.abs() < EPS {
                break;
            }
            s -= err / slope;
        }

        let (mut lo, mut hi) = (0.0, 1.0);
        s = target;
        for _ in 0..30 {
            let x = self.at(s);
            if (x - target).abs() < EPS {
                break;
            }
            if x < target {
                lo = s;
            } else {
                hi = s;
            }
            s = 0.5 * (lo + hi);
        }
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: &[Easing] = &[
        Easing::Linear,
        Easing::EaseInOut,
        Easing::EaseOutQuad,
        Easing::EaseInOutCubic,
        Easing::EaseOutQuart,
        Easing::EaseInOutQuint,
        Easing::EaseInSine,
        Easing::EaseInOutSine,
        Easing::EaseOutExpo,
        Easing::BackOut(1.7),
        Easing::ELASTIC_OUT,
        Easing::CubicBezier(0.25, 0.1, 0.25, 1.0),
    ];

    #[test]
    fn test_endpoints() {
        for easing in ALL {
            assert!(easing.apply(0.0).abs() < 1e-4, "{easing:?} at 0");
            assert!((easing.apply(1.0) - 1.0).abs() < 1e-4, "{easing:?} at 1");
        }
    }

    #[test]
    fn test_parse_power_family() {
        assert_eq!("power3.out".parse::<Easing>().unwrap(), Easing::POWER3_OUT);
        assert_eq!("power2.out".parse::<Easing>().unwrap(), Easing::POWER2_OUT);
        assert_eq!("power1.inOut".parse::<Easing>().unwrap(), Easing::EaseInOutQuad);
        assert_eq!("power4".parse::<Easing>().unwrap(), Easing::EaseOutQuint);
        assert_eq!("none".parse::<Easing>().unwrap(), Easing::Linear);
    }

    #[test]
    fn test_parse_parameterized() {
        assert_eq!(
            "elastic.out(1, 0.3)".parse::<Easing>().unwrap(),
            Easing::ELASTIC_OUT
        );
        assert_eq!("back.out(2)".parse::<Easing>().unwrap(), Easing::BackOut(2.0));
        assert_eq!("back.out".parse::<Easing>().unwrap(), Easing::BackOut(1.7));
    }

    #[test]
    fn test_parse_unknown() {
        assert!("power9.out".parse::<Easing>().is_err());
        assert!("bounce.sideways".parse::<Easing>().is_err());
        assert!("elastic.out(1, x)".parse::<Easing>().is_err());
        assert!("elastic.out(1".parse::<Easing>().is_err());
    }

    #[test]
    fn test_parse_cubic_bezier() {
        let ease = "cubic-bezier(0.25, 0.1, 0.25, 1)".parse::<Easing>().unwrap();
        assert_eq!(ease, Easing::CubicBezier(0.25, 0.1, 0.25, 1.0));
        // CSS `ease` passes through about 0.8024 at the midpoint
        assert!((ease.apply(0.5) - 0.8024).abs() < 1e-3);

        let straight = "cubic-bezier(0, 0, 1, 1)".parse::<Easing>().unwrap();
        assert!((straight.apply(0.3) - 0.3).abs() < 1e-4);

        // y may overshoot, x may not
        assert!("cubic-bezier(0.3, 1.6, 0.6, 1)".parse::<Easing>().is_ok());
        assert!("cubic-bezier(1.5, 0, 0.5, 1)".parse::<Easing>().is_err());
        assert!("cubic-bezier(0.25, 0.1, 0.25)".parse::<Easing>().is_err());
    }

    #[test]
    fn test_elastic_overshoots_and_settles() {
        let easing = Easing::ELASTIC_OUT;
        let peak = (1..100)
            .map(|i| easing.apply(i as f32 / 100.0))
            .fold(f32::MIN, f32::max);
        assert!(peak > 1.0, "elastic curve should overshoot, peak {peak}");
        assert!((easing.apply(0.99) - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_out_curves_are_front_loaded() {
        assert!(Easing::POWER3_OUT.apply(0.5) > 0.9);
        assert!(Easing::POWER2_OUT.apply(0.5) > 0.85);
    }
}
