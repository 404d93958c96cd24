//! Continuous linear scale from genomic coordinates to pixels, plus axis tick helpers.

use crate::types::GenomicPos;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    domain: (f64, f64),
    range: (f64, f64),
}

impl LinearScale {
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self { domain, range }
    }

    pub fn domain(&self) -> (f64, f64) {
        self.domain
    }

    pub fn range(&self) -> (f64, f64) {
        self.range
    }

    pub fn set_domain(&mut self, domain: (f64, f64)) {
        self.domain = domain;
    }

    pub fn set_range(&mut self, range: (f64, f64)) {
        self.range = range;
    }

    /// Map a genomic position to a pixel x coordinate.
    pub fn apply(&self, pos: GenomicPos) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        let span = d1 - d0;
        if span == 0.0 {
            return (r0 + r1) / 2.0;
        }
        r0 + (pos - d0) / span * (r1 - r0)
    }

    /// Map a pixel x coordinate back to a genomic position.
    pub fn invert(&self, px: f64) -> GenomicPos {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        let span = r1 - r0;
        if span == 0.0 {
            return (d0 + d1) / 2.0;
        }
        d0 + (px - r0) / span * (d1 - d0)
    }

    /// Tick positions at round values across the domain.
    pub fn ticks(&self, desired: usize) -> Vec<GenomicPos> {
        let (d0, d1) = self.domain;
        nice_ticks(d0.min(d1), d0.max(d1), desired.max(1))
    }
}

/// Round a length up to a "nice" number: 1, 2, or 5 × 10^k
pub fn nice_round_length(x: f64) -> f64 {
    if x <= 0.0 || !x.is_finite() {
        return 1.0;
    }
    let exp = x.log10().floor();
    let base = 10f64.powf(exp);
    let mant = x / base;
    let nice = if mant <= 1.0 {
        1.0
    } else if mant <= 2.0 {
        2.0
    } else if mant <= 5.0 {
        5.0
    } else {
        10.0
    };
    nice * base
}

fn nice_ticks(min: f64, max: f64, desired: usize) -> Vec<f64> {
    let span = max - min;
    if !(span > 0.0) {
        return vec![min];
    }
    let step = nice_round_length(span / desired as f64);
    let mut ticks = Vec::new();
    let mut i = (min / step).ceil();
    loop {
        let v = i * step;
        if v > max + step * 1e-9 {
            break;
        }
        ticks.push(v);
        i += 1.0;
    }
    ticks
}

/// Format a basepair position in human-friendly units
pub fn format_bp(bp: f64) -> String {
    let abs = bp.abs();
    if abs >= 1e9 {
        format!("{} Gb", trim_decimal(bp / 1e9))
    } else if abs >= 1e6 {
        format!("{} Mb", trim_decimal(bp / 1e6))
    } else if abs >= 1e3 {
        format!("{} kb", trim_decimal(bp / 1e3))
    } else {
        format!("{:.0}", bp)
    }
}

fn trim_decimal(v: f64) -> String {
    let s = format!("{:.2}", v);
    let s = s.trim_end_matches('0').trim_end_matches('.');
    s.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_and_invert() {
        let scale = LinearScale::new((0.0, 100.0), (0.0, 200.0));
        assert_eq!(scale.apply(10.0), 20.0);
        assert_eq!(scale.apply(30.0) - scale.apply(10.0), 40.0);
        assert_eq!(scale.invert(100.0), 50.0);
    }

    #[test]
    fn test_degenerate_domain() {
        let scale = LinearScale::new((5.0, 5.0), (0.0, 100.0));
        assert_eq!(scale.apply(5.0), 50.0);
    }

    #[test]
    fn test_ticks_are_round() {
        let scale = LinearScale::new((0.0, 1000.0), (0.0, 500.0));
        let ticks = scale.ticks(5);
        assert_eq!(ticks, vec![0.0, 200.0, 400.0, 600.0, 800.0, 1000.0]);

        let scale = LinearScale::new((1234.0, 5678.0), (0.0, 500.0));
        let ticks = scale.ticks(4);
        assert_eq!(ticks.first(), Some(&2000.0));
        assert!(ticks.iter().all(|t| *t >= 1234.0 && *t <= 5678.0));
    }

    #[test]
    fn test_nice_round_length() {
        assert_eq!(nice_round_length(0.0), 1.0);
        assert_eq!(nice_round_length(130.0), 200.0);
        assert_eq!(nice_round_length(4000.0), 5000.0);
        assert_eq!(nice_round_length(100.0), 100.0);
    }

    #[test]
    fn test_format_bp() {
        assert_eq!(format_bp(950.0), "950");
        assert_eq!(format_bp(1500.0), "1.5 kb");
        assert_eq!(format_bp(2_000_000.0), "2 Mb");
        assert_eq!(format_bp(1_250_000_000.0), "1.25 Gb");
    }
}
