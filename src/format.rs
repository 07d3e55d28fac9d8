//! Rendering configuration for extracted values.
//!
//! A [`Format`] is supplied by the caller to an output adapter; the
//! extraction core never interprets it. Three presets mirror the common
//! uses: [`Format::default`] for human-readable output,
//! [`Format::precise`] for round-trip faithful output, and
//! [`Format::r_lang`] for dumps meant to be sourced into R.

use std::time::Duration;

use chrono::{DateTime, FixedOffset, Local, Utc};
use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::value::Value;

/// The timezone timestamps are presented in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayZone {
    /// Keep the value's own timezone (UTC).
    Original,
    /// Convert to the system's local timezone.
    Local,
    /// Convert to a fixed offset, in seconds east of UTC.
    Offset {
        /// Seconds east of UTC; out-of-range offsets fall back to UTC.
        seconds: i32,
    },
}

/// How durations are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DurationStyle {
    /// Human-readable units (`2m 30s`).
    Human,
    /// Integer nanoseconds.
    Nanos,
}

/// Describes how the different value kinds are rendered as text.
///
/// Literal representations are used for booleans, absence, NaN, and the
/// infinities; floats carry a significant-digit budget; timestamps a
/// strftime pattern and a display timezone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Format {
    /// Text for boolean true.
    pub true_text: String,
    /// Text for boolean false.
    pub false_text: String,
    /// Significant digits for floats and complex components; `None` renders
    /// the shortest round-trip form.
    pub float_digits: Option<usize>,
    /// Debug-quote text cells.
    pub quote_text: bool,
    /// A chrono strftime pattern for timestamps.
    pub timestamp_format: String,
    /// The timezone timestamps are presented in.
    pub zone: DisplayZone,
    /// How durations are rendered.
    pub duration_style: DurationStyle,
    /// Text for an absent cell.
    pub absent_text: String,
    /// Text for a floating-point NaN.
    pub nan_text: String,
    /// Text for positive infinity (complex infinities use this too).
    pub pos_inf_text: String,
    /// Text for negative infinity.
    pub neg_inf_text: String,
}

impl Default for Format {
    /// Formatting options which produce pleasant human readable output.
    fn default() -> Self {
        Self {
            true_text: "true".to_string(),
            false_text: "false".to_string(),
            float_digits: Some(4),
            quote_text: false,
            timestamp_format: "%Y-%m-%dT%H:%M:%S".to_string(),
            zone: DisplayZone::Local,
            duration_style: DurationStyle::Human,
            absent_text: String::new(),
            nan_text: String::new(),
            pos_inf_text: "+\u{221e}".to_string(),
            neg_inf_text: "-\u{221e}".to_string(),
        }
    }
}

impl Format {
    /// Formatting options which preserve the original data pretty well.
    #[must_use]
    pub fn precise() -> Self {
        Self {
            true_text: "true".to_string(),
            false_text: "false".to_string(),
            float_digits: None,
            quote_text: true,
            timestamp_format: "%+".to_string(),
            zone: DisplayZone::Original,
            duration_style: DurationStyle::Human,
            absent_text: String::new(),
            nan_text: "NaN".to_string(),
            pos_inf_text: "+\u{221e}".to_string(),
            neg_inf_text: "-\u{221e}".to_string(),
        }
    }

    /// Formatting options useful for reading the generated dumps into R.
    #[must_use]
    pub fn r_lang() -> Self {
        Self {
            true_text: "TRUE".to_string(),
            false_text: "FALSE".to_string(),
            float_digits: Some(9),
            quote_text: true,
            timestamp_format: "as.POSIXct(\"%Y-%m-%d %H:%M:%S\")".to_string(),
            zone: DisplayZone::Local,
            duration_style: DurationStyle::Nanos,
            absent_text: "NA".to_string(),
            nan_text: "NA".to_string(),
            pos_inf_text: "Inf".to_string(),
            neg_inf_text: "-Inf".to_string(),
        }
    }

    /// Render one cell: a kind-tagged value, or absence.
    #[must_use]
    pub fn cell(&self, value: Option<&Value>) -> String {
        match value {
            None => self.absent_text.clone(),
            Some(Value::Bool(b)) => self.boolean(*b),
            Some(Value::Int(i)) => i.to_string(),
            Some(Value::Uint(u)) => u.to_string(),
            Some(Value::Float(x)) => self.float(*x),
            Some(Value::Complex(c)) => self.complex(*c),
            Some(Value::Text(s)) => self.text(s),
            Some(Value::Timestamp(t)) => self.timestamp(*t),
            Some(Value::Duration(d)) => self.duration(*d),
        }
    }

    /// Render a boolean.
    #[must_use]
    pub fn boolean(&self, b: bool) -> String {
        if b {
            self.true_text.clone()
        } else {
            self.false_text.clone()
        }
    }

    /// Render a float, honoring the NaN/infinity literals and the
    /// significant-digit budget.
    #[must_use]
    pub fn float(&self, x: f64) -> String {
        if x.is_nan() {
            return self.nan_text.clone();
        }
        if x == f64::INFINITY {
            return self.pos_inf_text.clone();
        }
        if x == f64::NEG_INFINITY {
            return self.neg_inf_text.clone();
        }
        match self.float_digits {
            None => format!("{x}"),
            Some(digits) => significant(x, digits.max(1)),
        }
    }

    /// Render a complex number as `re+imi` / `re-imi`.
    #[must_use]
    pub fn complex(&self, c: Complex64) -> String {
        if c.re.is_nan() || c.im.is_nan() {
            return self.nan_text.clone();
        }
        if c.re.is_infinite() || c.im.is_infinite() {
            return self.pos_inf_text.clone();
        }
        let re = self.float(c.re);
        let im = self.float(c.im.abs());
        let sign = if c.im.is_sign_negative() { '-' } else { '+' };
        format!("{re}{sign}{im}i")
    }

    /// Render text, optionally debug-quoted.
    #[must_use]
    pub fn text(&self, s: &str) -> String {
        if self.quote_text {
            format!("{s:?}")
        } else {
            s.to_string()
        }
    }

    /// Render a timestamp in the configured display timezone.
    #[must_use]
    pub fn timestamp(&self, t: DateTime<Utc>) -> String {
        match self.zone {
            DisplayZone::Original => t.format(&self.timestamp_format).to_string(),
            DisplayZone::Local => t
                .with_timezone(&Local)
                .format(&self.timestamp_format)
                .to_string(),
            DisplayZone::Offset { seconds } => match FixedOffset::east_opt(seconds) {
                Some(zone) => t
                    .with_timezone(&zone)
                    .format(&self.timestamp_format)
                    .to_string(),
                None => t.format(&self.timestamp_format).to_string(),
            },
        }
    }

    /// Render a duration.
    #[must_use]
    pub fn duration(&self, d: Duration) -> String {
        match self.duration_style {
            DurationStyle::Human => humantime::format_duration(d).to_string(),
            DurationStyle::Nanos => d.as_nanos().to_string(),
        }
    }

    /// The absent-cell literal.
    #[must_use]
    pub fn absent(&self) -> &str {
        &self.absent_text
    }
}

/// Format `x` with the given number of significant digits, trimming
/// trailing zeros, switching to exponent notation outside `1e-4..10^digits`.
fn significant(x: f64, digits: usize) -> String {
    if x == 0.0 {
        return "0".to_string();
    }
    let sci = format!("{:.*e}", digits - 1, x);
    let (mantissa, exponent) = match sci.split_once('e') {
        Some(parts) => parts,
        None => return sci,
    };
    let exponent: i32 = exponent.parse().unwrap_or(0);
    if exponent < -4 || exponent >= digits as i32 {
        format!("{}e{exponent}", trim_fraction(mantissa))
    } else {
        let decimals = (digits as i32 - 1 - exponent).max(0);
        let decimals = usize::try_from(decimals).unwrap_or(0);
        trim_fraction(&format!("{x:.decimals$}")).to_string()
    }
}

fn trim_fraction(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}
