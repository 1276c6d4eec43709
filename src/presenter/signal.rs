use std::fmt;

use serde::Serialize;

/// WiFi signal quality bucket derived from RSSI in dBm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalQuality {
    Excellent,
    Good,
    Fair,
    Weak,
}

impl SignalQuality {
    /// Each bucket's lower bound belongs to the bucket below it: -50 is Good, -60 is Fair.
    pub fn from_rssi(rssi: i32) -> Self {
        if rssi > -50 {
            SignalQuality::Excellent
        } else if rssi > -60 {
            SignalQuality::Good
        } else if rssi > -70 {
            SignalQuality::Fair
        } else {
            SignalQuality::Weak
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SignalQuality::Excellent => "Excellent",
            SignalQuality::Good => "Good",
            SignalQuality::Fair => "Fair",
            SignalQuality::Weak => "Weak",
        }
    }
}

impl fmt::Display for SignalQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bucket_boundaries() {
        let cases = [
            (-30, SignalQuality::Excellent),
            (-49, SignalQuality::Excellent),
            (-50, SignalQuality::Good),
            (-59, SignalQuality::Good),
            (-60, SignalQuality::Fair),
            (-69, SignalQuality::Fair),
            (-70, SignalQuality::Weak),
            (-100, SignalQuality::Weak),
        ];
        for (rssi, expected) in cases {
            assert_eq!(SignalQuality::from_rssi(rssi), expected, "rssi {rssi}");
        }
    }
}
