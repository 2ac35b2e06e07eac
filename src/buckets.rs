//! Fixed vocabularies and per-field matching rules.
//!
//! The price models were trained on these exact spellings, so every cleaned
//! categorical field must end up as one of them (or a documented default).

/// Condition grades used for interior, exterior and mechanical condition
pub const CONDITION_BUCKETS: &[&str] = &[
    "Excellent",
    "good",
    "average",
    "belowAverage",
    "rough",
    "great",
];

/// Market line of a vehicle
pub const LINE_BUCKETS: &[&str] = &["Mid", "Economy", "High", "Exotic"];

/// Drivetrain spellings seen in the training data
pub const DRIVETRAIN_BUCKETS: &[&str] = &[
    "FWD",
    "AWD",
    "RWD",
    "front wheel drive",
    "4x4",
    "4x2",
    "Front Wheel Drive",
    "four wheel drive",
    "4WD",
    "Four Wheel Drive",
    "rear wheel drive",
    "all wheel drive",
    "2WD",
    "Front",
];

/// Transmission spellings seen in the training data
pub const TRANSMISSION_BUCKETS: &[&str] = &[
    // Automatic
    "AUTOMATIC",
    "Automatic",
    "A/T",
    "A",
    "8-Speed A/T",
    "10-Speed A/T",
    "6-Speed A/T",
    "5-Speed A/T",
    "4-Speed A/T",
    "1-Speed A/T",
    "8-speed automatic",
    "10-speed automatic",
    "6-speed automatic",
    "5-speed automatic",
    "4-speed automatic",
    "9-speed automatic",
    "7-speed automatic",
    "2-speed automatic",
    "8-speed Tiptronic automatic",
    "8-speed Geartronic automatic",
    "ZF 8-speed automatic",
    "ZF 9-speed automatic",
    "ZF 6-speed automatic",
    "TorqueFlite 8-speed automatic",
    "TorqueFlite 9-speed automatic",
    "TorqueFlite 8 8-speed automatic",
    "Powertech 6-speed automatic",
    "TorqShift 5-speed automatic",
    "TorqShift 6-speed automatic",
    "TorqShift-G 6-speed automatic",
    "TorqShift 10-speed automatic",
    "Allison 10-speed automatic",
    "Allison 6-speed automatic",
    "Allison 5-speed automatic",
    "Allison 1000 5-speed automatic",
    "Getrag 6-speed automatic",
    "Getrag 6-speed multi-speed automatic",
    "SKYACTIV-Drive 6-speed automatic",
    "SKYACTIV-Drive 8-speed automatic",
    // CVT
    "CVT",
    "CVT Transmission",
    "1-speed CVT",
    "EFlite CVT",
    "EFlite 1-speed CVT",
    "E-Flite CVT",
    "2-speed CVT",
    "2-speed CVTi-S CVT",
    "Aisin CVT",
    "Aisin 2-speed CVT",
    "Jatco CVT",
    "Jatco 2-speed CVT",
    "5-speed CVT",
    "6-speed CVT",
    "7-speed CVT",
    "8-speed CVT",
    "4-speed automatic/CVT",
    "Automatic/CVT",
    "2-speed automatic/CVT",
    "10-speed automatic/CVT",
    "10-speed Dynamic Shift automatic/CVT",
    "PowerSplit eCVT 2-speed CVT",
    "2-speed Intelligent Variable Transmission (IVT) CV",
    "2-speed Smartstream IVT CVT",
    "6-speed Xtronic CVT",
    "2-speed Xtronic CVT",
    "6-speed Lineartronic CVT",
    "7-speed Lineartronic CVT",
    "8-speed Lineartronic CVT",
    "8-speed multitronic CVT",
    // Manual
    "MANUAL",
    "Manual",
    "4-speed manual",
    "5-speed manual",
    "6-speed manual",
    "7-speed manual",
    "Tremec 6-speed manual",
    "TREMEC 6-speed manual",
    "TREMEC 10-speed manual",
    "Tremec 7-speed manual",
    "7-Speed M/T",
    "Aisin 5-speed manual",
    "ZF 6-speed manual",
    "SKYACTIV-MT 6-speed manual",
    "Getrag 5-speed manual",
    // Automated manual / dual clutch
    "AUTOMATED_MANUAL",
    "6-speed auto-shift manual",
    "7-speed auto-shift manual",
    "8-speed auto-shift manual",
    "PDK 7-speed auto-shift manual",
    "PDK 8-speed auto-shift manual",
    "TREMEC 7-speed auto-shift manual",
    "7-speed DSG auto-shift manual",
    "7-speed EcoShift DCT auto-shift manual",
    "6-speed EcoShift DCT auto-shift manual",
    "6-speed S tronic auto-shift manual",
    "7-speed S tronic auto-shift manual",
    // Electric
    "DIRECT_DRIVE",
];

/// Matching rule for one input field
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldRule {
    pub field: &'static str,
    /// Minimum score in `[0, 1]` for a fuzzy candidate to be accepted
    pub threshold: f64,
    /// Substituted when nothing clears the threshold. `None` fails the request.
    pub default: Option<&'static str>,
}

pub const MAKE: FieldRule = FieldRule {
    field: "make",
    threshold: 0.7,
    default: None,
};

pub const MODEL: FieldRule = FieldRule {
    field: "model",
    threshold: 0.6,
    default: None,
};

pub const TRIM: FieldRule = FieldRule {
    field: "trim",
    threshold: 0.5,
    default: Some("Other"),
};

pub const INTERIOR: FieldRule = condition_rule("interior");
pub const EXTERIOR: FieldRule = condition_rule("exterior");
pub const MECHANICAL: FieldRule = condition_rule("mechanical");

pub const LINE: FieldRule = FieldRule {
    field: "line",
    threshold: 0.7,
    default: Some("Economy"),
};

pub const DRIVETRAIN: FieldRule = FieldRule {
    field: "drivetrain",
    threshold: 0.7,
    default: Some("AWD"),
};

pub const TRANSMISSION: FieldRule = FieldRule {
    field: "transmission",
    threshold: 0.7,
    default: Some("Automatic"),
};

const fn condition_rule(field: &'static str) -> FieldRule {
    FieldRule {
        field,
        threshold: 0.7,
        default: Some("average"),
    }
}
