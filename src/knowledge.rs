//! Crop Knowledge Table
//!
//! Static per-crop reference data served by the lookup endpoint. Read-only
//! and entirely separate from the prediction algorithm; unknown labels get a
//! fixed "not available" entry rather than an error.

use serde::Serialize;

/// Descriptive metadata for one crop label.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct CropInfo {
    pub description: &'static str,
    pub optimal_temp: &'static str,
    pub optimal_ph: &'static str,
    pub water_requirement: &'static str,
    pub season: &'static str,
}

static CROP_INFO: &[(&str, CropInfo)] = &[
    (
        "rice",
        CropInfo {
            description: "Rice is a cereal grain and the most important staple food for a large part of the world population.",
            optimal_temp: "20-35°C",
            optimal_ph: "5.5-6.5",
            water_requirement: "High",
            season: "Monsoon",
        },
    ),
    (
        "wheat",
        CropInfo {
            description: "Wheat is a cereal grain that is a worldwide staple food.",
            optimal_temp: "15-25°C",
            optimal_ph: "6.0-7.5",
            water_requirement: "Medium",
            season: "Winter",
        },
    ),
    (
        "maize",
        CropInfo {
            description: "Maize, also known as corn, is a cereal grain first domesticated by indigenous peoples in Mexico.",
            optimal_temp: "18-32°C",
            optimal_ph: "5.5-7.5",
            water_requirement: "High",
            season: "Summer",
        },
    ),
    (
        "cotton",
        CropInfo {
            description: "Cotton is a soft, fluffy staple fiber that grows in a boll around the seeds of cotton plants.",
            optimal_temp: "25-35°C",
            optimal_ph: "5.5-8.5",
            water_requirement: "Medium",
            season: "Summer",
        },
    ),
];

/// Fallback entry for crops not in the table.
const UNKNOWN_CROP: CropInfo = CropInfo {
    description: "Information not available for this crop.",
    optimal_temp: "N/A",
    optimal_ph: "N/A",
    water_requirement: "N/A",
    season: "N/A",
};

/// Case-insensitive lookup with a fixed fallback for unknown labels.
pub fn crop_info(name: &str) -> CropInfo {
    let needle = name.trim().to_lowercase();
    CROP_INFO
        .iter()
        .find(|(label, _)| *label == needle)
        .map(|(_, info)| *info)
        .unwrap_or(UNKNOWN_CROP)
}
