//! Weight unit conversion
//!
//! Diary quantities are grams internally. Callers may log in other weight
//! units, or in a household unit annotated with its weight ("slice (28g)").

use crate::error::{EngineError, EngineResult};

/// Grams per milligram
pub const G_PER_MG: f64 = 0.001;
/// Grams per kilogram
pub const G_PER_KG: f64 = 1000.0;
/// Grams per ounce
pub const G_PER_OZ: f64 = 28.3495;
/// Grams per pound
pub const G_PER_LB: f64 = 453.592;

/// Conversion factor to grams for a plain weight unit
pub fn grams_per_unit(unit: &str) -> Option<f64> {
    match unit.trim().to_lowercase().as_str() {
        "g" | "gram" | "grams" => Some(1.0),
        "mg" | "milligram" | "milligrams" => Some(G_PER_MG),
        "kg" | "kilogram" | "kilograms" => Some(G_PER_KG),
        "oz" | "ounce" | "ounces" => Some(G_PER_OZ),
        "lb" | "lbs" | "pound" | "pounds" => Some(G_PER_LB),
        _ => None,
    }
}

/// Weight carried in a parenthetical annotation, e.g. `"tbsp (20g)"` -> 20.0
fn annotated_grams(unit: &str) -> Option<f64> {
    let start = unit.find('(')?;
    let end = unit[start..].find(')')? + start;
    let inner = unit[start + 1..end].trim().to_lowercase();

    for suffix in ["grams", "gram", "g"] {
        if let Some(number) = inner.strip_suffix(suffix) {
            if let Ok(value) = number.trim().parse::<f64>() {
                return Some(value);
            }
        }
    }
    None
}

/// Convert `quantity` of `unit` to grams.
///
/// Volume and count units without a gram annotation are rejected: without a
/// density there is no honest conversion.
pub fn to_grams(quantity: f64, unit: &str) -> EngineResult<f64> {
    let grams_per = annotated_grams(unit)
        .or_else(|| grams_per_unit(unit))
        .ok_or_else(|| {
            EngineError::validation(format!(
                "unit '{}' is not a weight; use g, kg, oz, lb or annotate it like 'slice (28g)'",
                unit
            ))
        })?;

    let grams = quantity * grams_per;
    if grams.is_finite() && grams > 0.0 {
        Ok(grams)
    } else {
        Err(EngineError::InvalidQuantity(grams))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_units() {
        assert_eq!(to_grams(150.0, "g").unwrap(), 150.0);
        assert_eq!(to_grams(0.25, "KG").unwrap(), 250.0);
        assert!((to_grams(2.0, "oz").unwrap() - 56.699).abs() < 1e-9);
    }

    #[test]
    fn test_annotated_units() {
        assert_eq!(to_grams(3.0, "slice (28g)").unwrap(), 84.0);
        assert_eq!(to_grams(2.0, "tbsp (20 grams)").unwrap(), 40.0);
    }

    #[test]
    fn test_rejects_volume_without_weight() {
        assert!(matches!(to_grams(1.0, "cup"), Err(EngineError::Validation(_))));
    }

    #[test]
    fn test_rejects_non_positive_result() {
        assert!(matches!(to_grams(0.0, "g"), Err(EngineError::InvalidQuantity(_))));
    }
}
