//! Body-mass index from the profile's weight and height.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BmiCategory {
    Underweight,
    Normal,
    Overweight,
    Obese,
}

impl BmiCategory {
    fn of(value: f64) -> Self {
        if value < 18.5 {
            BmiCategory::Underweight
        } else if value < 25.0 {
            BmiCategory::Normal
        } else if value < 30.0 {
            BmiCategory::Overweight
        } else {
            BmiCategory::Obese
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            BmiCategory::Underweight => "Underweight",
            BmiCategory::Normal => "Normal weight",
            BmiCategory::Overweight => "Overweight",
            BmiCategory::Obese => "Obese",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bmi {
    /// Rounded to one decimal; the category is read from the rounded value.
    pub value: f64,
    pub category: BmiCategory,
}

pub fn bmi(weight_kg: Option<f64>, height_cm: Option<f64>) -> Option<Bmi> {
    let (weight, height) = (weight_kg?, height_cm?);
    if weight <= 0.0 || height <= 0.0 {
        return None;
    }
    let meters = height / 100.0;
    let value = (weight / (meters * meters) * 10.0).round() / 10.0;
    Some(Bmi {
        value,
        category: BmiCategory::of(value),
    })
}
