use serde::{Deserialize, Serialize};

/// Base price of a case before option deltas, in cents.
pub const BASE_PRICE_CENTS: u32 = 1400;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CaseColor {
    #[default]
    Black,
    Blue,
    Rose,
}

impl CaseColor {
    pub const ALL: [Self; 3] = [Self::Black, Self::Blue, Self::Rose];

    pub fn label(self) -> &'static str {
        match self {
            Self::Black => "Black",
            Self::Blue => "Blue",
            Self::Rose => "Rose",
        }
    }

    /// Fill used for the case body and wrap-around edge in the composite.
    pub fn rgba(self) -> [u8; 4] {
        match self {
            Self::Black => [24, 24, 27, 255],
            Self::Blue => [23, 37, 84, 255],
            Self::Rose => [76, 5, 25, 255],
        }
    }

    pub fn price_delta_cents(self) -> u32 {
        0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PhoneModel {
    #[default]
    Iphonex,
    Iphone11,
    Iphone12,
    Iphone13,
    Iphone14,
    Iphone15,
}

impl PhoneModel {
    pub const ALL: [Self; 6] = [
        Self::Iphonex,
        Self::Iphone11,
        Self::Iphone12,
        Self::Iphone13,
        Self::Iphone14,
        Self::Iphone15,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Iphonex => "iPhone X",
            Self::Iphone11 => "iPhone 11",
            Self::Iphone12 => "iPhone 12",
            Self::Iphone13 => "iPhone 13",
            Self::Iphone14 => "iPhone 14",
            Self::Iphone15 => "iPhone 15",
        }
    }

    pub fn price_delta_cents(self) -> u32 {
        0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CaseMaterial {
    #[default]
    Silicone,
    Polycarbonate,
}

impl CaseMaterial {
    pub const ALL: [Self; 2] = [Self::Silicone, Self::Polycarbonate];

    pub fn label(self) -> &'static str {
        match self {
            Self::Silicone => "Silicone",
            Self::Polycarbonate => "Polycarbonate",
        }
    }

    pub fn description(self) -> Option<&'static str> {
        match self {
            Self::Silicone => None,
            Self::Polycarbonate => Some("Scratch-resistant coating"),
        }
    }

    pub fn price_delta_cents(self) -> u32 {
        match self {
            Self::Silicone => 0,
            Self::Polycarbonate => 500,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CaseFinish {
    #[default]
    Smooth,
    Textured,
}

impl CaseFinish {
    pub const ALL: [Self; 2] = [Self::Smooth, Self::Textured];

    pub fn label(self) -> &'static str {
        match self {
            Self::Smooth => "Smooth Finish",
            Self::Textured => "Textured Finish",
        }
    }

    pub fn description(self) -> Option<&'static str> {
        match self {
            Self::Smooth => None,
            Self::Textured => Some("Soft grippy texture"),
        }
    }

    pub fn price_delta_cents(self) -> u32 {
        match self {
            Self::Smooth => 0,
            Self::Textured => 300,
        }
    }
}

/// One selection from each axis of the closed catalog.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct ProductOptions {
    pub color: CaseColor,
    pub model: PhoneModel,
    pub material: CaseMaterial,
    pub finish: CaseFinish,
}

impl ProductOptions {
    /// Total price in cents. Always computed server-side from the catalog;
    /// client-supplied amounts are never trusted.
    pub fn total_price_cents(self) -> u32 {
        BASE_PRICE_CENTS
            + self.color.price_delta_cents()
            + self.model.price_delta_cents()
            + self.material.price_delta_cents()
            + self.finish.price_delta_cents()
    }
}
