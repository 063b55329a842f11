use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{
    catalog::ProductOptions,
    error::{CaseError, CaseResult},
    geometry::PixelDims,
};

/// Type-safe wrapper around the opaque string ids the external store issues.
macro_rules! define_id {
    ($name:ident) => {
        #[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }
    };
}

define_id!(ConfigurationId);
define_id!(OrderId);
define_id!(UserId);

/// The original upload. Immutable once created; dimensions are the native
/// pixel grid reported by the upload pipeline.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceImage {
    pub url: String,
    pub pixel_width: u32,
    pub pixel_height: u32,
}

impl SourceImage {
    pub fn new(url: impl Into<String>, pixel_width: u32, pixel_height: u32) -> CaseResult<Self> {
        let url = url.into();
        if url.trim().is_empty() {
            return Err(CaseError::input("source image url must be non-empty"));
        }
        PixelDims::new(pixel_width, pixel_height)?;
        Ok(Self {
            url,
            pixel_width,
            pixel_height,
        })
    }

    pub fn dims(&self) -> PixelDims {
        PixelDims {
            width: self.pixel_width,
            height: self.pixel_height,
        }
    }
}

/// One design draft: the upload plus the chosen product options, and, once a
/// confirm succeeds, the print-ready composite's URL.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Configuration {
    pub id: ConfigurationId,
    pub source_image: SourceImage,
    pub cropped_image_url: Option<String>,
    pub options: ProductOptions,
}

impl Configuration {
    /// A configuration is ready for checkout once a composite exists.
    pub fn is_ready(&self) -> bool {
        self.cropped_image_url.is_some()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingAddress {
    pub name: String,
    pub street: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
    pub phone_number: Option<String>,
}

/// Fulfillment status after payment. Progresses forward only.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    AwaitingShipment,
    Shipped,
    Fulfilled,
}

impl OrderStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AwaitingShipment => "awaiting_shipment",
            Self::Shipped => "shipped",
            Self::Fulfilled => "fulfilled",
        }
    }

    /// Whether `next` is the single legal forward step from `self`.
    pub fn can_advance_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::AwaitingShipment, Self::Shipped) | (Self::Shipped, Self::Fulfilled)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Fulfilled)
    }
}

/// A priced, checked-out configuration moving through payment and fulfillment.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub configuration_id: ConfigurationId,
    pub user_id: UserId,
    /// Amount in currency units (dollars), fixed at order creation.
    pub amount: Decimal,
    pub is_paid: bool,
    pub status: OrderStatus,
    pub shipping_address: Option<ShippingAddress>,
}
