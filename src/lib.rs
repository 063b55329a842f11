#![forbid(unsafe_code)]

pub mod catalog;
pub mod checkout;
pub mod compositor;
pub mod editor;
pub mod error;
pub mod fingerprint;
pub mod geometry;
pub mod model;
pub mod pipeline;
pub mod store;
pub mod upload;

pub use catalog::{
    BASE_PRICE_CENTS, CaseColor, CaseFinish, CaseMaterial, PhoneModel, ProductOptions,
};
pub use checkout::{
    CheckoutRedirect, CheckoutSession, DesignPhase, MemoryPaymentGateway, OrderFlow,
    PaymentConfirmation, PaymentGateway, design_phase,
};
pub use compositor::{
    CASE_BLEED_PX, CompositeArtifact, CompositeJob, FrameMetrics, StaticFrameMetrics, compose,
    decode_source, encode_png, render,
};
pub use editor::{PlacementEditor, PlacementState, ResizeHandle};
pub use error::{CaseError, CaseResult};
pub use geometry::{
    PixelDims, Point, RENDER_CEILING_PX, Rect, Size, Vec2, initial_render_size, scale_to_source,
    template_relative,
};
pub use model::{
    Configuration, ConfigurationId, Order, OrderId, OrderStatus, ShippingAddress, SourceImage,
    UserId,
};
pub use pipeline::confirm_design;
pub use store::{
    ConfigurationPatch, ConfigurationStore, MemoryConfigurationStore, MemoryOrderStore, OrderStore,
};
pub use upload::{
    MAX_UPLOAD_BYTES, MemoryUploadPipeline, UploadFile, UploadOutcome, UploadPipeline,
    UploadedAsset,
};
