use std::{io::Cursor, sync::Arc};

use casepress::{
    CaseFinish, CaseMaterial, ConfigurationId, MemoryConfigurationStore, MemoryUploadPipeline,
    PlacementEditor, ProductOptions, SourceImage, StaticFrameMetrics, UploadFile, UploadPipeline,
    Vec2, confirm_design, geometry::Rect, store::ConfigurationStore,
};

const ART_RGBA: [u8; 4] = [20, 120, 220, 255];

fn png_bytes(w: u32, h: u32) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(w, h, image::Rgba(ART_RGBA));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

fn settled_metrics() -> StaticFrameMetrics {
    StaticFrameMetrics {
        viewport: Some(Rect::new(0.0, 0.0, 640.0, 960.0)),
        template: Some(Rect::new(64.0, 96.0, 304.0, 586.0)),
    }
}

fn stack() -> (Arc<MemoryConfigurationStore>, MemoryUploadPipeline) {
    let store = Arc::new(MemoryConfigurationStore::new());
    let uploads = MemoryUploadPipeline::new(store.clone());
    (store, uploads)
}

#[test]
fn scenario_a_large_upload_starts_within_the_ceiling() {
    // 4000x3000 halves down to 250x187.5, ratio 4:3 exactly.
    let source = SourceImage::new("mem://big.png", 4000, 3000).unwrap();
    let editor = PlacementEditor::new(&source).unwrap();
    let size = editor.state().size;
    assert!(size.width <= 320.0 && size.height <= 320.0);
    assert_eq!(size.width, 250.0);
    assert_eq!(size.height, 187.5);
    assert!((size.width / size.height - 4.0 / 3.0).abs() < 1e-12);
}

#[test]
fn scenario_b_drag_lands_template_relative_in_the_composite() {
    let (store, uploads) = stack();
    let configuration = uploads
        .upload(
            &UploadFile {
                file_name: "art.png".to_string(),
                bytes: png_bytes(64, 48),
            },
            None,
        )
        .unwrap()
        .configuration;

    // 64x48 is already within the ceiling, so it renders 1:1.
    let mut editor = PlacementEditor::new(&configuration.source_image).unwrap();
    editor.drag_by(Vec2::new(20.0, -10.0)); // (150,205) -> (170,195)

    let confirmed = confirm_design(
        &settled_metrics(),
        editor.state(),
        ProductOptions::default(),
        &configuration.id,
        store.as_ref(),
        &uploads,
    )
    .unwrap();

    let composite_url = confirmed.cropped_image_url.as_deref().unwrap();
    let composite = casepress::decode_source(&uploads.fetch(composite_url).unwrap()).unwrap();

    // Template 240x490 plus 30px bleed on every side.
    assert_eq!(composite.dimensions(), (300, 550));

    // actualOffset = (170-64, 195-96) = (106, 99); drawn at +bleed.
    let inside = composite.get_pixel(106 + 30 + 2, 99 + 30 + 2);
    assert_eq!(inside.0, ART_RGBA);
    let left_of_art = composite.get_pixel(106 + 30 - 1, 99 + 30 + 2);
    assert_ne!(left_of_art.0, ART_RGBA);
}

#[test]
fn scenario_d_failed_measurement_leaves_configuration_unchanged() {
    let (store, uploads) = stack();
    let configuration = uploads
        .upload(
            &UploadFile {
                file_name: "art.png".to_string(),
                bytes: png_bytes(64, 48),
            },
            None,
        )
        .unwrap()
        .configuration;
    let editor = PlacementEditor::new(&configuration.source_image).unwrap();

    // Frame mounted but with zero width: layout has not settled.
    let metrics = StaticFrameMetrics {
        viewport: Some(Rect::new(0.0, 0.0, 640.0, 960.0)),
        template: Some(Rect::new(64.0, 96.0, 64.0, 586.0)),
    };
    let err = confirm_design(
        &metrics,
        editor.state(),
        ProductOptions::default(),
        &configuration.id,
        store.as_ref(),
        &uploads,
    )
    .unwrap_err();

    assert_eq!(err.kind(), "geometry");
    let reloaded = store.find_by_id(&configuration.id).unwrap();
    assert_eq!(reloaded.cropped_image_url, None);
    assert_eq!(reloaded, configuration);
}

#[test]
fn reconfirming_unchanged_state_yields_a_content_equal_configuration() {
    let (store, uploads) = stack();
    let configuration = uploads
        .upload(
            &UploadFile {
                file_name: "art.png".to_string(),
                bytes: png_bytes(64, 48),
            },
            None,
        )
        .unwrap()
        .configuration;
    let editor = PlacementEditor::new(&configuration.source_image).unwrap();
    let options = ProductOptions {
        material: CaseMaterial::Polycarbonate,
        ..ProductOptions::default()
    };

    let first = confirm_design(
        &settled_metrics(),
        editor.state(),
        options,
        &configuration.id,
        store.as_ref(),
        &uploads,
    )
    .unwrap();
    let second = confirm_design(
        &settled_metrics(),
        editor.state(),
        options,
        &configuration.id,
        store.as_ref(),
        &uploads,
    )
    .unwrap();

    assert_eq!(first.cropped_image_url, second.cropped_image_url);
    assert_eq!(first.options, second.options);
    assert_eq!(first, second);
}

#[test]
fn reconfirming_with_new_options_overwrites_instead_of_appending() {
    let (store, uploads) = stack();
    let configuration = uploads
        .upload(
            &UploadFile {
                file_name: "art.png".to_string(),
                bytes: png_bytes(64, 48),
            },
            None,
        )
        .unwrap()
        .configuration;
    let mut editor = PlacementEditor::new(&configuration.source_image).unwrap();

    let first = confirm_design(
        &settled_metrics(),
        editor.state(),
        ProductOptions::default(),
        &configuration.id,
        store.as_ref(),
        &uploads,
    )
    .unwrap();

    editor.drag_by(Vec2::new(12.0, 30.0));
    let second = confirm_design(
        &settled_metrics(),
        editor.state(),
        ProductOptions {
            finish: CaseFinish::Textured,
            ..ProductOptions::default()
        },
        &configuration.id,
        store.as_ref(),
        &uploads,
    )
    .unwrap();

    // Same configuration row, new composite and options.
    assert_eq!(first.id, second.id);
    assert_ne!(first.cropped_image_url, second.cropped_image_url);
    assert_eq!(second.options.finish, CaseFinish::Textured);
    assert_eq!(
        store.find_by_id(&configuration.id).unwrap().cropped_image_url,
        second.cropped_image_url
    );
}

#[test]
fn unsupported_upload_never_creates_a_configuration() {
    let (store, uploads) = stack();
    let err = uploads
        .upload(
            &UploadFile {
                file_name: "art.webp".to_string(),
                bytes: b"RIFF\x00\x00\x00\x00WEBPVP8 ".to_vec(),
            },
            None,
        )
        .unwrap_err();
    assert_eq!(err.kind(), "input");
    assert!(store.find_by_id(&ConfigurationId::new("cfg-1")).is_err());
}
