//! Renders a short animated scene into PNG files.
//!
//! Run with `cargo run --example stage_demo [output_dir]`.

use image::Rgba;
use stagehand::prelude::*;

const FRAME_MS: f32 = 1000.0 / 30.0;

fn panel_texture() -> Option<Texture> {
    // 12x12 frame with a 4px border, stretched as a nine-patch.
    let mut painter = Painter::new(12, 12);
    painter.fill(Rgba([40, 90, 160, 255]));
    painter.rect(Rect::new(4, 4, 4, 4), Rgba([230, 235, 245, 255]), true);
    painter.into_texture()
}

fn dot_texture(color: [u8; 4]) -> Option<Texture> {
    let mut painter = Painter::new(32, 32);
    painter.circle(16, 16, 14, Rgba(color), true);
    painter.into_texture()
}

fn main() {
    env_logger::init();

    let out_dir = std::env::args().nth(1).unwrap_or_else(|| ".".to_string());
    let mut stage = Stage::new().width(320).height(200);

    let (Some(panel), Some(red), Some(green)) = (
        panel_texture(),
        dot_texture([220, 60, 60, 255]),
        dot_texture([60, 200, 90, 255]),
    ) else {
        log::error!("Failed to build demo textures");
        return;
    };
    let cache = stage.cache_mut();
    cache.register_texture(panel, Some("panel_9p"));
    cache.register_texture(red, Some("dot_red"));
    cache.register_texture(green, Some("dot_green"));

    let scene = r#"[
        { "name": "panel", "loc": [60, 40, 260, 160], "image": "panel_9p" },
        { "name": "orbit", "loc": [150, 90, 170, 110], "image": "dot_red", "parent": "panel" },
        { "name": "moon", "loc": [30, 5, 40, 15], "image": "dot_green", "parent": "orbit" }
    ]"#;
    if let Err(e) = stage.load_elements_json(scene) {
        log::error!("Failed to load scene: {}", e);
        return;
    }

    stage.animate(
        "panel",
        Timeline::new()
            .scale(1.0, 1.2, 500.0)
            .scale(1.2, 1.0, 500.0)
            .repeat(-1),
    );
    stage.animate("orbit", Timeline::new().rotate(0.0, 360.0, 2000.0).repeat(-1));
    if let Err(e) = stage.load_animation_json(
        "moon",
        r#"[
            { "type": "delay", "durationMs": 500 },
            { "type": "changeTexture", "image": "dot_red" },
            { "type": "alpha", "fromAlpha": 1, "toAlpha": 0.3, "durationMs": 500 },
            { "type": "changeTexture", "image": "dot_green" },
            { "type": "alpha", "fromAlpha": 0.3, "toAlpha": 1, "durationMs": 500 },
            { "type": "repeat", "count": -1 }
        ]"#,
    ) {
        log::error!("Failed to load animation: {}", e);
    }

    let Some(mut canvas) = stage.create_canvas() else {
        log::error!("Failed to create canvas");
        return;
    };

    for frame in 0..60 {
        stage.frame(FRAME_MS, &mut canvas);
        if frame % 15 == 0 {
            let path = format!("{}/stage_{:02}.png", out_dir, frame);
            match canvas.to_image().save(&path) {
                Ok(()) => log::info!("Wrote {}", path),
                Err(e) => log::error!("Failed to write {}: {}", path, e),
            }
        }
    }

    if let Some(hit) = stage.find_element_at(70, 50) {
        log::info!("Element under (70, 50): {}", hit);
    }
}
