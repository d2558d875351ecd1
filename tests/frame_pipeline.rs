use stagehand::prelude::*;

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn approx_eq(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-4
}

fn stage_with_textures(names: &[&str]) -> Stage {
    let mut stage = Stage::new().width(200).height(200);
    for name in names {
        let texture = Texture::solid(8, 8, [255, 255, 255, 255]).unwrap();
        stage.cache_mut().register_texture(texture, Some(name));
    }
    stage
}

fn add(stage: &mut Stage, json: &str) -> String {
    stage
        .add_from_spec(&ElementSpec::from_json(json).unwrap())
        .unwrap()
}

#[test]
fn test_animation_output_is_drawn_in_the_same_frame() {
    init();
    let mut stage = stage_with_textures(&["box"]);
    add(&mut stage, r#"{ "name": "a", "loc": [0, 0, 10, 10], "image": "box" }"#);
    assert!(stage.animate("a", Timeline::new().alpha(1.0, 0.0, 100.0).move_to(50.0, 0.0, 100.0)));

    let mut list = DrawList::new();
    stage.frame(50.0, &mut list);
    let draw = list.find("a").unwrap();
    assert!(approx_eq(draw.alpha, 0.5));

    stage.frame(100.0, &mut list);
    assert_eq!(list.len(), 1);
    let draw = list.find("a").unwrap();
    assert!(approx_eq(draw.alpha, 0.0));
    assert_eq!(draw.dst, Rect::new(25, 0, 10, 10));
}

#[test]
fn test_parent_scale_moves_and_grows_children() {
    init();
    let mut stage = stage_with_textures(&["box"]);
    add(&mut stage, r#"{ "name": "A", "loc": [0, 0, 100, 100], "image": "box" }"#);
    add(
        &mut stage,
        r#"{ "name": "B", "loc": [10, 10, 30, 30], "image": "box", "parent": "A" }"#,
    );
    stage.animate("A", Timeline::new().scale(1.0, 2.0, 100.0));

    let mut list = DrawList::new();
    stage.frame(100.0, &mut list);

    assert_eq!(list.find("A").unwrap().dst, Rect::new(-50, -50, 200, 200));
    let b = list.find("B").unwrap();
    assert_eq!(b.dst, Rect::new(-30, -30, 40, 40));
    // Scaled chains are not clipped.
    assert_eq!(b.clip, None);
    assert_eq!(stage.store().world_scale("B"), 2.0);
}

#[test]
fn test_draw_order_and_hit_testing() {
    init();
    let mut stage = stage_with_textures(&["box"]);
    add(
        &mut stage,
        r#"{ "name": "top", "loc": [0, 0, 50, 50], "image": "box", "clickable": true }"#,
    );
    add(
        &mut stage,
        r#"{ "name": "middle", "loc": [0, 0, 50, 50], "image": "box", "clickable": true }"#,
    );
    add(&mut stage, r#"{ "name": "plain", "loc": [0, 0, 50, 50], "image": "box" }"#);
    stage.store_mut().set_always_on_top("top", true);

    let mut list = DrawList::new();
    stage.render(&mut list);
    assert_eq!(list.element_names(), ["middle", "plain", "top"]);

    // Hit testing walks collection order backwards and ignores draw passes.
    assert_eq!(stage.find_element_at(10, 10), Some("middle"));
    stage.store_mut().set_visible("middle", false);
    assert_eq!(stage.find_element_at(10, 10), Some("top"));
    assert_eq!(stage.find_element_at(60, 60), None);
}

#[test]
fn test_children_clip_to_ancestors() {
    init();
    let mut stage = stage_with_textures(&["box"]);
    add(&mut stage, r#"{ "name": "window", "loc": [20, 20, 80, 80], "image": "box" }"#);
    add(
        &mut stage,
        r#"{ "name": "content", "loc": [40, 40, 100, 100], "image": "box", "parent": "window" }"#,
    );
    add(
        &mut stage,
        r#"{ "name": "outside", "loc": [70, 0, 80, 10], "image": "box", "parent": "window" }"#,
    );

    let mut list = DrawList::new();
    stage.render(&mut list);
    let content = list.find("content").unwrap();
    assert_eq!(content.dst, Rect::new(60, 60, 60, 60));
    assert_eq!(content.clip, Some(Rect::new(20, 20, 60, 60)));
    assert!(list.find("outside").is_none());
}

#[test]
fn test_timeline_texture_swap_and_removal() {
    init();
    let mut stage = stage_with_textures(&["frame_9p", "lit_9p"]);
    add(&mut stage, r#"{ "name": "btn", "loc": [0, 0, 40, 20], "image": "frame_9p" }"#);
    let first = stage.store().texture_id("btn").to_string();
    assert!(stage.cache().is_dynamic(&first));

    stage
        .load_animation_json(
            "btn",
            r#"[{ "type": "changeTexture", "image": "lit_9p" }, { "type": "delay", "durationMs": 1000 }]"#,
        )
        .unwrap();
    let mut list = DrawList::new();
    stage.frame(16.0, &mut list);

    let second = stage.store().texture_id("btn").to_string();
    assert_ne!(first, second);
    assert!(!stage.cache().contains(&first));
    assert_eq!(list.find("btn").unwrap().texture.size(), (40, 20));

    assert!(stage.remove_element("btn"));
    assert!(!stage.cache().contains(&second));
    assert!(stage.scheduler().is_empty());
    stage.frame(16.0, &mut list);
    assert!(list.is_empty());
}

#[test]
fn test_pixmap_frame() {
    init();
    let mut stage = Stage::new().width(20).height(20).background([0, 0, 0, 255]);
    let red = Texture::solid(4, 4, [255, 0, 0, 255]).unwrap();
    stage.cache_mut().register_texture(red, Some("red"));
    add(&mut stage, r#"{ "name": "r", "loc": [5, 5, 15, 15], "image": "red" }"#);

    let mut canvas = stage.create_canvas().unwrap();
    stage.frame(16.0, &mut canvas);
    let image = canvas.to_image();
    assert_eq!(image.get_pixel(10, 10).0, [255, 0, 0, 255]);
    assert_eq!(image.get_pixel(1, 1).0, [0, 0, 0, 255]);
}
