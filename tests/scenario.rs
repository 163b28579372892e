use std::path::{Path, PathBuf};

use imagebox::{
    BoxConfig, Color, EffectRequest, Frame, FrameSink, ImageBox, ImageBoxError, Padding, PixelBuffer, Result,
    Viewport,
};

/// Every image is a flat color derived from its file name: `a` is red, `b` green, `c` blue.
fn flat_loader(path: &Path) -> Result<PixelBuffer> {
    let pixel = match path.file_stem().and_then(|s| s.to_str()) {
        Some("a") => [200, 0, 0],
        Some("b") => [0, 200, 0],
        Some("c") => [0, 0, 200],
        _ => return Err(ImageBoxError::Load { path: path.to_path_buf(), details: "unknown test image".into() }),
    };
    PixelBuffer::filled(40, 20, &pixel)
}

type Loader = fn(&Path) -> Result<PixelBuffer>;

#[derive(Default)]
struct Recorder {
    frames: Vec<Frame>,
}

impl FrameSink for Recorder {
    fn present(&mut self, frame: &Frame) -> Result<()> {
        self.frames.push(frame.clone());
        Ok(())
    }
}

fn image_box(names: &[&str], config: BoxConfig) -> ImageBox<Loader> {
    let mut image_box = ImageBox::new(flat_loader as Loader, config);
    let failures = image_box.add_images(names.iter().map(|name| PathBuf::from(format!("/pictures/{name}.png"))));
    assert!(failures.is_empty());
    image_box
}

fn current_name(image_box: &ImageBox<Loader>) -> String {
    let entry = image_box.images().current().unwrap();
    entry.path.file_stem().unwrap().to_string_lossy().into_owned()
}

#[test]
fn delayed_cycling_fade_with_rotation() {
    let config = BoxConfig { background: Color::WHITE, padding: Padding { x: 10, y: 10 }, ..BoxConfig::default() };
    let mut image_box = image_box(&["a", "b"], config);
    let mut sink = Recorder::default();
    let viewport = Viewport::new(90, 90);
    let request: EffectRequest = "fadeIn=1,fadeCycle=1,rotate=3,fadeDelay=0.5".parse().unwrap();

    image_box.update(0.0, Some(&request), viewport, &mut sink).unwrap();
    assert_eq!(image_box.effects().opacity(), 0.0);

    image_box.update(0.5, None, viewport, &mut sink).unwrap();
    assert_eq!(image_box.effects().opacity(), 0.0);
    // fully transparent: the frame is the background color
    assert_eq!(sink.frames[1].pixels.pixel(0, 0), &[255, 255, 255]);

    image_box.update(1.5, None, viewport, &mut sink).unwrap();
    assert_eq!(image_box.effects().opacity(), 1.0);
    assert_eq!(current_name(&image_box), "a");
    assert_eq!(sink.frames[2].pixels.pixel(0, 0), &[200, 0, 0]);

    image_box.update(3.0, None, viewport, &mut sink).unwrap();
    assert_eq!(current_name(&image_box), "b");
    assert!(image_box.is_fading());
    assert!(image_box.is_rotating());

    // 80x40 fits the 80x80 room left by the padding, centered in 90x90
    let frame = &sink.frames[3];
    assert_eq!((frame.pixels.width(), frame.pixels.height()), (80, 40));
    assert_eq!((frame.x, frame.y), (5, 25));
    assert_eq!(frame.anchor, (45.0, 45.0));
}

#[test]
fn rotation_visits_images_in_order() {
    let mut image_box = image_box(&["a", "b", "c"], BoxConfig::default());
    let viewport = Viewport::new(20, 20);
    image_box.start_effect(&EffectRequest::default().with_rotate(1.0), 0.0);

    let mut advances = 0;
    let mut previous = image_box.images().cursor();
    for step in 1..=(7 * 8) {
        image_box.render(f64::from(step) * 0.125, None, viewport).unwrap();
        if image_box.images().cursor() != previous {
            advances += 1;
            previous = image_box.images().cursor();
        }
    }
    assert_eq!(advances, 7);
    assert_eq!(image_box.images().cursor(), Some(7 % 3));
}

#[test]
fn removing_images_while_rotating() {
    let mut image_box = image_box(&["a", "b", "c"], BoxConfig::default());
    let viewport = Viewport::new(20, 20);
    image_box.start_effect(&EffectRequest::default().with_rotate(1.0), 0.0);
    image_box.render(1.0, None, viewport).unwrap();
    assert_eq!(current_name(&image_box), "b");

    assert_eq!(image_box.remove_images(["/pictures/b.png"]), 1);
    assert_eq!(current_name(&image_box), "c");
    assert_eq!(image_box.remove_images(["/pictures/a.png", "/pictures/c.png"]), 2);
    assert!(matches!(image_box.render(1.5, None, viewport), Err(ImageBoxError::NoImages)));

    // state survives the empty frames
    image_box.add_images(["/pictures/a.png"]);
    let frame = image_box.render(2.0, None, viewport).unwrap();
    assert_eq!(frame.pixels.pixel(0, 0), &[200, 0, 0]);
    assert!(image_box.is_rotating());
}

#[test]
fn fade_out_blends_toward_background() {
    let config = BoxConfig { background: Color::new(0, 0, 100), ..BoxConfig::default() };
    let mut image_box = image_box(&["a"], config);
    let viewport = Viewport::new(40, 20);
    let request = EffectRequest::default().with_fade_out(2.0);
    image_box.render(10.0, Some(&request), viewport).unwrap();
    let frame = image_box.render(11.0, None, viewport).unwrap();
    assert_eq!(frame.pixels.pixel(3, 3), &[100, 0, 50]);

    image_box.stop_fade();
    let frame = image_box.render(11.5, None, viewport).unwrap();
    assert_eq!(frame.pixels.pixel(3, 3), &[200, 0, 0]);
}
