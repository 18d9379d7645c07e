use std::time::Duration;
use reveal_render::{
    DriverSettings, NoisePolarity, NoiseRaster, Phase, RenderSurface, RevealDriver, RevealMaterial,
    RevealObserver, RevealScene, RevealState, TimingFunction,
};
use reveal_text::{BlockTextSurface, TextLayoutRequest, TextRasterizer};
use tiny_skia::Pixmap;

const VIEW: u32 = 256;

#[derive(Default)]
struct CountingSurface {
    visible: Vec<usize>,
}

impl RenderSurface for CountingSurface {
    fn size(&self) -> (u32, u32) {
        (VIEW, VIEW)
    }

    fn present(&mut self, frame: &Pixmap) -> reveal_render::Result<()> {
        let visible = frame.pixels().iter().filter(|p| p.alpha() > 0).count();
        self.visible.push(visible);
        Ok(())
    }
}

fn hash_noise() -> NoiseRaster {
    let data = (0..VIEW * VIEW)
        .map(|i| {
            let (x, y) = (i % VIEW, i / VIEW);
            ((x * 37 + y * 101) % 256) as u8
        })
        .collect();
    NoiseRaster::new(VIEW, VIEW, data).unwrap()
}

fn hello_world_scene(smoothing: f32, polarity: NoisePolarity) -> RevealScene<CountingSurface> {
    let request = TextLayoutRequest::new("Hello\nworld!")
        .horizontal_padding(1.8)
        .line_height(2.5);
    let raster = TextRasterizer::new(BlockTextSurface::new())
        .ideal_size(2048)
        .rasterize(&request)
        .unwrap();
    assert_eq!(raster.side(), 2048);
    assert!((raster.widest_line() - 2048.0 / 1.8).abs() < 2.0);

    let material = RevealMaterial::builder()
        .mask(raster)
        .noise(hash_noise())
        .smoothing(smoothing)
        .polarity(polarity)
        .build()
        .unwrap();
    RevealScene::new(CountingSurface::default(), material)
}

/// Pixels whose mask sample carries any glyph coverage
fn glyph_pixels(material: &RevealMaterial) -> usize {
    let mut count = 0;
    for y in 0..VIEW {
        let v = 1.0 - (y as f32 + 0.5) / VIEW as f32;
        for x in 0..VIEW {
            let u = (x as f32 + 0.5) / VIEW as f32;
            if material.mask().sample(u, v) < 1.0 {
                count += 1;
            }
        }
    }
    count
}

fn linear_driver() -> RevealDriver {
    RevealDriver::new(DriverSettings {
        duration: Duration::from_secs(1),
        timing: TimingFunction::Linear,
        ..DriverSettings::default()
    })
}

#[test]
fn test_hello_world_reveal() {
    let mut scene = hello_world_scene(0.0, NoisePolarity::LowFirst);
    let glyphs = glyph_pixels(scene.material());
    assert!(glyphs > 1000, "glyph pixels: {}", glyphs);

    // Nothing is visible before the reveal starts
    scene.on_update(RevealState { progress: 0.0, time: 0.0 }).unwrap();
    assert_eq!(scene.last_revealed(), 0);

    let mut driver = linear_driver();
    driver.start(&scene).unwrap();

    let mut phases = Vec::new();
    for _ in 0..10 {
        phases.push(driver.frame(Duration::from_millis(100), &mut scene).unwrap());
    }
    assert!(phases[..9].iter().all(|p| *p == Phase::Revealing));
    assert_eq!(phases[9], Phase::SteadyAnimating);

    let visible = &scene.surface().visible[1..];
    assert_eq!(visible.len(), 10);
    assert!(visible.windows(2).all(|w| w[1] > w[0]), "{:?}", visible);
    assert_eq!(*visible.last().unwrap(), glyphs);

    // Every glyph pixel is drawn in the configured color
    let frame = scene.frame().unwrap();
    for pixel in frame.pixels().iter().filter(|p| p.alpha() > 0) {
        assert_eq!((pixel.red(), pixel.green(), pixel.blue()), (0, 0, 0));
    }

    // The clock keeps running after the reveal
    driver.frame(Duration::from_millis(16), &mut scene).unwrap();
    assert_eq!(driver.state().progress, 1.0);
    assert!((driver.state().time - 0.55).abs() < 1e-4);

    driver.stop(&mut scene).unwrap();
    assert!(scene.is_released());
    let frames = scene.frames_rendered();
    assert_eq!(driver.frame(Duration::from_millis(16), &mut scene).unwrap(), Phase::Stopped);
    assert_eq!(scene.frames_rendered(), frames);
}

#[test]
fn test_smoothed_reveal_is_monotonic() {
    for polarity in [NoisePolarity::LowFirst, NoisePolarity::HighFirst] {
        let mut scene = hello_world_scene(0.15, polarity);
        let glyphs = glyph_pixels(scene.material());
        let mut driver = linear_driver();
        driver.start(&scene).unwrap();
        while driver.phase() == Phase::Revealing {
            driver.frame(Duration::from_millis(125), &mut scene).unwrap();
        }

        let visible = &scene.surface().visible;
        assert!(visible.windows(2).all(|w| w[1] >= w[0]), "{:?}: {:?}", polarity, visible);
        assert_eq!(*visible.last().unwrap(), glyphs);
    }
}
