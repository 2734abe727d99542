use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use ab_glyph::{FontVec, PxScale};
use anyhow::{bail, Context, Result};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::{self, FilterType};
use image::{DynamicImage, Rgb, RgbImage};
use imageproc::drawing::{draw_text_mut, text_size};

pub const MAIN_SIZE: u32 = 1000;
pub const DETAIL_SIZE: u32 = 1500;
pub const JPEG_QUALITY: u8 = 95;
pub const SUPPORTED_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "bmp", "tiff"];

const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
const BLACK: Rgb<u8> = Rgb([0, 0, 0]);
const WATERMARK_PX: f32 = 36.0;
const WATERMARK_MARGIN: i64 = 50;
const WATERMARK_PADDING: i64 = 10;
const WATERMARK_BOX_ALPHA: u32 = 128;

const FONT_CANDIDATES: [&str; 5] = [
    "arial.ttf",
    "/System/Library/Fonts/Arial.ttf",
    "/Library/Fonts/Arial.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

pub fn is_supported(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| SUPPORTED_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Resize to exactly `width`x`height`. Without an explicit output the
/// result lands next to the input as `{stem}_resized.jpg`.
pub fn resize_image(input: &Path, width: u32, height: u32, output: Option<&Path>) -> Result<PathBuf> {
    if width == 0 || height == 0 {
        bail!("target size must be non-zero, got {width}x{height}");
    }
    let img = load(input)?;
    let out = output.map(Path::to_path_buf).unwrap_or_else(|| sibling(input, "resized"));
    let resized = img.resize_exact(width, height, FilterType::Lanczos3);
    save_jpeg(&flatten_on_white(&resized), &out)?;
    Ok(out)
}

/// Square main image from the first input: centre crop, 1000x1000,
/// transparency flattened onto white.
pub fn create_main_image(inputs: &[PathBuf], output: &Path) -> Result<PathBuf> {
    let Some(first) = inputs.first() else { bail!("at least one image path is required") };
    let img = load(first)?;
    let (w, h) = (img.width(), img.height());
    let side = w.min(h);
    let cropped = img.crop_imm((w - side) / 2, (h - side) / 2, side, side);
    let resized = cropped.resize_exact(MAIN_SIZE, MAIN_SIZE, FilterType::Lanczos3);
    save_jpeg(&flatten_on_white(&resized), output)?;
    Ok(output.to_path_buf())
}

/// One 1500x1500 detail image per input, padded to square with white and
/// written as `detail_{n}.jpg` (1-based) under `output_dir`.
pub fn create_detail_images(inputs: &[PathBuf], output_dir: &Path) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(output_dir).with_context(|| format!("create {}", output_dir.display()))?;
    let mut outputs = Vec::with_capacity(inputs.len());
    for (i, input) in inputs.iter().enumerate() {
        let img = load(input)?;
        let out = output_dir.join(format!("detail_{}.jpg", i + 1));
        save_jpeg(&pad_to_square(&img, DETAIL_SIZE), &out)?;
        outputs.push(out);
    }
    Ok(outputs)
}

/// Scale so the longer side is `size`, then centre on a white `size`x`size` canvas.
pub fn pad_to_square(img: &DynamicImage, size: u32) -> RgbImage {
    let (w, h) = (img.width().max(1) as u64, img.height().max(1) as u64);
    let longest = w.max(h);
    let fit_w = ((w * size as u64) / longest).max(1) as u32;
    let fit_h = ((h * size as u64) / longest).max(1) as u32;
    let fitted = flatten_on_white(&img.resize_exact(fit_w, fit_h, FilterType::Lanczos3));

    let mut canvas = RgbImage::from_pixel(size, size, WHITE);
    let x = (size - fit_w) / 2;
    let y = (size - fit_h) / 2;
    imageops::overlay(&mut canvas, &fitted, x as i64, y as i64);
    canvas
}

/// TrueType font used for watermark text.
pub struct WatermarkFont {
    font: FontVec,
    pub source: PathBuf,
}

impl WatermarkFont {
    pub fn from_file(path: &Path) -> Result<Self> {
        let bytes = fs::read(path).with_context(|| format!("read font {}", path.display()))?;
        let font = FontVec::try_from_vec(bytes).with_context(|| format!("parse font {}", path.display()))?;
        Ok(Self { font, source: path.to_path_buf() })
    }

    /// LISTING_WATERMARK_FONT first, then a few well-known system paths.
    pub fn discover() -> Result<Self> {
        if let Ok(p) = std::env::var("LISTING_WATERMARK_FONT") {
            if !p.trim().is_empty() {
                return Self::from_file(Path::new(p.trim()));
            }
        }
        for candidate in FONT_CANDIDATES {
            let path = Path::new(candidate);
            if path.is_file() {
                return Self::from_file(path);
            }
        }
        bail!("no watermark font found; set LISTING_WATERMARK_FONT to a .ttf file")
    }
}

/// Bottom-right text on a half-transparent white box. Default output is
/// `{stem}_watermarked.jpg` next to the input.
pub fn add_watermark(input: &Path, text: &str, output: Option<&Path>, font: &WatermarkFont) -> Result<PathBuf> {
    let img = load(input)?;
    let out = output.map(Path::to_path_buf).unwrap_or_else(|| sibling(input, "watermarked"));
    let mut canvas = flatten_on_white(&img);

    let scale = PxScale::from(WATERMARK_PX);
    let (tw, th) = text_size(scale, &font.font, text);
    let (x, y) = watermark_origin(canvas.width(), canvas.height(), tw, th);
    blend_white_box(
        &mut canvas,
        (x - WATERMARK_PADDING, y - WATERMARK_PADDING),
        (x + tw as i64 + WATERMARK_PADDING, y + th as i64 + WATERMARK_PADDING),
    );
    draw_text_mut(&mut canvas, BLACK, x as i32, y as i32, scale, &font.font, text);

    save_jpeg(&canvas, &out)?;
    Ok(out)
}

pub fn watermark_origin(width: u32, height: u32, text_w: u32, text_h: u32) -> (i64, i64) {
    (
        width as i64 - text_w as i64 - WATERMARK_MARGIN,
        height as i64 - text_h as i64 - WATERMARK_MARGIN,
    )
}

// inclusive corners, clipped to the canvas
fn blend_white_box(img: &mut RgbImage, top_left: (i64, i64), bottom_right: (i64, i64)) {
    let (w, h) = (img.width() as i64, img.height() as i64);
    let x0 = top_left.0.clamp(0, w);
    let y0 = top_left.1.clamp(0, h);
    let x1 = (bottom_right.0 + 1).clamp(0, w);
    let y1 = (bottom_right.1 + 1).clamp(0, h);
    for y in y0..y1 {
        for x in x0..x1 {
            let px = img.get_pixel_mut(x as u32, y as u32);
            for c in px.0.iter_mut() {
                *c = mix(255, *c, WATERMARK_BOX_ALPHA);
            }
        }
    }
}

/// What a batch run does to every supported file in a directory.
#[derive(Clone, Debug, PartialEq)]
pub enum BatchOp {
    Main,
    Detail,
    Resize { width: u32, height: u32 },
    Watermark { text: String },
}

/// Apply `op` to every supported image in `input_dir`, in file-name order.
/// Details are numbered across the whole batch under `{output_dir}/details`.
pub fn batch_process(input_dir: &Path, output_dir: &Path, op: &BatchOp) -> Result<Vec<PathBuf>> {
    let inputs = list_images(input_dir)?;
    fs::create_dir_all(output_dir).with_context(|| format!("create {}", output_dir.display()))?;

    match op {
        BatchOp::Detail => create_detail_images(&inputs, &output_dir.join("details")),
        BatchOp::Main => inputs
            .iter()
            .map(|p| create_main_image(std::slice::from_ref(p), &prefixed(output_dir, "main", p)))
            .collect(),
        BatchOp::Resize { width, height } => inputs
            .iter()
            .map(|p| resize_image(p, *width, *height, Some(&prefixed(output_dir, "resized", p))))
            .collect(),
        BatchOp::Watermark { text } => {
            let font = WatermarkFont::discover()?;
            inputs
                .iter()
                .map(|p| add_watermark(p, text, Some(&prefixed(output_dir, "watermarked", p)), &font))
                .collect()
        }
    }
}

pub fn list_images(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("read dir {}", dir.display()))? {
        let path = entry?.path();
        if path.is_file() && is_supported(&path) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

fn load(path: &Path) -> Result<DynamicImage> {
    image::open(path).with_context(|| format!("open image {}", path.display()))
}

fn save_jpeg(img: &RgbImage, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
    }
    let file = File::create(path).with_context(|| format!("create {}", path.display()))?;
    let mut w = BufWriter::new(file);
    JpegEncoder::new_with_quality(&mut w, JPEG_QUALITY)
        .encode_image(img)
        .with_context(|| format!("encode {}", path.display()))?;
    w.flush().with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

fn flatten_on_white(img: &DynamicImage) -> RgbImage {
    if !img.color().has_alpha() {
        return img.to_rgb8();
    }
    let rgba = img.to_rgba8();
    RgbImage::from_fn(rgba.width(), rgba.height(), |x, y| {
        let [r, g, b, a] = rgba.get_pixel(x, y).0;
        let a = a as u32;
        Rgb([mix(r, 255, a), mix(g, 255, a), mix(b, 255, a)])
    })
}

// src over dst with alpha in 0..=255
fn mix(src: u8, dst: u8, alpha: u32) -> u8 {
    ((src as u32 * alpha + dst as u32 * (255 - alpha) + 127) / 255) as u8
}

// photo.png -> photo_resized.jpg
fn sibling(input: &Path, suffix: &str) -> PathBuf {
    let stem = input.file_stem().and_then(|s| s.to_str()).unwrap_or("image");
    input.with_file_name(format!("{stem}_{suffix}.jpg"))
}

// (out, "main", in/photo.png) -> out/main_photo.jpg
fn prefixed(dir: &Path, prefix: &str, input: &Path) -> PathBuf {
    let stem = input.file_stem().and_then(|s| s.to_str()).unwrap_or("image");
    dir.join(format!("{prefix}_{stem}.jpg"))
}
