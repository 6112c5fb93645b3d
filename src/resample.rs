use image::imageops::FilterType;
use image::{DynamicImage, ImageBuffer, Pixel, Primitive};

/// Integer sample types the area filter accumulates in `f64`.
pub trait AreaSample: Primitive {
    fn to_f64(self) -> f64;
    fn from_f64(v: f64) -> Self;
}

impl AreaSample for u8 {
    fn to_f64(self) -> f64 {
        self as f64
    }

    fn from_f64(v: f64) -> Self {
        v.round().clamp(0.0, u8::MAX as f64) as u8
    }
}

impl AreaSample for u16 {
    fn to_f64(self) -> f64 {
        self as f64
    }

    fn from_f64(v: f64) -> Self {
        v.round().clamp(0.0, u16::MAX as f64) as u16
    }
}

/// Source pixels covering each destination pixel along one axis, with the
/// fraction of the destination pixel each one covers.
fn axis_weights(src_len: u32, dst_len: u32) -> Vec<Vec<(u32, f64)>> {
    let scale = src_len as f64 / dst_len as f64;
    (0..dst_len)
        .map(|d| {
            let start = d as f64 * scale;
            let end = start + scale;
            let first = start.floor() as u32;
            let last = (end.ceil() as u32).min(src_len);
            (first..last)
                .filter_map(|s| {
                    let covered = (end.min(s as f64 + 1.0) - start.max(s as f64)) / scale;
                    (covered > 0.0).then_some((s, covered))
                })
                .collect()
        })
        .collect()
}

/// Resamples by averaging every source pixel under each destination pixel,
/// weighted by overlapping area.
pub fn area_resize<P>(
    src: &ImageBuffer<P, Vec<P::Subpixel>>,
    width: u32,
    height: u32,
) -> ImageBuffer<P, Vec<P::Subpixel>>
where
    P: Pixel + 'static,
    P::Subpixel: AreaSample + 'static,
{
    let (src_w, src_h) = src.dimensions();
    let xs = axis_weights(src_w, width);
    let ys = axis_weights(src_h, height);
    let channels = P::CHANNEL_COUNT as usize;

    let mut out: ImageBuffer<P, Vec<P::Subpixel>> = ImageBuffer::new(width, height);
    let mut acc = vec![0f64; channels];
    for (y, y_weights) in ys.iter().enumerate() {
        for (x, x_weights) in xs.iter().enumerate() {
            acc.iter_mut().for_each(|a| *a = 0.0);
            for &(sy, wy) in y_weights {
                for &(sx, wx) in x_weights {
                    let w = wx * wy;
                    let px = src.get_pixel(sx, sy);
                    for (a, c) in acc.iter_mut().zip(px.channels()) {
                        *a += c.to_f64() * w;
                    }
                }
            }
            let dst = out.get_pixel_mut(x as u32, y as u32);
            for (c, a) in dst.channels_mut().iter_mut().zip(&acc) {
                *c = P::Subpixel::from_f64(*a);
            }
        }
    }
    out
}

/// Squashes `img` into a `side` x `side` square, keeping its color type.
pub fn resize_square(img: &DynamicImage, side: u32) -> DynamicImage {
    match img {
        DynamicImage::ImageLuma8(b) => DynamicImage::ImageLuma8(area_resize(b, side, side)),
        DynamicImage::ImageLumaA8(b) => DynamicImage::ImageLumaA8(area_resize(b, side, side)),
        DynamicImage::ImageRgb8(b) => DynamicImage::ImageRgb8(area_resize(b, side, side)),
        DynamicImage::ImageRgba8(b) => DynamicImage::ImageRgba8(area_resize(b, side, side)),
        DynamicImage::ImageLuma16(b) => DynamicImage::ImageLuma16(area_resize(b, side, side)),
        DynamicImage::ImageLumaA16(b) => DynamicImage::ImageLumaA16(area_resize(b, side, side)),
        DynamicImage::ImageRgb16(b) => DynamicImage::ImageRgb16(area_resize(b, side, side)),
        DynamicImage::ImageRgba16(b) => DynamicImage::ImageRgba16(area_resize(b, side, side)),
        // Float images: the triangle filter widens its support when shrinking.
        other => other.resize_exact(side, side, FilterType::Triangle),
    }
}
