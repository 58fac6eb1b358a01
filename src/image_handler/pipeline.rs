//! # 画布几何变换模块
//!
//! ## 设计思路
//!
//! 所有尺寸计算集中在这里，并且都是纯函数：输入一张 RGB 图和 `TargetSpec`，
//! 输出一张新图。浮点尺寸转像素时一律截断（不四舍五入），
//! 居中偏移一律 `(剩余尺寸) / 2` 向下取整，保证重复运行得到逐像素一致的几何结果。
//!
//! ## 实现思路
//!
//! 1. 宽或高为 0：记录警告后原样返回
//! 2. 裁切模式：若配置了容差区间，先按目标宽度缩放一次，高度落在区间内直接返回
//! 3. 否则在原图上取与目标宽高比一致的居中窗口，再缩放到目标尺寸（中间缓冲不超过原图）
//! 4. 填充模式：等比缩放进内容框（允许放大），居中贴到背景画布
//!
//! 重采样优先走 `fast_image_resize`，失败时回退 `image::imageops::resize`。

use fast_image_resize as fr;
use image::imageops::{self, FilterType};
use image::{ImageBuffer, Rgb, RgbImage};

use super::{ImageError, TargetSpec};

/// 铺满目标框并居中裁切；配置了容差区间时，区间内的图片只缩放不裁切。
pub fn fit_and_crop(image: RgbImage, spec: &TargetSpec, filter: FilterType) -> RgbImage {
    let (width, height) = image.dimensions();
    if is_degenerate(width, height, spec) {
        return image;
    }

    let source_ratio = width as f64 / height as f64;

    if let Some(band) = spec.height_band {
        let scaled_height = truncate(spec.width as f64 / source_ratio).max(1);
        if band.contains(scaled_height) {
            log::debug!(
                "📐 缩放后高度 {} 在容差区间 [{}, {}] 内，保留内容不裁切",
                scaled_height,
                band.min,
                band.max
            );
            return resize_exact(&image, spec.width, scaled_height, filter);
        }
    }

    cover_and_center_crop(&image, spec.width, spec.height, filter)
}

/// 等比缩放进内容框后居中贴到 `background` 画布上，输出恰好等于画布尺寸。
pub fn fit_and_pad(image: RgbImage, spec: &TargetSpec, filter: FilterType) -> RgbImage {
    let (width, height) = image.dimensions();
    if is_degenerate(width, height, spec) {
        return image;
    }

    let (content_width, content_height) = spec.content_size();
    let source_ratio = width as f64 / height as f64;
    let box_ratio = content_width as f64 / content_height as f64;

    let (scaled_width, scaled_height) = if source_ratio > box_ratio {
        (content_width, truncate(content_width as f64 / source_ratio).max(1))
    } else {
        (truncate(content_height as f64 * source_ratio).max(1), content_height)
    };

    let resized = resize_exact(&image, scaled_width, scaled_height, filter);
    let mut canvas = RgbImage::from_pixel(spec.width, spec.height, Rgb(spec.background));

    let x = center_offset(spec.width, scaled_width);
    let y = center_offset(spec.height, scaled_height);
    imageops::replace(&mut canvas, &resized, x, y);

    canvas
}

/// 先在原图坐标系里按目标宽高比取居中窗口，再把窗口缩放到目标尺寸。
///
/// 只做一次重采样，中间缓冲不超过原图，极端长宽比的细条也不会放大出巨型缓冲。
fn cover_and_center_crop(
    image: &RgbImage,
    target_width: u32,
    target_height: u32,
    filter: FilterType,
) -> RgbImage {
    let window = crop_window(image.dimensions(), target_width, target_height);
    let region = imageops::crop_imm(image, window.0, window.1, window.2, window.3).to_image();
    resize_exact(&region, target_width, target_height, filter)
}

/// 原图中与目标宽高比一致的居中窗口 `(left, top, width, height)`，偏移向下取整。
fn crop_window(source: (u32, u32), target_width: u32, target_height: u32) -> (u32, u32, u32, u32) {
    let (width, height) = source;
    let source_ratio = width as f64 / height as f64;
    let target_ratio = target_width as f64 / target_height as f64;

    if source_ratio > target_ratio {
        let window_width = truncate(height as f64 * target_ratio).clamp(1, width);
        ((width - window_width) / 2, 0, window_width, height)
    } else {
        let window_height = truncate(width as f64 / target_ratio).clamp(1, height);
        (0, (height - window_height) / 2, width, window_height)
    }
}

fn is_degenerate(width: u32, height: u32, spec: &TargetSpec) -> bool {
    if width == 0 || height == 0 {
        log::warn!("⚠️ 图片尺寸无效（{}x{}），跳过几何变换原样输出", width, height);
        return true;
    }
    if spec.width == 0 || spec.height == 0 {
        log::warn!(
            "⚠️ 目标尺寸无效（{}x{}），跳过几何变换原样输出",
            spec.width,
            spec.height
        );
        return true;
    }
    false
}

/// 浮点尺寸转像素：截断而非四舍五入。
fn truncate(value: f64) -> u32 {
    value as u32
}

/// `(canvas - content) // 2`，内容大于画布时为负（向下取整）。
fn center_offset(canvas: u32, content: u32) -> i64 {
    (canvas as i64 - content as i64).div_euclid(2)
}

/// 精确缩放到指定尺寸。
///
/// 优先使用 `fast_image_resize`，失败时回退 `image::imageops::resize`。
pub fn resize_exact(
    image: &RgbImage,
    target_width: u32,
    target_height: u32,
    filter: FilterType,
) -> RgbImage {
    if image.dimensions() == (target_width, target_height) {
        return image.clone();
    }

    match resize_with_fast_image_resize(image, target_width, target_height, filter) {
        Ok(resized) => resized,
        Err(err) => {
            log::warn!(
                "⚠️ fast_image_resize 缩放失败，回退 image::imageops::resize：{}",
                err
            );
            imageops::resize(image, target_width, target_height, filter)
        }
    }
}

fn resize_with_fast_image_resize(
    image: &RgbImage,
    target_width: u32,
    target_height: u32,
    filter: FilterType,
) -> Result<RgbImage, ImageError> {
    let (src_width, src_height) = image.dimensions();

    let src_image = fr::images::Image::from_vec_u8(
        src_width,
        src_height,
        image.as_raw().clone(),
        fr::PixelType::U8x3,
    )
    .map_err(|e| ImageError::Decode(format!("构建源图像缓冲失败：{}", e)))?;

    let mut dst_image = fr::images::Image::new(target_width, target_height, fr::PixelType::U8x3);

    let mut resizer = fr::Resizer::new();
    let options = fr::ResizeOptions::new()
        .resize_alg(fr::ResizeAlg::Convolution(to_fast_filter(filter)));

    resizer
        .resize(&src_image, &mut dst_image, Some(&options))
        .map_err(|e| ImageError::Decode(format!("fast_image_resize 执行失败：{}", e)))?;

    ImageBuffer::<Rgb<u8>, Vec<u8>>::from_raw(target_width, target_height, dst_image.into_vec())
        .ok_or_else(|| ImageError::Decode("fast_image_resize 输出缓冲长度异常".to_string()))
}

fn to_fast_filter(filter: FilterType) -> fr::FilterType {
    match filter {
        FilterType::Nearest => fr::FilterType::Box,
        FilterType::Triangle => fr::FilterType::Bilinear,
        FilterType::CatmullRom => fr::FilterType::CatmullRom,
        FilterType::Gaussian => fr::FilterType::Mitchell,
        FilterType::Lanczos3 => fr::FilterType::Lanczos3,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const FILTER: FilterType = FilterType::Lanczos3;

    fn solid(width: u32, height: u32, color: [u8; 3]) -> RgbImage {
        RgbImage::from_pixel(width, height, Rgb(color))
    }

    #[test]
    fn crop_wider_source_scales_to_height_then_crops_width() {
        let spec = TargetSpec::new(960, 720);
        let out = fit_and_crop(solid(2000, 1000, [10, 20, 30]), &spec, FILTER);
        assert_eq!(out.dimensions(), (960, 720));
    }

    #[test]
    fn crop_taller_source_scales_to_width_then_crops_height() {
        let spec = TargetSpec::new(960, 720);
        let out = fit_and_crop(solid(500, 1500, [10, 20, 30]), &spec, FILTER);
        assert_eq!(out.dimensions(), (960, 720));
    }

    #[test]
    fn crop_keeps_center_with_floor_offset() {
        let mut image = solid(40, 10, [255, 255, 255]);
        for x in 0..20 {
            for y in 0..10 {
                image.put_pixel(x, y, Rgb([0, 0, 0]));
            }
        }
        let spec = TargetSpec::new(20, 10);
        let out = fit_and_crop(image, &spec, FilterType::Nearest);
        assert_eq!(out.dimensions(), (20, 10));
        // 窗口 20x10，left = (40 - 20) / 2 = 10
        assert_eq!(out.get_pixel(0, 5), &Rgb([0, 0, 0]));
        assert_eq!(out.get_pixel(19, 5), &Rgb([255, 255, 255]));
    }

    #[test]
    fn crop_window_stays_inside_source() {
        assert_eq!(crop_window((2000, 1000), 960, 720), (333, 0, 1333, 1000));
        assert_eq!(crop_window((500, 1500), 960, 720), (0, 562, 500, 375));
        assert_eq!(crop_window((1, 100_000), 960, 720), (0, 49_999, 1, 1));
        assert_eq!(crop_window((100_000, 1), 960, 720), (49_999, 0, 1, 1));
    }

    #[test]
    fn thin_strip_is_cropped_without_huge_intermediate() {
        let spec = TargetSpec::new(960, 720);
        let out = fit_and_crop(solid(1, 100_000, [7, 8, 9]), &spec, FILTER);
        assert_eq!(out.dimensions(), (960, 720));

        let banded = TargetSpec::new(900, 600).with_height_band(550, 650);
        let out = fit_and_crop(solid(100_000, 1, [7, 8, 9]), &banded, FILTER);
        assert_eq!(out.dimensions(), (900, 600));
    }

    #[test]
    fn band_accepts_near_ratio_image_without_crop() {
        // 1000x640 -> 宽 900 时高 576，落在 [550, 650]
        let spec = TargetSpec::new(900, 600).with_height_band(550, 650);
        let out = fit_and_crop(solid(1000, 640, [1, 2, 3]), &spec, FILTER);
        assert_eq!(out.dimensions(), (900, 576));
    }

    #[test]
    fn band_rejects_square_image_and_crops_exactly() {
        let spec = TargetSpec::new(900, 600).with_height_band(550, 650);
        let out = fit_and_crop(solid(800, 800, [1, 2, 3]), &spec, FILTER);
        assert_eq!(out.dimensions(), (900, 600));
    }

    #[test]
    fn band_rejects_very_wide_image_and_crops_exactly() {
        let spec = TargetSpec::new(900, 600).with_height_band(550, 650);
        let out = fit_and_crop(solid(3000, 1000, [1, 2, 3]), &spec, FILTER);
        assert_eq!(out.dimensions(), (900, 600));
    }

    #[test]
    fn zero_sized_image_passes_through() {
        let spec = TargetSpec::new(900, 600);
        let out = fit_and_crop(RgbImage::new(0, 10), &spec, FILTER);
        assert_eq!(out.dimensions(), (0, 10));
        let out = fit_and_pad(RgbImage::new(10, 0), &spec, FILTER);
        assert_eq!(out.dimensions(), (10, 0));
    }

    #[test]
    fn pad_centers_content_on_background() {
        let spec = TargetSpec::square(750)
            .with_content_box(650, 650)
            .with_background([255, 255, 255]);
        let out = fit_and_pad(solid(800, 400, [0, 0, 0]), &spec, FILTER);
        assert_eq!(out.dimensions(), (750, 750));
        // 800x400 -> 650x325，偏移 (50, 212)
        assert_eq!(out.get_pixel(0, 0), &Rgb([255, 255, 255]));
        assert_eq!(out.get_pixel(49, 375), &Rgb([255, 255, 255]));
        assert_eq!(out.get_pixel(375, 375), &Rgb([0, 0, 0]));
        assert_eq!(out.get_pixel(375, 211), &Rgb([255, 255, 255]));
        assert_eq!(out.get_pixel(375, 536), &Rgb([0, 0, 0]));
        assert_eq!(out.get_pixel(375, 537), &Rgb([255, 255, 255]));
    }

    #[test]
    fn pad_upscales_small_sources() {
        let spec = TargetSpec::square(100);
        let out = fit_and_pad(solid(10, 5, [9, 9, 9]), &spec, FilterType::Nearest);
        assert_eq!(out.dimensions(), (100, 100));
        assert_eq!(out.get_pixel(50, 50), &Rgb([9, 9, 9]));
        assert_eq!(out.get_pixel(50, 10), &Rgb([255, 255, 255]));
    }

    #[test]
    fn center_offset_floors_negative_remainders() {
        assert_eq!(center_offset(750, 650), 50);
        assert_eq!(center_offset(750, 325), 212);
        assert_eq!(center_offset(10, 13), -2);
    }

    #[test]
    fn resize_is_deterministic() {
        let mut image = solid(37, 23, [0, 0, 0]);
        for (x, y, pixel) in image.enumerate_pixels_mut() {
            *pixel = Rgb([(x * 7) as u8, (y * 11) as u8, ((x + y) * 3) as u8]);
        }
        let a = resize_exact(&image, 91, 57, FILTER);
        let b = resize_exact(&image, 91, 57, FILTER);
        assert_eq!(a.as_raw(), b.as_raw());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(48))]

        #[test]
        fn crop_output_is_always_exact_target(w in 1u32..120, h in 1u32..120) {
            let spec = TargetSpec::new(36, 24);
            let out = fit_and_crop(solid(w, h, [5, 5, 5]), &spec, FILTER);
            prop_assert_eq!(out.dimensions(), (36, 24));
        }

        #[test]
        fn pad_output_is_always_exact_canvas(w in 1u32..120, h in 1u32..120) {
            let spec = TargetSpec::new(40, 30).with_content_box(32, 24);
            let out = fit_and_pad(solid(w, h, [5, 5, 5]), &spec, FILTER);
            prop_assert_eq!(out.dimensions(), (40, 30));
        }

        #[test]
        fn band_result_is_target_width_and_in_band_or_exact(w in 1u32..200, h in 1u32..200) {
            let spec = TargetSpec::new(30, 20).with_height_band(18, 23);
            let out = fit_and_crop(solid(w, h, [5, 5, 5]), &spec, FILTER);
            let (ow, oh) = out.dimensions();
            prop_assert_eq!(ow, 30);
            prop_assert!(oh == 20 || (18..=23).contains(&oh));
        }
    }
}
