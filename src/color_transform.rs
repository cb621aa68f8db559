//! Forward HP color transformations (HP extension, not part of
//! ISO/IEC 14495-1). The transforms are reversible in modular arithmetic at
//! the full sample width, which is why they are restricted to 8 and 16 bits
//! per sample.

use crate::traits::Sample;
use crate::ColorTransformation;

fn range_half<T: Sample>() -> i32 {
    1 << (T::BITS - 1)
}

pub fn transform_hp1<T: Sample>(v1: i32, v2: i32, v3: i32) -> (T, T, T) {
    let half = range_half::<T>();
    (
        T::from_i32(v1 - v2 + half),
        T::from_i32(v2),
        T::from_i32(v3 - v2 + half),
    )
}

pub fn transform_hp2<T: Sample>(v1: i32, v2: i32, v3: i32) -> (T, T, T) {
    let half = range_half::<T>();
    (
        T::from_i32(v1 - v2 + half),
        T::from_i32(v2),
        T::from_i32(v3 - ((v1 + v2) >> 1) + half),
    )
}

pub fn transform_hp3<T: Sample>(v1: i32, v2: i32, v3: i32) -> (T, T, T) {
    let half = range_half::<T>();
    let quarter = half >> 1;
    let y2 = T::from_i32(v3 - v2 + half);
    let y3 = T::from_i32(v1 - v2 + half);
    (
        T::from_i32(v2 + ((y2.to_i32() + y3.to_i32()) >> 1) - quarter),
        y2,
        y3,
    )
}

/// Applies the configured transformation to one RGB pixel. `None` is the
/// identity.
pub fn transform_pixel<T: Sample>(
    transformation: ColorTransformation,
    v1: T,
    v2: T,
    v3: T,
) -> (T, T, T) {
    match transformation {
        ColorTransformation::None => (v1, v2, v3),
        ColorTransformation::Hp1 => transform_hp1(v1.to_i32(), v2.to_i32(), v3.to_i32()),
        ColorTransformation::Hp2 => transform_hp2(v1.to_i32(), v2.to_i32(), v3.to_i32()),
        ColorTransformation::Hp3 => transform_hp3(v1.to_i32(), v2.to_i32(), v3.to_i32()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hp1_gray_pixel_maps_to_neutral_chroma() {
        let (v1, v2, v3) = transform_hp1::<u8>(100, 100, 100);
        assert_eq!((v1, v2, v3), (128, 100, 128));
    }

    #[test]
    fn hp1_wraps_at_sample_width() {
        let (v1, _, v3) = transform_hp1::<u8>(255, 0, 0);
        assert_eq!(v1, 127); // 255 + 128 mod 256
        assert_eq!(v3, 128);
    }

    #[test]
    fn hp2_is_reversible_in_modular_arithmetic() {
        for &(r, g, b) in &[(12, 200, 33), (255, 255, 255), (0, 128, 7)] {
            let (y1, y2, y3) = transform_hp2::<u8>(r, g, b);
            let r2 = y1.to_i32() + y2.to_i32() - 128;
            let g2 = y2.to_i32();
            let b2 = y3.to_i32() + (((r2 & 0xFF) + g2) >> 1) - 128;
            assert_eq!((r2 as u8, g2 as u8, b2 as u8), (r as u8, g as u8, b as u8));
        }
    }

    #[test]
    fn hp3_is_reversible_in_modular_arithmetic() {
        for &(r, g, b) in &[(12, 200, 33), (255, 255, 255), (0, 128, 7)] {
            let (y1, y2, y3) = transform_hp3::<u8>(r, g, b);
            // Inverse of HP3 as defined by the HP extension.
            let g2 = y1.to_i32() - ((y2.to_i32() + y3.to_i32()) >> 1) + 64;
            let r2 = y3.to_i32() + g2 - 128;
            let b2 = y2.to_i32() + g2 - 128;
            assert_eq!((r2 as u8, g2 as u8, b2 as u8), (r as u8, g as u8, b as u8));
        }
    }
}
