/// Decode an IEEE-754 binary16 bit pattern into an `f32`
///
/// Normalized values, zeros, infinities and NaN decode exactly. Subnormal
/// inputs (exponent 0, non-zero fraction) decode as `±fraction / 1024`
/// without the 2^-14 exponent scale, so they come out larger than the
/// textbook value. Existing depth exports were produced with this rule, keep
/// it.
pub fn decode_half(bits: u16) -> f32 {
    let negative = bits & 0x8000 != 0;
    let exponent = (bits & 0x7C00) >> 10;
    let fraction = bits & 0x03FF;

    let magnitude = match exponent {
        0 if fraction == 0 => 0.0,
        0 => f32::from(fraction) / 1024.0,
        0x1F if fraction == 0 => f32::INFINITY,
        0x1F => return f32::NAN,
        _ => (1.0 + f32::from(fraction) / 1024.0) * 2f32.powi(i32::from(exponent) - 15),
    };

    if negative {
        -magnitude
    } else {
        magnitude
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signed_zeros() {
        let pos = decode_half(0x0000);
        let neg = decode_half(0x8000);
        assert_eq!(pos, 0.0);
        assert!(pos.is_sign_positive());
        assert_eq!(neg, 0.0);
        assert!(neg.is_sign_negative());
    }

    #[test]
    fn infinities_and_nan() {
        assert_eq!(decode_half(0x7C00), f32::INFINITY);
        assert_eq!(decode_half(0xFC00), f32::NEG_INFINITY);
        assert!(decode_half(0x7C01).is_nan());
        assert!(decode_half(0x7E00).is_nan());
        assert!(decode_half(0xFFFF).is_nan());
    }

    #[test]
    fn normalized_values() {
        assert_eq!(decode_half(0x3C00), 1.0);
        assert_eq!(decode_half(0xBC00), -1.0);
        assert_eq!(decode_half(0x4000), 2.0);
        assert_eq!(decode_half(0x3800), 0.5);
        assert_eq!(decode_half(0x3E00), 1.5);
        // Largest finite half.
        assert_eq!(decode_half(0x7BFF), 65504.0);
        // Smallest normal half.
        assert_eq!(decode_half(0x0400), 2f32.powi(-14));
    }

    #[test]
    fn subnormals_skip_exponent_scale() {
        assert_eq!(decode_half(0x0001), 1.0 / 1024.0);
        assert_eq!(decode_half(0x0200), 0.5);
        assert_eq!(decode_half(0x8200), -0.5);
        assert_eq!(decode_half(0x03FF), 1023.0 / 1024.0);
    }
}
