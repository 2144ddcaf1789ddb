//! Element-wise activations and the final class selection.

/// Leaky rectifier applied in-place.
///
/// Positive values pass through unchanged; everything else (zero included) is
/// scaled by `alpha`.
pub fn leaky_relu_inplace(data: &mut [f32], alpha: f32) {
    for value in data.iter_mut() {
        if *value <= 0.0 {
            *value *= alpha;
        }
    }
}

/// Index of the first maximum in `logits`.
///
/// Scans left to right and only moves on a strictly greater value, so ties
/// resolve to the earliest index. Returns 0 for an empty slice.
pub fn argmax(logits: &[f32]) -> usize {
    let Some((&first, rest)) = logits.split_first() else {
        return 0;
    };

    let mut best = first;
    let mut arg = 0usize;
    for (i, &value) in rest.iter().enumerate() {
        if value > best {
            best = value;
            arg = i + 1;
        }
    }
    arg
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leaky_relu_negative() {
        let mut data = vec![-10.0f32];
        leaky_relu_inplace(&mut data, 0.1);
        assert_eq!(data[0], -1.0);
    }

    #[test]
    fn test_leaky_relu_positive() {
        let mut data = vec![5.0f32];
        leaky_relu_inplace(&mut data, 0.1);
        assert_eq!(data[0], 5.0);
    }

    #[test]
    fn test_leaky_relu_zero_stays_zero() {
        let mut data = vec![0.0f32];
        leaky_relu_inplace(&mut data, 0.1);
        assert_eq!(data[0], 0.0);
    }

    #[test]
    fn test_leaky_relu_zero_alpha_is_relu() {
        let mut data = vec![-2.0, -1.0, 0.0, 1.0, 2.0];
        leaky_relu_inplace(&mut data, 0.0);
        for (value, expected) in data.iter().zip([0.0, 0.0, 0.0, 1.0, 2.0]) {
            assert_eq!(*value, expected);
        }
    }

    #[test]
    fn test_argmax_first_maximum_wins() {
        assert_eq!(argmax(&[2.0, 5.0, 5.0, 1.0]), 1);
    }

    #[test]
    fn test_argmax_last_element() {
        assert_eq!(argmax(&[-3.0, -2.0, -1.0]), 2);
    }

    #[test]
    fn test_argmax_empty() {
        assert_eq!(argmax(&[]), 0);
    }
}
