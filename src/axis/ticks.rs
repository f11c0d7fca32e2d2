/// Tick count for an axis of `axis_span_px` pixels at a preferred spacing.
pub(crate) fn axis_tick_target_count(
    axis_span_px: f64,
    target_spacing_px: f64,
    min_ticks: usize,
    max_ticks: usize,
) -> usize {
    if !axis_span_px.is_finite() || axis_span_px <= 0.0 {
        return min_ticks;
    }
    if !target_spacing_px.is_finite() || target_spacing_px <= 0.0 {
        return min_ticks;
    }

    let raw = (axis_span_px / target_spacing_px).floor() as usize + 1;
    raw.clamp(min_ticks, max_ticks)
}

/// Stride that keeps at most `max_ticks` out of `count` candidates.
///
/// Keeping indices `0, k, 2k, ...` yields `ceil(count / k)` survivors.
pub(crate) fn thinning_stride(count: usize, max_ticks: usize) -> usize {
    if max_ticks == 0 || count <= max_ticks {
        return 1;
    }
    count.div_ceil(max_ticks)
}

#[cfg(test)]
mod tests {
    use super::{axis_tick_target_count, thinning_stride};

    #[test]
    fn target_count_is_clamped() {
        assert_eq!(axis_tick_target_count(10.0, 48.0, 2, 12), 2);
        assert_eq!(axis_tick_target_count(480.0, 48.0, 2, 12), 11);
        assert_eq!(axis_tick_target_count(f64::NAN, 48.0, 2, 12), 2);
    }

    #[test]
    fn stride_keeps_survivors_within_bounds() {
        for count in 10..200 {
            let stride = thinning_stride(count, 9);
            let survivors = count.div_ceil(stride);
            assert!(survivors <= 9, "count={count}");
            assert!(survivors >= 5, "count={count}");
        }
        assert_eq!(thinning_stride(7, 9), 1);
    }
}
