use barflux_core::bands::BinEdges;
use barflux_core::config::LayerSpec;
use proptest::prelude::*;

fn spec(freq_min: f32, freq_max: f32, bins: usize) -> LayerSpec {
    LayerSpec {
        freq_min,
        freq_max,
        bins,
        ..LayerSpec::default()
    }
}

#[test]
fn known_scenario_80_to_6000_hz() {
    // round(80 * 2048 / 44100) = 4, round(6000 * 2048 / 44100) = 279
    let edges = BinEdges::compute(&spec(80.0, 6000.0, 64), 2048, 44100);
    assert_eq!(edges.bins(), 64);
    assert_eq!(edges.as_slice()[0], 4);
    assert_eq!(edges.as_slice()[64], 279);
}

#[test]
fn edges_clamp_to_the_valid_bin_range() {
    // Range extends past Nyquist; edges must stay inside the spectrum
    let edges = BinEdges::compute(&spec(1000.0, 40000.0, 32), 1024, 44100);
    assert!(*edges.as_slice().last().unwrap() <= 512);
}

proptest! {
    #[test]
    fn edges_are_monotone_and_in_range(
        freq_min in 20.0f32..2000.0,
        span in 1.1f32..40.0,
        bins in 1usize..256,
        fft_pow in 8u32..14,
        sample_rate in 8000u32..96000,
    ) {
        let fft_size = 1usize << fft_pow;
        let layer = spec(freq_min, freq_min * span, bins);
        let edges = BinEdges::compute(&layer, fft_size, sample_rate);
        let slice = edges.as_slice();

        prop_assert_eq!(slice.len(), bins + 1);
        for pair in slice.windows(2) {
            prop_assert!(pair[0] <= pair[1]);
        }
        prop_assert!(*slice.last().unwrap() <= fft_size / 2);
    }
}
