/// Whole-number percentage of `part` in `total`, rounded half away from zero.
/// An empty total counts as no progress.
pub fn percent(part: usize, total: usize) -> u16 {
    match total {
        positive if positive > 0 => ((part as f64 / total as f64) * 100.0).round() as u16,
        _ => 0,
    }
}
