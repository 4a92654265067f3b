/// Number of collections due after `elapsed_months` for a given cadence.
///
/// Collections fall on months `0, c, 2c, ...` strictly before the elapsed
/// month, so the baseline visit counts as soon as one month has passed:
/// `ceil(elapsed / cadence)`, and zero at month zero.
pub fn expected_count(elapsed_months: u32, cadence_months: u32) -> u32 {
    if elapsed_months == 0 {
        return 0;
    }
    elapsed_months.div_ceil(cadence_months.max(1))
}
