/// Render a smallest-unit token amount as a decimal string.
///
/// Integer arithmetic only, so amounts beyond 2^53 stay exact. Trailing
/// fractional zeros are trimmed.
pub fn format_token_amount(amount: u128, decimals: u32) -> String {
	let scale = 10u128.pow(decimals);
	let whole = amount / scale;
	let frac = amount % scale;

	if frac == 0 {
		return whole.to_string();
	}

	let frac = format!("{frac:0width$}", width = decimals as usize);
	format!("{whole}.{}", frac.trim_end_matches('0'))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn formats_whole_and_fractional_amounts() {
		assert_eq!(format_token_amount(0, 18), "0");
		assert_eq!(format_token_amount(1_000_000_000_000_000_000, 18), "1");
		assert_eq!(format_token_amount(1_500_000_000_000_000_000, 18), "1.5");
		assert_eq!(format_token_amount(25, 6), "0.000025");
	}
}
