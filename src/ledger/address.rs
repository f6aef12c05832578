use bech32::Bech32m;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AddressError {
	#[error("address prefix first part != 'tkt'")]
	PrefixInvalidConstant,
	#[error("malformed address: {0}")]
	Encoding(String),
}

/// Bech32m account identifier used on the ticketing ledger.
///
/// The human-readable part is `tkt`, optionally followed by a network
/// suffix (`tkt_test`, `tkt_dev`); mainnet addresses carry no suffix. The
/// Bech32m checksum is verified on decode, and encoding canonicalizes the
/// textual form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountAddress {
	pub network: Option<String>,
	pub data: Vec<u8>,
}

impl AccountAddress {
	pub fn decode(encoded: &str) -> Result<Self, AddressError> {
		let (hrp, data) =
			bech32::decode(encoded).map_err(|e| AddressError::Encoding(e.to_string()))?;
		let prefix_parts = hrp.as_str().split('_').collect::<Vec<&str>>();
		prefix_parts
			.first()
			.filter(|c| *c == &"tkt")
			.ok_or(AddressError::PrefixInvalidConstant)?;
		let network = prefix_parts.get(1).map(|s| s.to_string());

		Ok(Self { network, data })
	}

	pub fn encode(&self) -> String {
		let network_str = match &self.network {
			Some(network) => format!("_{}", network),
			None => "".to_string(),
		};

		bech32::encode::<Bech32m>(
			bech32::Hrp::parse(&format!("tkt{}", network_str))
				.expect("Failed while bech32 parsing"),
			&self.data,
		)
		.expect("Failed while bech32 encoding")
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use bech32::{Bech32m, Hrp};

	#[test]
	fn test_parse() {
		let encoded_str = bech32::encode::<Bech32m>(
			Hrp::parse("tkt_test").expect("Failed while bech32 parsing"),
			&[1, 2, 3],
		)
		.expect("Failed while bech32 encoding");
		let address =
			AccountAddress::decode(&encoded_str).expect("Failed while decoding `AccountAddress`");
		assert_eq!(address.network, Some("test".to_string()));
		assert_eq!(address.data, vec![1u8, 2u8, 3u8]);
		assert_eq!(address.encode(), encoded_str);
	}

	#[test]
	fn test_rejects_foreign_prefix() {
		let encoded_str = bech32::encode::<Bech32m>(
			Hrp::parse("mn_test").expect("Failed while bech32 parsing"),
			&[1, 2, 3],
		)
		.expect("Failed while bech32 encoding");
		assert!(matches!(
			AccountAddress::decode(&encoded_str),
			Err(AddressError::PrefixInvalidConstant)
		));
	}

	#[test]
	fn test_rejects_corrupted_checksum() {
		let encoded_str = bech32::encode::<Bech32m>(
			Hrp::parse("tkt").expect("Failed while bech32 parsing"),
			&[1, 2, 3],
		)
		.expect("Failed while bech32 encoding");
		let mut corrupted = encoded_str.clone();
		let last = if corrupted.ends_with('q') { 'p' } else { 'q' };
		corrupted.pop();
		corrupted.push(last);
		assert!(matches!(
			AccountAddress::decode(&corrupted),
			Err(AddressError::Encoding(_))
		));
	}
}
