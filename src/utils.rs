use crate::crc::CRC16;
use pretty_env_logger::formatted_builder;

pub fn init_logger() -> Result<(), log::SetLoggerError> {
    let mut builder = formatted_builder();

    if let Ok(s) = ::std::env::var("RUST_LOG") {
        builder.parse_filters(&s);
    } else {
        builder.parse_filters("info");
    }

    builder.try_init()
}

/// Computes the TVM method id of a getter by name.
pub fn method_name_to_id(name: &str) -> u32 {
    (CRC16.checksum(name.as_bytes()) as u32 & 0xFFFF) | 0x10000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_id_has_flag_bit() {
        let id = method_name_to_id("get_sale_data");
        assert_eq!(id & 0x10000, 0x10000);
        assert!(id <= 0x1FFFF);
    }

    #[test]
    fn test_method_id_deterministic() {
        assert_eq!(
            method_name_to_id("get_collection_data"),
            method_name_to_id("get_collection_data")
        );
        assert_ne!(
            method_name_to_id("get_collection_data"),
            method_name_to_id("get_nft_data")
        );
    }
}
